// # Instance Store Implementations
//
// This module provides implementations of the InstanceStore trait.

pub mod memory;

pub use memory::MemoryInstanceStore;
