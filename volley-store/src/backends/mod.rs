//! Backend implementations of the campaign store
//!
//! This module contains the available backends:
//! - `memory`: In-memory tables for tests and single-process runs
//! - `fault`: Failure-injecting wrapper for exercising abort and resume paths

pub mod fault;
pub mod memory;

pub use fault::FaultStore;
pub use memory::MemoryStore;
