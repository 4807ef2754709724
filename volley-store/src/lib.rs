//! Campaign persistence for volley
//!
//! This crate provides:
//! - The [`CampaignStore`] trait the dispatch engine is written against
//! - An in-memory backend for tests and single-process runs
//! - A failure-injecting backend for exercising abort and resume paths

pub mod backends;
pub mod error;
pub mod r#trait;
pub mod types;

pub use backends::{FaultStore, MemoryStore};
pub use error::{Result, StoreError};
pub use r#trait::CampaignStore;
pub use types::CampaignProgress;
