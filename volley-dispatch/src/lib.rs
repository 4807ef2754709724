//! The campaign dispatch engine for volley
//!
//! This crate provides functionality to:
//! - Run a campaign end to end: load, batch, dispatch, settle
//! - Pace sends inside each rate window with staggered offsets
//! - Isolate per-recipient render and transport failures
//! - Cancel active runs at batch boundaries and resume them later

mod cancel;
mod config;
mod coordinator;
mod error;
mod scheduler;
mod types;
mod unit;

pub use config::DispatchConfig;
pub use coordinator::DispatchEngine;
pub use error::DispatchError;
pub use types::{DispatchOutcome, DispatchResult, RunSummary};
