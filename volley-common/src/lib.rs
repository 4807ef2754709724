//! Shared campaign model and ambient plumbing for volley
//!
//! This crate provides:
//! - Identifier types for campaigns and recipients
//! - Campaign and recipient records plus their status lifecycles
//! - The rendered message handed to transports
//! - Logging macros and subscriber setup

pub mod campaign;
pub mod ids;
pub mod logging;
pub mod message;
pub mod recipient;
pub mod status;

// Re-exported so the logging macros can expand in downstream crates.
pub use tracing;

pub use campaign::Campaign;
pub use ids::{CampaignId, RecipientId};
pub use message::RenderedMessage;
pub use recipient::Recipient;
pub use status::{CampaignStatus, RecipientStatus};

/// Control signals broadcast to active campaign runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Stop at the next batch boundary, leaving campaigns resumable.
    Shutdown,
}
