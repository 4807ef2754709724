//! Error types for campaign store operations

use thiserror::Error;
use volley_common::{CampaignId, RecipientId};

/// Top-level store error type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Campaign not found.
    #[error("Campaign not found: {0}")]
    CampaignNotFound(CampaignId),

    /// Recipient not found.
    #[error("Recipient not found: {0}")]
    RecipientNotFound(RecipientId),

    /// A campaign with this id already exists.
    #[error("Campaign already exists: {0}")]
    AlreadyExists(CampaignId),

    /// A recipient with this email is already attached to the campaign.
    #[error("Duplicate recipient {email} in campaign {campaign}")]
    DuplicateRecipient {
        campaign: CampaignId,
        email: String,
    },

    /// The write would move a status backwards or past a terminal state.
    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    /// The write would break the `sent + failed <= total` count invariant.
    #[error("Invalid progress: {0}")]
    InvalidProgress(String),

    /// The backend cannot currently serve requests.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Internal error (lock poisoning, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        Self::Internal(format!("Lock poisoned: {e}"))
    }
}
