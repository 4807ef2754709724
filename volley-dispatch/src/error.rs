//! Error types for campaign runs

use thiserror::Error;
use volley_common::{CampaignId, CampaignStatus};
use volley_store::StoreError;

/// Failures that abort a run before or between batches.
///
/// Per-recipient render and transport failures never surface here; the
/// dispatch unit records those on the recipient row and the run carries on.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The campaign cannot accept a run from its current status.
    #[error("Invalid state: campaign {campaign} is {status}")]
    InvalidState {
        campaign: CampaignId,
        status: CampaignStatus,
    },

    /// The campaign does not exist.
    #[error("Campaign not found: {0}")]
    CampaignNotFound(CampaignId),

    /// The store failed while loading the campaign or its recipients.
    /// Nothing has been mutated when this is returned.
    #[error("Load failure: {0}")]
    LoadFailure(#[source] StoreError),

    /// The store failed while recording progress. The campaign is left in
    /// `sending` so a later run can resume it.
    #[error("Persist failure: {0}")]
    PersistFailure(String),

    /// The run was requested with an unusable configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DispatchError {
    /// Categorize a store error raised while loading.
    pub(crate) fn load(error: StoreError) -> Self {
        match error {
            StoreError::CampaignNotFound(id) => Self::CampaignNotFound(id),
            other => Self::LoadFailure(other),
        }
    }

    /// Categorize a store error raised while persisting progress.
    pub(crate) fn persist(error: &StoreError) -> Self {
        Self::PersistFailure(error.to_string())
    }

    #[must_use]
    pub const fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }

    #[must_use]
    pub const fn is_load_failure(&self) -> bool {
        matches!(self, Self::LoadFailure(_))
    }

    #[must_use]
    pub const fn is_persist_failure(&self) -> bool {
        matches!(self, Self::PersistFailure(_))
    }
}
