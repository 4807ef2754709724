//! The campaign store abstraction

use async_trait::async_trait;
use volley_common::{Campaign, CampaignId, Recipient, RecipientId, RecipientStatus};

use crate::types::CampaignProgress;

/// Persistence seam for campaign runs.
///
/// The dispatch engine is written against this trait alone; backends decide
/// where rows actually live. Implementations must tolerate concurrent calls.
#[async_trait]
pub trait CampaignStore: std::fmt::Debug + Send + Sync {
    /// Load one campaign row.
    ///
    /// # Errors
    /// `CampaignNotFound` when the id is unknown, or a backend failure.
    async fn load_campaign(&self, id: &CampaignId) -> crate::Result<Campaign>;

    /// Load every recipient of `campaign_id` still `pending`, in insertion
    /// order.
    ///
    /// # Errors
    /// `CampaignNotFound` when the id is unknown, or a backend failure.
    async fn load_pending_recipients(
        &self,
        campaign_id: &CampaignId,
    ) -> crate::Result<Vec<Recipient>>;

    /// Settle one recipient. Only `pending` rows may be written, and only to
    /// a terminal status.
    ///
    /// # Errors
    /// `RecipientNotFound`, `InvalidTransition`, or a backend failure.
    async fn update_recipient_status(
        &self,
        id: &RecipientId,
        status: RecipientStatus,
    ) -> crate::Result<()>;

    /// Write a campaign progress snapshot.
    ///
    /// # Errors
    /// `CampaignNotFound`, `InvalidTransition` when the status write would
    /// regress the lifecycle, `InvalidProgress` when the counts are
    /// inconsistent, or a backend failure.
    async fn update_campaign_progress(&self, progress: &CampaignProgress) -> crate::Result<()>;
}
