//! The recipient record

use serde::{Deserialize, Serialize};

use crate::{CampaignId, RecipientId, RecipientStatus};

/// One addressee of a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub id: RecipientId,
    pub campaign_id: CampaignId,
    pub email: String,
    /// Display name, available to templates as `{{name}}`.
    pub name: String,
    #[serde(default)]
    pub status: RecipientStatus,
}

impl Recipient {
    /// A fresh `pending` recipient with a generated id.
    #[must_use]
    pub fn new(
        campaign_id: CampaignId,
        email: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: RecipientId::generate(),
            campaign_id,
            email: email.into(),
            name: name.into(),
            status: RecipientStatus::default(),
        }
    }
}
