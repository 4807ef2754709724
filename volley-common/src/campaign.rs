//! The campaign record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CampaignId, CampaignStatus};

/// A bulk-send campaign: one subject/body template pair plus the progress of
/// its run.
///
/// `subject` and `body_template` may reference `{{name}}`, `{{email}}`, and
/// `{{campaign}}`; rendering resolves them per recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub subject: String,
    pub body_template: String,
    /// Throughput cap in messages per minute. Also the batch size of a run.
    pub rate_limit_per_minute: u32,
    #[serde(default)]
    pub status: CampaignStatus,
    /// How many recipients the current or last run set out to settle.
    #[serde(default)]
    pub total_recipients: u32,
    #[serde(default)]
    pub sent_count: u32,
    #[serde(default)]
    pub failed_count: u32,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Campaign {
    /// A fresh `draft` campaign with zeroed progress.
    #[must_use]
    pub fn new(
        id: CampaignId,
        subject: impl Into<String>,
        body_template: impl Into<String>,
        rate_limit_per_minute: u32,
    ) -> Self {
        Self {
            id,
            subject: subject.into(),
            body_template: body_template.into(),
            rate_limit_per_minute,
            status: CampaignStatus::default(),
            total_recipients: 0,
            sent_count: 0,
            failed_count: 0,
            started_at: None,
            completed_at: None,
        }
    }
}
