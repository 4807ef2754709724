//! Type definitions for store payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use volley_common::{CampaignId, CampaignStatus};

/// One campaign progress snapshot, written after every batch and at run
/// boundaries.
///
/// Snapshots carry cumulative counts, never deltas, so a lost write is
/// healed by the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignProgress {
    pub campaign_id: CampaignId,
    pub status: CampaignStatus,
    pub total_recipients: u32,
    pub sent_count: u32,
    pub failed_count: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}
