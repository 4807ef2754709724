//! Type definitions for dispatch outcomes and run summaries

use std::fmt::{self, Display, Formatter};

use volley_common::{CampaignId, CampaignStatus, RecipientId};
use volley_transport::DeliveryToken;

/// How one dispatch unit invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The transport accepted the message.
    Sent { token: DeliveryToken },
    /// Rendering or transport failed; `reason` is what got recorded on the
    /// recipient row.
    Failed { reason: String },
}

impl DispatchOutcome {
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }

    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Failed { reason } => Some(reason),
            Self::Sent { .. } => None,
        }
    }
}

/// Per-recipient result of one dispatch unit invocation. Feeds the
/// coordinator's aggregation step and is then discarded; the durable record
/// is the recipient row.
#[derive(Debug, Clone)]
pub struct DispatchResult {
    pub recipient_id: RecipientId,
    pub outcome: DispatchOutcome,
    /// The recipient status write failed; the row may still read `pending`
    /// even though the outcome above is settled.
    pub store_write_failed: bool,
}

/// Aggregate counts handed back once a run drains or stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub campaign_id: CampaignId,
    pub total_recipients: u32,
    pub sent_count: u32,
    pub failed_count: u32,
    /// `sending` means the run was cancelled and the campaign can be
    /// resumed; `completed` and `failed` are terminal.
    pub final_status: CampaignStatus,
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "campaign {} {}: sent {}, failed {}, total {}",
            self.campaign_id,
            self.final_status,
            self.sent_count,
            self.failed_count,
            self.total_recipients,
        )
    }
}
