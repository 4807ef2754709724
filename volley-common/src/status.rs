//! Status lifecycles for campaigns and recipients

use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a campaign.
///
/// Campaigns move `draft` → `sending` → `completed`, or `sending` → `failed`
/// when a drained run sent nothing at all. A cancelled or aborted run leaves
/// the campaign in `sending` so it can be resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    /// Created but never run.
    #[default]
    Draft,
    /// A run has started; progress counts are live.
    Sending,
    /// A run drained and at least one message was sent (or there was nothing
    /// to send).
    Completed,
    /// A run drained and every recipient failed.
    Failed,
}

impl CampaignStatus {
    /// No further status writes are accepted once a campaign is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether a fresh run may start from this status.
    #[must_use]
    pub const fn can_begin_run(self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Whether a resume may proceed from this status: `sending` left behind
    /// by an interrupted run, or a `draft` that never started.
    #[must_use]
    pub const fn is_resumable(self) -> bool {
        matches!(self, Self::Draft | Self::Sending)
    }

    /// Whether a status write moving `self` to `next` preserves the
    /// lifecycle. Same-status writes are accepted for `draft` and `sending`
    /// so progress updates stay idempotent.
    #[must_use]
    pub const fn accepts(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Draft | Self::Sending)
                | (Self::Sending, Self::Sending | Self::Completed | Self::Failed)
        )
    }
}

impl Display for CampaignStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => f.write_str("draft"),
            Self::Sending => f.write_str("sending"),
            Self::Completed => f.write_str("completed"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// Lifecycle of a single recipient within a campaign.
///
/// Recipients settle exactly once: `pending` → `sent` or `pending` →
/// `failed`. There is no retry state; a resumed run only ever touches rows
/// still `pending`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientStatus {
    /// Not yet dispatched.
    #[default]
    Pending,
    /// The transport accepted the message.
    Sent { sent_at: DateTime<Utc> },
    /// Rendering or transport failed; `reason` says why.
    Failed { reason: String },
}

impl RecipientStatus {
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Sent { .. } | Self::Failed { .. })
    }

    /// When the transport accepted the message, if it has.
    #[must_use]
    pub const fn sent_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Sent { sent_at } => Some(*sent_at),
            Self::Pending | Self::Failed { .. } => None,
        }
    }

    /// Why dispatch failed, if it has.
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Failed { reason } => Some(reason),
            Self::Pending | Self::Sent { .. } => None,
        }
    }
}

impl Display for RecipientStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Sent { .. } => f.write_str("sent"),
            Self::Failed { .. } => f.write_str("failed"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn campaign_transition_table() {
        use CampaignStatus::{Completed, Draft, Failed, Sending};

        // Accepted writes.
        assert!(Draft.accepts(Draft));
        assert!(Draft.accepts(Sending));
        assert!(Sending.accepts(Sending));
        assert!(Sending.accepts(Completed));
        assert!(Sending.accepts(Failed));

        // Everything else is a regression or a write past a terminal state.
        assert!(!Draft.accepts(Completed));
        assert!(!Draft.accepts(Failed));
        assert!(!Sending.accepts(Draft));
        for terminal in [Completed, Failed] {
            for next in [Draft, Sending, Completed, Failed] {
                assert!(!terminal.accepts(next), "{terminal} must not accept {next}");
            }
        }
    }

    #[test]
    fn campaign_status_predicates() {
        assert!(CampaignStatus::Draft.can_begin_run());
        assert!(!CampaignStatus::Sending.can_begin_run());
        assert!(CampaignStatus::Sending.is_resumable());
        assert!(CampaignStatus::Draft.is_resumable());
        assert!(!CampaignStatus::Completed.is_resumable());
        assert!(!CampaignStatus::Failed.is_resumable());
        assert!(CampaignStatus::Completed.is_terminal());
        assert!(CampaignStatus::Failed.is_terminal());
        assert!(!CampaignStatus::Draft.is_terminal());
    }

    #[test]
    fn recipient_status_settles_once() {
        let pending = RecipientStatus::Pending;
        assert!(pending.is_pending());
        assert!(!pending.is_terminal());

        let sent = RecipientStatus::Sent {
            sent_at: Utc::now(),
        };
        assert!(sent.is_terminal());
        assert!(sent.sent_at().is_some());
        assert_eq!(sent.failure_reason(), None);

        let failed = RecipientStatus::Failed {
            reason: "mailbox full".to_string(),
        };
        assert!(failed.is_terminal());
        assert_eq!(failed.failure_reason(), Some("mailbox full"));
        assert_eq!(failed.sent_at(), None);
    }

    #[test]
    fn statuses_serialize_lowercase() {
        assert_eq!(
            ron::to_string(&CampaignStatus::Draft).unwrap(),
            "draft".to_string()
        );
        assert_eq!(
            ron::to_string(&CampaignStatus::Sending).unwrap(),
            "sending".to_string()
        );
        let parsed: CampaignStatus = ron::from_str("completed").unwrap();
        assert_eq!(parsed, CampaignStatus::Completed);
    }

    #[test]
    fn defaults_are_the_initial_states() {
        assert_eq!(CampaignStatus::default(), CampaignStatus::Draft);
        assert_eq!(RecipientStatus::default(), RecipientStatus::Pending);
    }
}
