//! The per-recipient dispatch unit

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use volley_common::{Campaign, Recipient, RecipientStatus, dispatch};
use volley_render::Renderer;
use volley_store::CampaignStore;
use volley_transport::{Transport, TransportError};

use crate::types::{DispatchOutcome, DispatchResult};

/// Everything one dispatch unit needs. Cheap to clone into spawned tasks.
#[derive(Debug, Clone)]
pub(crate) struct UnitContext {
    pub(crate) store: Arc<dyn CampaignStore>,
    pub(crate) renderer: Arc<dyn Renderer>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) send_timeout: Duration,
}

/// Render and send one message, then settle the recipient row.
///
/// This is the only place a message is ever handed to the transport, and it
/// never escapes an error: render and transport failures become a `failed`
/// outcome on the result, and a failed status write is flagged so the
/// coordinator can tell a recipient failure from a store outage.
pub(crate) async fn dispatch_one(
    ctx: UnitContext,
    campaign: Arc<Campaign>,
    recipient: Recipient,
) -> DispatchResult {
    let outcome = attempt(&ctx, &campaign, &recipient).await;

    let status = match &outcome {
        DispatchOutcome::Sent { token } => {
            dispatch!(level = DEBUG, "sent to {} ({token})", recipient.email);
            RecipientStatus::Sent { sent_at: Utc::now() }
        }
        DispatchOutcome::Failed { reason } => RecipientStatus::Failed {
            reason: reason.clone(),
        },
    };

    // Exactly one status write per invocation, regardless of outcome.
    let store_write_failed = match ctx.store.update_recipient_status(&recipient.id, status).await {
        Ok(()) => false,
        Err(error) => {
            tracing::warn!(
                campaign = %campaign.id,
                recipient = %recipient.id,
                error = %error,
                "failed to record recipient outcome; row left pending for a later resume"
            );
            true
        }
    };

    DispatchResult {
        recipient_id: recipient.id,
        outcome,
        store_write_failed,
    }
}

async fn attempt(
    ctx: &UnitContext,
    campaign: &Campaign,
    recipient: &Recipient,
) -> DispatchOutcome {
    let message = match ctx.renderer.render(campaign, recipient).await {
        Ok(message) => message,
        // Rendering failed: the transport is never called for this recipient.
        Err(error) => {
            tracing::debug!(
                campaign = %campaign.id,
                recipient = %recipient.id,
                error = %error,
                "render failed"
            );
            return DispatchOutcome::Failed {
                reason: format!("render error: {error}"),
            };
        }
    };

    match tokio::time::timeout(
        ctx.send_timeout,
        ctx.transport.send(&message, &recipient.email),
    )
    .await
    {
        Ok(Ok(token)) => DispatchOutcome::Sent { token },
        Ok(Err(error)) => {
            tracing::debug!(
                campaign = %campaign.id,
                recipient = %recipient.id,
                error = %error,
                "transport refused message"
            );
            DispatchOutcome::Failed {
                reason: error.to_string(),
            }
        }
        Err(_elapsed) => {
            let error = TransportError::TimedOut {
                seconds: ctx.send_timeout.as_secs(),
            };
            tracing::debug!(
                campaign = %campaign.id,
                recipient = %recipient.id,
                error = %error,
                "transport call cut off"
            );
            DispatchOutcome::Failed {
                reason: error.to_string(),
            }
        }
    }
}
