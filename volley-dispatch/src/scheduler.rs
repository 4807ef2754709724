//! Batch partitioning and staggered fan-out

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::task::JoinSet;
use volley_common::{Campaign, Recipient};

use crate::{
    types::{DispatchOutcome, DispatchResult},
    unit::{self, UnitContext},
};

/// Split the pending set into batches of at most `rate` recipients.
///
/// Yields `ceil(N / rate)` batches; the last one may be short, and an empty
/// input yields no batches at all.
pub(crate) fn partition(recipients: &[Recipient], rate: u32) -> impl Iterator<Item = &[Recipient]> {
    recipients.chunks(usize::try_from(rate).unwrap_or(usize::MAX).max(1))
}

/// Per-item start offset inside a batch window.
///
/// Item `k` of a batch starts `k * delay` after the batch does, spreading up
/// to `rate` sends evenly across the window instead of bursting them.
pub(crate) fn stagger_delay(rate: u32, window: Duration) -> Duration {
    window / rate.max(1)
}

/// Launch one dispatch unit per recipient in `batch`, each offset by its
/// stagger delay, and wait for every one of them to settle.
///
/// Always returns exactly one result per recipient. Units convert their own
/// failures to data; a panicked task (which a unit should never produce) is
/// folded into a failed result rather than poisoning the batch.
pub(crate) async fn run_batch(
    ctx: &UnitContext,
    campaign: &Arc<Campaign>,
    batch: &[Recipient],
    delay: Duration,
) -> Vec<DispatchResult> {
    let mut units = JoinSet::new();
    let mut spawned = HashMap::with_capacity(batch.len());

    for (index, recipient) in batch.iter().enumerate() {
        let recipient_id = recipient.id.clone();
        let ctx = ctx.clone();
        let campaign = Arc::clone(campaign);
        let recipient = recipient.clone();
        let offset = delay * u32::try_from(index).unwrap_or(u32::MAX);

        let handle = units.spawn(async move {
            if !offset.is_zero() {
                tokio::time::sleep(offset).await;
            }
            unit::dispatch_one(ctx, campaign, recipient).await
        });
        spawned.insert(handle.id(), recipient_id);
    }

    let mut results = Vec::with_capacity(batch.len());
    while let Some(settled) = units.join_next_with_id().await {
        match settled {
            Ok((_, result)) => results.push(result),
            Err(error) => {
                tracing::error!(
                    campaign = %campaign.id,
                    error = %error,
                    "dispatch unit task died; counting its recipient as failed"
                );
                if let Some(recipient_id) = spawned.get(&error.id()) {
                    results.push(DispatchResult {
                        recipient_id: recipient_id.clone(),
                        outcome: DispatchOutcome::Failed {
                            reason: format!("dispatch task failed: {error}"),
                        },
                        store_write_failed: false,
                    });
                }
            }
        }
    }
    results
}
