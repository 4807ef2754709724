//! Campaign run coordination

use std::sync::Arc;

use chrono::{DateTime, Utc};
use volley_common::{Campaign, CampaignId, CampaignStatus, Recipient};
use volley_render::Renderer;
use volley_store::{CampaignProgress, CampaignStore};
use volley_transport::Transport;

use crate::{
    cancel::{CancelRegistry, RunToken},
    config::DispatchConfig,
    error::DispatchError,
    scheduler,
    types::{DispatchResult, RunSummary},
    unit::UnitContext,
};

/// Drives campaign runs: load, batch, dispatch, aggregate, settle.
///
/// One engine serves any number of campaigns, but each campaign gets at most
/// one active run at a time. Cloning is cheap and shares the collaborators
/// and the active-run registry.
#[derive(Debug, Clone)]
pub struct DispatchEngine {
    store: Arc<dyn CampaignStore>,
    renderer: Arc<dyn Renderer>,
    transport: Arc<dyn Transport>,
    config: DispatchConfig,
    runs: CancelRegistry,
}

impl DispatchEngine {
    #[must_use]
    pub fn new(
        store: Arc<dyn CampaignStore>,
        renderer: Arc<dyn Renderer>,
        transport: Arc<dyn Transport>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            store,
            renderer,
            transport,
            config,
            runs: CancelRegistry::default(),
        }
    }

    /// Run a `draft` campaign to completion and return the final counts.
    ///
    /// The rate limit is authoritative for this run: batches hold at most
    /// `rate_limit_per_minute` recipients and each batch owns one window.
    ///
    /// # Errors
    /// `Configuration` when the rate limit is zero, `CampaignNotFound` or
    /// `LoadFailure` when the campaign or its recipients cannot be loaded
    /// (nothing has been mutated), `InvalidState` when the campaign is not
    /// `draft` or already has an active run, `PersistFailure` when the store
    /// stops accepting writes mid-run (the campaign stays `sending`).
    pub async fn start_campaign_run(
        &self,
        id: &CampaignId,
        rate_limit_per_minute: u32,
    ) -> Result<RunSummary, DispatchError> {
        self.run(id, rate_limit_per_minute, false).await
    }

    /// Pick up a campaign left in `sending` by an interrupted or cancelled
    /// run (a never-started `draft` is accepted too).
    ///
    /// Only rows still `pending` are dispatched; recipients settled by the
    /// earlier run are never revisited, and prior counts carry over into the
    /// final totals.
    ///
    /// # Errors
    /// As [`Self::start_campaign_run`], except that `sending` is startable.
    pub async fn resume_campaign_run(
        &self,
        id: &CampaignId,
        rate_limit_per_minute: u32,
    ) -> Result<RunSummary, DispatchError> {
        self.run(id, rate_limit_per_minute, true).await
    }

    /// Ask the active run for `id`, if any, to stop at the next batch
    /// boundary. The in-flight batch drains first, so the request takes
    /// effect within one batch window. Returns whether a run observed it.
    pub fn request_cancellation(&self, id: &CampaignId) -> bool {
        self.runs.cancel(id)
    }

    /// Flag every active run for cancellation and return how many there
    /// were. The binary's shutdown path.
    pub fn cancel_all(&self) -> usize {
        self.runs.cancel_all()
    }

    async fn run(
        &self,
        id: &CampaignId,
        rate: u32,
        resume: bool,
    ) -> Result<RunSummary, DispatchError> {
        if rate == 0 {
            return Err(DispatchError::Configuration(
                "rate limit must be at least 1 message per minute".to_string(),
            ));
        }

        // The registry entry doubles as the in-process run lock: a held slot
        // means a run is already mid-`sending`.
        let Some(token) = self.runs.begin(id.clone()) else {
            return Err(DispatchError::InvalidState {
                campaign: id.clone(),
                status: CampaignStatus::Sending,
            });
        };

        let campaign = self
            .store
            .load_campaign(id)
            .await
            .map_err(DispatchError::load)?;
        let startable = if resume {
            campaign.status.is_resumable()
        } else {
            campaign.status.can_begin_run()
        };
        if !startable {
            return Err(DispatchError::InvalidState {
                campaign: id.clone(),
                status: campaign.status,
            });
        }

        let pending = self
            .store
            .load_pending_recipients(id)
            .await
            .map_err(DispatchError::load)?;

        self.drain(campaign, pending, rate, &token).await
    }

    /// The run loop proper: everything from the first `sending` write to the
    /// terminal status.
    async fn drain(
        &self,
        campaign: Campaign,
        pending: Vec<Recipient>,
        rate: u32,
        token: &RunToken,
    ) -> Result<RunSummary, DispatchError> {
        let mut state = RunState::open(&campaign, pending.len());

        // Claim the run: `sending` plus the total snapshot. Until this write
        // lands nothing has been dispatched, so a failure aborts cleanly.
        self.store
            .update_campaign_progress(&state.snapshot(CampaignStatus::Sending, None))
            .await
            .map_err(|error| DispatchError::persist(&error))?;

        tracing::info!(
            campaign = %state.id,
            total = state.total_recipients,
            pending = pending.len(),
            rate,
            "campaign run started"
        );

        let ctx = UnitContext {
            store: Arc::clone(&self.store),
            renderer: Arc::clone(&self.renderer),
            transport: Arc::clone(&self.transport),
            send_timeout: self.config.send_timeout(),
        };
        let delay = scheduler::stagger_delay(rate, self.config.batch_window());
        let campaign = Arc::new(campaign);

        for batch in scheduler::partition(&pending, rate) {
            if token.is_cancelled() {
                tracing::info!(
                    campaign = %state.id,
                    sent = state.sent_count,
                    failed = state.failed_count,
                    "cancellation observed; campaign left resumable"
                );
                return Ok(state.summary(CampaignStatus::Sending));
            }

            let results = scheduler::run_batch(&ctx, &campaign, batch, delay).await;
            let unit_write_failures = state.absorb(&results);

            let progress = self
                .store
                .update_campaign_progress(&state.snapshot(CampaignStatus::Sending, None))
                .await;
            if let Err(error) = &progress {
                // Counts are cumulative, so one missed write heals on the
                // next.
                tracing::warn!(
                    campaign = %state.id,
                    error = %error,
                    "campaign progress write failed"
                );
            }

            // A batch whose every recipient write failed means the store is
            // gone, whatever the campaign row accepted: stop and leave
            // `sending` for a later resume.
            if !results.is_empty() && unit_write_failures == results.len() {
                return Err(match progress {
                    Err(error) => DispatchError::persist(&error),
                    Ok(()) => DispatchError::PersistFailure(format!(
                        "every recipient status write failed in a batch of {} for campaign {}",
                        results.len(),
                        state.id,
                    )),
                });
            }
        }

        // `failed` is reserved for a drained run that sent nothing at all;
        // partial failures still complete.
        let final_status = if state.total_recipients > 0 && state.sent_count == 0 {
            CampaignStatus::Failed
        } else {
            CampaignStatus::Completed
        };
        self.store
            .update_campaign_progress(&state.snapshot(final_status, Some(Utc::now())))
            .await
            .map_err(|error| DispatchError::persist(&error))?;

        tracing::info!(
            campaign = %state.id,
            status = %final_status,
            sent = state.sent_count,
            failed = state.failed_count,
            "campaign run drained"
        );

        Ok(state.summary(final_status))
    }
}

/// Mutable progress of one run. Counts start from the campaign row, so a
/// resume keeps whatever an earlier run already settled.
struct RunState {
    id: CampaignId,
    total_recipients: u32,
    sent_count: u32,
    failed_count: u32,
    started_at: DateTime<Utc>,
}

impl RunState {
    fn open(campaign: &Campaign, pending: usize) -> Self {
        let pending = u32::try_from(pending).unwrap_or(u32::MAX);
        Self {
            id: campaign.id.clone(),
            total_recipients: campaign
                .sent_count
                .saturating_add(campaign.failed_count)
                .saturating_add(pending),
            sent_count: campaign.sent_count,
            failed_count: campaign.failed_count,
            started_at: campaign.started_at.unwrap_or_else(Utc::now),
        }
    }

    /// Fold one batch's results into the counts; returns how many of them
    /// failed their recipient status write.
    fn absorb(&mut self, results: &[DispatchResult]) -> usize {
        let mut write_failures = 0;
        for result in results {
            if result.outcome.is_sent() {
                self.sent_count += 1;
            } else {
                self.failed_count += 1;
            }
            if result.store_write_failed {
                write_failures += 1;
            }
        }
        write_failures
    }

    fn snapshot(
        &self,
        status: CampaignStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> CampaignProgress {
        CampaignProgress {
            campaign_id: self.id.clone(),
            status,
            total_recipients: self.total_recipients,
            sent_count: self.sent_count,
            failed_count: self.failed_count,
            started_at: Some(self.started_at),
            completed_at,
        }
    }

    fn summary(&self, final_status: CampaignStatus) -> RunSummary {
        RunSummary {
            campaign_id: self.id.clone(),
            total_recipients: self.total_recipients,
            sent_count: self.sent_count,
            failed_count: self.failed_count,
            final_status,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use volley_common::RecipientId;
    use volley_render::MockRenderer;
    use volley_store::MemoryStore;
    use volley_transport::{DeliveryToken, MockTransport};

    use super::*;
    use crate::types::DispatchOutcome;

    fn result(sent: bool, write_failed: bool) -> DispatchResult {
        DispatchResult {
            recipient_id: RecipientId::generate(),
            outcome: if sent {
                DispatchOutcome::Sent {
                    token: DeliveryToken::new("t"),
                }
            } else {
                DispatchOutcome::Failed {
                    reason: "nope".to_string(),
                }
            },
            store_write_failed: write_failed,
        }
    }

    #[test]
    fn run_state_counts_carry_over_from_the_campaign_row() {
        let mut campaign = Campaign::new(CampaignId::new("spring"), "Hi", "Hello", 10);
        campaign.sent_count = 7;
        campaign.failed_count = 1;
        campaign.started_at = Some(Utc::now());

        let state = RunState::open(&campaign, 4);
        assert_eq!(state.total_recipients, 12);
        assert_eq!(state.sent_count, 7);
        assert_eq!(state.failed_count, 1);
        assert_eq!(state.started_at, campaign.started_at.unwrap());
    }

    #[test]
    fn absorb_splits_outcomes_and_reports_write_failures() {
        let campaign = Campaign::new(CampaignId::new("spring"), "Hi", "Hello", 10);
        let mut state = RunState::open(&campaign, 4);

        let write_failures = state.absorb(&[
            result(true, false),
            result(true, true),
            result(false, true),
            result(false, false),
        ]);

        assert_eq!(state.sent_count, 2);
        assert_eq!(state.failed_count, 2);
        assert_eq!(write_failures, 2);

        let progress = state.snapshot(CampaignStatus::Sending, None);
        assert_eq!(progress.sent_count, 2);
        assert_eq!(progress.total_recipients, 4);
        assert!(progress.completed_at.is_none());
    }

    #[tokio::test]
    async fn a_zero_rate_is_refused_before_any_store_access() {
        let store = volley_store::FaultStore::new();
        store.fail_campaign_loads(true);
        let engine = DispatchEngine::new(
            Arc::new(store),
            Arc::new(MockRenderer::new()),
            Arc::new(MockTransport::new()),
            DispatchConfig::default(),
        );

        let error = engine
            .start_campaign_run(&CampaignId::new("spring"), 0)
            .await
            .unwrap_err();
        assert!(matches!(error, DispatchError::Configuration(_)));
    }

    #[tokio::test]
    async fn unknown_campaigns_are_not_a_load_failure() {
        let engine = DispatchEngine::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MockRenderer::new()),
            Arc::new(MockTransport::new()),
            DispatchConfig::default(),
        );

        let error = engine
            .start_campaign_run(&CampaignId::new("ghost"), 10)
            .await
            .unwrap_err();
        assert!(matches!(error, DispatchError::CampaignNotFound(_)));
    }
}
