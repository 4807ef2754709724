//! Wires the collaborators together and runs campaigns to completion
//!
//! The controller owns one store, one renderer, one transport, and one
//! dispatch engine. A campaign run is cancelled rather than killed: a
//! shutdown signal flags every active run, the in-flight batch drains, and
//! the campaign is left `sending` so `--resume` can finish it later.

use std::{
    path::Path,
    sync::{Arc, LazyLock},
};

use tokio::sync::broadcast;
use volley_common::{Signal, internal};
use volley_dispatch::{DispatchEngine, RunSummary};
use volley_render::TemplateRenderer;
use volley_store::MemoryStore;
use volley_transport::{SinkTransport, Transport};

use crate::{
    config::{TransportChoice, VolleyConfig},
    import,
};

/// Process-wide shutdown channel. OS signals publish here; every campaign
/// run holds a subscription for its lifetime.
pub static SHUTDOWN_BROADCAST: LazyLock<broadcast::Sender<Signal>> = LazyLock::new(|| {
    let (sender, _receiver) = broadcast::channel(16);
    sender
});

/// One configured volley instance: store, renderer, transport, engine.
#[derive(Debug, Clone)]
pub struct Controller {
    store: MemoryStore,
    engine: DispatchEngine,
    log_sends: bool,
}

impl Controller {
    #[must_use]
    pub fn new(config: &VolleyConfig) -> Self {
        let store = MemoryStore::new();
        let transport: Arc<dyn Transport> = match config.transport {
            TransportChoice::Sink => Arc::new(SinkTransport::new()),
        };
        let engine = DispatchEngine::new(
            Arc::new(store.clone()),
            Arc::new(TemplateRenderer::new()),
            transport,
            config.dispatch.clone(),
        );

        Self {
            store,
            engine,
            log_sends: config.log_sends,
        }
    }

    /// The store backing this controller, for seeding and inspection.
    #[must_use]
    pub const fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// The engine backing this controller, for cancellation requests.
    #[must_use]
    pub const fn engine(&self) -> &DispatchEngine {
        &self.engine
    }

    /// Import `path` and run the campaign, stopping early when `shutdown`
    /// fires. A shutdown mid-run drains the in-flight batch and returns the
    /// summary with the campaign still `sending`.
    ///
    /// # Errors
    ///
    /// Import failures (unreadable file, invalid address, duplicate email)
    /// and every [`volley_dispatch::DispatchError`] the engine can raise.
    pub async fn run_campaign(
        &self,
        path: &Path,
        rate_override: Option<u32>,
        resume: bool,
        mut shutdown: broadcast::Receiver<Signal>,
    ) -> anyhow::Result<RunSummary> {
        let campaign = if resume {
            import::import_or_resume(&self.store, path)?
        } else {
            import::import_campaign_file(&self.store, path)?
        };
        let rate = rate_override.unwrap_or(campaign.rate_limit_per_minute);

        let run = async {
            if resume {
                self.engine.resume_campaign_run(&campaign.id, rate).await
            } else {
                self.engine.start_campaign_run(&campaign.id, rate).await
            }
        };
        tokio::pin!(run);

        let summary = loop {
            tokio::select! {
                summary = &mut run => break summary?,
                signal = shutdown.recv() => match signal {
                    Ok(Signal::Shutdown) => {
                        let flagged = self.engine.cancel_all();
                        internal!(
                            level = INFO,
                            "shutdown requested, {flagged} run(s) will stop at the next batch boundary"
                        );
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    // No senders left: nothing can interrupt us any more.
                    Err(broadcast::error::RecvError::Closed) => break (&mut run).await?,
                },
            }
        };

        if self.log_sends {
            for recipient in self.store.recipients(&campaign.id)? {
                internal!(
                    level = INFO,
                    "{}: {} {}",
                    recipient.email,
                    recipient.status,
                    recipient.status.failure_reason().unwrap_or_default()
                );
            }
        }
        internal!(level = INFO, "{summary}");

        Ok(summary)
    }

    /// Run one campaign under OS signal handling: CTRL+C or SIGTERM cancels
    /// at the next batch boundary, a second CTRL+C abandons the drain.
    ///
    /// # Errors
    ///
    /// As [`Self::run_campaign`], or when signal handlers cannot be
    /// installed, or on a forced shutdown.
    pub async fn run(
        self,
        path: &Path,
        rate_override: Option<u32>,
        resume: bool,
    ) -> anyhow::Result<RunSummary> {
        internal!(level = INFO, "controller running");

        tokio::select! {
            summary = self.run_campaign(path, rate_override, resume, SHUTDOWN_BROADCAST.subscribe()) => {
                summary
            }
            result = shutdown() => {
                result?;
                anyhow::bail!("forced shutdown before the run settled")
            }
        }
    }
}

/// Wait for CTRL+C or SIGTERM, publish [`Signal::Shutdown`], then wait for a
/// second CTRL+C. Completing this future means the operator gave up on the
/// graceful drain.
async fn shutdown() -> anyhow::Result<()> {
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            internal!(level = INFO, "CTRL+C entered -- enter it again to force shutdown");
        }
        _ = terminate.recv() => {
            internal!(level = INFO, "terminate signal received, shutting down");
        }
    };

    SHUTDOWN_BROADCAST
        .send(Signal::Shutdown)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Interrupted, e.to_string()))?;

    tokio::signal::ctrl_c().await?;
    Ok(())
}
