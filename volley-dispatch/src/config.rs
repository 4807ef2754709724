//! Run configuration

use std::time::Duration;

use serde::Deserialize;

const fn default_send_timeout() -> u64 {
    30
}

const fn default_batch_window() -> u64 {
    60
}

/// Tunables for campaign runs.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Per-send transport timeout in seconds. An elapsed timeout is recorded
    /// as a transport failure on that recipient, not an aborted run.
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,

    /// Wall-clock budget of one batch in seconds. A batch holds up to
    /// `rate_limit_per_minute` recipients, so the default of 60 makes the
    /// configured rate a per-minute cap. Tests shrink it.
    #[serde(default = "default_batch_window")]
    pub batch_window_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            send_timeout_secs: default_send_timeout(),
            batch_window_secs: default_batch_window(),
        }
    }
}

impl DispatchConfig {
    pub(crate) const fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }

    pub(crate) const fn batch_window(&self) -> Duration {
        Duration::from_secs(self.batch_window_secs)
    }
}
