//! Failure-injecting campaign store for tests

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use volley_common::{Campaign, CampaignId, Recipient, RecipientId, RecipientStatus};

use crate::{StoreError, backends::memory::MemoryStore, r#trait::CampaignStore, types::CampaignProgress};

/// Wraps a [`MemoryStore`] with per-operation failure toggles.
///
/// While a toggle is set, the matching operation returns
/// `StoreError::Unavailable` without touching the inner store. Used to
/// exercise load-failure, abort, and resume paths.
#[derive(Debug, Clone, Default)]
pub struct FaultStore {
    inner: MemoryStore,
    fail_campaign_loads: Arc<AtomicBool>,
    fail_recipient_loads: Arc<AtomicBool>,
    fail_recipient_writes: Arc<AtomicBool>,
    fail_progress_writes: Arc<AtomicBool>,
}

impl FaultStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The wrapped store, for seeding rows and reading them back.
    #[must_use]
    pub const fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn fail_campaign_loads(&self, fail: bool) {
        self.fail_campaign_loads.store(fail, Ordering::Relaxed);
    }

    pub fn fail_recipient_loads(&self, fail: bool) {
        self.fail_recipient_loads.store(fail, Ordering::Relaxed);
    }

    pub fn fail_recipient_writes(&self, fail: bool) {
        self.fail_recipient_writes.store(fail, Ordering::Relaxed);
    }

    pub fn fail_progress_writes(&self, fail: bool) {
        self.fail_progress_writes.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl CampaignStore for FaultStore {
    async fn load_campaign(&self, id: &CampaignId) -> crate::Result<Campaign> {
        if self.fail_campaign_loads.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable(
                "campaign load failure injected".to_string(),
            ));
        }
        self.inner.load_campaign(id).await
    }

    async fn load_pending_recipients(
        &self,
        campaign_id: &CampaignId,
    ) -> crate::Result<Vec<Recipient>> {
        if self.fail_recipient_loads.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable(
                "recipient load failure injected".to_string(),
            ));
        }
        self.inner.load_pending_recipients(campaign_id).await
    }

    async fn update_recipient_status(
        &self,
        id: &RecipientId,
        status: RecipientStatus,
    ) -> crate::Result<()> {
        if self.fail_recipient_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable(
                "recipient write failure injected".to_string(),
            ));
        }
        self.inner.update_recipient_status(id, status).await
    }

    async fn update_campaign_progress(&self, progress: &CampaignProgress) -> crate::Result<()> {
        if self.fail_progress_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable(
                "progress write failure injected".to_string(),
            ));
        }
        self.inner.update_campaign_progress(progress).await
    }
}
