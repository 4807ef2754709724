//! Cancellation flags for active campaign runs

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use dashmap::{DashMap, mapref::entry::Entry};
use volley_common::CampaignId;

/// One cancellation flag per active run, keyed by campaign.
///
/// The entry itself doubles as the in-process run lock: `begin` refuses a
/// second concurrent run for the same campaign, and dropping the token frees
/// the slot again.
#[derive(Debug, Clone, Default)]
pub(crate) struct CancelRegistry {
    active: Arc<DashMap<CampaignId, Arc<AtomicBool>>>,
}

impl CancelRegistry {
    /// Register a run. Returns `None` when the campaign already has one.
    pub(crate) fn begin(&self, id: CampaignId) -> Option<RunToken> {
        match self.active.entry(id.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let flag = Arc::new(AtomicBool::new(false));
                slot.insert(Arc::clone(&flag));
                Some(RunToken {
                    id,
                    flag,
                    registry: self.clone(),
                })
            }
        }
    }

    /// Flag the active run for `id`, if any. Returns whether one was found.
    pub(crate) fn cancel(&self, id: &CampaignId) -> bool {
        self.active.get(id).is_some_and(|flag| {
            flag.store(true, Ordering::Relaxed);
            true
        })
    }

    /// Flag every active run. Returns how many were flagged.
    pub(crate) fn cancel_all(&self) -> usize {
        let mut flagged = 0;
        for entry in self.active.iter() {
            entry.value().store(true, Ordering::Relaxed);
            flagged += 1;
        }
        flagged
    }
}

/// Held by a run for its lifetime; observed at batch boundaries.
#[derive(Debug)]
pub(crate) struct RunToken {
    id: CampaignId,
    flag: Arc<AtomicBool>,
    registry: CancelRegistry,
}

impl RunToken {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

impl Drop for RunToken {
    fn drop(&mut self) {
        self.registry.active.remove(&self.id);
    }
}
