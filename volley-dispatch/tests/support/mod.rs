//! Shared fixtures for the engine integration tests
#![allow(dead_code)] // Test utility module - not every helper is used in every test

use std::{sync::Arc, time::Duration};

use volley_common::{Campaign, CampaignId, Recipient, RecipientId};
use volley_dispatch::{DispatchConfig, DispatchEngine};
use volley_render::Renderer;
use volley_store::{CampaignStore, MemoryStore};
use volley_transport::Transport;

/// `userNN@example.org`, matching what [`seed_campaign`] inserts.
pub fn address(index: usize) -> String {
    format!("user{index:02}@example.org")
}

/// Insert a draft campaign with `recipients` pending rows named `User NN`.
/// Returns the campaign id and the recipient ids in insertion order.
pub fn seed_campaign(
    store: &MemoryStore,
    id: &str,
    recipients: usize,
) -> (CampaignId, Vec<RecipientId>) {
    let campaign = Campaign::new(
        CampaignId::new(id),
        "Hi {{name}}",
        "Hello {{name}}, this is {{campaign}}.",
        10,
    );
    let campaign_id = campaign.id.clone();
    store.insert_campaign(campaign).expect("campaign seeds");

    let mut ids = Vec::with_capacity(recipients);
    for index in 0..recipients {
        let recipient = Recipient::new(
            campaign_id.clone(),
            address(index),
            format!("User {index:02}"),
        );
        ids.push(recipient.id.clone());
        store.insert_recipient(recipient).expect("recipient seeds");
    }
    (campaign_id, ids)
}

/// An engine over the given collaborators with the stock configuration:
/// one-minute batch windows, 30 second send timeout. Paused-clock tests
/// fast-forward through both.
pub fn engine(
    store: Arc<dyn CampaignStore>,
    renderer: Arc<dyn Renderer>,
    transport: Arc<dyn Transport>,
) -> DispatchEngine {
    DispatchEngine::new(store, renderer, transport, DispatchConfig::default())
}

/// Poll `check` every 100ms of (virtual) time until it holds.
///
/// # Panics
/// When the condition is still false after 600 polls; a test that trips this
/// has deadlocked rather than slowed down.
pub async fn wait_until(what: &str, mut check: impl FnMut() -> bool) {
    for _ in 0..600 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("gave up waiting for {what}");
}
