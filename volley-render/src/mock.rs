//! A scriptable renderer for tests

use std::{
    collections::HashSet,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use parking_lot::Mutex;
use volley_common::{Campaign, Recipient, RenderedMessage};

use crate::{Renderer, error::RenderError};

/// Renderer double: returns templates verbatim and fails on demand for
/// specific addresses.
#[derive(Debug, Default)]
pub struct MockRenderer {
    fail_for: Mutex<HashSet<String>>,
    calls: AtomicUsize,
}

impl MockRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every render for `email` fail from now on.
    pub fn fail_for(&self, email: impl Into<String>) {
        self.fail_for.lock().insert(email.into());
    }

    /// Number of render calls observed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    async fn render(
        &self,
        campaign: &Campaign,
        recipient: &Recipient,
    ) -> Result<RenderedMessage, RenderError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        if self.fail_for.lock().contains(&recipient.email) {
            return Err(RenderError::Template(format!(
                "scripted failure for {}",
                recipient.email
            )));
        }

        let mut message =
            RenderedMessage::new(campaign.subject.clone(), campaign.body_template.clone());
        message.insert_header("X-Campaign", campaign.id.as_str());
        message.insert_header("X-Recipient", recipient.id.to_string());
        Ok(message)
    }
}
