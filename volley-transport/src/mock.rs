//! A scriptable transport for tests

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use volley_common::RenderedMessage;

use crate::{DeliveryToken, Transport, TransportError};

/// One accepted message, as observed by the mock.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub destination: String,
    pub subject: String,
    pub body: String,
    /// Acceptance time. Virtual time under a paused test clock, which makes
    /// stagger offsets exactly checkable.
    pub at: Instant,
}

/// Transport double with scriptable rejections, fixed latency, and
/// concurrency accounting.
#[derive(Debug, Default)]
pub struct MockTransport {
    sent: Mutex<Vec<SentMessage>>,
    reject_all: Option<String>,
    reject_for: Mutex<HashMap<String, String>>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that rejects every send with `reason`.
    #[must_use]
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            reject_all: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Add fixed latency to every send.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Reject sends to `destination` with `reason`; other destinations are
    /// unaffected.
    pub fn reject_for(&self, destination: impl Into<String>, reason: impl Into<String>) {
        self.reject_for
            .lock()
            .insert(destination.into(), reason.into());
    }

    /// Everything accepted so far, in acceptance order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn was_sent_to(&self, destination: &str) -> bool {
        self.sent
            .lock()
            .iter()
            .any(|message| message.destination == destination)
    }

    /// High-water mark of concurrent sends.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::Relaxed)
    }
}

/// Decrements the in-flight count even when the send future is dropped by a
/// caller-side timeout.
struct InFlightGuard<'mock> {
    transport: &'mock MockTransport,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.transport.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        message: &RenderedMessage,
        destination: &str,
    ) -> Result<DeliveryToken, TransportError> {
        let current = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        self.max_in_flight.fetch_max(current, Ordering::Relaxed);
        let _guard = InFlightGuard { transport: self };

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(reason) = &self.reject_all {
            return Err(TransportError::Rejected {
                reason: reason.clone(),
            });
        }

        let scripted = self.reject_for.lock().get(destination).cloned();
        if let Some(reason) = scripted {
            return Err(TransportError::Rejected { reason });
        }

        let mut sent = self.sent.lock();
        sent.push(SentMessage {
            destination: destination.to_string(),
            subject: message.subject.clone(),
            body: message.body.clone(),
            at: Instant::now(),
        });
        Ok(DeliveryToken::new(format!("mock-{}", sent.len())))
    }
}
