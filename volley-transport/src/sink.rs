//! A transport that accepts everything

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use volley_common::RenderedMessage;

use crate::{DeliveryToken, Transport, TransportError};

/// Accepts every message, logs it at debug level, and mints sequential
/// tokens. The development and demo transport.
#[derive(Debug, Default)]
pub struct SinkTransport {
    accepted: AtomicU64,
}

impl SinkTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages accepted so far.
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Transport for SinkTransport {
    async fn send(
        &self,
        message: &RenderedMessage,
        destination: &str,
    ) -> Result<DeliveryToken, TransportError> {
        let sequence = self.accepted.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        tracing::debug!(
            destination = %destination,
            subject = %message.subject,
            "sink transport accepted message"
        );
        Ok(DeliveryToken::new(format!("sink-{sequence}")))
    }
}
