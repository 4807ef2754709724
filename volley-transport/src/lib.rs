//! Delivery transports for volley
//!
//! This crate provides:
//! - The [`Transport`] trait the dispatch unit hands rendered messages to
//! - A sink transport for development and demos
//! - A scriptable mock for tests

pub mod mock;
pub mod sink;

use std::fmt::{self, Display, Formatter};

use async_trait::async_trait;
use thiserror::Error;
use volley_common::RenderedMessage;

pub use mock::{MockTransport, SentMessage};
pub use sink::SinkTransport;

/// Opaque acceptance receipt minted by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeliveryToken(String);

impl DeliveryToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DeliveryToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a transport did not accept a message.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The destination refused the message.
    #[error("Rejected by destination: {reason}")]
    Rejected { reason: String },

    /// The destination could not be reached at all.
    #[error("Connection failure: {0}")]
    Connection(String),

    /// The send did not finish within the allowed time.
    #[error("Send timed out after {seconds}s")]
    TimedOut { seconds: u64 },
}

impl TransportError {
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

/// Hands one rendered message to the outside world.
#[async_trait]
pub trait Transport: std::fmt::Debug + Send + Sync {
    /// Send `message` to `destination`, returning the acceptance token.
    ///
    /// # Errors
    /// [`TransportError`] when the message was not accepted. One failed send
    /// never aborts the batch it belongs to; the dispatch unit records the
    /// failure on the recipient and moves on.
    async fn send(
        &self,
        message: &RenderedMessage,
        destination: &str,
    ) -> Result<DeliveryToken, TransportError>;
}
