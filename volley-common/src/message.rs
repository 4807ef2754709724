//! The rendered message handed to transports

use ahash::AHashMap;

/// A fully rendered, per-recipient message.
///
/// Every template placeholder is resolved by the time one of these exists;
/// transports treat it as opaque content plus tracking headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
    /// Tracking headers (`X-Campaign`, `X-Recipient`).
    pub headers: AHashMap<String, String>,
}

impl RenderedMessage {
    /// A message with no headers yet.
    #[must_use]
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            headers: AHashMap::new(),
        }
    }

    pub fn insert_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}
