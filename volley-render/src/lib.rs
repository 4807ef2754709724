//! Message rendering for volley
//!
//! This crate provides:
//! - The [`Renderer`] trait the dispatch unit calls per recipient
//! - A handlebars implementation with strict placeholder checking
//! - A scriptable mock for tests

pub mod error;
pub mod mock;
pub mod template;

use async_trait::async_trait;
use volley_common::{Campaign, Recipient, RenderedMessage};

pub use error::RenderError;
pub use mock::MockRenderer;
pub use template::TemplateRenderer;

/// Renders one campaign's templates for one recipient.
#[async_trait]
pub trait Renderer: std::fmt::Debug + Send + Sync {
    /// Produce the personalised message for `recipient`.
    ///
    /// # Errors
    /// [`RenderError`] when the templates cannot be rendered for this
    /// recipient. Failures are per recipient: the caller records them and
    /// the rest of the batch proceeds.
    async fn render(
        &self,
        campaign: &Campaign,
        recipient: &Recipient,
    ) -> Result<RenderedMessage, RenderError>;
}
