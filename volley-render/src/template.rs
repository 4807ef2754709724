//! Handlebars-backed campaign rendering

use std::fmt;

use async_trait::async_trait;
use handlebars::Handlebars;
use serde::Serialize;
use volley_common::{Campaign, Recipient, RenderedMessage};

use crate::{Renderer, error::RenderError};

/// The fields templates may reference.
#[derive(Serialize)]
struct RenderContext<'a> {
    name: &'a str,
    email: &'a str,
    campaign: &'a str,
}

/// Renders campaign subject and body templates with handlebars.
///
/// Strict mode is on: a placeholder without a matching field fails the
/// render instead of producing a blank, so a typo in a template surfaces as
/// a `failed` recipient rather than a half-personalised send.
pub struct TemplateRenderer {
    registry: Handlebars<'static>,
}

impl TemplateRenderer {
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        Self { registry }
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRenderer").finish_non_exhaustive()
    }
}

#[async_trait]
impl Renderer for TemplateRenderer {
    async fn render(
        &self,
        campaign: &Campaign,
        recipient: &Recipient,
    ) -> Result<RenderedMessage, RenderError> {
        if recipient.email.is_empty() {
            return Err(RenderError::MissingField("email"));
        }

        let context = RenderContext {
            name: &recipient.name,
            email: &recipient.email,
            campaign: campaign.id.as_str(),
        };

        let subject = self
            .registry
            .render_template(&campaign.subject, &context)
            .map_err(|e| RenderError::Template(e.to_string()))?;
        let body = self
            .registry
            .render_template(&campaign.body_template, &context)
            .map_err(|e| RenderError::Template(e.to_string()))?;

        let mut message = RenderedMessage::new(subject, body);
        message.insert_header("X-Campaign", campaign.id.as_str());
        message.insert_header("X-Recipient", recipient.id.to_string());
        Ok(message)
    }
}
