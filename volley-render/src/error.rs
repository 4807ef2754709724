//! Error types for message rendering

use thiserror::Error;

/// Why a message could not be rendered for a recipient.
///
/// Render failures are always per recipient: the dispatch unit records the
/// failure on that row and the rest of the batch proceeds.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template could not be rendered (bad syntax, or a placeholder with
    /// no matching field under strict mode).
    #[error("Template error: {0}")]
    Template(String),

    /// The recipient is missing a field rendering requires.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
