//! CLI error type, reported through miette.

use miette::Diagnostic;
use thiserror::Error;

use invsync_core::CoreError;

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    /// Server-side validation failure. The display contract requires
    /// every message, in order, unchanged — one per line.
    #[error("the server rejected the request:\n{}", messages.join("\n"))]
    Validation { messages: Vec<String> },

    #[error(transparent)]
    Core(CoreError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationFailed { messages } => Self::Validation { messages },
            other => Self::Core(other),
        }
    }
}
