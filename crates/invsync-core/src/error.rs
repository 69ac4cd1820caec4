// ── Core error types ──
//
// User-facing errors from invsync-core. Consumers never see HTTP status
// codes or JSON parse failures directly. The `From<invsync_api::Error>`
// impl translates transport-layer errors into domain-appropriate
// variants — except the validation message sequence, which is carried
// through verbatim for display.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach inventory server: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Product not found: {message}")]
    NotFound { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    /// The server rejected the payload. `messages` is the server's
    /// sequence, in order, unchanged.
    #[error("Validation failed: {}", messages.join("; "))]
    ValidationFailed { messages: Vec<String> },

    #[error("Server error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Live channel errors ──────────────────────────────────────────
    #[error("Live channel error: {reason}")]
    Channel { reason: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The verbatim validation message sequence, if present.
    ///
    /// The display contract requires these to reach the presentation
    /// layer in order and unchanged.
    pub fn validation_messages(&self) -> Option<&[String]> {
        match self {
            Self::ValidationFailed { messages } => Some(messages),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<invsync_api::Error> for CoreError {
    fn from(err: invsync_api::Error) -> Self {
        match err {
            invsync_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            invsync_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            invsync_api::Error::Server { status, body } => CoreError::Api {
                message: if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body
                },
                status: Some(status),
            },
            invsync_api::Error::Validation { messages } => {
                CoreError::ValidationFailed { messages }
            }
            invsync_api::Error::NotFound { message } => CoreError::NotFound { message },
            invsync_api::Error::WebSocketConnect(reason) => CoreError::Channel { reason },
            invsync_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
