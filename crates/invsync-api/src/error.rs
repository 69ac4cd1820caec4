use thiserror::Error;

/// Top-level error type for the `invsync-api` crate.
///
/// Covers every failure mode across both transports: the CRUD HTTP API
/// and the live WebSocket channel. `invsync-core` maps these into
/// user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── CRUD API ────────────────────────────────────────────────────
    /// Non-success status with no structured error body.
    #[error("Server error (HTTP {status}): {body}")]
    Server { status: u16, body: String },

    /// The server rejected the payload and returned its reasons.
    ///
    /// The message sequence is preserved verbatim, in order — the
    /// display layer shows it unchanged.
    #[error("Validation rejected: {}", messages.join("; "))]
    Validation { messages: Vec<String> },

    /// The operation target does not exist server-side.
    #[error("Not found: {message}")]
    NotFound { message: String },

    // ── WebSocket ───────────────────────────────────────────────────
    /// Live channel connection failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization of a success body failed, with the raw body
    /// for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::WebSocketConnect(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The verbatim validation message sequence, if this is a
    /// validation failure.
    pub fn validation_messages(&self) -> Option<&[String]> {
        match self {
            Self::Validation { messages } => Some(messages),
            _ => None,
        }
    }
}
