//! Live update channel: a single long-lived WebSocket connection over
//! which the server pushes full inventory snapshots.
//!
//! The channel owns exactly one connection (or none) at a time and
//! exposes its lifecycle through a [`tokio::sync::watch`] state channel.
//! Decoded snapshots are delivered through a [`tokio::sync::broadcast`]
//! channel. There is no automatic reconnection: when the connection
//! drops, the channel reports `Disconnected` and stops — re-establishing
//! it is an explicit caller decision.
//!
//! # Example
//!
//! ```rust,ignore
//! use invsync_api::channel::LiveChannel;
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! let cancel = CancellationToken::new();
//! let ws_url = Url::parse("ws://127.0.0.1:5000/ws")?;
//!
//! let channel = LiveChannel::connect(ws_url, cancel.clone());
//! let mut rx = channel.subscribe();
//!
//! while let Ok(snapshot) = rx.recv().await {
//!     println!("{} products", snapshot.len());
//! }
//!
//! channel.shutdown();
//! ```

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, watch};
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::model::Product;

// ── Broadcast channel capacity ───────────────────────────────────────

const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

/// Advisory liveness frame sent right after the connection opens.
/// Not part of the data protocol; the server ignores its content.
const GREETING: &str = "Hi From the Client!";

/// Best-effort farewell frame sent while the connection is going down.
const FAREWELL: &str = "Client Closed!";

// ── ChannelState ─────────────────────────────────────────────────────

/// Connection lifecycle, observable via [`LiveChannel::state`].
///
/// Transitions: `Disconnected → Connecting → Connected → Disconnected`.
/// `Connecting` is only reachable again through a fresh
/// [`LiveChannel::connect`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelState {
    /// No connection. `reason` describes the last closure, for
    /// diagnostics only.
    Disconnected { reason: Option<String> },
    Connecting,
    Connected,
}

impl ChannelState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

// ── LiveChannel ──────────────────────────────────────────────────────

/// Handle to a running live update channel.
///
/// Dropping the handle does not tear down the connection; call
/// [`shutdown`](Self::shutdown) or cancel the token passed to
/// [`connect`](Self::connect).
pub struct LiveChannel {
    snapshot_rx: broadcast::Receiver<Arc<Vec<Product>>>,
    state_rx: watch::Receiver<ChannelState>,
    cancel: CancellationToken,
}

impl LiveChannel {
    /// Open a connection to the push endpoint and spawn the read task.
    ///
    /// Returns immediately; the connection attempt happens
    /// asynchronously. Observe [`state`](Self::state) for the outcome.
    /// A failed attempt lands back in [`ChannelState::Disconnected`]
    /// and is not retried.
    pub fn connect(ws_url: Url, cancel: CancellationToken) -> Self {
        let (snapshot_tx, snapshot_rx) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(ChannelState::Disconnected { reason: None });

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            run_connection(ws_url, snapshot_tx, state_tx, task_cancel).await;
        });

        Self {
            snapshot_rx,
            state_rx,
            cancel,
        }
    }

    /// Get a new broadcast receiver for decoded snapshots.
    ///
    /// Multiple consumers can subscribe concurrently. A consumer that
    /// falls behind receives [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Vec<Product>>> {
        self.snapshot_rx.resubscribe()
    }

    /// Observe connection state transitions.
    pub fn state(&self) -> watch::Receiver<ChannelState> {
        self.state_rx.clone()
    }

    /// Signal the connection task to shut down gracefully.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Connection lifecycle ─────────────────────────────────────────────

/// One full connection lifecycle: connect, greet, read until the stream
/// drops or the token is cancelled, then attempt a farewell and report
/// the closure. No reconnect.
async fn run_connection(
    ws_url: Url,
    snapshot_tx: broadcast::Sender<Arc<Vec<Product>>>,
    state_tx: watch::Sender<ChannelState>,
    cancel: CancellationToken,
) {
    let _ = state_tx.send(ChannelState::Connecting);
    tracing::info!(url = %ws_url, "connecting to live channel");

    // The handshake itself must be cancellable: a caller replacing this
    // connection relies on the old attempt never reaching Connected.
    let ws_stream = tokio::select! {
        biased;
        () = cancel.cancelled() => {
            tracing::debug!("connection attempt cancelled");
            let _ = state_tx.send(ChannelState::Disconnected {
                reason: Some("connection attempt cancelled".into()),
            });
            return;
        }
        result = open(&ws_url) => match result {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(error = %e, "live channel connection failed");
                let _ = state_tx.send(ChannelState::Disconnected {
                    reason: Some(e.to_string()),
                });
                return;
            }
        },
    };

    let _ = state_tx.send(ChannelState::Connected);
    tracing::info!("live channel connected");

    let (mut write, mut read) = ws_stream.split();

    // Liveness notice; content is not meaningful to the protocol.
    if let Err(e) = write.send(tungstenite::Message::text(GREETING)).await {
        tracing::debug!(error = %e, "greeting send failed");
    }

    let reason = loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break None,
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        decode_and_broadcast(text.as_str(), &snapshot_tx);
                    }
                    Some(Ok(tungstenite::Message::Ping(_))) => {
                        // tungstenite answers pongs automatically
                        tracing::trace!("live channel ping");
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        let reason = frame
                            .map(|cf| format!("close frame (code {}): {}", cf.code, cf.reason))
                            .unwrap_or_else(|| "close frame".into());
                        tracing::info!("{reason}");
                        break Some(reason);
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "live channel read error");
                        break Some(e.to_string());
                    }
                    None => {
                        // Stream ended without a close frame
                        tracing::info!("live channel stream ended");
                        break Some("stream ended".into());
                    }
                    _ => {
                        // Binary, Pong, Frame — ignore
                    }
                }
            }
        }
    };

    // Best-effort farewell; the connection is already going down, so a
    // failure here is expected and only logged.
    if let Err(e) = write.send(tungstenite::Message::text(FAREWELL)).await {
        tracing::debug!(error = %e, "farewell send failed");
    }
    let _ = write.close().await;

    let _ = state_tx.send(ChannelState::Disconnected { reason });
    tracing::info!("live channel closed");
}

async fn open(
    url: &Url,
) -> Result<
    tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    Error,
> {
    let uri: tungstenite::http::Uri = url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::WebSocketConnect(e.to_string()))?;

    let request = ClientRequestBuilder::new(uri);
    let (ws_stream, _response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    Ok(ws_stream)
}

// ── Snapshot decoding ────────────────────────────────────────────────

/// Decode a text frame as a full inventory snapshot and broadcast it.
///
/// A malformed payload is logged and swallowed — it must never reach the
/// store or clear existing state.
fn decode_and_broadcast(text: &str, snapshot_tx: &broadcast::Sender<Arc<Vec<Product>>>) {
    let snapshot: Vec<Product> = match serde_json::from_str(text) {
        Ok(products) => products,
        Err(e) => {
            tracing::debug!(error = %e, "discarding undecodable push payload");
            return;
        }
    };

    tracing::debug!(products = snapshot.len(), "snapshot received");

    // Ignore send errors — just means no active subscribers right now
    let _ = snapshot_tx.send(Arc::new(snapshot));
}

// ── Tests ────────────────────────────────────────────────────────────
