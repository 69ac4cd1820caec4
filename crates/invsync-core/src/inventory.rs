// ── Inventory abstraction ──
//
// The consumer-facing entry point. Owns the reconciliation store, the
// CRUD client, and (optionally) the live update channel, and exposes
// the read model plus mutation operations with refresh-on-success
// semantics.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use invsync_api::channel::{ChannelState, LiveChannel};
use invsync_api::model::Product;
use invsync_api::{ProductClient, TransportConfig};

use crate::config::InventoryConfig;
use crate::error::CoreError;
use crate::store::{InventoryStore, SnapshotSource};
use crate::stream::ProductStream;

// ── Inventory ────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<InventoryInner>`. All mutations delegate
/// to the CRUD client and re-derive the view through a full refresh on
/// success — there are no optimistic local inserts, because the server
/// is authoritative for identity and validation.
#[derive(Clone)]
pub struct Inventory {
    inner: Arc<InventoryInner>,
}

struct InventoryInner {
    config: InventoryConfig,
    store: Arc<InventoryStore>,
    client: ProductClient,
    channel_state: watch::Sender<ChannelState>,
    live: Mutex<Option<LiveSession>>,
    cancel: CancellationToken,
}

/// A running live channel plus the task pumping its snapshots into the
/// store.
struct LiveSession {
    channel: LiveChannel,
    pump: JoinHandle<()>,
    cancel: CancellationToken,
}

impl Inventory {
    /// Create a new Inventory from configuration. Does NOT fetch
    /// anything — call [`refresh()`](Self::refresh) for the initial
    /// load and [`connect_live()`](Self::connect_live) for push
    /// updates.
    pub fn new(config: InventoryConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
        };
        let client = ProductClient::new(&config.base_url, &transport)?;
        let (channel_state, _) = watch::channel(ChannelState::Disconnected { reason: None });

        Ok(Self {
            inner: Arc::new(InventoryInner {
                config,
                store: Arc::new(InventoryStore::new()),
                client,
                channel_state,
                live: Mutex::new(None),
                cancel: CancellationToken::new(),
            }),
        })
    }

    /// Access the configuration.
    pub fn config(&self) -> &InventoryConfig {
        &self.inner.config
    }

    /// Access the underlying store.
    pub fn store(&self) -> &Arc<InventoryStore> {
        &self.inner.store
    }

    // ── Read model ───────────────────────────────────────────────────

    /// The latest merged view (ordered, read-only).
    pub fn products(&self) -> Arc<Vec<Arc<Product>>> {
        self.inner.store.products()
    }

    /// Indexed lookup into the current view.
    pub fn product(&self, id: i64) -> Option<Arc<Product>> {
        self.inner.store.product(id)
    }

    /// Subscribe to view changes.
    pub fn subscribe(&self) -> ProductStream {
        self.inner.store.subscribe()
    }

    // ── CRUD operations ──────────────────────────────────────────────

    /// Fetch the full collection and replace the local view with it.
    ///
    /// On failure the previous view stays intact (stale-but-available)
    /// and the error propagates; either way the store is marked loaded.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let result = self.inner.client.list().await;
        self.inner.store.mark_loaded();

        match result {
            Ok(products) => {
                self.inner
                    .store
                    .apply_snapshot(SnapshotSource::Refresh, products);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "refresh failed, keeping previous view");
                Err(e.into())
            }
        }
    }

    /// Read-through fetch of a single record. Does not touch the view.
    pub async fn fetch(&self, id: i64) -> Result<Product, CoreError> {
        Ok(self.inner.client.fetch(id).await?)
    }

    /// Submit a new record, then re-derive the view.
    ///
    /// No optimistic insert: the client cannot know the server-assigned
    /// identity or validation outcome ahead of time. On failure the
    /// error (including any validation message sequence) propagates
    /// with the view untouched.
    pub async fn create(&self, product: &Product) -> Result<(), CoreError> {
        self.inner.client.create(product).await?;
        debug!(id = product.id, "product created");
        self.refresh().await
    }

    /// Replace an existing record, then re-derive the view.
    /// Same refresh-on-success, propagate-on-failure contract as
    /// [`create`](Self::create).
    pub async fn update(&self, product: &Product) -> Result<(), CoreError> {
        self.inner.client.update(product).await?;
        debug!(id = product.id, "product updated");
        self.refresh().await
    }

    /// Delete a record, then re-derive the view.
    ///
    /// On failure the record remains visible — nothing is dropped from
    /// the view until the server confirms.
    pub async fn remove(&self, id: i64) -> Result<(), CoreError> {
        self.inner.client.remove(id).await?;
        debug!(id, "product removed");
        self.refresh().await
    }

    // ── Live channel lifecycle ───────────────────────────────────────

    /// Open the live update channel and start applying pushed snapshots
    /// to the store.
    ///
    /// At most one connection is active at a time. Calling this while
    /// connected is a no-op; calling it after a closure observed via
    /// [`channel_state`](Self::channel_state) re-establishes the
    /// connection — there is no automatic reconnect.
    pub async fn connect_live(&self) -> Result<(), CoreError> {
        let mut guard = self.inner.live.lock().await;

        if let Some(ref session) = *guard {
            if session.channel.state().borrow().is_connected() {
                return Ok(());
            }
        }
        // The previous session is dead or still mid-handshake. Wait for
        // it to fully wind down before dialing again: at most one
        // connection may exist at any instant.
        if let Some(old) = guard.take() {
            old.cancel.cancel();
            let _ = old.pump.await;
        }

        let ws_url = self.inner.config.websocket_url()?;
        info!(url = %ws_url, "opening live channel");

        let session_cancel = self.inner.cancel.child_token();
        let channel = LiveChannel::connect(ws_url, session_cancel.clone());

        let snapshots = channel.subscribe();
        let states = channel.state();
        let pump = tokio::spawn(pump_task(
            snapshots,
            states,
            Arc::clone(&self.inner.store),
            self.inner.channel_state.clone(),
        ));

        *guard = Some(LiveSession {
            channel,
            pump,
            cancel: session_cancel,
        });
        Ok(())
    }

    /// Close the live channel, if open. Further pushes stop; the view
    /// keeps its last state.
    pub async fn disconnect_live(&self) {
        let mut guard = self.inner.live.lock().await;
        if let Some(session) = guard.take() {
            session.channel.shutdown();
            let _ = session.pump.await;
            debug!("live channel disconnected");
        }
    }

    /// Observe live channel state transitions (diagnostics only).
    pub fn channel_state(&self) -> watch::Receiver<ChannelState> {
        self.inner.channel_state.subscribe()
    }

    /// Tear down the live channel and cancel all background work.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        self.disconnect_live().await;
    }
}

// ── Background pump ──────────────────────────────────────────────────

/// Apply pushed snapshots to the store and mirror channel state for
/// observers. Exits when the channel task goes away.
async fn pump_task(
    mut snapshots: broadcast::Receiver<Arc<Vec<Product>>>,
    mut states: watch::Receiver<ChannelState>,
    store: Arc<InventoryStore>,
    state_tx: watch::Sender<ChannelState>,
) {
    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                debug!(?state, "live channel state");
                let _ = state_tx.send(state);
            }
            received = snapshots.recv() => {
                match received {
                    Ok(snapshot) => {
                        // A push always wins over whatever was visible
                        // before it: unconditional full replace.
                        store.apply_snapshot(
                            SnapshotSource::Push,
                            snapshot.as_ref().clone(),
                        );
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Only the newest snapshot matters; the skipped
                        // ones were superseded anyway.
                        warn!(skipped, "live snapshot receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    // Make sure observers see the terminal state even if the final
    // watch update raced with task teardown.
    state_tx.send_if_modified(|state| {
        if state.is_connected() || *state == ChannelState::Connecting {
            *state = ChannelState::Disconnected {
                reason: Some("live channel task ended".into()),
            };
            true
        } else {
            false
        }
    });
}
