// ── Runtime connection configuration ──
//
// Describes *how* to reach the inventory server. The CLI constructs an
// `InventoryConfig` and hands it in — core never reads config files.

use std::time::Duration;

use url::Url;

use crate::error::CoreError;

/// Configuration for connecting to a single inventory server.
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// Server base URL (e.g., `http://127.0.0.1:5000`).
    pub base_url: Url,
    /// Push endpoint. When `None`, derived from `base_url`: same host,
    /// `ws`/`wss` scheme, `/ws` path (the server serves both on one port).
    pub ws_url: Option<Url>,
    /// Request timeout for CRUD calls.
    pub timeout: Duration,
    /// Connect the live update channel on startup.
    pub live_updates: bool,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://127.0.0.1:5000").expect("static URL is valid"),
            ws_url: None,
            timeout: Duration::from_secs(30),
            live_updates: true,
        }
    }
}

impl InventoryConfig {
    /// Resolve the push endpoint URL.
    pub fn websocket_url(&self) -> Result<Url, CoreError> {
        if let Some(ref url) = self.ws_url {
            return Ok(url.clone());
        }

        let mut url = self.base_url.clone();
        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(CoreError::Config {
                    message: format!("cannot derive WebSocket URL from scheme {other:?}"),
                });
            }
        };
        url.set_scheme(scheme).map_err(|()| CoreError::Config {
            message: "cannot derive WebSocket URL".into(),
        })?;
        url.set_path("/ws");
        Ok(url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn websocket_url_derived_from_http_base() {
        let config = InventoryConfig {
            base_url: Url::parse("http://127.0.0.1:5000").unwrap(),
            ..InventoryConfig::default()
        };
        assert_eq!(config.websocket_url().unwrap().as_str(), "ws://127.0.0.1:5000/ws");
    }

    #[test]
    fn websocket_url_derived_from_https_base() {
        let config = InventoryConfig {
            base_url: Url::parse("https://inventory.example.com/api").unwrap(),
            ..InventoryConfig::default()
        };
        assert_eq!(
            config.websocket_url().unwrap().as_str(),
            "wss://inventory.example.com/ws"
        );
    }

    #[test]
    fn explicit_ws_url_wins() {
        let config = InventoryConfig {
            ws_url: Some(Url::parse("ws://push.example.com/feed").unwrap()),
            ..InventoryConfig::default()
        };
        assert_eq!(
            config.websocket_url().unwrap().as_str(),
            "ws://push.example.com/feed"
        );
    }
}
