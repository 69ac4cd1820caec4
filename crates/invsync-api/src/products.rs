// Hand-crafted async HTTP client for the inventory CRUD API.
//
// One call = one round trip. No retries, no state: retry policy belongs
// to the caller.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::model::Product;
use crate::transport::TransportConfig;

// ── Error response shape from the server ─────────────────────────────

/// Structured error body: `{"errors": ["...", ...]}`.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the product CRUD endpoints.
///
/// Stateless: every operation is a single request/response exchange
/// against `{base_url}/products`.
pub struct ProductClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ProductClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL and transport config.
    pub fn new(base_url: &Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url),
        })
    }

    /// Wrap an existing `reqwest::Client` (used by tests).
    pub fn with_client(http: reqwest::Client, base_url: &Url) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
        }
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"products/3"`) onto the base URL.
    fn url(&self, path: &str) -> Url {
        // base_url always ends with `/`, so joining `products/…` works.
        self.base_url
            .join(path)
            .expect("path should be valid relative URL")
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Fetch the full product collection.
    pub async fn list(&self) -> Result<Vec<Product>, Error> {
        let url = self.url("products");
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    /// Submit a new record. The server validates the payload (including
    /// any client-supplied id) and assigns timestamps; the response body
    /// is ignored — callers re-derive state via `list()`.
    pub async fn create(&self, product: &Product) -> Result<(), Error> {
        let url = self.url("products");
        debug!("POST {url}");

        let resp = self.http.post(url).json(product).send().await?;
        self.handle_empty(resp).await
    }

    /// Fetch one record by id.
    pub async fn fetch(&self, id: i64) -> Result<Product, Error> {
        let url = self.url(&format!("products/{id}"));
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    /// Replace the record with `product.id`.
    pub async fn update(&self, product: &Product) -> Result<(), Error> {
        let url = self.url(&format!("products/{}", product.id));
        debug!("PUT {url}");

        let resp = self.http.put(url).json(product).send().await?;
        self.handle_empty(resp).await
    }

    /// Delete the record with the given id.
    pub async fn remove(&self, id: i64) -> Result<(), Error> {
        let url = self.url(&format!("products/{id}"));
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(parse_error(status, resp).await)
        }
    }
}

/// Map a non-success response to an [`Error`].
///
/// 404 is always `NotFound`. Any other status with a structured
/// `{"errors": [...]}` body becomes `Validation`, carrying the message
/// sequence untouched. Everything else is `Server`.
async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    let raw = resp.text().await.unwrap_or_default();

    if status == reqwest::StatusCode::NOT_FOUND {
        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|e| e.errors.into_iter().next())
            .unwrap_or_else(|| "product not found".into());
        return Error::NotFound { message };
    }

    if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
        if !err.errors.is_empty() {
            return Error::Validation {
                messages: err.errors,
            };
        }
    }

    Error::Server {
        status: status.as_u16(),
        body: raw,
    }
}

/// Ensure the base URL ends with `/` so relative joins behave.
fn normalize_base_url(raw: &Url) -> Url {
    let mut url = raw.clone();
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/"));
    url
}
