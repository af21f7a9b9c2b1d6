//! Remote data gateway for the menu backend.

pub mod cache;
pub mod draft;
pub mod model;
pub mod token;

use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use url::Url;

use crate::error::MenuboardError;

pub use cache::{QueryCache, QueryKey};
pub use draft::Draft;
pub use model::{Campaign, Category, Entity, LoadedPage, Menu, MenuItem, Page, ResourceKind};
pub use token::TokenStore;

use model::PageEnvelope;

const USER_AGENT: &str = concat!("menuboard/", env!("CARGO_PKG_VERSION"));

/// Public endpoint recording a QR-code scan.
const QR_TRACK_PATH: &str = "qr-track";

/// Typed access to the backend's REST resources.
///
/// Cheap to clone; clones share the HTTP client and the read cache.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    tokens: TokenStore,
    cache: Arc<QueryCache>,
}

impl Gateway {
    /// Create a gateway for the API rooted at `base_url`.
    pub fn new(
        base_url: &str,
        tokens: TokenStore,
        timeout: Duration,
    ) -> Result<Self, MenuboardError> {
        let parsed = Url::parse(base_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(MenuboardError::InvalidUrl(format!(
                "unsupported scheme: {}",
                parsed.scheme()
            )));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
            cache: Arc::new(QueryCache::new()),
        })
    }

    /// The read cache shared by all clones.
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Attach the bearer credential when one is available.
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Fetch one page of a resource.
    ///
    /// Served from the cache when the resource has not been written since
    /// the page was last read.
    pub async fn list<T: Entity>(
        &self,
        page_index: u32,
        page_size: u32,
    ) -> Result<Page<T>, MenuboardError> {
        let key = QueryKey {
            kind: T::KIND,
            page: page_index,
            size: page_size,
        };

        if let Some(body) = self.cache.get(&key) {
            tracing::trace!(resource = T::KIND.path(), page = page_index, "cache hit");
            return decode_page(body);
        }

        let epoch = self.cache.epoch(T::KIND);
        let request = self
            .client
            .get(self.url(T::KIND.path()))
            .query(&[("page", page_index), ("size", page_size)]);
        let response = self.authorized(request).send().await?;
        let body: Value = check_status(response).await?.json().await?;

        let page = decode_page::<T>(body.clone())?;
        self.cache.insert(key, epoch, body);
        tracing::debug!(
            resource = T::KIND.path(),
            page = page_index,
            items = page.items.len(),
            last = page.is_last_page,
            "page fetched"
        );
        Ok(page)
    }

    /// Create an entity. Invalidates cached reads of the resource.
    pub async fn create<T: Entity>(&self, draft: &Draft) -> Result<T, MenuboardError> {
        draft.validate(T::KIND)?;
        let request = self.client.post(self.url(T::KIND.path()));
        let request = with_body(request, T::KIND, draft).await?;
        let response = self.authorized(request).send().await?;
        let created: T = check_status(response).await?.json().await?;

        self.cache.invalidate(T::KIND);
        tracing::info!(resource = T::KIND.path(), id = created.id(), "created");
        Ok(created)
    }

    /// Update an entity. Invalidates cached reads of the resource.
    pub async fn update<T: Entity>(&self, id: i64, draft: &Draft) -> Result<T, MenuboardError> {
        draft.validate(T::KIND)?;
        let request = self.client.put(self.url(&format!("{}/{id}", T::KIND.path())));
        let request = with_body(request, T::KIND, draft).await?;
        let response = self.authorized(request).send().await?;
        let updated: T = check_status(response).await?.json().await?;

        self.cache.invalidate(T::KIND);
        tracing::info!(resource = T::KIND.path(), id, "updated");
        Ok(updated)
    }

    /// Delete an entity. Invalidates cached reads of the resource.
    pub async fn delete(&self, kind: ResourceKind, id: i64) -> Result<(), MenuboardError> {
        let request = self.client.delete(self.url(&format!("{}/{id}", kind.path())));
        let response = self.authorized(request).send().await?;
        check_status(response).await?;

        self.cache.invalidate(kind);
        tracing::info!(resource = kind.path(), id, "deleted");
        Ok(())
    }

    /// Record a QR-code scan. Public endpoint: never authenticated.
    pub async fn track_qr(&self) -> Result<(), MenuboardError> {
        let response = self.client.post(self.url(QR_TRACK_PATH)).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

fn decode_page<T: Entity>(body: Value) -> Result<Page<T>, MenuboardError> {
    let envelope: PageEnvelope<T> = serde_json::from_value(body)
        .map_err(|e| MenuboardError::Network(format!("malformed page response: {e}")))?;
    Ok(envelope.into())
}

/// Attach the draft as JSON, or as multipart when it carries an image.
async fn with_body(
    request: RequestBuilder,
    kind: ResourceKind,
    draft: &Draft,
) -> Result<RequestBuilder, MenuboardError> {
    let Some(image_path) = &draft.image else {
        return Ok(request.json(&draft.to_json(kind)));
    };

    let bytes = tokio::fs::read(image_path).await?;
    let file_name = image_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());

    let data = Part::text(draft.to_json(kind).to_string()).mime_str("application/json")?;
    let image = Part::bytes(bytes).file_name(file_name);
    let form = Form::new().part("data", data).part("image", image);
    Ok(request.multipart(form))
}

/// Turn 4xx/5xx responses into `ServerError` with the backend's message.
async fn check_status(response: Response) -> Result<Response, MenuboardError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = server_message(&body);
    tracing::debug!(status = status.as_u16(), %message, "request failed");
    Err(MenuboardError::Server {
        status: status.as_u16(),
        message,
    })
}

/// Extract `message` (or `error`) from an error body.
fn server_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error"]
                .iter()
                .find_map(|field| v.get(*field).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_default()
}
