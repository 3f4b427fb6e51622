//! HTTP implementation of the remote channel.

use std::fmt;

use futures::Stream;
use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{
    upload_percentage, RemoteBill, RemoteCategory, RemoteChannel, RemoteError, RemoteItem,
    RemoteResult, RemoteSettings, UploadProgress,
};
use crate::config::RemoteConfig;
use crate::models::DEFAULT_ATTACHMENT_CONTENT_TYPE;
use crate::util::compact_text;

const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// Bearer-authenticated JSON client for the Tally API.
#[derive(Clone)]
pub struct HttpRemoteChannel {
    base_url: String,
    access_token: String,
    client: Client,
}

impl fmt::Debug for HttpRemoteChannel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HttpRemoteChannel")
            .field("base_url", &self.base_url)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl HttpRemoteChannel {
    pub fn new(config: &RemoteConfig) -> RemoteResult<Self> {
        if config.access_token.trim().is_empty() {
            return Err(RemoteError::InvalidConfiguration(
                "access token must not be empty".to_string(),
            ));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            client,
        })
    }

    /// Returns the base URL this channel was configured with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> RemoteResult<T> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// GET that maps 404 (and a JSON `null` body) to `None`.
    async fn get_optional_json<T: DeserializeOwned>(&self, path: &str) -> RemoteResult<Option<T>> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response).await?;
        Ok(response.json::<Option<T>>().await?)
    }

    async fn put_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> RemoteResult<()> {
        let response = self
            .client
            .put(self.url(path))
            .bearer_auth(&self.access_token)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

impl RemoteChannel for HttpRemoteChannel {
    async fn fetch_categories(&self) -> RemoteResult<Vec<RemoteCategory>> {
        self.get_json("/v1/categories").await
    }

    async fn push_category(&self, category: &RemoteCategory) -> RemoteResult<()> {
        self.put_json(&entity_path("categories", &category.id), category)
            .await
    }

    async fn fetch_items(&self) -> RemoteResult<Vec<RemoteItem>> {
        self.get_json("/v1/items").await
    }

    async fn push_item(&self, item: &RemoteItem) -> RemoteResult<()> {
        self.put_json(&entity_path("items", &item.id), item).await
    }

    async fn fetch_bills(&self) -> RemoteResult<Vec<RemoteBill>> {
        self.get_json("/v1/bills").await
    }

    async fn push_bill(&self, bill: &RemoteBill) -> RemoteResult<()> {
        self.put_json(&entity_path("bills", &bill.id), bill).await
    }

    async fn fetch_settings(&self) -> RemoteResult<Option<RemoteSettings>> {
        self.get_optional_json("/v1/settings").await
    }

    async fn push_settings(&self, settings: &RemoteSettings) -> RemoteResult<()> {
        self.put_json("/v1/settings", settings).await
    }

    async fn fetch_attachment(&self, bill_id: &str) -> RemoteResult<Option<Vec<u8>>> {
        let response = self
            .client
            .get(self.url(&document_path(bill_id)))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response).await?;
        let bytes = response.bytes().await?;
        Ok(Some(bytes.to_vec()))
    }

    async fn push_attachment(
        &self,
        bill_id: &str,
        bytes: &[u8],
        progress: Option<UploadProgress>,
    ) -> RemoteResult<()> {
        let body = upload_body(bytes, progress.clone());
        let response = self
            .client
            .put(self.url(&document_path(bill_id)))
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, DEFAULT_ATTACHMENT_CONTENT_TYPE)
            .header(CONTENT_LENGTH, bytes.len())
            .body(body)
            .send()
            .await?;
        ensure_success(response).await?;
        // An empty body yields no chunks, so nothing has reported completion yet.
        if bytes.is_empty() {
            if let Some(progress) = progress {
                progress(100);
            }
        }
        Ok(())
    }
}

fn entity_path(collection: &str, id: &str) -> String {
    format!("/v1/{collection}/{}", urlencoding::encode(id))
}

fn document_path(bill_id: &str) -> String {
    format!("/v1/bills/{}/document", urlencoding::encode(bill_id))
}

/// Build an upload body, streaming in chunks when progress is requested.
fn upload_body(bytes: &[u8], progress: Option<UploadProgress>) -> Body {
    match progress {
        Some(progress) => Body::wrap_stream(upload_stream(bytes, progress)),
        None => Body::from(bytes.to_vec()),
    }
}

/// Split a payload into upload chunks, reporting the cumulative percentage
/// as each chunk is handed to the transport.
fn upload_stream(
    bytes: &[u8],
    progress: UploadProgress,
) -> impl Stream<Item = std::io::Result<Vec<u8>>> + Send + 'static {
    let total = bytes.len();
    let chunks = bytes
        .chunks(UPLOAD_CHUNK_BYTES)
        .map(<[u8]>::to_vec)
        .collect::<Vec<_>>();
    let mut sent = 0usize;
    futures::stream::iter(chunks.into_iter().map(move |chunk| {
        sent += chunk.len();
        progress(upload_percentage(sent, total));
        Ok(chunk)
    }))
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

async fn ensure_success(response: Response) -> RemoteResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::Api {
        status: status.as_u16(),
        message: parse_api_error(status, &body),
    })
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return message.trim().to_string();
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        trimmed
    }
}
