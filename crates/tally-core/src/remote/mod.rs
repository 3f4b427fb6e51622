//! Remote store channel.
//!
//! The reconciliation engine talks to the remote store only through
//! [`RemoteChannel`]: one fetch-all and one push-one operation per entity
//! kind, plus a get/put pair for rendered bill documents. Request shapes and
//! transport concerns (auth headers, timeouts) belong to the implementation;
//! [`HttpRemoteChannel`] is the production one.

mod codec;
mod http;
mod wire;

use std::sync::Arc;

use thiserror::Error;

pub use codec::wide_int;
pub use http::HttpRemoteChannel;
pub use wire::{RemoteBill, RemoteBillItem, RemoteCategory, RemoteItem, RemoteSettings};

/// Upload progress callback receiving a 0-100 percentage.
pub type UploadProgress = Arc<dyn Fn(u8) + Send + Sync>;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Invalid remote configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Remote HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Remote API error: {message} ({status})")]
    Api { status: u16, message: String },
    #[error("Invalid remote payload: {0}")]
    InvalidPayload(String),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Authenticated channel to the remote store.
///
/// Holding a value of this type means "an authenticated channel is
/// available"; hosts drop it on logout.
#[allow(async_fn_in_trait)]
pub trait RemoteChannel {
    async fn fetch_categories(&self) -> RemoteResult<Vec<RemoteCategory>>;

    /// Upsert one category.
    async fn push_category(&self, category: &RemoteCategory) -> RemoteResult<()>;

    async fn fetch_items(&self) -> RemoteResult<Vec<RemoteItem>>;

    async fn push_item(&self, item: &RemoteItem) -> RemoteResult<()>;

    async fn fetch_bills(&self) -> RemoteResult<Vec<RemoteBill>>;

    async fn push_bill(&self, bill: &RemoteBill) -> RemoteResult<()>;

    /// Fetch the remote settings singleton, `None` when never pushed.
    async fn fetch_settings(&self) -> RemoteResult<Option<RemoteSettings>>;

    async fn push_settings(&self, settings: &RemoteSettings) -> RemoteResult<()>;

    /// Fetch the rendered document for a bill, `None` when absent.
    async fn fetch_attachment(&self, bill_id: &str) -> RemoteResult<Option<Vec<u8>>>;

    /// Store the rendered document for a bill, replacing any previous one.
    async fn push_attachment(
        &self,
        bill_id: &str,
        bytes: &[u8],
        progress: Option<UploadProgress>,
    ) -> RemoteResult<()>;
}

/// Cumulative upload percentage, clamped to 0-100.
#[must_use]
pub fn upload_percentage(sent: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = sent.min(total).saturating_mul(100) / total;
    u8::try_from(percent).unwrap_or(100)
}
