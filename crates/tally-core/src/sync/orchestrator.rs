//! Multi-stage sync protocol.
//!
//! Stages run strictly in order: upload, download, merge and persist, then
//! document sync. Per-record failures are logged and skipped so that one bad
//! record never blocks the rest; a failed fetch-all or a local store failure
//! aborts the run.

use std::collections::HashMap;

use serde::Serialize;

use super::adapters::RemoteAdapter;
use super::attachments::AttachmentTransfer;
use super::merge::{merge, merge_settings};
use crate::db::LocalStore;
use crate::models::{Attachment, Settings, Syncable};
use crate::remote::RemoteChannel;
use crate::Result;

/// Progress notification emitted between stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncProgress {
    /// 0-100
    pub percent: u8,
    pub message: String,
}

impl SyncProgress {
    pub fn new(percent: u8, message: impl Into<String>) -> Self {
        Self {
            percent: percent.min(100),
            message: message.into(),
        }
    }
}

/// Counts describing one completed sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Records accepted by the remote store (settings included)
    pub pushed: usize,
    pub push_failures: usize,
    pub merged_categories: usize,
    pub merged_items: usize,
    pub merged_bills: usize,
    pub merged_bill_items: usize,
    pub settings_merged: bool,
    pub attachments_uploaded: usize,
    pub attachments_downloaded: usize,
    pub attachment_failures: usize,
}

/// Run one full sync between `store` and `channel`.
///
/// Not reentrant: callers must serialize runs (see
/// [`SyncController`](super::SyncController)).
pub async fn perform_sync<S, C, F>(store: &S, channel: &C, mut on_progress: F) -> Result<SyncReport>
where
    S: LocalStore,
    C: RemoteChannel,
    F: FnMut(SyncProgress),
{
    let mut report = SyncReport::default();
    let transfer = AttachmentTransfer::new(channel);

    on_progress(SyncProgress::new(10, "Uploading local changes..."));
    upload_local_changes(store, channel, &mut report).await?;
    upload_documents(store, &transfer, &mut report).await?;

    on_progress(SyncProgress::new(40, "Downloading remote data..."));
    let (remote_categories, remote_items, remote_bills, remote_settings) = tokio::try_join!(
        channel.fetch_categories(),
        channel.fetch_items(),
        channel.fetch_bills(),
        channel.fetch_settings(),
    )?;
    let local_settings = store.load_settings().await?;
    tracing::debug!(
        "Fetched {} categories, {} items, {} bills from remote",
        remote_categories.len(),
        remote_items.len(),
        remote_bills.len()
    );

    on_progress(SyncProgress::new(70, "Merging data..."));
    let categories = reconcile(store.all_categories().await?, remote_categories);
    report.merged_categories = categories.len();
    store.upsert_categories(&categories).await?;

    let items = reconcile(store.all_items().await?, remote_items);
    report.merged_items = items.len();
    store.upsert_items(&items).await?;

    let bills = reconcile(store.all_bills().await?, remote_bills);
    report.merged_bills = bills.len();
    store.upsert_bills(&bills).await?;

    // Bill lines have no remote representation yet.
    let bill_items = merge(store.all_bill_items().await?, Vec::new());
    report.merged_bill_items = bill_items.len();
    store.upsert_bill_items(&bill_items).await?;

    let remote_settings = remote_settings.map(|remote| {
        let settings = Settings::from_remote(remote);
        match &local_settings {
            Some(local) => settings.with_local_fields(local),
            None => settings,
        }
    });
    if let Some(settings) = merge_settings(local_settings, remote_settings) {
        store.save_settings(&settings).await?;
        report.settings_merged = true;
    }

    on_progress(SyncProgress::new(90, "Syncing documents..."));
    download_documents(store, &transfer, &mut report).await?;

    on_progress(SyncProgress::new(100, "Sync complete!"));
    tracing::info!(
        pushed = report.pushed,
        push_failures = report.push_failures,
        categories = report.merged_categories,
        items = report.merged_items,
        bills = report.merged_bills,
        documents_uploaded = report.attachments_uploaded,
        documents_downloaded = report.attachments_downloaded,
        document_failures = report.attachment_failures,
        "Sync finished"
    );
    Ok(report)
}

async fn upload_local_changes<S: LocalStore, C: RemoteChannel>(
    store: &S,
    channel: &C,
    report: &mut SyncReport,
) -> Result<()> {
    for category in store.all_categories().await? {
        match channel.push_category(&category.to_remote()).await {
            Ok(()) => report.pushed += 1,
            Err(error) => {
                report.push_failures += 1;
                tracing::warn!("Failed to upload category {}: {error}", category.category_id);
            }
        }
    }

    for item in store.all_items().await? {
        match channel.push_item(&item.to_remote()).await {
            Ok(()) => report.pushed += 1,
            Err(error) => {
                report.push_failures += 1;
                tracing::warn!("Failed to upload item {}: {error}", item.item_id);
            }
        }
    }

    for bill in store.all_bills().await? {
        match channel.push_bill(&bill.to_remote()).await {
            Ok(()) => report.pushed += 1,
            Err(error) => {
                report.push_failures += 1;
                tracing::warn!("Failed to upload bill {}: {error}", bill.bill_id);
            }
        }
    }

    if let Some(settings) = store.load_settings().await? {
        match channel.push_settings(&settings.to_remote()).await {
            Ok(()) => report.pushed += 1,
            Err(error) => {
                report.push_failures += 1;
                tracing::warn!("Failed to upload settings: {error}");
            }
        }
    }

    Ok(())
}

async fn upload_documents<S: LocalStore, C: RemoteChannel>(
    store: &S,
    transfer: &AttachmentTransfer<'_, C>,
    report: &mut SyncReport,
) -> Result<()> {
    for attachment in store.all_attachments().await? {
        match transfer
            .upload(&attachment.bill_id, &attachment.bytes, None)
            .await
        {
            Ok(()) => report.attachments_uploaded += 1,
            Err(error) => {
                report.attachment_failures += 1;
                tracing::warn!(
                    "Failed to upload document for bill {}: {error}",
                    attachment.bill_id
                );
            }
        }
    }
    Ok(())
}

async fn download_documents<S: LocalStore, C: RemoteChannel>(
    store: &S,
    transfer: &AttachmentTransfer<'_, C>,
    report: &mut SyncReport,
) -> Result<()> {
    for bill in store.all_bills().await? {
        if bill.deleted {
            continue;
        }

        let bytes = match transfer.download(&bill.bill_id).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => continue,
            Err(error) => {
                report.attachment_failures += 1;
                tracing::warn!(
                    "Failed to download document for bill {}: {error}",
                    bill.bill_id
                );
                continue;
            }
        };

        let stored = match Attachment::new(bill.bill_id.clone(), bytes) {
            Ok(attachment) => store.put_attachment(&attachment).await,
            Err(error) => Err(error),
        };
        match stored {
            Ok(()) => report.attachments_downloaded += 1,
            Err(error) => {
                report.attachment_failures += 1;
                tracing::warn!("Failed to store document for bill {}: {error}", bill.bill_id);
            }
        }
    }
    Ok(())
}

/// Convert remote records, restore local-only fields, then merge.
fn reconcile<E>(local: Vec<E>, remote: Vec<E::Remote>) -> Vec<E>
where
    E: RemoteAdapter + Syncable,
{
    let remote = {
        let local_by_key: HashMap<&str, &E> =
            local.iter().map(|record| (record.key(), record)).collect();
        remote
            .into_iter()
            .map(|remote| {
                let record = E::from_remote(remote);
                match local_by_key.get(record.key()) {
                    Some(existing) => record.with_local_fields(existing),
                    None => record,
                }
            })
            .collect::<Vec<_>>()
    };
    merge(local, remote)
}
