//! In-memory store and scripted remote channel for sync tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::db::LocalStore;
use crate::models::{Attachment, Bill, BillItem, Category, Item, Settings};
use crate::remote::{
    RemoteBill, RemoteCategory, RemoteChannel, RemoteError, RemoteItem, RemoteResult,
    RemoteSettings, UploadProgress,
};
use crate::Result;

#[derive(Default)]
pub struct MemoryStore {
    categories: Mutex<HashMap<String, Category>>,
    items: Mutex<HashMap<String, Item>>,
    bills: Mutex<HashMap<String, Bill>>,
    bill_items: Mutex<HashMap<String, BillItem>>,
    settings: Mutex<Option<Settings>>,
    attachments: Mutex<HashMap<String, Attachment>>,
}

impl MemoryStore {
    pub fn seed_category(&self, category: Category) {
        self.categories
            .lock()
            .unwrap()
            .insert(category.category_id.clone(), category);
    }

    pub fn seed_item(&self, item: Item) {
        self.items
            .lock()
            .unwrap()
            .insert(item.item_id.clone(), item);
    }

    pub fn seed_bill(&self, bill: Bill) {
        self.bills
            .lock()
            .unwrap()
            .insert(bill.bill_id.clone(), bill);
    }

    pub fn seed_bill_item(&self, bill_item: BillItem) {
        self.bill_items
            .lock()
            .unwrap()
            .insert(bill_item.item_id.clone(), bill_item);
    }

    pub fn seed_settings(&self, settings: Settings) {
        *self.settings.lock().unwrap() = Some(settings);
    }

    pub fn seed_attachment(&self, attachment: Attachment) {
        self.attachments
            .lock()
            .unwrap()
            .insert(attachment.bill_id.clone(), attachment);
    }

    pub fn category(&self, id: &str) -> Option<Category> {
        self.categories.lock().unwrap().get(id).cloned()
    }

    pub fn item(&self, id: &str) -> Option<Item> {
        self.items.lock().unwrap().get(id).cloned()
    }

    pub fn bill(&self, id: &str) -> Option<Bill> {
        self.bills.lock().unwrap().get(id).cloned()
    }

    pub fn bill_item(&self, id: &str) -> Option<BillItem> {
        self.bill_items.lock().unwrap().get(id).cloned()
    }

    pub fn settings(&self) -> Option<Settings> {
        self.settings.lock().unwrap().clone()
    }

    pub fn attachment(&self, bill_id: &str) -> Option<Attachment> {
        self.attachments.lock().unwrap().get(bill_id).cloned()
    }
}

impl LocalStore for MemoryStore {
    async fn all_categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.lock().unwrap().values().cloned().collect())
    }

    async fn upsert_categories(&self, categories: &[Category]) -> Result<()> {
        for category in categories {
            self.seed_category(category.clone());
        }
        Ok(())
    }

    async fn all_items(&self) -> Result<Vec<Item>> {
        Ok(self.items.lock().unwrap().values().cloned().collect())
    }

    async fn upsert_items(&self, items: &[Item]) -> Result<()> {
        for item in items {
            self.seed_item(item.clone());
        }
        Ok(())
    }

    async fn all_bills(&self) -> Result<Vec<Bill>> {
        Ok(self.bills.lock().unwrap().values().cloned().collect())
    }

    async fn upsert_bills(&self, bills: &[Bill]) -> Result<()> {
        for bill in bills {
            self.seed_bill(bill.clone());
        }
        Ok(())
    }

    async fn all_bill_items(&self) -> Result<Vec<BillItem>> {
        Ok(self.bill_items.lock().unwrap().values().cloned().collect())
    }

    async fn upsert_bill_items(&self, bill_items: &[BillItem]) -> Result<()> {
        for bill_item in bill_items {
            self.seed_bill_item(bill_item.clone());
        }
        Ok(())
    }

    async fn load_settings(&self) -> Result<Option<Settings>> {
        Ok(self.settings())
    }

    async fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.seed_settings(settings.clone());
        Ok(())
    }

    async fn all_attachments(&self) -> Result<Vec<Attachment>> {
        Ok(self.attachments.lock().unwrap().values().cloned().collect())
    }

    async fn get_attachment(&self, bill_id: &str) -> Result<Option<Attachment>> {
        Ok(self.attachment(bill_id))
    }

    async fn put_attachment(&self, attachment: &Attachment) -> Result<()> {
        self.seed_attachment(attachment.clone());
        Ok(())
    }
}

/// Remote channel backed by maps, with scriptable failures.
///
/// Every call yields once so that concurrent callers interleave.
#[derive(Default)]
pub struct FakeRemote {
    categories: Mutex<HashMap<String, RemoteCategory>>,
    items: Mutex<HashMap<String, RemoteItem>>,
    bills: Mutex<HashMap<String, RemoteBill>>,
    settings: Mutex<Option<RemoteSettings>>,
    attachments: Mutex<HashMap<String, Vec<u8>>>,
    failing_pushes: Mutex<HashSet<String>>,
    failing_attachments: Mutex<HashSet<String>>,
    rejected_uploads: Mutex<HashSet<String>>,
    fail_fetches: AtomicBool,
    calls: AtomicUsize,
}

impl FakeRemote {
    pub fn insert_category(&self, category: RemoteCategory) {
        self.categories
            .lock()
            .unwrap()
            .insert(category.id.clone(), category);
    }

    pub fn insert_item(&self, item: RemoteItem) {
        self.items.lock().unwrap().insert(item.id.clone(), item);
    }

    pub fn insert_bill(&self, bill: RemoteBill) {
        self.bills.lock().unwrap().insert(bill.id.clone(), bill);
    }

    pub fn set_settings(&self, settings: RemoteSettings) {
        *self.settings.lock().unwrap() = Some(settings);
    }

    pub fn set_attachment(&self, bill_id: &str, bytes: Vec<u8>) {
        self.attachments
            .lock()
            .unwrap()
            .insert(bill_id.to_string(), bytes);
    }

    /// Make pushes of the record with this id fail.
    pub fn fail_push_for(&self, id: &str) {
        self.failing_pushes.lock().unwrap().insert(id.to_string());
    }

    /// Make document transfers for this bill fail.
    pub fn fail_attachment_for(&self, bill_id: &str) {
        self.failing_attachments
            .lock()
            .unwrap()
            .insert(bill_id.to_string());
    }

    /// Make document uploads (only) for this bill fail.
    pub fn reject_uploads_for(&self, bill_id: &str) {
        self.rejected_uploads
            .lock()
            .unwrap()
            .insert(bill_id.to_string());
    }

    /// Make every fetch-all call fail.
    pub fn fail_fetches(&self) {
        self.fail_fetches.store(true, Ordering::SeqCst);
    }

    pub fn category(&self, id: &str) -> Option<RemoteCategory> {
        self.categories.lock().unwrap().get(id).cloned()
    }

    pub fn item(&self, id: &str) -> Option<RemoteItem> {
        self.items.lock().unwrap().get(id).cloned()
    }

    pub fn bill(&self, id: &str) -> Option<RemoteBill> {
        self.bills.lock().unwrap().get(id).cloned()
    }

    pub fn settings(&self) -> Option<RemoteSettings> {
        self.settings.lock().unwrap().clone()
    }

    pub fn attachment(&self, bill_id: &str) -> Option<Vec<u8>> {
        self.attachments.lock().unwrap().get(bill_id).cloned()
    }

    /// Total number of channel calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
    }

    async fn enter_fetch(&self) -> RemoteResult<()> {
        self.enter().await;
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }

    async fn enter_push(&self, id: &str) -> RemoteResult<()> {
        self.enter().await;
        if self.failing_pushes.lock().unwrap().contains(id) {
            return Err(RemoteError::Api {
                status: 422,
                message: format!("rejected {id}"),
            });
        }
        Ok(())
    }

    async fn enter_attachment(&self, bill_id: &str) -> RemoteResult<()> {
        self.enter().await;
        if self.failing_attachments.lock().unwrap().contains(bill_id) {
            return Err(unavailable());
        }
        Ok(())
    }
}

fn unavailable() -> RemoteError {
    RemoteError::Api {
        status: 503,
        message: "service unavailable".to_string(),
    }
}

impl RemoteChannel for FakeRemote {
    async fn fetch_categories(&self) -> RemoteResult<Vec<RemoteCategory>> {
        self.enter_fetch().await?;
        Ok(self.categories.lock().unwrap().values().cloned().collect())
    }

    async fn push_category(&self, category: &RemoteCategory) -> RemoteResult<()> {
        self.enter_push(&category.id).await?;
        self.insert_category(category.clone());
        Ok(())
    }

    async fn fetch_items(&self) -> RemoteResult<Vec<RemoteItem>> {
        self.enter_fetch().await?;
        Ok(self.items.lock().unwrap().values().cloned().collect())
    }

    async fn push_item(&self, item: &RemoteItem) -> RemoteResult<()> {
        self.enter_push(&item.id).await?;
        self.insert_item(item.clone());
        Ok(())
    }

    async fn fetch_bills(&self) -> RemoteResult<Vec<RemoteBill>> {
        self.enter_fetch().await?;
        Ok(self.bills.lock().unwrap().values().cloned().collect())
    }

    async fn push_bill(&self, bill: &RemoteBill) -> RemoteResult<()> {
        self.enter_push(&bill.id).await?;
        self.insert_bill(bill.clone());
        Ok(())
    }

    async fn fetch_settings(&self) -> RemoteResult<Option<RemoteSettings>> {
        self.enter_fetch().await?;
        Ok(self.settings())
    }

    async fn push_settings(&self, settings: &RemoteSettings) -> RemoteResult<()> {
        self.enter_push("settings").await?;
        self.set_settings(settings.clone());
        Ok(())
    }

    async fn fetch_attachment(&self, bill_id: &str) -> RemoteResult<Option<Vec<u8>>> {
        self.enter_attachment(bill_id).await?;
        Ok(self.attachment(bill_id))
    }

    async fn push_attachment(
        &self,
        bill_id: &str,
        bytes: &[u8],
        progress: Option<UploadProgress>,
    ) -> RemoteResult<()> {
        self.enter_attachment(bill_id).await?;
        if self.rejected_uploads.lock().unwrap().contains(bill_id) {
            return Err(RemoteError::Api {
                status: 413,
                message: "document too large".to_string(),
            });
        }
        self.set_attachment(bill_id, bytes.to_vec());
        if let Some(progress) = progress {
            progress(100);
        }
        Ok(())
    }
}
