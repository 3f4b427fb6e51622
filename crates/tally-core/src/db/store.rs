//! Local store contract used by reconciliation

use crate::error::Result;
use crate::models::{Attachment, Bill, BillItem, Category, Item, Settings};

/// Durable local persistence for every synchronized entity kind.
///
/// `all_*` reads must return soft-deleted records too. `upsert_*` writes
/// insert or replace by key and must never remove records that are absent
/// from the input.
#[allow(async_fn_in_trait)]
pub trait LocalStore {
    async fn all_categories(&self) -> Result<Vec<Category>>;

    async fn upsert_categories(&self, categories: &[Category]) -> Result<()>;

    async fn all_items(&self) -> Result<Vec<Item>>;

    async fn upsert_items(&self, items: &[Item]) -> Result<()>;

    async fn all_bills(&self) -> Result<Vec<Bill>>;

    async fn upsert_bills(&self, bills: &[Bill]) -> Result<()>;

    async fn all_bill_items(&self) -> Result<Vec<BillItem>>;

    async fn upsert_bill_items(&self, bill_items: &[BillItem]) -> Result<()>;

    /// Load the settings singleton, `None` when never saved
    async fn load_settings(&self) -> Result<Option<Settings>>;

    async fn save_settings(&self, settings: &Settings) -> Result<()>;

    async fn all_attachments(&self) -> Result<Vec<Attachment>>;

    async fn get_attachment(&self, bill_id: &str) -> Result<Option<Attachment>>;

    /// Store an attachment, overwriting any previous payload for the bill
    async fn put_attachment(&self, attachment: &Attachment) -> Result<()>;
}
