//! Data models for Tally

mod attachment;
mod bill;
mod category;
mod item;
mod settings;

pub use attachment::{Attachment, DEFAULT_ATTACHMENT_CONTENT_TYPE};
pub use bill::{Bill, BillItem, DescriptionMode};
pub use category::Category;
pub use item::Item;
pub use settings::{BackupFrequency, Settings, DEFAULT_CURRENCY, SETTINGS_KEY};

use crate::util::now_millis;

/// A record that takes part in last-write-wins reconciliation.
///
/// Every synchronized kind has a stable string key and a logical update time
/// (unix ms) that the writer stamps on each mutation.
pub trait Syncable {
    /// Stable identifier, unique within the entity kind.
    fn key(&self) -> &str;

    /// Logical update time used as the sole merge tie-breaker.
    fn updated_at(&self) -> i64;

    fn set_updated_at(&mut self, updated_at: i64);

    /// Stamp a fresh logical update time. Call on every local mutation,
    /// soft-delete included.
    fn touch(&mut self) {
        let next = next_update_time(self.updated_at());
        self.set_updated_at(next);
    }
}

/// Generate a new entity identifier (UUID v7, time-sortable).
#[must_use]
pub fn new_entity_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Next logical update time after `previous`.
///
/// Wall-clock derived, but never moves backwards or repeats for the same
/// record even if the clock does.
#[must_use]
pub fn next_update_time(previous: i64) -> i64 {
    now_millis().max(previous.saturating_add(1))
}
