//! Catalogue item model

use serde::{Deserialize, Serialize};

use super::{new_entity_id, Syncable};
use crate::util::now_millis;

/// A sellable catalogue item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier
    pub item_id: String,
    /// Display name
    pub name: String,
    /// Parent category id
    pub category_id: String,
    /// Unit price in major currency units
    pub base_price: f64,
    /// GST rate in percent. Not modeled remotely.
    #[serde(default)]
    pub gst_percentage: f64,
    /// Logical update time (Unix ms)
    pub updated_at: i64,
    /// Soft delete flag for sync
    #[serde(default)]
    pub deleted: bool,
}

impl Item {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        category_id: impl Into<String>,
        base_price: f64,
        gst_percentage: f64,
    ) -> Self {
        Self {
            item_id: new_entity_id(),
            name: name.into(),
            category_id: category_id.into(),
            base_price,
            gst_percentage,
            updated_at: now_millis(),
            deleted: false,
        }
    }

    pub fn mark_deleted(&mut self) {
        self.deleted = true;
        self.touch();
    }
}

impl Syncable for Item {
    fn key(&self) -> &str {
        &self.item_id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn set_updated_at(&mut self, updated_at: i64) {
        self.updated_at = updated_at;
    }
}
