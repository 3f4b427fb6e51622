//! Bill and bill line-item models

use serde::{Deserialize, Serialize};

use super::{new_entity_id, Syncable};
use crate::util::now_millis;

/// A saved bill (invoice).
///
/// Only `date`, `total_amount` and the sync bookkeeping fields travel to the
/// remote store; customer details stay on the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    /// Unique identifier
    pub bill_id: String,
    /// Human-facing invoice number (e.g. `INV-2026-0001`)
    #[serde(default)]
    pub bill_number: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    /// Bill date as entered (ISO date string)
    pub date: String,
    /// Computed total in major currency units
    pub total_amount: f64,
    /// Logical update time (Unix ms)
    pub updated_at: i64,
    /// Soft delete flag for sync
    #[serde(default)]
    pub deleted: bool,
}

impl Bill {
    #[must_use]
    pub fn new(date: impl Into<String>, total_amount: f64) -> Self {
        Self {
            bill_id: new_entity_id(),
            bill_number: String::new(),
            customer_name: String::new(),
            phone: String::new(),
            address: String::new(),
            date: date.into(),
            total_amount,
            updated_at: now_millis(),
            deleted: false,
        }
    }

    pub fn mark_deleted(&mut self) {
        self.deleted = true;
        self.touch();
    }
}

impl Syncable for Bill {
    fn key(&self) -> &str {
        &self.bill_id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn set_updated_at(&mut self, updated_at: i64) {
        self.updated_at = updated_at;
    }
}

/// How a bill line's description was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DescriptionMode {
    /// Picked from the item catalogue
    Catalogue,
    /// Typed by hand
    #[default]
    Manual,
}

impl DescriptionMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Catalogue => "catalogue",
            Self::Manual => "manual",
        }
    }

    /// Parse a stored value, falling back to `Manual` for unknown input
    #[must_use]
    pub fn parse_lossy(value: &str) -> Self {
        match value.trim() {
            "catalogue" => Self::Catalogue,
            _ => Self::Manual,
        }
    }
}

/// A line on a bill. Local only: the remote schema has no item-level detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillItem {
    /// Line identifier, unique within the parent bill
    pub item_id: String,
    /// Parent bill id
    pub bill_id: String,
    pub description: String,
    pub base_price: f64,
    pub quantity: f64,
    /// Discount in percent
    pub discount: f64,
    /// GST in percent
    pub gst: f64,
    /// Line total after discount and GST, in major units
    pub total_price: f64,
    #[serde(default)]
    pub description_mode: DescriptionMode,
    #[serde(default)]
    pub catalogue_item_id: Option<String>,
    /// Logical update time (Unix ms)
    pub updated_at: i64,
    /// Soft delete flag for sync
    #[serde(default)]
    pub deleted: bool,
}

impl BillItem {
    pub fn mark_deleted(&mut self) {
        self.deleted = true;
        self.touch();
    }
}

impl Syncable for BillItem {
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
