//! Local <-> remote record conversion.
//!
//! Conversions are pure and total. Fields the remote store does not model are
//! filled with neutral defaults by `from_remote` and restored from the local
//! copy with [`RemoteAdapter::with_local_fields`] before merging.

use crate::models::{Bill, Category, Item, Settings};
use crate::remote::{RemoteBill, RemoteCategory, RemoteItem, RemoteSettings};

/// Bidirectional mapping between a local record and its wire shape.
pub trait RemoteAdapter: Sized {
    type Remote;

    fn to_remote(&self) -> Self::Remote;

    fn from_remote(remote: Self::Remote) -> Self;

    /// Copy local-only fields from `local` onto this remote-derived record.
    #[must_use]
    fn with_local_fields(self, local: &Self) -> Self;
}

/// Convert a major-unit amount to integer minor units (half away from zero).
///
/// Fractions below one minor unit are lost: `19.999` becomes `2000`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn from_minor_units(minor: i64) -> f64 {
    minor as f64 / 100.0
}

impl RemoteAdapter for Category {
    type Remote = RemoteCategory;

    fn to_remote(&self) -> RemoteCategory {
        RemoteCategory {
            id: self.category_id.clone(),
            name: self.name.clone(),
            icon: String::new(),
            updated_at: self.updated_at,
            deleted: self.deleted,
        }
    }

    fn from_remote(remote: RemoteCategory) -> Self {
        Self {
            category_id: remote.id,
            name: remote.name,
            updated_at: remote.updated_at,
            deleted: remote.deleted,
        }
    }

    fn with_local_fields(self, _local: &Self) -> Self {
        self
    }
}

impl RemoteAdapter for Item {
    type Remote = RemoteItem;

    fn to_remote(&self) -> RemoteItem {
        RemoteItem {
            id: self.item_id.clone(),
            name: self.name.clone(),
            category_id: self.category_id.clone(),
            price: to_minor_units(self.base_price),
            updated_at: self.updated_at,
            deleted: self.deleted,
        }
    }

    fn from_remote(remote: RemoteItem) -> Self {
        Self {
            item_id: remote.id,
            name: remote.name,
            category_id: remote.category_id,
            base_price: from_minor_units(remote.price),
            gst_percentage: 0.0,
            updated_at: remote.updated_at,
            deleted: remote.deleted,
        }
    }

    fn with_local_fields(self, local: &Self) -> Self {
        Self {
            gst_percentage: local.gst_percentage,
            ..self
        }
    }
}

impl RemoteAdapter for Bill {
    type Remote = RemoteBill;

    fn to_remote(&self) -> RemoteBill {
        RemoteBill {
            id: self.bill_id.clone(),
            date: self.date.clone(),
            total: to_minor_units(self.total_amount),
            items: Vec::new(),
            updated_at: self.updated_at,
            deleted: self.deleted,
        }
    }

    fn from_remote(remote: RemoteBill) -> Self {
        Self {
            bill_id: remote.id,
            bill_number: String::new(),
            customer_name: String::new(),
            phone: String::new(),
            address: String::new(),
            date: remote.date,
            total_amount: from_minor_units(remote.total),
            updated_at: remote.updated_at,
            deleted: remote.deleted,
        }
    }

    fn with_local_fields(self, local: &Self) -> Self {
        Self {
            bill_number: local.bill_number.clone(),
            customer_name: local.customer_name.clone(),
            phone: local.phone.clone(),
            address: local.address.clone(),
            ..self
        }
    }
}

impl RemoteAdapter for Settings {
    type Remote = RemoteSettings;

    fn to_remote(&self) -> RemoteSettings {
        RemoteSettings {
            currency: self.currency.clone(),
            updated_at: self.updated_at,
        }
    }

    fn from_remote(remote: RemoteSettings) -> Self {
        Self {
            currency: remote.currency,
            updated_at: remote.updated_at,
            ..Self::default()
        }
    }

    fn with_local_fields(self, local: &Self) -> Self {
        Self {
            currency: self.currency,
            updated_at: self.updated_at,
            ..local.clone()
        }
    }
}
