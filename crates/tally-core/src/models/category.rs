//! Category model

use serde::{Deserialize, Serialize};

use super::{new_entity_id, Syncable};
use crate::util::now_millis;

/// A catalogue category grouping items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique identifier
    pub category_id: String,
    /// Display name
    pub name: String,
    /// Logical update time (Unix ms)
    pub updated_at: i64,
    /// Soft delete flag for sync
    #[serde(default)]
    pub deleted: bool,
}

impl Category {
    /// Create a new category with a fresh id and update time
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            category_id: new_entity_id(),
            name: name.into(),
            updated_at: now_millis(),
            deleted: false,
        }
    }

    /// Soft delete, stamping a new update time so the deletion propagates
    pub fn mark_deleted(&mut self) {
        self.deleted = true;
        self.touch();
    }
}

impl Syncable for Category {
    fn key(&self) -> &str {
        &self.category_id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn set_updated_at(&mut self, updated_at: i64) {
        self.updated_at = updated_at;
    }
}
