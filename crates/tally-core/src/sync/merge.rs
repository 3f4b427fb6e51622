//! Last-write-wins reconciliation.

use std::collections::HashMap;

use crate::models::{Settings, Syncable};

/// Merge two collections of one entity kind by key.
///
/// A remote record replaces the local one only when its update time is
/// strictly greater; ties keep the local record. Records present on one side
/// only are kept. Output order is unspecified.
pub fn merge<E: Syncable>(local: Vec<E>, remote: Vec<E>) -> Vec<E> {
    let mut merged: HashMap<String, E> = local
        .into_iter()
        .map(|record| (record.key().to_string(), record))
        .collect();

    for record in remote {
        let newer = merged
            .get(record.key())
            .is_none_or(|existing| record.updated_at() > existing.updated_at());
        if newer {
            merged.insert(record.key().to_string(), record);
        }
    }

    merged.into_values().collect()
}

/// Singleton variant of [`merge`] for settings.
#[must_use]
pub fn merge_settings(local: Option<Settings>, remote: Option<Settings>) -> Option<Settings> {
    match (local, remote) {
        (None, remote) => remote,
        (local, None) => local,
        (Some(local), Some(remote)) => {
            if remote.updated_at > local.updated_at {
                Some(remote)
            } else {
                Some(local)
            }
        }
    }
}
