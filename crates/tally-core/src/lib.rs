//! tally-core - Core library for Tally
//!
//! This crate contains the models, the local libSQL store, the remote
//! channel and the offline/online reconciliation engine shared by every
//! Tally client.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod remote;
pub mod services;
pub mod sync;
pub mod util;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};
pub use services::DatabaseService;
pub use sync::{AutoSync, SyncController, SyncReport, SyncStatus};
