//! Offline/online reconciliation.
//!
//! [`SyncController`] is the host-facing entry point. It drives
//! [`perform_sync`], which moves records through the [`RemoteAdapter`]
//! conversions and the last-write-wins [`merge`], then transfers bill
//! documents with [`AttachmentTransfer`].

mod adapters;
mod attachments;
mod auto;
mod controller;
mod merge;
mod orchestrator;

pub use adapters::{from_minor_units, to_minor_units, RemoteAdapter};
pub use attachments::AttachmentTransfer;
pub use auto::AutoSync;
pub use controller::{SyncController, SyncSnapshot, SyncStatus, DEFAULT_STATUS_RESET_DELAY};
pub use merge::{merge, merge_settings};
pub use orchestrator::{perform_sync, SyncProgress, SyncReport};
