//! Sync status controller.
//!
//! Owns the local store and the (optional) authenticated remote channel,
//! serializes sync runs and publishes status snapshots for host UIs.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, Mutex};

use super::orchestrator::{perform_sync, SyncProgress, SyncReport};
use crate::db::LocalStore;
use crate::error::{Error, Result};
use crate::remote::RemoteChannel;
use crate::util::now_millis;

/// How long `Success`/`Error` stay visible before reverting to `Idle`.
pub const DEFAULT_STATUS_RESET_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Success,
    Error,
}

impl SyncStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Syncing => "syncing",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

/// Point-in-time view of the controller published to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSnapshot {
    pub status: SyncStatus,
    pub progress: Option<SyncProgress>,
    pub last_error: Option<String>,
    /// Unix ms of the last successful sync, seeded from persisted settings
    pub last_synced_at: Option<i64>,
    #[serde(skip)]
    run: u64,
}

enum Start<C> {
    Run(Arc<C>, u64),
    Busy,
    Unauthenticated(u64),
}

/// Entry point for manual and automatic syncs.
pub struct SyncController<S, C> {
    store: S,
    channel: Mutex<Option<Arc<C>>>,
    state: Arc<watch::Sender<SyncSnapshot>>,
    invalidations: watch::Sender<u64>,
    reset_delay: Duration,
}

impl<S: LocalStore, C: RemoteChannel> SyncController<S, C> {
    pub fn new(store: S) -> Self {
        let (state, _) = watch::channel(SyncSnapshot::default());
        let (invalidations, _) = watch::channel(0);
        Self {
            store,
            channel: Mutex::new(None),
            state: Arc::new(state),
            invalidations,
            reset_delay: DEFAULT_STATUS_RESET_DELAY,
        }
    }

    #[must_use]
    pub const fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Make an authenticated channel available (sign in).
    pub async fn connect(&self, channel: Arc<C>) {
        *self.channel.lock().await = Some(channel);
        tracing::debug!("Remote channel connected");
        if let Err(error) = self.restore_last_sync().await {
            tracing::warn!("Failed to load last sync time: {error}");
        }
    }

    /// Seed the snapshot's last sync time from persisted settings.
    ///
    /// A time already recorded by a run in this process is kept.
    pub async fn restore_last_sync(&self) -> Result<()> {
        let persisted = self
            .store
            .load_settings()
            .await?
            .and_then(|settings| settings.last_sync_at);
        self.state.send_if_modified(|snapshot| {
            if snapshot.last_synced_at.is_some() || persisted.is_none() {
                return false;
            }
            snapshot.last_synced_at = persisted;
            true
        });
        Ok(())
    }

    /// Drop the authenticated channel (sign out).
    pub async fn disconnect(&self) {
        *self.channel.lock().await = None;
        tracing::debug!("Remote channel disconnected");
    }

    pub async fn is_authenticated(&self) -> bool {
        self.channel.lock().await.is_some()
    }

    pub fn status(&self) -> SyncStatus {
        self.state.borrow().status
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot> {
        self.state.subscribe()
    }

    /// Counter bumped after every successful sync; views refetch on change.
    pub fn subscribe_invalidations(&self) -> watch::Receiver<u64> {
        self.invalidations.subscribe()
    }

    /// Run a sync now.
    ///
    /// Returns [`Error::SyncInProgress`] without touching state when a run is
    /// already in flight, and [`Error::NotAuthenticated`] (status `Error`)
    /// when no channel is connected. The remote is contacted in neither case.
    pub async fn sync_now(&self) -> Result<SyncReport> {
        let channel = self.channel.lock().await.clone();

        let (channel, run) = match self.begin(channel) {
            Start::Run(channel, run) => (channel, run),
            Start::Busy => {
                tracing::debug!("Sync already in progress; ignoring request");
                return Err(Error::SyncInProgress);
            }
            Start::Unauthenticated(run) => {
                tracing::warn!("Sync requested without an authenticated channel");
                self.schedule_reset(run);
                return Err(Error::NotAuthenticated);
            }
        };

        tracing::info!("Starting sync");
        let outcome = perform_sync(&self.store, channel.as_ref(), |progress| {
            self.state.send_modify(|snapshot| snapshot.progress = Some(progress));
        })
        .await;

        match outcome {
            Ok(report) => {
                let synced_at = now_millis();
                if let Err(error) = self.record_last_sync(synced_at).await {
                    tracing::warn!("Failed to record last sync time: {error}");
                }
                self.invalidations.send_modify(|version| *version += 1);
                self.state.send_modify(|snapshot| {
                    snapshot.status = SyncStatus::Success;
                    snapshot.last_synced_at = Some(synced_at);
                });
                self.schedule_reset(run);
                Ok(report)
            }
            Err(error) => {
                tracing::error!("Sync failed: {error}");
                let message = error.to_string();
                self.state.send_modify(|snapshot| {
                    snapshot.status = SyncStatus::Error;
                    snapshot.progress = None;
                    snapshot.last_error = Some(message);
                });
                self.schedule_reset(run);
                Err(error)
            }
        }
    }

    /// Atomically claim the `Syncing` state.
    fn begin(&self, channel: Option<Arc<C>>) -> Start<C> {
        let mut start = Start::Busy;
        self.state.send_if_modified(|snapshot| {
            if snapshot.status == SyncStatus::Syncing {
                return false;
            }
            snapshot.run += 1;
            snapshot.progress = None;
            match channel {
                Some(channel) => {
                    snapshot.status = SyncStatus::Syncing;
                    snapshot.last_error = None;
                    snapshot.progress = Some(SyncProgress::new(0, "Starting sync..."));
                    start = Start::Run(channel, snapshot.run);
                }
                None => {
                    snapshot.status = SyncStatus::Error;
                    snapshot.last_error = Some(Error::NotAuthenticated.to_string());
                    start = Start::Unauthenticated(snapshot.run);
                }
            }
            true
        });
        start
    }

    /// Store the sync time without bumping the settings update time, so the
    /// bookkeeping write never wins a merge on its own.
    async fn record_last_sync(&self, synced_at: i64) -> Result<()> {
        let mut settings = self.store.load_settings().await?.unwrap_or_default();
        settings.last_sync_at = Some(synced_at);
        self.store.save_settings(&settings).await
    }

    fn schedule_reset(&self, run: u64) {
        let state = Arc::clone(&self.state);
        let delay = self.reset_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            state.send_if_modified(|snapshot| {
                if snapshot.run != run || !snapshot.status.is_terminal() {
                    return false;
                }
                snapshot.status = SyncStatus::Idle;
                snapshot.progress = None;
                true
            });
        });
    }
}
