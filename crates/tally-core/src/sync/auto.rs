//! One-shot automatic sync per sign-in session.

use super::controller::{SyncController, SyncStatus};
use super::orchestrator::SyncReport;
use crate::db::LocalStore;
use crate::remote::RemoteChannel;
use crate::Result;

/// Fires at most one automatic sync per authentication session.
///
/// Armed while signed in; losing the channel re-arms it so the next sign-in
/// gets exactly one more attempt.
#[derive(Debug, Default)]
pub struct AutoSync {
    fired: bool,
}

impl AutoSync {
    pub const fn new() -> Self {
        Self { fired: false }
    }

    pub const fn has_fired(&self) -> bool {
        self.fired
    }

    /// Decide whether to fire now, consuming the session's single attempt.
    pub fn should_fire(
        &mut self,
        enabled: bool,
        authenticated: bool,
        status: SyncStatus,
    ) -> bool {
        if !authenticated {
            self.fired = false;
            return false;
        }
        if self.fired || !enabled || !matches!(status, SyncStatus::Idle) {
            return false;
        }
        self.fired = true;
        true
    }

    /// Check the trigger conditions and run a sync when they hold.
    ///
    /// Returns `None` when no sync was started.
    pub async fn poll<S: LocalStore, C: RemoteChannel>(
        &mut self,
        controller: &SyncController<S, C>,
    ) -> Option<Result<SyncReport>> {
        let enabled = match controller.store().load_settings().await {
            Ok(settings) => settings.is_some_and(|settings| settings.auto_sync_enabled),
            Err(error) => {
                tracing::warn!("Could not read auto-sync preference: {error}");
                false
            }
        };
        let authenticated = controller.is_authenticated().await;

        if !self.should_fire(enabled, authenticated, controller.status()) {
            return None;
        }

        tracing::info!("Auto-sync triggered");
        Some(controller.sync_now().await)
    }
}
