use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tally_core::config::RemoteConfig;
use tally_core::remote::HttpRemoteChannel;
use tally_core::services::DatabaseService;
use tally_core::{AutoSync, SyncController};

use crate::error::CliError;

pub type Controller = SyncController<DatabaseService, HttpRemoteChannel>;

/// Everything a command needs: the local store behind a sync controller.
pub struct Session {
    pub controller: Controller,
    pub db_path: PathBuf,
    pub remote_config: Option<RemoteConfig>,
}

impl Session {
    pub const fn db(&self) -> &DatabaseService {
        self.controller.store()
    }

    pub const fn is_signed_in(&self) -> bool {
        self.remote_config.is_some()
    }
}

/// Open the database, connect the remote channel when configured and, if
/// requested, run the session's automatic sync.
pub async fn open_session(
    db_path: &Path,
    remote_config: Option<RemoteConfig>,
    auto_sync: bool,
) -> Result<Session, CliError> {
    let db = DatabaseService::open_path(db_path.to_path_buf()).await?;
    let controller = SyncController::new(db);

    if let Some(config) = remote_config.as_ref() {
        let channel = HttpRemoteChannel::new(config).map_err(tally_core::Error::from)?;
        tracing::debug!("Using remote API at {}", channel.base_url());
        controller.connect(Arc::new(channel)).await;
    } else {
        controller.restore_last_sync().await?;
    }

    if auto_sync {
        match AutoSync::new().poll(&controller).await {
            Some(Ok(report)) => eprintln!(
                "Auto-sync complete ({} pushed, {} bills merged)",
                report.pushed, report.merged_bills
            ),
            Some(Err(error)) => tracing::warn!("Auto-sync failed: {error}"),
            None => {}
        }
    }

    Ok(Session {
        controller,
        db_path: db_path.to_path_buf(),
        remote_config,
    })
}

pub fn load_remote_config() -> Result<Option<RemoteConfig>, CliError> {
    Ok(RemoteConfig::from_env()?)
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    resolve_db_path_with(
        cli_db_path,
        env::var_os("TALLY_DB_PATH").map(PathBuf::from),
        dirs::data_dir(),
    )
}

pub fn resolve_db_path_with(
    cli_db_path: Option<PathBuf>,
    env_db_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> Result<PathBuf, CliError> {
    if let Some(path) = cli_db_path.or(env_db_path) {
        return Ok(path);
    }
    data_dir
        .map(|dir| dir.join("tally").join("tally.db"))
        .ok_or(CliError::DataDirUnavailable)
}

pub fn format_sync_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}
