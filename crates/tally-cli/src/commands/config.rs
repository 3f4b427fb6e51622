use tally_core::db::LocalStore;
use tally_core::models::{Settings, Syncable};
use tally_core::services::DatabaseService;

use crate::cli::ConfigCommands;
use crate::error::CliError;

pub async fn run_config(command: ConfigCommands, db: &DatabaseService) -> Result<(), CliError> {
    match command {
        ConfigCommands::AutoSync { state } => {
            let settings = set_auto_sync(db, state.enabled()).await?;
            println!(
                "Auto-sync {}",
                if settings.auto_sync_enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            Ok(())
        }
    }
}

/// Persist the auto-sync preference, stamping a new update time on change.
pub async fn set_auto_sync(db: &DatabaseService, enabled: bool) -> Result<Settings, CliError> {
    let mut settings = db.settings_or_default().await?;
    if settings.auto_sync_enabled == enabled {
        return Ok(settings);
    }

    settings.auto_sync_enabled = enabled;
    settings.touch();
    db.save_settings(&settings).await?;
    Ok(settings)
}
