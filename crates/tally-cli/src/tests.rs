use std::path::PathBuf;

use clap::Parser;
use pretty_assertions::assert_eq;
use tally_core::db::LocalStore;
use tally_core::models::{Bill, BillItem, Category, DescriptionMode};
use tally_core::SyncStatus;
use tempfile::tempdir;

use crate::cli::{Cli, Commands, CompletionShell, ConfigCommands, Toggle};
use crate::commands::common::{
    format_relative_time, format_sync_timestamp, open_session, resolve_db_path_with,
};
use crate::commands::completions::run_completions;
use crate::commands::config::set_auto_sync;
use crate::commands::export::build_export;
use crate::commands::status::collect_status;
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[test]
fn resolve_db_path_prefers_flag_then_env_then_data_dir() {
    let flag = Some(PathBuf::from("/tmp/flag.db"));
    let env = Some(PathBuf::from("/tmp/env.db"));
    let data = Some(PathBuf::from("/data"));

    assert_eq!(
        resolve_db_path_with(flag, env.clone(), data.clone()).unwrap(),
        PathBuf::from("/tmp/flag.db")
    );
    assert_eq!(
        resolve_db_path_with(None, env, data.clone()).unwrap(),
        PathBuf::from("/tmp/env.db")
    );
    assert_eq!(
        resolve_db_path_with(None, None, data).unwrap(),
        PathBuf::from("/data/tally/tally.db")
    );
    assert!(matches!(
        resolve_db_path_with(None, None, None),
        Err(CliError::DataDirUnavailable)
    ));
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
}

#[test]
fn format_sync_timestamp_renders_utc() {
    assert_eq!(
        format_sync_timestamp(1_767_225_600_000),
        "2026-01-01 00:00:00 UTC"
    );
}

#[test]
fn parses_config_auto_sync_toggle() {
    let cli = Cli::try_parse_from(["tally", "config", "auto-sync", "on"]).unwrap();
    match cli.command {
        Commands::Config {
            command: ConfigCommands::AutoSync { state },
        } => assert_eq!(state, Toggle::On),
        _ => panic!("expected config command"),
    }
}

#[test]
fn parses_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["tally", "sync", "--json", "--db-path", "/tmp/x.db"]).unwrap();
    assert!(matches!(cli.command, Commands::Sync { json: true }));
    assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/x.db")));
    assert!(!cli.no_auto_sync);
}

#[test]
fn completions_are_written_to_file() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("tally.bash");

    run_completions(CompletionShell::Bash, Some(&path)).unwrap();

    let script = std::fs::read_to_string(path).unwrap();
    assert!(script.contains("tally"));
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_without_credentials_is_rejected() {
    let tmp = tempdir().unwrap();
    let session = open_session(&tmp.path().join("tally.db"), None, true)
        .await
        .unwrap();

    let error = run_sync(&session, true).await.unwrap_err();

    assert!(matches!(
        error,
        CliError::Core(tally_core::Error::NotAuthenticated)
    ));
    assert_eq!(session.controller.status(), SyncStatus::Error);
}

#[tokio::test(flavor = "multi_thread")]
async fn set_auto_sync_stamps_update_time_on_change() {
    let tmp = tempdir().unwrap();
    let session = open_session(&tmp.path().join("tally.db"), None, false)
        .await
        .unwrap();

    let enabled = set_auto_sync(session.db(), true).await.unwrap();
    assert!(enabled.auto_sync_enabled);
    assert!(enabled.updated_at > 0);

    let unchanged = set_auto_sync(session.db(), true).await.unwrap();
    assert_eq!(unchanged.updated_at, enabled.updated_at);

    let status = collect_status(&session).await.unwrap();
    assert!(status.auto_sync_enabled);
    assert!(!status.signed_in);
    assert_eq!(status.last_sync_at, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn export_skips_deleted_records_and_nests_lines() {
    let tmp = tempdir().unwrap();
    let session = open_session(&tmp.path().join("tally.db"), None, false)
        .await
        .unwrap();
    let db = session.db();

    let mut removed = Category::new("Discontinued");
    removed.mark_deleted();
    db.upsert_categories(&[Category::new("Beverages"), removed])
        .await
        .unwrap();

    let bill = Bill::new("2026-01-15", 47.2);
    db.upsert_bills(std::slice::from_ref(&bill)).await.unwrap();
    db.upsert_bill_items(&[BillItem {
        item_id: "l1".to_string(),
        bill_id: bill.bill_id.clone(),
        description: "Masala Chai".to_string(),
        base_price: 20.0,
        quantity: 2.0,
        discount: 0.0,
        gst: 18.0,
        total_price: 47.2,
        description_mode: DescriptionMode::Manual,
        catalogue_item_id: None,
        updated_at: bill.updated_at,
        deleted: false,
    }])
    .await
    .unwrap();

    let export = build_export(db).await.unwrap();

    assert_eq!(export.categories.len(), 1);
    assert_eq!(export.categories[0].name, "Beverages");
    assert_eq!(export.bills.len(), 1);
    assert_eq!(export.bills[0].lines.len(), 1);

    let json = serde_json::to_value(&export).unwrap();
    assert_eq!(json["bills"][0]["billId"], bill.bill_id.as_str());
    assert_eq!(json["bills"][0]["lines"][0]["description"], "Masala Chai");
}
