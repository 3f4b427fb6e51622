use chrono::Utc;
use serde::Serialize;

use crate::commands::common::{format_relative_time, format_sync_timestamp, Session};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub db_path: String,
    pub signed_in: bool,
    pub api_url: Option<String>,
    pub sync_status: String,
    pub auto_sync_enabled: bool,
    pub currency: String,
    pub last_sync_at: Option<i64>,
    pub last_sync_at_iso: Option<String>,
    pub categories: usize,
    pub items: usize,
    pub bills: usize,
    pub documents: usize,
}

pub async fn collect_status(session: &Session) -> Result<StatusReport, CliError> {
    let db = session.db();
    let settings = db.settings_or_default().await?;

    Ok(StatusReport {
        db_path: session.db_path.display().to_string(),
        signed_in: session.is_signed_in(),
        api_url: session
            .remote_config
            .as_ref()
            .map(|config| config.base_url.clone()),
        sync_status: session.controller.status().as_str().to_string(),
        auto_sync_enabled: settings.auto_sync_enabled,
        currency: settings.currency,
        last_sync_at: settings.last_sync_at,
        last_sync_at_iso: settings.last_sync_at.map(format_sync_timestamp),
        categories: db.list_categories().await?.len(),
        items: db.list_items().await?.len(),
        bills: db.list_bills().await?.len(),
        documents: db.count_attachments().await?,
    })
}

pub async fn run_status(session: &Session, as_json: bool) -> Result<(), CliError> {
    let status = collect_status(session).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("Database:   {}", status.db_path);
    match status.api_url.as_deref() {
        Some(url) => println!("Signed in:  yes ({url})"),
        None => println!("Signed in:  no (set TALLY_API_URL and TALLY_ACCESS_TOKEN)"),
    }
    println!(
        "Auto-sync:  {}",
        if status.auto_sync_enabled { "on" } else { "off" }
    );
    match status.last_sync_at {
        Some(timestamp) => println!(
            "Last sync:  {} ({})",
            format_sync_timestamp(timestamp),
            format_relative_time(timestamp, Utc::now().timestamp_millis())
        ),
        None => println!("Last sync:  never"),
    }
    println!("Currency:   {}", status.currency);
    println!(
        "Records:    {} categories, {} items, {} bills, {} documents",
        status.categories, status.items, status.bills, status.documents
    );
    Ok(())
}
