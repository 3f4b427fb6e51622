use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use tally_core::models::{Bill, BillItem, Category, Item, Settings};
use tally_core::services::DatabaseService;

use crate::error::CliError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedBill {
    #[serde(flatten)]
    pub bill: Bill,
    pub lines: Vec<BillItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub exported_at: String,
    pub settings: Settings,
    pub categories: Vec<Category>,
    pub items: Vec<Item>,
    pub bills: Vec<ExportedBill>,
}

/// Snapshot every non-deleted record in the local store.
pub async fn build_export(db: &DatabaseService) -> Result<ExportDocument, CliError> {
    let mut bills = Vec::new();
    for bill in db.list_bills().await? {
        let lines = db.list_bill_items(&bill.bill_id).await?;
        bills.push(ExportedBill { bill, lines });
    }

    Ok(ExportDocument {
        exported_at: Utc::now().to_rfc3339(),
        settings: db.settings_or_default().await?,
        categories: db.list_categories().await?,
        items: db.list_items().await?,
        bills,
    })
}

pub async fn run_export(db: &DatabaseService, output_path: Option<&Path>) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(&build_export(db).await?)?;

    if let Some(path) = output_path {
        std::fs::write(path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}
