use tally_core::sync::SyncSnapshot;
use tally_core::SyncReport;

use crate::commands::common::Session;
use crate::error::CliError;

pub async fn run_sync(session: &Session, as_json: bool) -> Result<(), CliError> {
    let report = sync_with_progress(session, !as_json).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Sync completed: {} pushed ({} failed), {} categories, {} items, {} bills",
        report.pushed,
        report.push_failures,
        report.merged_categories,
        report.merged_items,
        report.merged_bills
    );
    if report.attachments_uploaded + report.attachments_downloaded + report.attachment_failures > 0
    {
        println!(
            "Documents: {} uploaded, {} downloaded, {} failed",
            report.attachments_uploaded, report.attachments_downloaded, report.attachment_failures
        );
    }
    Ok(())
}

/// Run a sync, echoing stage progress to stderr while it runs.
async fn sync_with_progress(session: &Session, show_progress: bool) -> Result<SyncReport, CliError> {
    let controller = &session.controller;
    let mut updates = controller.subscribe();
    let mut last_percent = None;

    let sync = controller.sync_now();
    tokio::pin!(sync);

    let outcome = loop {
        tokio::select! {
            outcome = &mut sync => break outcome,
            changed = updates.changed() => {
                if changed.is_ok() && show_progress {
                    print_progress(&updates.borrow_and_update(), &mut last_percent);
                }
            }
        }
    };

    if show_progress {
        print_progress(&controller.snapshot(), &mut last_percent);
    }
    Ok(outcome?)
}

fn print_progress(snapshot: &SyncSnapshot, last_percent: &mut Option<u8>) {
    let Some(progress) = snapshot.progress.as_ref() else {
        return;
    };
    if *last_percent == Some(progress.percent) {
        return;
    }
    *last_percent = Some(progress.percent);
    eprintln!("[{:>3}%] {}", progress.percent, progress.message);
}
