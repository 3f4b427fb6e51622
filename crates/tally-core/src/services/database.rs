//! Shared database service wrapper used across clients.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::db::{Database, LibSqlBillingRepository, LocalStore};
use crate::models::{Attachment, Bill, BillItem, Category, Item, Settings};
use crate::Result;

/// Thread-safe service for DB and repository operations.
#[derive(Clone)]
pub struct DatabaseService {
    db: Arc<Mutex<Database>>,
    db_path: Option<PathBuf>,
}

impl DatabaseService {
    /// Open a database service at the given filesystem path.
    ///
    /// A file that is not a database is moved aside and a fresh one created.
    pub async fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = match Database::open(&db_path).await {
            Ok(db) => db,
            Err(error) if Self::is_corrupted_db_error(&error) => {
                tracing::warn!(
                    "Local database at {} is unreadable: {}. Moving it aside and starting fresh.",
                    db_path.display(),
                    error
                );
                Self::quarantine_corrupted_db_files(&db_path)?;
                Database::open(&db_path).await?
            }
            Err(error) => return Err(error),
        };

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: Some(db_path),
        })
    }

    /// Open an in-memory database service (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: None,
        })
    }

    /// Filesystem location of the database, `None` when in memory.
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn is_corrupted_db_error(error: &crate::Error) -> bool {
        error
            .to_string()
            .to_ascii_lowercase()
            .contains("file is not a database")
    }

    fn quarantine_corrupted_db_files(db_path: &Path) -> Result<()> {
        let Some(base_name) = db_path.file_name().and_then(|name| name.to_str()) else {
            return Ok(());
        };

        if db_path.exists() {
            let timestamp = chrono::Utc::now().timestamp_millis();
            let backup_path = db_path.with_file_name(format!("{base_name}.corrupt-{timestamp}"));

            std::fs::rename(db_path, &backup_path)?;
            tracing::warn!(
                "Moved corrupted local DB file from {} to {}",
                db_path.display(),
                backup_path.display()
            );
        }

        let Some(parent) = db_path.parent() else {
            return Ok(());
        };
        let sidecar_prefix = format!("{base_name}-");

        for entry in std::fs::read_dir(parent)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if file_name.starts_with(&sidecar_prefix) {
                let path = entry.path();
                std::fs::remove_file(&path)?;
                tracing::warn!("Removed stale database sidecar file {}", path.display());
            }
        }

        Ok(())
    }

    /// List non-deleted categories by name.
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let db = self.db.lock().await;
        LibSqlBillingRepository::new(db.connection())
            .list_categories()
            .await
    }

    /// List non-deleted items by name.
    pub async fn list_items(&self) -> Result<Vec<Item>> {
        let db = self.db.lock().await;
        LibSqlBillingRepository::new(db.connection())
            .list_items()
            .await
    }

    /// List non-deleted bills newest-first.
    pub async fn list_bills(&self) -> Result<Vec<Bill>> {
        let db = self.db.lock().await;
        LibSqlBillingRepository::new(db.connection())
            .list_bills()
            .await
    }

    /// List the non-deleted lines of a bill.
    pub async fn list_bill_items(&self, bill_id: &str) -> Result<Vec<BillItem>> {
        let db = self.db.lock().await;
        LibSqlBillingRepository::new(db.connection())
            .list_bill_items(bill_id)
            .await
    }

    /// Number of stored bill documents, without loading their payloads.
    pub async fn count_attachments(&self) -> Result<usize> {
        let db = self.db.lock().await;
        LibSqlBillingRepository::new(db.connection())
            .count_attachments()
            .await
    }

    /// Load settings, falling back to defaults when never saved.
    pub async fn settings_or_default(&self) -> Result<Settings> {
        Ok(self.load_settings().await?.unwrap_or_default())
    }
}

impl LocalStore for DatabaseService {
    async fn all_categories(&self) -> Result<Vec<Category>> {
        let db = self.db.lock().await;
        LibSqlBillingRepository::new(db.connection())
            .all_categories()
            .await
    }

    async fn upsert_categories(&self, categories: &[Category]) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlBillingRepository::new(db.connection())
            .upsert_categories(categories)
            .await
    }

    async fn all_items(&self) -> Result<Vec<Item>> {
        let db = self.db.lock().await;
        LibSqlBillingRepository::new(db.connection())
            .all_items()
            .await
    }

    async fn upsert_items(&self, items: &[Item]) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlBillingRepository::new(db.connection())
            .upsert_items(items)
            .await
    }

    async fn all_bills(&self) -> Result<Vec<Bill>> {
        let db = self.db.lock().await;
        LibSqlBillingRepository::new(db.connection())
            .all_bills()
            .await
    }

    async fn upsert_bills(&self, bills: &[Bill]) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlBillingRepository::new(db.connection())
            .upsert_bills(bills)
            .await
    }

    async fn all_bill_items(&self) -> Result<Vec<BillItem>> {
        let db = self.db.lock().await;
        LibSqlBillingRepository::new(db.connection())
            .all_bill_items()
            .await
    }

    async fn upsert_bill_items(&self, bill_items: &[BillItem]) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlBillingRepository::new(db.connection())
            .upsert_bill_items(bill_items)
            .await
    }

    async fn load_settings(&self) -> Result<Option<Settings>> {
        let db = self.db.lock().await;
        LibSqlBillingRepository::new(db.connection())
            .load_settings()
            .await
    }

    async fn save_settings(&self, settings: &Settings) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlBillingRepository::new(db.connection())
            .save_settings(settings)
            .await
    }

    async fn all_attachments(&self) -> Result<Vec<Attachment>> {
        let db = self.db.lock().await;
        LibSqlBillingRepository::new(db.connection())
            .all_attachments()
            .await
    }

    async fn get_attachment(&self, bill_id: &str) -> Result<Option<Attachment>> {
        let db = self.db.lock().await;
        LibSqlBillingRepository::new(db.connection())
            .get_attachment(bill_id)
            .await
    }

    async fn put_attachment(&self, attachment: &Attachment) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlBillingRepository::new(db.connection())
            .put_attachment(attachment)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test(flavor = "multi_thread")]
    async fn in_memory_upsert_and_list_roundtrip() {
        let service = DatabaseService::open_in_memory().await.unwrap();

        let category = Category::new("Beverages");
        service
            .upsert_categories(std::slice::from_ref(&category))
            .await
            .unwrap();

        assert_eq!(service.list_categories().await.unwrap(), vec![category]);
        assert!(service.db_path().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn settings_or_default_when_never_saved() {
        let service = DatabaseService::open_in_memory().await.unwrap();
        assert_eq!(
            service.settings_or_default().await.unwrap(),
            Settings::default()
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn count_attachments_tracks_stored_documents() {
        let service = DatabaseService::open_in_memory().await.unwrap();
        assert_eq!(service.count_attachments().await.unwrap(), 0);

        service
            .put_attachment(&Attachment::new("b1", b"%PDF".to_vec()).unwrap())
            .await
            .unwrap();
        service
            .put_attachment(&Attachment::new("b2", b"%PDF".to_vec()).unwrap())
            .await
            .unwrap();

        assert_eq!(service.count_attachments().await.unwrap(), 2);
    }

    #[test]
    fn detects_corrupted_db_errors() {
        assert!(DatabaseService::is_corrupted_db_error(
            &crate::Error::Database("SQLite failure: file is not a database".to_string())
        ));
        assert!(!DatabaseService::is_corrupted_db_error(
            &crate::Error::InvalidInput("name cannot be empty".to_string())
        ));
    }

    #[test]
    fn quarantine_moves_db_and_removes_sidecars() {
        let tmp = tempdir().unwrap();
        let db_path = tmp.path().join("tally.db");
        let wal_path = tmp.path().join("tally.db-wal");
        let shm_path = tmp.path().join("tally.db-shm");

        std::fs::write(&db_path, b"bad-db").unwrap();
        std::fs::write(&wal_path, b"wal").unwrap();
        std::fs::write(&shm_path, b"shm").unwrap();

        DatabaseService::quarantine_corrupted_db_files(&db_path).unwrap();

        assert!(!db_path.exists());
        assert!(!wal_path.exists());
        assert!(!shm_path.exists());
    }
}
