//! Application settings model

use serde::{Deserialize, Serialize};

use super::Syncable;

/// Storage key of the singleton settings record.
pub const SETTINGS_KEY: &str = "main";

/// Currency reported to the remote store when none is configured.
pub const DEFAULT_CURRENCY: &str = "INR";

/// How often the user wants local backups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackupFrequency {
    #[default]
    Manual,
    Daily,
    Weekly,
    Monthly,
}

/// Application settings.
///
/// Only `currency` and `updated_at` are modeled remotely. Everything else is
/// device branding and preferences that a merge must never overwrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub company_name: String,
    pub company_address: String,
    pub company_phone: String,
    /// Logo image as a data URL
    pub company_logo: Option<String>,
    /// Payment QR image as a data URL
    pub payment_qr: Option<String>,
    /// Default GST percentage applied to new bill lines
    pub default_gst: f64,
    pub backup_frequency: BackupFrequency,
    /// ISO currency code
    pub currency: String,
    /// Sync automatically once per sign-in
    pub auto_sync_enabled: bool,
    /// Unix ms of the most recent successful sync
    pub last_sync_at: Option<i64>,
    /// Logical update time (Unix ms)
    pub updated_at: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            company_name: String::new(),
            company_address: String::new(),
            company_phone: String::new(),
            company_logo: None,
            payment_qr: None,
            default_gst: 0.0,
            backup_frequency: BackupFrequency::Manual,
            currency: DEFAULT_CURRENCY.to_string(),
            auto_sync_enabled: false,
            last_sync_at: None,
            updated_at: 0,
        }
    }
}

impl Syncable for Settings {
    fn key(&self) -> &str {
        SETTINGS_KEY
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn set_updated_at(&mut self, updated_at: i64) {
        self.updated_at = updated_at;
    }
}
