//! Remote wire records.
//!
//! Money is integer minor units (cents/paise) and update times are unix ms;
//! both go through [`wide_int`](super::wide_int).

use serde::{Deserialize, Serialize};

use super::codec::wide_int;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCategory {
    pub id: String,
    pub name: String,
    /// Unused by clients; always sent empty.
    #[serde(default)]
    pub icon: String,
    #[serde(with = "wide_int")]
    pub updated_at: i64,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteItem {
    pub id: String,
    pub name: String,
    pub category_id: String,
    /// Price in minor units
    #[serde(with = "wide_int")]
    pub price: i64,
    #[serde(with = "wide_int")]
    pub updated_at: i64,
    #[serde(default)]
    pub deleted: bool,
}

/// Line item as the remote schema models it. Clients never populate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBillItem {
    pub item_id: String,
    #[serde(with = "wide_int")]
    pub quantity: i64,
    #[serde(with = "wide_int")]
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBill {
    pub id: String,
    pub date: String,
    /// Total in minor units
    #[serde(with = "wide_int")]
    pub total: i64,
    #[serde(default)]
    pub items: Vec<RemoteBillItem>,
    #[serde(with = "wide_int")]
    pub updated_at: i64,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSettings {
    pub currency: String,
    #[serde(with = "wide_int")]
    pub updated_at: i64,
}
