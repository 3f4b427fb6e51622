//! Billing repository implementation

use crate::error::{Error, Result};
use crate::models::{
    Attachment, Bill, BillItem, Category, DescriptionMode, Item, Settings, SETTINGS_KEY,
};
use crate::util::now_millis;
use libsql::{Connection, Row, Value};

const CATEGORY_COLUMNS: &str = "category_id, name, updated_at, deleted";
const ITEM_COLUMNS: &str =
    "item_id, name, category_id, base_price, gst_percentage, updated_at, deleted";
const BILL_COLUMNS: &str = "bill_id, bill_number, customer_name, phone, address, date, \
     total_amount, updated_at, deleted";
const BILL_ITEM_COLUMNS: &str = "item_id, bill_id, description, base_price, quantity, discount, \
     gst, total_price, description_mode, catalogue_item_id, updated_at, deleted";

/// libSQL-backed storage for every billing entity kind.
///
/// `all_*` reads include soft-deleted rows (sync needs them so deletions
/// propagate); `list_*` reads are the filtered views hosts display.
pub struct LibSqlBillingRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlBillingRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub async fn all_categories(&self) -> Result<Vec<Category>> {
        self.query_categories(&format!("SELECT {CATEGORY_COLUMNS} FROM categories"))
            .await
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.query_categories(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE deleted = 0 ORDER BY name COLLATE NOCASE"
        ))
        .await
    }

    pub async fn upsert_categories(&self, categories: &[Category]) -> Result<()> {
        let sql = format!(
            "INSERT OR REPLACE INTO categories ({CATEGORY_COLUMNS}) VALUES (?, ?, ?, ?)"
        );
        let statements = categories
            .iter()
            .map(|category| {
                vec![
                    Value::Text(category.category_id.clone()),
                    Value::Text(category.name.clone()),
                    Value::Integer(category.updated_at),
                    Value::Integer(i64::from(category.deleted)),
                ]
            })
            .collect();
        self.write_all(&sql, statements).await
    }

    pub async fn all_items(&self) -> Result<Vec<Item>> {
        self.query_items(&format!("SELECT {ITEM_COLUMNS} FROM items"))
            .await
    }

    pub async fn list_items(&self) -> Result<Vec<Item>> {
        self.query_items(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE deleted = 0 ORDER BY name COLLATE NOCASE"
        ))
        .await
    }

    pub async fn upsert_items(&self, items: &[Item]) -> Result<()> {
        let sql = format!("INSERT OR REPLACE INTO items ({ITEM_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)");
        let statements = items
            .iter()
            .map(|item| {
                vec![
                    Value::Text(item.item_id.clone()),
                    Value::Text(item.name.clone()),
                    Value::Text(item.category_id.clone()),
                    Value::Real(item.base_price),
                    Value::Real(item.gst_percentage),
                    Value::Integer(item.updated_at),
                    Value::Integer(i64::from(item.deleted)),
                ]
            })
            .collect();
        self.write_all(&sql, statements).await
    }

    pub async fn all_bills(&self) -> Result<Vec<Bill>> {
        self.query_bills(&format!("SELECT {BILL_COLUMNS} FROM bills"))
            .await
    }

    /// Non-deleted bills, newest first
    pub async fn list_bills(&self) -> Result<Vec<Bill>> {
        self.query_bills(&format!(
            "SELECT {BILL_COLUMNS} FROM bills WHERE deleted = 0 ORDER BY updated_at DESC"
        ))
        .await
    }

    pub async fn upsert_bills(&self, bills: &[Bill]) -> Result<()> {
        let sql = format!(
            "INSERT OR REPLACE INTO bills ({BILL_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        let statements = bills
            .iter()
            .map(|bill| {
                vec![
                    Value::Text(bill.bill_id.clone()),
                    Value::Text(bill.bill_number.clone()),
                    Value::Text(bill.customer_name.clone()),
                    Value::Text(bill.phone.clone()),
                    Value::Text(bill.address.clone()),
                    Value::Text(bill.date.clone()),
                    Value::Real(bill.total_amount),
                    Value::Integer(bill.updated_at),
                    Value::Integer(i64::from(bill.deleted)),
                ]
            })
            .collect();
        self.write_all(&sql, statements).await
    }

    pub async fn all_bill_items(&self) -> Result<Vec<BillItem>> {
        self.query_bill_items(
            &format!("SELECT {BILL_ITEM_COLUMNS} FROM bill_items"),
            Vec::new(),
        )
        .await
    }

    /// Non-deleted lines of one bill
    pub async fn list_bill_items(&self, bill_id: &str) -> Result<Vec<BillItem>> {
        self.query_bill_items(
            &format!(
                "SELECT {BILL_ITEM_COLUMNS} FROM bill_items WHERE bill_id = ? AND deleted = 0 ORDER BY rowid"
            ),
            vec![Value::Text(bill_id.to_string())],
        )
        .await
    }

    pub async fn upsert_bill_items(&self, bill_items: &[BillItem]) -> Result<()> {
        let sql = format!(
            "INSERT OR REPLACE INTO bill_items ({BILL_ITEM_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        let statements = bill_items
            .iter()
            .map(|line| {
                vec![
                    Value::Text(line.item_id.clone()),
                    Value::Text(line.bill_id.clone()),
                    Value::Text(line.description.clone()),
                    Value::Real(line.base_price),
                    Value::Real(line.quantity),
                    Value::Real(line.discount),
                    Value::Real(line.gst),
                    Value::Real(line.total_price),
                    Value::Text(line.description_mode.as_str().to_string()),
                    line.catalogue_item_id.clone().map_or(Value::Null, Value::Text),
                    Value::Integer(line.updated_at),
                    Value::Integer(i64::from(line.deleted)),
                ]
            })
            .collect();
        self.write_all(&sql, statements).await
    }

    /// Load the settings singleton, `None` when it was never saved
    pub async fn load_settings(&self) -> Result<Option<Settings>> {
        let mut rows = self
            .conn
            .query("SELECT value FROM settings WHERE key = ?", [SETTINGS_KEY])
            .await?;

        match rows.next().await? {
            Some(row) => {
                let value: String = row.get(0)?;
                Ok(Some(serde_json::from_str(&value)?))
            }
            None => Ok(None),
        }
    }

    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        let value = serde_json::to_string(settings)?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)",
                [SETTINGS_KEY, value.as_str()],
            )
            .await?;
        Ok(())
    }

    pub async fn all_attachments(&self) -> Result<Vec<Attachment>> {
        let mut rows = self
            .conn
            .query(
                "SELECT bill_id, content_type, bytes FROM attachments ORDER BY bill_id",
                (),
            )
            .await?;

        let mut attachments = Vec::new();
        while let Some(row) = rows.next().await? {
            attachments.push(Self::parse_attachment(&row)?);
        }
        Ok(attachments)
    }

    pub async fn count_attachments(&self) -> Result<usize> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM attachments", ())
            .await?;

        let count = match rows.next().await? {
            Some(row) => row.get::<i64>(0)?,
            None => 0,
        };
        usize::try_from(count).map_err(|_| Error::Database("Invalid attachment count".to_string()))
    }

    pub async fn get_attachment(&self, bill_id: &str) -> Result<Option<Attachment>> {
        let mut rows = self
            .conn
            .query(
                "SELECT bill_id, content_type, bytes FROM attachments WHERE bill_id = ?",
                [bill_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_attachment(&row)?)),
            None => Ok(None),
        }
    }

    /// Store an attachment, replacing any previous payload for the bill
    pub async fn put_attachment(&self, attachment: &Attachment) -> Result<()> {
        let size_bytes = i64::try_from(attachment.size_bytes())
            .map_err(|_| Error::InvalidInput("Attachment is too large".to_string()))?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO attachments (bill_id, content_type, size_bytes, bytes, stored_at)
                 VALUES (?, ?, ?, ?, ?)",
                vec![
                    Value::Text(attachment.bill_id.clone()),
                    Value::Text(attachment.content_type.clone()),
                    Value::Integer(size_bytes),
                    Value::Blob(attachment.bytes.clone()),
                    Value::Integer(now_millis()),
                ],
            )
            .await?;
        Ok(())
    }

    /// Run one parameterized statement per row inside a single transaction
    async fn write_all(&self, sql: &str, rows: Vec<Vec<Value>>) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        self.conn.execute("BEGIN TRANSACTION", ()).await?;

        for params in rows {
            if let Err(e) = self.conn.execute(sql, params).await {
                self.conn.execute("ROLLBACK", ()).await.ok();
                return Err(e.into());
            }
        }

        if let Err(e) = self.conn.execute("COMMIT", ()).await {
            self.conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }

        Ok(())
    }

    async fn query_categories(&self, sql: &str) -> Result<Vec<Category>> {
        let mut rows = self.conn.query(sql, ()).await?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next().await? {
            categories.push(Category {
                category_id: row.get(0)?,
                name: row.get(1)?,
                updated_at: row.get(2)?,
                deleted: row.get::<i64>(3)? != 0,
            });
        }
        Ok(categories)
    }

    async fn query_items(&self, sql: &str) -> Result<Vec<Item>> {
        let mut rows = self.conn.query(sql, ()).await?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(Item {
                item_id: row.get(0)?,
                name: row.get(1)?,
                category_id: row.get(2)?,
                base_price: row.get(3)?,
                gst_percentage: row.get(4)?,
                updated_at: row.get(5)?,
                deleted: row.get::<i64>(6)? != 0,
            });
        }
        Ok(items)
    }

    async fn query_bills(&self, sql: &str) -> Result<Vec<Bill>> {
        let mut rows = self.conn.query(sql, ()).await?;
        let mut bills = Vec::new();
        while let Some(row) = rows.next().await? {
            bills.push(Bill {
                bill_id: row.get(0)?,
                bill_number: row.get(1)?,
                customer_name: row.get(2)?,
                phone: row.get(3)?,
                address: row.get(4)?,
                date: row.get(5)?,
                total_amount: row.get(6)?,
                updated_at: row.get(7)?,
                deleted: row.get::<i64>(8)? != 0,
            });
        }
        Ok(bills)
    }

    async fn query_bill_items(&self, sql: &str, params: Vec<Value>) -> Result<Vec<BillItem>> {
        let mut rows = self.conn.query(sql, params).await?;
        let mut bill_items = Vec::new();
        while let Some(row) = rows.next().await? {
            let description_mode: String = row.get(8)?;
            bill_items.push(BillItem {
                item_id: row.get(0)?,
                bill_id: row.get(1)?,
                description: row.get(2)?,
                base_price: row.get(3)?,
                quantity: row.get(4)?,
                discount: row.get(5)?,
                gst: row.get(6)?,
                total_price: row.get(7)?,
                description_mode: DescriptionMode::parse_lossy(&description_mode),
                catalogue_item_id: optional_text(&row, 9)?,
                updated_at: row.get(10)?,
                deleted: row.get::<i64>(11)? != 0,
            });
        }
        Ok(bill_items)
    }

    fn parse_attachment(row: &Row) -> Result<Attachment> {
        Ok(Attachment {
            bill_id: row.get(0)?,
            content_type: row.get(1)?,
            bytes: row.get(2)?,
        })
    }
}

fn optional_text(row: &Row, index: i32) -> Result<Option<String>> {
    match row.get_value(index)? {
        Value::Text(value) => Ok(Some(value)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use pretty_assertions::assert_eq;

    async fn setup() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn category(id: &str, updated_at: i64, deleted: bool) -> Category {
        Category {
            category_id: id.to_string(),
            name: format!("Category {id}"),
            updated_at,
            deleted,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_all_categories_includes_soft_deleted() {
        let db = setup().await;
        let repo = LibSqlBillingRepository::new(db.connection());

        repo.upsert_categories(&[category("c1", 10, false), category("c2", 20, true)])
            .await
            .unwrap();

        assert_eq!(repo.all_categories().await.unwrap().len(), 2);
        let visible = repo.list_categories().await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].category_id, "c1");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_upsert_replaces_matching_keys() {
        let db = setup().await;
        let repo = LibSqlBillingRepository::new(db.connection());

        repo.upsert_categories(&[category("c1", 10, false)])
            .await
            .unwrap();
        let mut renamed = category("c1", 30, false);
        renamed.name = "Renamed".to_string();
        repo.upsert_categories(&[renamed.clone()]).await.unwrap();

        assert_eq!(repo.all_categories().await.unwrap(), vec![renamed]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_items_and_bills_roundtrip() {
        let db = setup().await;
        let repo = LibSqlBillingRepository::new(db.connection());

        let item = Item {
            item_id: "i1".to_string(),
            name: "Masala Chai".to_string(),
            category_id: "c1".to_string(),
            base_price: 19.99,
            gst_percentage: 18.0,
            updated_at: 100,
            deleted: false,
        };
        let bill = Bill {
            bill_id: "b1".to_string(),
            bill_number: "INV-2026-0001".to_string(),
            customer_name: "Asha".to_string(),
            phone: "98450".to_string(),
            address: "MG Road".to_string(),
            date: "2026-01-15".to_string(),
            total_amount: 23.59,
            updated_at: 200,
            deleted: false,
        };
        repo.upsert_items(&[item.clone()]).await.unwrap();
        repo.upsert_bills(&[bill.clone()]).await.unwrap();

        assert_eq!(repo.all_items().await.unwrap(), vec![item]);
        assert_eq!(repo.all_bills().await.unwrap(), vec![bill]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_bill_items_keep_optional_catalogue_id() {
        let db = setup().await;
        let repo = LibSqlBillingRepository::new(db.connection());

        let lines = vec![
            BillItem {
                item_id: "l1".to_string(),
                bill_id: "b1".to_string(),
                description: "Masala Chai".to_string(),
                base_price: 20.0,
                quantity: 2.0,
                discount: 0.0,
                gst: 18.0,
                total_price: 47.2,
                description_mode: DescriptionMode::Catalogue,
                catalogue_item_id: Some("i1".to_string()),
                updated_at: 10,
                deleted: false,
            },
            BillItem {
                item_id: "l2".to_string(),
                bill_id: "b1".to_string(),
                description: "Delivery".to_string(),
                base_price: 30.0,
                quantity: 1.0,
                discount: 0.0,
                gst: 0.0,
                total_price: 30.0,
                description_mode: DescriptionMode::Manual,
                catalogue_item_id: None,
                updated_at: 10,
                deleted: false,
            },
        ];
        repo.upsert_bill_items(&lines).await.unwrap();

        assert_eq!(repo.list_bill_items("b1").await.unwrap(), lines);
        assert!(repo.list_bill_items("b2").await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_settings_absent_until_saved() {
        let db = setup().await;
        let repo = LibSqlBillingRepository::new(db.connection());

        assert_eq!(repo.load_settings().await.unwrap(), None);

        let settings = Settings {
            company_name: "Chai Point".to_string(),
            auto_sync_enabled: true,
            updated_at: 42,
            ..Settings::default()
        };
        repo.save_settings(&settings).await.unwrap();

        assert_eq!(repo.load_settings().await.unwrap(), Some(settings));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_put_attachment_overwrites() {
        let db = setup().await;
        let repo = LibSqlBillingRepository::new(db.connection());
        assert_eq!(repo.count_attachments().await.unwrap(), 0);

        repo.put_attachment(&Attachment::new("b1", vec![1, 2]).unwrap())
            .await
            .unwrap();
        repo.put_attachment(&Attachment::new("b1", vec![3, 4, 5]).unwrap())
            .await
            .unwrap();

        let stored = repo.get_attachment("b1").await.unwrap().unwrap();
        assert_eq!(stored.bytes, vec![3, 4, 5]);
        assert_eq!(repo.all_attachments().await.unwrap().len(), 1);
        assert_eq!(repo.count_attachments().await.unwrap(), 1);
        assert_eq!(repo.get_attachment("missing").await.unwrap(), None);
    }
}
