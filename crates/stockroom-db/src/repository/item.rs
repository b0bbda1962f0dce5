//! # Item Repository
//!
//! Rows of the `inventory` table.
//!
//! ## Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  id   → row key, used by update / remove / restock                      │
//! │  code → what people scan; uniqueness enforced by the backend            │
//! │                                                                         │
//! │  add("Drill", "004", 12)                                                │
//! │       │                                                                 │
//! │       ├── UNIQUE(code) ok ──────► ItemRecord { id: 7, .. }              │
//! │       └── UNIQUE(code) violated ─► DbError::DuplicateCode { "004" }     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::FromRow;
use tracing::{debug, warn};

use stockroom_core::ItemRecord;

use crate::backend::Statement;
use crate::error::{DbError, DbResult};
use crate::store::RecordStore;

const SELECT_COLUMNS: &str = "SELECT id, name, code, qty FROM inventory";

/// Raw `inventory` row. `qty` is read wide and narrowed on conversion.
#[derive(Debug, FromRow)]
struct ItemRow {
    id: i64,
    name: String,
    code: String,
    qty: i64,
}

impl TryFrom<ItemRow> for ItemRecord {
    type Error = DbError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.qty).map_err(|_| {
            DbError::Internal(format!(
                "item {} has out-of-range quantity {}",
                row.code, row.qty
            ))
        })?;

        Ok(ItemRecord {
            id: row.id,
            name: row.name,
            code: row.code,
            quantity,
        })
    }
}

/// Repository for inventory rows.
///
/// ## Usage
/// ```rust,ignore
/// let drill = store.items().add("Drill", "004", 12).await?;
/// let drill = store.items().restock(drill.id, 3).await?;
/// assert_eq!(drill.quantity, 15);
/// ```
#[derive(Debug, Clone)]
pub struct ItemRepository {
    store: RecordStore,
}

impl ItemRepository {
    pub fn new(store: RecordStore) -> Self {
        ItemRepository { store }
    }

    /// All rows, oldest first.
    ///
    /// Rows another client left unrepresentable (negative or oversized
    /// `qty`) are skipped with a warning.
    pub async fn list(&self) -> DbResult<Vec<ItemRecord>> {
        let rows: Vec<ItemRow> = self
            .store
            .fetch_all(|_| Statement::new(format!("{} ORDER BY id", SELECT_COLUMNS)))
            .await?;

        debug!(count = rows.len(), "Listed items");
        let records = rows
            .into_iter()
            .filter_map(|row| match ItemRecord::try_from(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable inventory row");
                    None
                }
            })
            .collect();
        Ok(records)
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<ItemRecord>> {
        let row: Option<ItemRow> = self
            .store
            .fetch_optional(|dialect| {
                Statement::new(format!(
                    "{} WHERE id = {}",
                    SELECT_COLUMNS,
                    dialect.placeholder(1)
                ))
                .bind(id)
            })
            .await?;

        row.map(ItemRecord::try_from).transpose()
    }

    /// Looks up an item by exact product code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<ItemRecord>> {
        let row: Option<ItemRow> = self
            .store
            .fetch_optional(|dialect| {
                Statement::new(format!(
                    "{} WHERE code = {}",
                    SELECT_COLUMNS,
                    dialect.placeholder(1)
                ))
                .bind(code)
            })
            .await?;

        row.map(ItemRecord::try_from).transpose()
    }

    /// Inserts a new row.
    ///
    /// ## Errors
    /// [`DbError::DuplicateCode`] when `code` is taken.
    pub async fn add(&self, name: &str, code: &str, quantity: u32) -> DbResult<ItemRecord> {
        debug!(code = %code, quantity, "Inserting item");

        let outcome = self
            .store
            .execute_raw(|dialect| {
                Statement::new(format!(
                    "INSERT INTO inventory (name, code, qty) VALUES ({})",
                    dialect.placeholders(3)
                ))
                .bind(name)
                .bind(code)
                .bind(quantity)
            })
            .await
            .map_err(|e| e.for_code(code))?;

        match outcome.last_insert_id {
            Some(id) => Ok(ItemRecord {
                id,
                name: name.to_string(),
                code: code.to_string(),
                quantity,
            }),
            None => self
                .get_by_code(code)
                .await?
                .ok_or_else(|| DbError::not_found("Item", code)),
        }
    }

    /// Replaces name, code and quantity of row `id`.
    ///
    /// ## Errors
    /// - [`DbError::NotFound`] when the row is gone
    /// - [`DbError::DuplicateCode`] when the new code belongs to another row
    pub async fn update(
        &self,
        id: i64,
        name: &str,
        code: &str,
        quantity: u32,
    ) -> DbResult<ItemRecord> {
        debug!(id, code = %code, quantity, "Updating item");

        self.store
            .execute_raw(|dialect| {
                Statement::new(format!(
                    "UPDATE inventory SET {} WHERE id = {}",
                    dialect.assignments(&["name", "code", "qty"]),
                    dialect.placeholder(4)
                ))
                .bind(name)
                .bind(code)
                .bind(quantity)
                .bind(id)
            })
            .await
            .map_err(|e| e.for_code(code))?;

        // MySQL reports changed rows, not matched ones, so an unchanged
        // update looks like a miss. Re-read instead.
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))
    }

    /// Adds `delta` units to row `id` in a single statement.
    pub async fn restock(&self, id: i64, delta: u32) -> DbResult<ItemRecord> {
        debug!(id, delta, "Restocking item");

        self.store
            .execute_raw(|dialect| {
                Statement::new(format!(
                    "UPDATE inventory SET qty = qty + {} WHERE id = {}",
                    dialect.placeholder(1),
                    dialect.placeholder(2)
                ))
                .bind(delta)
                .bind(id)
            })
            .await?;

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))
    }

    pub async fn remove(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting item");

        let outcome = self
            .store
            .execute_raw(|dialect| {
                Statement::new(format!(
                    "DELETE FROM inventory WHERE id = {}",
                    dialect.placeholder(1)
                ))
                .bind(id)
            })
            .await?;

        if outcome.rows_affected == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(())
    }

    /// Counts rows (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: Option<(i64,)> = self
            .store
            .fetch_optional(|_| Statement::new("SELECT COUNT(*) FROM inventory"))
            .await?;

        Ok(count.map(|(n,)| n).unwrap_or(0))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConnectionDescriptor, DbConfig};

    async fn embedded_store(dir: &tempfile::TempDir) -> RecordStore {
        RecordStore::connect(
            ConnectionDescriptor::default(),
            DbConfig::new(dir.path().join("inventory.db")),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_add_and_lookup_by_code() {
        let dir = tempfile::tempdir().unwrap();
        let items = embedded_store(&dir).await.items();

        let drill = items.add("Drill", "004", 12).await.unwrap();
        assert!(drill.id > 0);

        let found = items.get_by_code("004").await.unwrap().unwrap();
        assert_eq!(found, drill);
        assert!(items.get_by_code("005").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_is_rejected_by_backend() {
        let dir = tempfile::tempdir().unwrap();
        let items = embedded_store(&dir).await.items();

        items.add("Drill", "004", 12).await.unwrap();
        let err = items.add("Other drill", "004", 1).await.unwrap_err();

        assert!(matches!(err, DbError::DuplicateCode { ref code } if code == "004"));
        assert_eq!(items.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_changes_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let items = embedded_store(&dir).await.items();
        let drill = items.add("Drill", "004", 12).await.unwrap();

        let updated = items.update(drill.id, "Hammer drill", "005", 3).await.unwrap();

        assert_eq!(updated.id, drill.id);
        assert_eq!(updated.name, "Hammer drill");
        assert_eq!(updated.code, "005");
        assert_eq!(updated.quantity, 3);
        assert!(items.get_by_code("004").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_to_taken_code_fails() {
        let dir = tempfile::tempdir().unwrap();
        let items = embedded_store(&dir).await.items();
        items.add("Drill", "004", 12).await.unwrap();
        let saw = items.add("Saw", "006", 2).await.unwrap();

        let err = items.update(saw.id, "Saw", "004", 2).await.unwrap_err();

        assert!(matches!(err, DbError::DuplicateCode { .. }));
        assert_eq!(items.get(saw.id).await.unwrap().unwrap().code, "006");
    }

    #[tokio::test]
    async fn test_restock_adds_units() {
        let dir = tempfile::tempdir().unwrap();
        let items = embedded_store(&dir).await.items();
        let drill = items.add("Drill", "004", 12).await.unwrap();

        let drill = items.restock(drill.id, 3).await.unwrap();

        assert_eq!(drill.quantity, 15);
    }

    #[tokio::test]
    async fn test_remove_missing_row() {
        let dir = tempfile::tempdir().unwrap();
        let items = embedded_store(&dir).await.items();
        let drill = items.add("Drill", "004", 12).await.unwrap();

        items.remove(drill.id).await.unwrap();

        assert!(matches!(
            items.remove(drill.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
        assert!(items.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_skips_negative_quantity_row() {
        let dir = tempfile::tempdir().unwrap();
        let store = embedded_store(&dir).await;
        let items = store.items();
        items.add("Drill", "004", 12).await.unwrap();

        // Another client wrote a value the schema allows but an Item cannot hold
        store
            .execute_raw(|dialect| {
                Statement::new(format!(
                    "INSERT INTO inventory (name, code, qty) VALUES ({})",
                    dialect.placeholders(3)
                ))
                .bind("Broken")
                .bind("BAD-1")
                .bind(-1_i64)
            })
            .await
            .unwrap();

        let listed = items.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].code, "004");
        assert_eq!(items.count().await.unwrap(), 2);
    }
}
