//! # Inventory Model
//!
//! The item list the UI shows, plus every mutation the UI can make.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate input                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  write to the authoritative source                                      │
//! │       │   Database: record store row   (+ CSV snapshot, warn on fail)   │
//! │       │   FlatFile: whole CSV rewrite  (atomic)                         │
//! │       │   Memory:   nothing durable                                     │
//! │       ▼                                                                 │
//! │  refresh cached items          (Database: warn on fail, write stands)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logging the action is the caller's job, after the write returned.

use tracing::{debug, info, warn};

use stockroom_core::validation::{
    validate_code, validate_item_name, validate_quantity, validate_scan_quantity,
    validate_search_query,
};
use stockroom_core::{CoreError, Item, ItemRecord};
use stockroom_db::RecordStore;
use stockroom_files::FlatFileMirror;

use crate::error::{AppError, AppResult};

/// Where items are read from and written to.
#[derive(Debug, Clone)]
pub enum ItemSource {
    /// Record store is authoritative; the mirror gets a copy after each write.
    Database {
        store: RecordStore,
        mirror: FlatFileMirror,
    },

    /// The CSV file is authoritative.
    FlatFile(FlatFileMirror),

    /// Neither backend could be opened. Changes last until exit.
    Memory,
}

impl ItemSource {
    pub fn name(&self) -> &'static str {
        match self {
            ItemSource::Database { .. } => "database",
            ItemSource::FlatFile(_) => "file",
            ItemSource::Memory => "memory",
        }
    }
}

#[derive(Debug)]
pub struct InventoryModel {
    source: ItemSource,
    items: Vec<Item>,

    /// The flat file failed to parse on the last read. Writing now would
    /// replace whatever it holds, so edits are refused until it reads again.
    unreadable: bool,
}

impl InventoryModel {
    /// Builds the model and reads the current items.
    pub async fn load(source: ItemSource) -> AppResult<Self> {
        let mut model = InventoryModel {
            source,
            items: Vec::new(),
            unreadable: false,
        };
        model.refresh().await?;
        Ok(model)
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Cached items, in source order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn find(&self, code: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.code == code)
    }

    /// Switches to another source (after a reconnect) and reads from it.
    pub async fn replace_source(&mut self, source: ItemSource) -> AppResult<()> {
        info!(from = self.source.name(), to = source.name(), "Switching item source");
        self.source = source;
        self.unreadable = false;
        self.refresh().await
    }

    /// Re-reads the authoritative source.
    pub async fn refresh(&mut self) -> AppResult<()> {
        match &self.source {
            ItemSource::Database { store, mirror } => {
                let items: Vec<Item> = store
                    .items()
                    .list()
                    .await?
                    .into_iter()
                    .map(Item::from)
                    .collect();

                if let Err(e) = mirror.write(&items) {
                    warn!(path = %mirror.path().display(), error = %e, "Could not write inventory snapshot");
                }
                self.items = items;
            }
            ItemSource::FlatFile(mirror) => match mirror.read() {
                Ok(items) => {
                    self.items = items;
                    self.unreadable = false;
                }
                Err(e) => {
                    warn!(path = %mirror.path().display(), error = %e, "Inventory file unreadable, showing no items");
                    self.items = Vec::new();
                    self.unreadable = true;
                }
            },
            ItemSource::Memory => {}
        }

        debug!(source = self.source.name(), count = self.items.len(), "Items refreshed");
        Ok(())
    }

    /// Items whose name contains `query` (any case) or whose code contains it.
    pub fn search(&self, query: &str) -> AppResult<Vec<Item>> {
        let query = validate_search_query(query)?;
        Ok(self
            .items
            .iter()
            .filter(|item| item.matches(&query))
            .cloned()
            .collect())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub async fn add_item(&mut self, name: &str, code: &str, quantity: i64) -> AppResult<Item> {
        let item = Item::new(
            validate_item_name(name)?,
            validate_code(code)?,
            validate_quantity(quantity)?,
        );

        if let Some(store) = self.store() {
            store
                .items()
                .add(&item.name, &item.code, item.quantity)
                .await?;
            self.refresh_after_write().await;
        } else {
            self.ensure_writable()?;
            if self.find(&item.code).is_some() {
                return Err(CoreError::DuplicateCode(item.code).into());
            }
            let mut next = self.items.clone();
            next.push(item.clone());
            self.commit_local(next)?;
        }

        info!(code = %item.code, quantity = item.quantity, "Item added");
        Ok(item)
    }

    /// Replaces name, code and quantity of the item currently coded `code`.
    pub async fn update_item(
        &mut self,
        code: &str,
        name: &str,
        new_code: &str,
        quantity: i64,
    ) -> AppResult<Item> {
        let code = validate_code(code)?;
        let item = Item::new(
            validate_item_name(name)?,
            validate_code(new_code)?,
            validate_quantity(quantity)?,
        );

        if let Some(store) = self.store() {
            let record = record_for(&store, &code).await?;
            store
                .items()
                .update(record.id, &item.name, &item.code, item.quantity)
                .await?;
            self.refresh_after_write().await;
        } else {
            self.ensure_writable()?;
            let index = self.position(&code)?;
            if item.code != code && self.find(&item.code).is_some() {
                return Err(CoreError::DuplicateCode(item.code).into());
            }
            let mut next = self.items.clone();
            next[index] = item.clone();
            self.commit_local(next)?;
        }

        info!(code = %code, new_code = %item.code, "Item updated");
        Ok(item)
    }

    /// Quantity-only edit.
    pub async fn set_quantity(&mut self, code: &str, quantity: i64) -> AppResult<Item> {
        let code = validate_code(code)?;
        let quantity = validate_quantity(quantity)?;

        let item = if let Some(store) = self.store() {
            let record = record_for(&store, &code).await?;
            let updated = store
                .items()
                .update(record.id, &record.name, &record.code, quantity)
                .await?;
            self.refresh_after_write().await;
            Item::from(updated)
        } else {
            self.ensure_writable()?;
            let index = self.position(&code)?;
            let mut next = self.items.clone();
            next[index].quantity = quantity;
            let item = next[index].clone();
            self.commit_local(next)?;
            item
        };

        info!(code = %item.code, quantity, "Quantity set");
        Ok(item)
    }

    /// Adds `quantity` units to the item scanned as `code`.
    pub async fn scan(&mut self, code: &str, quantity: i64) -> AppResult<Item> {
        let code = validate_code(code)?;
        let delta = validate_scan_quantity(quantity)?;

        let item = if let Some(store) = self.store() {
            let record = record_for(&store, &code).await?;
            // Overflow is checked before anything is written
            record.to_item().restocked(delta)?;
            let updated = store.items().restock(record.id, delta).await?;
            self.refresh_after_write().await;
            Item::from(updated)
        } else {
            self.ensure_writable()?;
            let index = self.position(&code)?;
            let item = self.items[index].restocked(delta)?;
            let mut next = self.items.clone();
            next[index] = item.clone();
            self.commit_local(next)?;
            item
        };

        info!(code = %item.code, delta, quantity = item.quantity, "Item scanned");
        Ok(item)
    }

    /// Removes the item coded `code` and returns what it was.
    pub async fn remove_item(&mut self, code: &str) -> AppResult<Item> {
        let code = validate_code(code)?;

        let item = if let Some(store) = self.store() {
            let record = record_for(&store, &code).await?;
            store.items().remove(record.id).await?;
            self.refresh_after_write().await;
            Item::from(record)
        } else {
            self.ensure_writable()?;
            let index = self.position(&code)?;
            let mut next = self.items.clone();
            let item = next.remove(index);
            self.commit_local(next)?;
            item
        };

        info!(code = %item.code, "Item removed");
        Ok(item)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// The row is already committed, so a failed re-read must not turn the
    /// command into an error. The cache catches up on the next refresh.
    async fn refresh_after_write(&mut self) {
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Could not re-read items after write");
        }
    }

    fn store(&self) -> Option<RecordStore> {
        match &self.source {
            ItemSource::Database { store, .. } => Some(store.clone()),
            _ => None,
        }
    }

    fn position(&self, code: &str) -> AppResult<usize> {
        self.items
            .iter()
            .position(|item| item.code == code)
            .ok_or_else(|| CoreError::ItemNotFound(code.to_string()).into())
    }

    fn ensure_writable(&self) -> AppResult<()> {
        match &self.source {
            ItemSource::FlatFile(mirror) if self.unreadable => {
                Err(AppError::MirrorUnreadable(mirror.path().to_path_buf()))
            }
            _ => Ok(()),
        }
    }

    /// Persists `next` for the file and memory sources, then adopts it.
    fn commit_local(&mut self, next: Vec<Item>) -> AppResult<()> {
        if let ItemSource::FlatFile(mirror) = &self.source {
            mirror.write(&next)?;
        }
        self.items = next;
        Ok(())
    }
}

async fn record_for(store: &RecordStore, code: &str) -> AppResult<ItemRecord> {
    store
        .items()
        .get_by_code(code)
        .await?
        .ok_or_else(|| CoreError::ItemNotFound(code.to_string()).into())
}

// =============================================================================
// Unit Tests
// =============================================================================
