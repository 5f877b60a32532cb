//! # Database Pool Management
//!
//! Connection pool creation, typed list access and change subscriptions.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Handle                                    │
//! │                                                                         │
//! │  DbConfig::new(path)                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← pool + migrations + initial snapshots   │
//! │       │                                                                 │
//! │       ├── SqlitePool ──────────► kv_store (JSON blobs)                 │
//! │       │                                                                 │
//! │       ├── watch::Sender<Vec<DisplayItem>>  ─┐                          │
//! │       └── watch::Sender<Vec<ReceiptData>>  ─┤ replaced on every write  │
//! │                                             ▼                          │
//! │                              subscribers always see the latest list    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled so readers never block
//! the single writer.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use retreat_core::{CatalogStore, CoreResult, DisplayItem, ReceiptData, ReceiptStore, SampleDataFlag};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::kv::{KvRepository, DISPLAY_ITEMS_KEY, RECEIPT_LIST_KEY, SAMPLE_DATA_LOADED_KEY};

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/retreat.db");
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,
}

impl DbConfig {
    /// Creates a configuration for the given file, created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }

    /// Creates an in-memory database configuration (for testing).
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle.
///
/// Cheap to clone: clones share the pool and the change channels.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./retreat.db")).await?;
///
/// let mut receipts = db.subscribe_receipts();
/// db.save_receipts(vec![receipt]).await?;
/// receipts.changed().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    display_items_tx: Arc<watch::Sender<Vec<DisplayItem>>>,
    receipts_tx: Arc<watch::Sender<Vec<ReceiptData>>>,
}

impl Database {
    /// Creates the pool, runs migrations and loads the initial snapshots
    /// the subscriptions start from.
    ///
    /// SQLite is configured with WAL journaling and NORMAL synchronous.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        info!("Running database migrations");
        migrations::run_migrations(&pool).await?;

        let kv = KvRepository::new(pool.clone());
        let display_items = read_list(DISPLAY_ITEMS_KEY, kv.get_raw(DISPLAY_ITEMS_KEY).await?);
        let receipts = read_list(RECEIPT_LIST_KEY, kv.get_raw(RECEIPT_LIST_KEY).await?);

        debug!(
            display_items = display_items.len(),
            receipts = receipts.len(),
            "Initial snapshots loaded"
        );

        let (display_items_tx, _) = watch::channel(display_items);
        let (receipts_tx, _) = watch::channel(receipts);

        Ok(Database {
            pool,
            display_items_tx: Arc::new(display_items_tx),
            receipts_tx: Arc::new(receipts_tx),
        })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the raw key-value repository.
    pub fn kv(&self) -> KvRepository {
        KvRepository::new(self.pool.clone())
    }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    /// Latest written catalog; empty if never written or unreadable.
    /// Entries that fail to decode are skipped.
    pub async fn display_items(&self) -> DbResult<Vec<DisplayItem>> {
        let raw = self.kv().get_raw(DISPLAY_ITEMS_KEY).await?;
        Ok(read_list(DISPLAY_ITEMS_KEY, raw))
    }

    /// Overwrites the catalog and notifies subscribers.
    pub async fn save_display_items(&self, items: Vec<DisplayItem>) -> DbResult<()> {
        self.put_list(DISPLAY_ITEMS_KEY, &items).await?;
        self.display_items_tx.send_replace(items);
        Ok(())
    }

    /// Receiver that always holds the latest catalog.
    pub fn subscribe_display_items(&self) -> watch::Receiver<Vec<DisplayItem>> {
        self.display_items_tx.subscribe()
    }

    // -------------------------------------------------------------------------
    // Receipts
    // -------------------------------------------------------------------------

    /// Latest written receipt history; empty if never written or unreadable.
    /// Entries that fail to decode are skipped.
    pub async fn receipts(&self) -> DbResult<Vec<ReceiptData>> {
        let raw = self.kv().get_raw(RECEIPT_LIST_KEY).await?;
        Ok(read_list(RECEIPT_LIST_KEY, raw))
    }

    /// Overwrites the receipt history and notifies subscribers.
    pub async fn save_receipts(&self, receipts: Vec<ReceiptData>) -> DbResult<()> {
        self.put_list(RECEIPT_LIST_KEY, &receipts).await?;
        self.receipts_tx.send_replace(receipts);
        Ok(())
    }

    /// Receiver that always holds the latest receipt history.
    pub fn subscribe_receipts(&self) -> watch::Receiver<Vec<ReceiptData>> {
        self.receipts_tx.subscribe()
    }

    // -------------------------------------------------------------------------
    // First-run flag
    // -------------------------------------------------------------------------

    pub async fn sample_data_loaded(&self) -> DbResult<bool> {
        let raw = self.kv().get_raw(SAMPLE_DATA_LOADED_KEY).await?;
        Ok(raw.is_some_and(|value| value.trim().eq_ignore_ascii_case("true")))
    }

    pub async fn set_sample_data_loaded_flag(&self, loaded: bool) -> DbResult<()> {
        self.kv()
            .put_raw(SAMPLE_DATA_LOADED_KEY, if loaded { "true" } else { "false" })
            .await
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Closes the pool. Later operations fail with `ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Overwrites a stored list.
    ///
    /// Fails with `CorruptList` when the current blob is not a JSON array:
    /// reads show such a blob as empty, and writing the list built from that
    /// read would replace whatever the blob still holds.
    async fn put_list<T: Serialize>(&self, key: &str, list: &[T]) -> DbResult<()> {
        let kv = self.kv();

        if let Some(current) = kv.get_raw(key).await? {
            split_entries(&current).map_err(|reason| DbError::CorruptList {
                key: key.to_string(),
                reason,
            })?;
        }

        let json = serde_json::to_string(list)?;
        kv.put_raw(key, &json).await?;
        debug!(key = %key, entries = list.len(), "List saved");
        Ok(())
    }
}

/// Splits a stored blob into its JSON entries.
fn split_entries(raw: &str) -> Result<Vec<serde_json::Value>, String> {
    serde_json::from_str(raw).map_err(|e| e.to_string())
}

/// Decodes a stored list entry by entry.
///
/// A missing key is empty. An entry that fails to decode is logged and
/// skipped; a blob that is not an array at all is logged and read as empty.
fn read_list<T: DeserializeOwned>(key: &str, raw: Option<String>) -> Vec<T> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let entries = match split_entries(&raw) {
        Ok(entries) => entries,
        Err(reason) => {
            warn!(key = %key, error = %reason, "Stored list is unreadable, treating as empty");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, index, error = %e, "Skipping unreadable list entry");
                None
            }
        })
        .collect()
}

// =============================================================================
// Store Traits
// =============================================================================

impl ReceiptStore for Database {
    async fn fetch_receipts(&self) -> CoreResult<Vec<ReceiptData>> {
        Ok(self.receipts().await?)
    }

    async fn update_receipts(&self, receipts: Vec<ReceiptData>) -> CoreResult<()> {
        Ok(self.save_receipts(receipts).await?)
    }
}

impl CatalogStore for Database {
    async fn fetch_display_items(&self) -> CoreResult<Vec<DisplayItem>> {
        Ok(self.display_items().await?)
    }

    async fn update_display_items(&self, items: Vec<DisplayItem>) -> CoreResult<()> {
        Ok(self.save_display_items(items).await?)
    }
}

impl SampleDataFlag for Database {
    async fn is_sample_data_loaded(&self) -> CoreResult<bool> {
        Ok(self.sample_data_loaded().await?)
    }

    async fn set_sample_data_loaded(&self, loaded: bool) -> CoreResult<()> {
        Ok(self.set_sample_data_loaded_flag(loaded).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use retreat_core::{checkout, history, CheckoutItem, CheckoutStatus, Money};

    async fn memory_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = memory_db().await;
        assert!(db.receipts().await.unwrap().is_empty());
        assert!(db.display_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lists_overwrite_and_reload() {
        let db = memory_db().await;
        let bible = DisplayItem::new("Bible", Money::from_cents(2000), Vec::new());
        let candle = DisplayItem::new("Candle", Money::from_cents(500), Vec::new());

        db.save_display_items(vec![bible.clone(), candle]).await.unwrap();
        db.save_display_items(vec![bible.clone()]).await.unwrap();

        assert_eq!(db.display_items().await.unwrap(), vec![bible]);
    }

    #[tokio::test]
    async fn test_corrupt_blob_reads_as_empty() {
        let db = memory_db().await;
        db.kv().put_raw(RECEIPT_LIST_KEY, "{not json").await.unwrap();

        assert!(db.receipts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_not_overwritten() {
        let db = memory_db().await;
        db.kv().put_raw(RECEIPT_LIST_KEY, "{not json").await.unwrap();

        let cart = ReceiptData {
            checkout_list: vec![CheckoutItem::new("Bible", 1, Money::from_cents(2000))],
            ..ReceiptData::new()
        };
        let err = checkout::process_checkout(&db, &cart, "Cy", CheckoutStatus::CheckedOut)
            .await
            .unwrap_err();

        assert!(matches!(err, retreat_core::CoreError::Storage(_)));
        assert_eq!(
            db.kv().get_raw(RECEIPT_LIST_KEY).await.unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[tokio::test]
    async fn test_bad_entry_does_not_cost_the_rest_of_history() {
        let db = memory_db().await;
        let ann = ReceiptData {
            buyer_name: "Ann".into(),
            checkout_status: CheckoutStatus::CheckedOut,
            checkout_list: vec![CheckoutItem::new("Rosary", 1, Money::from_cents(800))],
            ..ReceiptData::new()
        };
        let mut ben = serde_json::to_value(ReceiptData {
            buyer_name: "Ben".into(),
            checkout_status: CheckoutStatus::CheckedOut,
            checkout_list: vec![CheckoutItem::new("Candle", 1, Money::from_cents(550))],
            ..ReceiptData::new()
        })
        .unwrap();
        ben["checkoutList"][0]["totalPrice"] = serde_json::json!(5.5);

        let blob = serde_json::to_string(&vec![serde_json::to_value(&ann).unwrap(), ben]).unwrap();
        db.kv().put_raw(RECEIPT_LIST_KEY, &blob).await.unwrap();

        assert_eq!(db.receipts().await.unwrap(), vec![ann.clone()]);

        let cart = ReceiptData {
            checkout_list: vec![CheckoutItem::new("Bible", 1, Money::from_cents(2000))],
            ..ReceiptData::new()
        };
        checkout::process_checkout(&db, &cart, "Cy", CheckoutStatus::CheckedOut)
            .await
            .unwrap();

        let buyers: Vec<String> = db
            .receipts()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.buyer_name)
            .collect();
        assert_eq!(buyers, vec!["Ann".to_string(), "Cy".to_string()]);
    }

    #[tokio::test]
    async fn test_subscription_sees_latest_list() {
        let db = memory_db().await;
        let mut rx = db.subscribe_receipts();
        assert!(rx.borrow().is_empty());

        let cart = ReceiptData {
            checkout_list: vec![CheckoutItem::new("Bible", 2, Money::from_cents(4000))],
            ..ReceiptData::new()
        };
        checkout::process_checkout(&db, &cart, "Jane", CheckoutStatus::CheckedOut)
            .await
            .unwrap();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        // clones share the channel
        let clone = db.clone();
        clone.save_receipts(Vec::new()).await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_store_traits_round_trip_through_use_cases() {
        let db = memory_db().await;
        let cart = ReceiptData {
            checkout_list: vec![CheckoutItem::new("Candle", 3, Money::from_cents(1500))],
            ..ReceiptData::new()
        };

        checkout::process_checkout(&db, &cart, "Ann", CheckoutStatus::CheckedOut)
            .await
            .unwrap();
        checkout::save_for_later(&db, &cart, "Ben").await.unwrap();

        assert_eq!(
            history::calculate_total_revenue(&db).await.unwrap(),
            Money::from_cents(1500)
        );
        assert_eq!(history::get_saved_for_later(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sample_flag() {
        let db = memory_db().await;
        assert!(!db.is_sample_data_loaded().await.unwrap());
        db.set_sample_data_loaded(true).await.unwrap();
        assert!(db.is_sample_data_loaded().await.unwrap());
    }

    #[tokio::test]
    async fn test_file_database_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("retreat.db");

        {
            let db = Database::new(DbConfig::new(&path)).await.unwrap();
            let item = DisplayItem::new("Rosary", Money::from_cents(800), Vec::new());
            db.save_display_items(vec![item]).await.unwrap();
            db.close().await;
        }

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(db.subscribe_display_items().borrow().len(), 1);
        db.close().await;
    }
}
