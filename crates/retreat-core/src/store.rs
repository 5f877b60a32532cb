//! # Store Seams
//!
//! Traits the use cases talk to instead of a concrete database.
//!
//! ```text
//! ┌──────────────┐  fetch / update   ┌──────────────────────────────┐
//! │  checkout    │ ────────────────► │ ReceiptStore                 │
//! │  history     │                   │   retreat_db::Database       │
//! ├──────────────┤                   │   MemoryStore (tests, embed) │
//! │  catalog     │ ────────────────► │ CatalogStore                 │
//! └──────────────┘                   └──────────────────────────────┘
//! ```
//!
//! Writes always replace the whole list. Nothing here is transactional:
//! a fetch-modify-update sequence from two writers can lose one update, so
//! the host keeps a single writer active.

use std::sync::{Mutex, MutexGuard};

use crate::error::{CoreError, CoreResult};
use crate::types::{DisplayItem, ReceiptData};

// =============================================================================
// Traits
// =============================================================================

/// Persisted receipt history.
#[allow(async_fn_in_trait)]
pub trait ReceiptStore {
    /// Latest written receipt list, in insertion order.
    async fn fetch_receipts(&self) -> CoreResult<Vec<ReceiptData>>;

    /// Overwrites the receipt list.
    async fn update_receipts(&self, receipts: Vec<ReceiptData>) -> CoreResult<()>;
}

/// Persisted catalog.
#[allow(async_fn_in_trait)]
pub trait CatalogStore {
    async fn fetch_display_items(&self) -> CoreResult<Vec<DisplayItem>>;

    async fn update_display_items(&self, items: Vec<DisplayItem>) -> CoreResult<()>;
}

/// The "first-run sample data loaded" flag.
#[allow(async_fn_in_trait)]
pub trait SampleDataFlag {
    async fn is_sample_data_loaded(&self) -> CoreResult<bool>;

    async fn set_sample_data_loaded(&self, loaded: bool) -> CoreResult<()>;
}

/// Delivers an exported CSV somewhere the operator can reach it.
///
/// Returns a human-readable location (path, URL, ...) of the delivered file.
#[allow(async_fn_in_trait)]
pub trait ShareTarget {
    async fn share_csv(&self, content: &str, file_name: &str) -> CoreResult<String>;
}

// =============================================================================
// In-Memory Store
// =============================================================================

#[derive(Debug, Default)]
struct MemoryInner {
    display_items: Vec<DisplayItem>,
    receipts: Vec<ReceiptData>,
    sample_data_loaded: bool,
}

/// Implements every store seam over plain vectors.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with the given receipts already in history.
    pub fn with_receipts(receipts: Vec<ReceiptData>) -> Self {
        MemoryStore {
            inner: Mutex::new(MemoryInner {
                receipts,
                ..MemoryInner::default()
            }),
        }
    }

    /// Starts with the given catalog.
    pub fn with_display_items(display_items: Vec<DisplayItem>) -> Self {
        MemoryStore {
            inner: Mutex::new(MemoryInner {
                display_items,
                ..MemoryInner::default()
            }),
        }
    }

    fn lock(&self) -> CoreResult<MutexGuard<'_, MemoryInner>> {
        self.inner
            .lock()
            .map_err(|_| CoreError::Storage("memory store lock poisoned".to_string()))
    }
}

impl ReceiptStore for MemoryStore {
    async fn fetch_receipts(&self) -> CoreResult<Vec<ReceiptData>> {
        Ok(self.lock()?.receipts.clone())
    }

    async fn update_receipts(&self, receipts: Vec<ReceiptData>) -> CoreResult<()> {
        self.lock()?.receipts = receipts;
        Ok(())
    }
}

impl CatalogStore for MemoryStore {
    async fn fetch_display_items(&self) -> CoreResult<Vec<DisplayItem>> {
        Ok(self.lock()?.display_items.clone())
    }

    async fn update_display_items(&self, items: Vec<DisplayItem>) -> CoreResult<()> {
        self.lock()?.display_items = items;
        Ok(())
    }
}

impl SampleDataFlag for MemoryStore {
    async fn is_sample_data_loaded(&self) -> CoreResult<bool> {
        Ok(self.lock()?.sample_data_loaded)
    }

    async fn set_sample_data_loaded(&self, loaded: bool) -> CoreResult<()> {
        self.lock()?.sample_data_loaded = loaded;
        Ok(())
    }
}
