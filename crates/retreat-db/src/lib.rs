//! # retreat-db: Persistence Layer for Retreat POS
//!
//! Local SQLite storage behind the `retreat-core` store traits.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Retreat POS Data Flow                              │
//! │                                                                         │
//! │  Register command (checkout)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  retreat_core::checkout::process_checkout(&db, ...)                    │
//! │       │  ReceiptStore::fetch_receipts / update_receipts                │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   retreat-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │ KvRepository  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │───►│   (kv.rs)     │    │  (embedded)  │  │   │
//! │  │   │ watch senders │    │ get/put/del   │    │ 001_kv_store │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (kv_store table, WAL)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, typed list access, subscriptions
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Raw key-value repository
//! - [`sample`] - First-run sample catalog
//!
//! ## Usage
//!
//! ```rust,ignore
//! use retreat_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/retreat.db")).await?;
//! db.load_sample_data_if_first_run().await?;
//!
//! let catalog = retreat_core::catalog::get_display_items(&db).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod sample;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::kv::KvRepository;
pub use sample::{load_sample_data_if_first_run, sample_catalog};
