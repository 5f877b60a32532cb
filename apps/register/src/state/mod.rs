//! # State Module
//!
//! Register state, split by concern so each command declares exactly
//! what it touches.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐          │
//! │  │   DbState    │  │    CartState     │  │   ConfigState    │          │
//! │  │              │  │                  │  │                  │          │
//! │  │  Database    │  │  watch::Sender<  │  │  store_name      │          │
//! │  │  (SQLite     │  │   ReceiptData>   │  │  export_dir      │          │
//! │  │   pool)      │  │                  │  │  utc offset      │          │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘          │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • CartState: watch channel, one committed cart at a time              │
//! │  • ConfigState: Read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod db;

pub use cart::CartState;
pub use config::{ConfigError, ConfigState};
pub use db::DbState;
