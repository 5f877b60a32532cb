//! # Repository Module
//!
//! Database repository implementations for Retreat POS.
//!
//! ```text
//! Database::receipts() / display_items()   typed lists, JSON encoded
//!       │
//!       ▼
//! KvRepository                              raw text rows
//! ├── get_raw(&self, key)
//! ├── put_raw(&self, key, value)
//! └── delete(&self, key)
//!       │
//!       ▼
//! kv_store table
//! ```

pub mod kv;
