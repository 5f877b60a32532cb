//! # retreat-core: Pure Business Logic for Retreat POS
//!
//! This crate is the **heart** of the retreat bookstore register. It contains
//! the cart, checkout, purchase history and reporting logic as pure functions
//! (or async functions over storage traits) with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Retreat POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Register host (apps/register)                   │   │
//! │  │    CartState ──► commands ──► ShareTarget (file export)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ retreat-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │  cart   │ │ checkout │ │ history │ │ report │  │   │
//! │  │   │ Receipt │ │ add/rm  │ │ commit   │ │ queries │ │  CSV   │  │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └─────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ store traits                           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              retreat-db (SQLite key-value blobs)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (DisplayItem, CheckoutItem, ReceiptData, enums)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level business rules
//! - [`cart`] - In-memory cart transformations
//! - [`checkout`] - Commit a cart into receipt history
//! - [`history`] - Read-side queries over receipts
//! - [`catalog`] - Catalog (inventory) management
//! - [`report`] - CSV reporting engine
//! - [`store`] - Persistence and share seams, plus an in-memory store
//!
//! ## Example Usage
//!
//! ```rust
//! use retreat_core::{cart, CheckoutItem, Money, ReceiptData};
//!
//! let line = CheckoutItem::new("Bible", 2, Money::from_cents(4000));
//! let cart = cart::add_to_cart(&ReceiptData::new(), line).unwrap();
//!
//! assert_eq!(cart::calculate_total(&cart).cents(), 4000);
//! assert_eq!(cart::get_item_count(&cart), 2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod history;
pub mod money;
pub mod report;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use store::{CatalogStore, MemoryStore, ReceiptStore, SampleDataFlag, ShareTarget};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Buyer name used when none was captured.
pub const UNKNOWN_BUYER: &str = "Unknown";

/// Placeholder for absent text fields in reports (no variants, no items).
pub const NOT_AVAILABLE: &str = "N/A";

/// Maximum length of an item name.
pub const MAX_NAME_LENGTH: usize = 200;
