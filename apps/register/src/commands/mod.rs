//! # Register Commands
//!
//! Everything the register can do, as plain async functions over the
//! state they need.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── catalog.rs   ◄─── Item grid: list, add, delete
//! ├── cart.rs      ◄─── Cart manipulation
//! ├── checkout.rs  ◄─── Checkout and save-for-later
//! ├── history.rs   ◄─── Receipts, revenue, resume, delete
//! └── export.rs    ◄─── CSV export through a ShareTarget
//! ```
//!
//! ## State Injection
//! Each command takes only the state it touches:
//! ```rust,ignore
//! // Only needs the cart
//! fn get_cart(cart: &CartState) -> CartResponse
//!
//! // Needs both
//! async fn add_item_to_cart(db: &DbState, cart: &CartState, ...)
//!
//! // Needs config and a share target
//! async fn export_csv(db: &DbState, config: &ConfigState, share: &impl ShareTarget, ...)
//! ```
//!
//! Every fallible command returns `Result<T, ApiError>`.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod export;
pub mod history;
