//! # Database State
//!
//! Wraps the `Database` connection for use in register commands.
//!
//! The `Database` from `retreat-db` holds a `SqlitePool` plus the list
//! watch channels, all of which are thread-safe, so no extra locking is
//! needed here.
//!
//! ## Usage in Commands
//! ```rust,ignore
//! pub async fn list_items(db: &DbState, cart: &CartState) -> Result<Vec<DisplayItem>, ApiError> {
//!     let items = catalog::get_display_items(db.inner()).await?;
//!     Ok(catalog::sync_in_cart_flags(&items, &cart.snapshot()))
//! }
//! ```

use retreat_db::Database;

/// Wrapper around `Database` for register state.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
