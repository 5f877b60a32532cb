//! # Checkout Commands
//!
//! Commit the current cart into receipt history.
//!
//! ```text
//! CartState ──snapshot──► checkout::process_checkout(db, cart, buyer, status)
//!                                   │
//!                         Ok ───────┼──────── Err
//!                          │                   │
//!                 cart.reset() (new id)   cart untouched
//! ```

use retreat_core::{checkout, CheckoutStatus, ReceiptData};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{CartState, DbState};

/// Checks the cart out as paid and starts a fresh cart.
pub async fn checkout(db: &DbState, cart: &CartState, buyer_name: &str) -> Result<ReceiptData, ApiError> {
    debug!(buyer = %buyer_name, "checkout command");
    commit(db, cart, buyer_name, CheckoutStatus::CheckedOut).await
}

/// Parks the cart in history for the buyer to come back to, and starts a
/// fresh cart.
pub async fn save_for_later(
    db: &DbState,
    cart: &CartState,
    buyer_name: &str,
) -> Result<ReceiptData, ApiError> {
    debug!(buyer = %buyer_name, "save_for_later command");
    commit(db, cart, buyer_name, CheckoutStatus::SaveForLater).await
}

async fn commit(
    db: &DbState,
    cart: &CartState,
    buyer_name: &str,
    status: CheckoutStatus,
) -> Result<ReceiptData, ApiError> {
    let current = cart.snapshot();
    let receipt = checkout::process_checkout(db.inner(), &current, buyer_name, status).await?;

    cart.reset();
    info!(
        receipt_id = %receipt.id,
        status = %receipt.checkout_status,
        total = %receipt.total_price(),
        "Cart committed"
    );
    Ok(receipt)
}
