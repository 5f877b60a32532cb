//! # Checkout Use Case
//!
//! Validates the current cart and commits it into receipt history.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  cart + buyer + status                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  buyer blank? ──────────────► ValidationError                          │
//! │  no lines? ─────────────────► EmptyCart                                │
//! │  qty ≤ 0 or total ≤ 0? ─────► InvalidItems { count, names }            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  receipt = cart stamped with buyer, status, now                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  fetch receipts ──► append ──► update receipts                         │
//! │  (read-then-write, last writer wins)                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart itself is not touched. The host resets it to a fresh
//! `ReceiptData::new()` once this returns `Ok`.

use chrono::Utc;
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::store::ReceiptStore;
use crate::types::{CheckoutStatus, ReceiptData};
use crate::validation::validate_buyer_name;

/// Commits `cart` to history under `buyer_name` with the given status.
///
/// The receipt keeps the cart's id, lines and payment method. The buyer
/// name is stored trimmed and the timestamp is the commit time.
pub async fn process_checkout<S>(
    store: &S,
    cart: &ReceiptData,
    buyer_name: &str,
    status: CheckoutStatus,
) -> CoreResult<ReceiptData>
where
    S: ReceiptStore,
{
    let buyer_name = validate_buyer_name(buyer_name)?;

    if cart.checkout_list.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let invalid: Vec<String> = cart
        .checkout_list
        .iter()
        .filter(|line| line.quantity <= 0 || !line.total_price.is_positive())
        .map(|line| line.item_name.clone())
        .collect();
    if !invalid.is_empty() {
        return Err(CoreError::InvalidItems {
            count: invalid.len(),
            names: invalid,
        });
    }

    let receipt = ReceiptData {
        buyer_name,
        checkout_status: status,
        date_time: Utc::now(),
        ..cart.clone()
    };

    let mut receipts = store.fetch_receipts().await?;
    receipts.push(receipt.clone());
    store.update_receipts(receipts).await?;

    debug!(
        receipt_id = %receipt.id,
        status = %receipt.checkout_status,
        total = %receipt.total_price(),
        "Receipt committed"
    );

    Ok(receipt)
}

/// Parks the cart in history as SAVE_FOR_LATER.
pub async fn save_for_later<S>(store: &S, cart: &ReceiptData, buyer_name: &str) -> CoreResult<ReceiptData>
where
    S: ReceiptStore,
{
    process_checkout(store, cart, buyer_name, CheckoutStatus::SaveForLater).await
}

/// Amount due for the cart.
pub fn calculate_checkout_total(cart: &ReceiptData) -> Money {
    cart.total_price()
}

// =============================================================================
// Unit Tests
// =============================================================================
