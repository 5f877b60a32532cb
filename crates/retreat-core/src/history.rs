//! # Purchase History Use Case
//!
//! Read-side projections over the persisted receipt list, plus the few
//! writes the history screen needs (delete, resume a parked receipt).
//!
//! ```text
//!   receipts (insertion order)
//!        │
//!        ├── get_purchase_history()   status == CHECKED_OUT
//!        ├── get_saved_for_later()    status == SAVE_FOR_LATER
//!        ├── get_receipts_by_buyer()  case-insensitive substring
//!        └── calculate_total_revenue() Σ total, CHECKED_OUT only
//! ```

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::store::ReceiptStore;
use crate::types::{CheckoutStatus, PaymentMethod, ReceiptData};

// =============================================================================
// Pure Projections
// =============================================================================

/// Receipts with the given status, order kept.
pub fn with_status(receipts: &[ReceiptData], status: CheckoutStatus) -> Vec<ReceiptData> {
    receipts
        .iter()
        .filter(|r| r.checkout_status == status)
        .cloned()
        .collect()
}

/// Sum of totals over CHECKED_OUT receipts.
pub fn total_revenue(receipts: &[ReceiptData]) -> Money {
    receipts
        .iter()
        .filter(|r| r.checkout_status == CheckoutStatus::CheckedOut)
        .map(ReceiptData::total_price)
        .sum()
}

/// CHECKED_OUT totals per payment method; methods with no sales are absent.
pub fn revenue_by_method(receipts: &[ReceiptData]) -> BTreeMap<PaymentMethod, Money> {
    let mut totals = BTreeMap::new();
    for receipt in receipts
        .iter()
        .filter(|r| r.checkout_status == CheckoutStatus::CheckedOut)
    {
        *totals.entry(receipt.payment_method).or_insert_with(Money::zero) += receipt.total_price();
    }
    totals
}

/// Receipts whose buyer name contains `query`, ignoring case.
pub fn matching_buyer(receipts: &[ReceiptData], query: &str) -> Vec<ReceiptData> {
    let needle = query.trim().to_lowercase();
    receipts
        .iter()
        .filter(|r| r.buyer_name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

// =============================================================================
// Store-backed Queries
// =============================================================================

pub async fn get_all_receipts<S: ReceiptStore>(store: &S) -> CoreResult<Vec<ReceiptData>> {
    store.fetch_receipts().await
}

pub async fn get_purchase_history<S: ReceiptStore>(store: &S) -> CoreResult<Vec<ReceiptData>> {
    let receipts = store.fetch_receipts().await?;
    Ok(with_status(&receipts, CheckoutStatus::CheckedOut))
}

pub async fn get_saved_for_later<S: ReceiptStore>(store: &S) -> CoreResult<Vec<ReceiptData>> {
    let receipts = store.fetch_receipts().await?;
    Ok(with_status(&receipts, CheckoutStatus::SaveForLater))
}

/// Revenue counts CHECKED_OUT receipts only.
pub async fn calculate_total_revenue<S: ReceiptStore>(store: &S) -> CoreResult<Money> {
    let receipts = store.fetch_receipts().await?;
    Ok(total_revenue(&receipts))
}

pub async fn revenue_by_payment_method<S: ReceiptStore>(
    store: &S,
) -> CoreResult<BTreeMap<PaymentMethod, Money>> {
    let receipts = store.fetch_receipts().await?;
    Ok(revenue_by_method(&receipts))
}

pub async fn get_receipts_by_buyer<S: ReceiptStore>(
    store: &S,
    name: &str,
) -> CoreResult<Vec<ReceiptData>> {
    let receipts = store.fetch_receipts().await?;
    Ok(matching_buyer(&receipts, name))
}

pub async fn get_receipt_count<S: ReceiptStore>(store: &S) -> CoreResult<usize> {
    Ok(store.fetch_receipts().await?.len())
}

pub async fn get_receipt_by_id<S: ReceiptStore>(store: &S, id: &str) -> CoreResult<ReceiptData> {
    store
        .fetch_receipts()
        .await?
        .into_iter()
        .find(|r| r.id == id)
        .ok_or_else(|| CoreError::not_found("Receipt", id))
}

/// Removes a receipt from history.
pub async fn delete_receipt<S: ReceiptStore>(store: &S, id: &str) -> CoreResult<()> {
    let mut receipts = store.fetch_receipts().await?;
    let before = receipts.len();
    receipts.retain(|r| r.id != id);

    if receipts.len() == before {
        return Err(CoreError::not_found("Receipt", id));
    }

    store.update_receipts(receipts).await?;
    debug!(receipt_id = %id, "Receipt deleted");
    Ok(())
}

/// Takes a SAVE_FOR_LATER receipt out of history and hands it back as a
/// PENDING cart.
///
/// ## Errors
/// - `NotFound` if no receipt has this id
/// - `InvalidState` if the receipt is not saved-for-later (nothing is removed)
pub async fn resume_saved_receipt<S: ReceiptStore>(store: &S, id: &str) -> CoreResult<ReceiptData> {
    let mut receipts = store.fetch_receipts().await?;
    let position = receipts
        .iter()
        .position(|r| r.id == id)
        .ok_or_else(|| CoreError::not_found("Receipt", id))?;

    if receipts[position].checkout_status != CheckoutStatus::SaveForLater {
        return Err(CoreError::InvalidState(format!(
            "receipt {} is {}, only SAVE_FOR_LATER receipts can be resumed",
            id, receipts[position].checkout_status
        )));
    }

    let mut cart = receipts.remove(position);
    store.update_receipts(receipts).await?;

    cart.checkout_status = CheckoutStatus::Pending;
    debug!(receipt_id = %id, lines = cart.item_count(), "Saved receipt resumed");
    Ok(cart)
}

// =============================================================================
// Unit Tests
// =============================================================================
