//! # History Commands
//!
//! Receipts already committed: listing, revenue, resume and delete.

use std::collections::BTreeMap;

use retreat_core::{history, CheckoutStatus, Money, PaymentMethod, ReceiptData};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{CartState, DbState};

/// Which receipts a history listing shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HistoryFilter {
    /// Every receipt, in commit order.
    All,
    /// CHECKED_OUT receipts.
    #[default]
    Purchased,
    /// SAVE_FOR_LATER receipts.
    Saved,
    /// Case-insensitive substring match on the buyer name.
    Buyer(String),
}

/// Revenue over CHECKED_OUT receipts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub total: Money,
    pub by_method: BTreeMap<PaymentMethod, Money>,
    /// CHECKED_OUT receipts counted in `total`.
    pub receipt_count: usize,
}

pub async fn list_receipts(db: &DbState, filter: HistoryFilter) -> Result<Vec<ReceiptData>, ApiError> {
    debug!(?filter, "list_receipts command");
    let store = db.inner();

    let receipts = match filter {
        HistoryFilter::All => history::get_all_receipts(store).await?,
        HistoryFilter::Purchased => history::get_purchase_history(store).await?,
        HistoryFilter::Saved => history::get_saved_for_later(store).await?,
        HistoryFilter::Buyer(query) => history::get_receipts_by_buyer(store, &query).await?,
    };

    Ok(receipts)
}

pub async fn revenue_summary(db: &DbState) -> Result<RevenueSummary, ApiError> {
    debug!("revenue_summary command");
    let receipts = history::get_all_receipts(db.inner()).await?;
    let purchased = history::with_status(&receipts, CheckoutStatus::CheckedOut);

    Ok(RevenueSummary {
        total: history::total_revenue(&receipts),
        by_method: history::revenue_by_method(&receipts),
        receipt_count: purchased.len(),
    })
}

pub async fn get_receipt(db: &DbState, id: &str) -> Result<ReceiptData, ApiError> {
    Ok(history::get_receipt_by_id(db.inner(), id).await?)
}

pub async fn delete_receipt(db: &DbState, id: &str) -> Result<(), ApiError> {
    debug!(receipt_id = %id, "delete_receipt command");
    Ok(history::delete_receipt(db.inner(), id).await?)
}

/// Moves a saved-for-later receipt back into the cart.
///
/// ## Errors
/// - `CART_ERROR` if the current cart has lines; nothing is resumed
/// - `NOT_FOUND` / `BUSINESS_LOGIC` from the resume itself
pub async fn resume_receipt(db: &DbState, cart: &CartState, id: &str) -> Result<ReceiptData, ApiError> {
    debug!(receipt_id = %id, "resume_receipt command");

    if !cart.snapshot().is_empty() {
        return Err(ApiError::cart("Finish or clear the current cart before resuming a receipt"));
    }

    let resumed = history::resume_saved_receipt(db.inner(), id).await?;
    cart.replace(resumed.clone());
    Ok(resumed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::checkout::{checkout, save_for_later};
    use crate::error::ErrorCode;
    use retreat_core::{cart, CheckoutItem};
    use retreat_db::{Database, DbConfig};

    async fn test_db() -> DbState {
        DbState::new(Database::new(DbConfig::in_memory()).await.unwrap())
    }

    fn fill(state: &CartState, name: &str, cents: i64, method: PaymentMethod) {
        let line = CheckoutItem::new(name, 1, Money::from_cents(cents));
        state.update(|c| cart::add_to_cart(c, line)).unwrap();
        state.update(|c| Ok(cart::set_payment_method(c, method))).unwrap();
    }

    #[tokio::test]
    async fn test_filters_and_revenue() {
        let db = test_db().await;
        let state = CartState::new();

        fill(&state, "Bible", 2000, PaymentMethod::Cash);
        checkout(&db, &state, "Jane Doe").await.unwrap();
        fill(&state, "Candle", 500, PaymentMethod::Venmo);
        checkout(&db, &state, "Mark").await.unwrap();
        fill(&state, "Hoodie", 3500, PaymentMethod::Cash);
        save_for_later(&db, &state, "jane").await.unwrap();

        assert_eq!(list_receipts(&db, HistoryFilter::All).await.unwrap().len(), 3);
        assert_eq!(list_receipts(&db, HistoryFilter::Purchased).await.unwrap().len(), 2);
        assert_eq!(list_receipts(&db, HistoryFilter::Saved).await.unwrap().len(), 1);
        assert_eq!(
            list_receipts(&db, HistoryFilter::Buyer("JANE".into())).await.unwrap().len(),
            2
        );

        let summary = revenue_summary(&db).await.unwrap();
        assert_eq!(summary.total, Money::from_cents(2500));
        assert_eq!(summary.receipt_count, 2);
        assert_eq!(summary.by_method[&PaymentMethod::Cash], Money::from_cents(2000));
        assert_eq!(summary.by_method[&PaymentMethod::Venmo], Money::from_cents(500));
    }

    #[tokio::test]
    async fn test_resume_into_empty_cart() {
        let db = test_db().await;
        let state = CartState::new();
        fill(&state, "Hoodie", 3500, PaymentMethod::Card);
        let saved = save_for_later(&db, &state, "Ann").await.unwrap();

        let resumed = resume_receipt(&db, &state, &saved.id).await.unwrap();

        assert_eq!(resumed.checkout_status, CheckoutStatus::Pending);
        assert_eq!(state.snapshot(), resumed);
        assert!(list_receipts(&db, HistoryFilter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resume_refuses_busy_cart() {
        let db = test_db().await;
        let state = CartState::new();
        fill(&state, "Hoodie", 3500, PaymentMethod::Card);
        let saved = save_for_later(&db, &state, "Ann").await.unwrap();
        fill(&state, "Candle", 500, PaymentMethod::Cash);

        let err = resume_receipt(&db, &state, &saved.id).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::CartError);
        assert_eq!(list_receipts(&db, HistoryFilter::Saved).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resume_paid_receipt_is_business_error() {
        let db = test_db().await;
        let state = CartState::new();
        fill(&state, "Bible", 2000, PaymentMethod::Cash);
        let paid = checkout(&db, &state, "Ann").await.unwrap();

        let err = resume_receipt(&db, &state, &paid.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let db = test_db().await;
        let state = CartState::new();
        fill(&state, "Bible", 2000, PaymentMethod::Cash);
        let paid = checkout(&db, &state, "Ann").await.unwrap();

        assert_eq!(get_receipt(&db, &paid.id).await.unwrap(), paid);
        delete_receipt(&db, &paid.id).await.unwrap();

        let err = get_receipt(&db, &paid.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
