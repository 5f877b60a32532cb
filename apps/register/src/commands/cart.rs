//! # Cart Commands
//!
//! Commands that reshape the current cart.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────────┐                    │
//! │  │  Empty   │────►│ In Cart  │────►│   Receipt    │                    │
//! │  │  Cart    │     │          │     │  (history)   │                    │
//! │  └──────────┘     └──────────┘     └──────────────┘                    │
//! │       ▲                │   checkout / save_for_later (checkout.rs)     │
//! │       │           add_item_to_cart                                     │
//! │       │           update_cart_quantity                                 │
//! │       │           remove_cart_item                                     │
//! │       │                │                                                │
//! │       └─── clear_cart ─┘                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use retreat_core::{cart, CheckoutItem, Money, PaymentMethod, ReceiptData};
use serde::Serialize;
use tracing::debug;

use crate::commands::catalog::find_item;
use crate::error::ApiError;
use crate::state::{CartState, DbState};

/// Cart plus its derived totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub cart: ReceiptData,
    pub total: Money,
    /// Sum of line quantities.
    pub item_count: i64,
}

impl From<ReceiptData> for CartResponse {
    fn from(cart: ReceiptData) -> Self {
        CartResponse {
            total: cart::calculate_total(&cart),
            item_count: cart::get_item_count(&cart),
            cart,
        }
    }
}

/// Gets the current cart contents.
pub fn get_cart(cart: &CartState) -> CartResponse {
    debug!("get_cart command");
    CartResponse::from(cart.snapshot())
}

/// Adds a catalog item to the cart.
///
/// ## Behavior
/// - `reference` is a catalog id or name
/// - Variants not named in `selections` take their first value
/// - A line with the same name and selections is merged
pub async fn add_item_to_cart(
    db: &DbState,
    cart: &CartState,
    reference: &str,
    quantity: i64,
    selections: &BTreeMap<String, String>,
) -> Result<CartResponse, ApiError> {
    debug!(reference = %reference, quantity, "add_item_to_cart command");

    let item = find_item(db, reference).await?;
    let line = CheckoutItem::from_display_item(&item, quantity, selections)?;
    let updated = cart.update(|c| cart::add_to_cart(c, line))?;

    Ok(CartResponse::from(updated))
}

/// Sets a line's quantity; the line total follows its unit price.
pub fn update_cart_quantity(
    cart: &CartState,
    line_id: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(line_id = %line_id, quantity, "update_cart_quantity command");
    let updated = cart.update(|c| cart::update_quantity(c, line_id, quantity))?;
    Ok(CartResponse::from(updated))
}

pub fn remove_cart_item(cart: &CartState, line_id: &str) -> Result<CartResponse, ApiError> {
    debug!(line_id = %line_id, "remove_cart_item command");
    let updated = cart.update(|c| cart::remove_from_cart(c, line_id))?;
    Ok(CartResponse::from(updated))
}

/// Empties the cart, keeping its id, buyer and payment method.
pub fn clear_cart(cart: &CartState) -> Result<CartResponse, ApiError> {
    debug!("clear_cart command");
    let updated = cart.update(|c| Ok(cart::clear_cart(c)))?;
    Ok(CartResponse::from(updated))
}

pub fn set_payment_method(cart: &CartState, method: PaymentMethod) -> Result<CartResponse, ApiError> {
    debug!(method = %method, "set_payment_method command");
    let updated = cart.update(|c| Ok(cart::set_payment_method(c, method)))?;
    Ok(CartResponse::from(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::catalog::add_item;
    use crate::error::ErrorCode;
    use retreat_core::ItemVariant;
    use retreat_db::{Database, DbConfig};

    async fn stocked_db() -> DbState {
        let db = DbState::new(Database::new(DbConfig::in_memory()).await.unwrap());
        add_item(
            &db,
            "Retreat T-Shirt",
            Money::from_cents(1500),
            vec![ItemVariant::new("Size", ["S", "M", "L"])],
        )
        .await
        .unwrap();
        db
    }

    fn size(value: &str) -> BTreeMap<String, String> {
        BTreeMap::from([("Size".to_string(), value.to_string())])
    }

    #[tokio::test]
    async fn test_add_merges_same_selection() {
        let db = stocked_db().await;
        let state = CartState::new();

        add_item_to_cart(&db, &state, "retreat t-shirt", 1, &size("L")).await.unwrap();
        let response = add_item_to_cart(&db, &state, "Retreat T-Shirt", 2, &size("L"))
            .await
            .unwrap();

        assert_eq!(response.cart.checkout_list.len(), 1);
        assert_eq!(response.item_count, 3);
        assert_eq!(response.total, Money::from_cents(4500));
    }

    #[tokio::test]
    async fn test_distinct_selections_get_own_lines() {
        let db = stocked_db().await;
        let state = CartState::new();

        add_item_to_cart(&db, &state, "Retreat T-Shirt", 1, &size("L")).await.unwrap();
        let response = add_item_to_cart(&db, &state, "Retreat T-Shirt", 1, &size("M"))
            .await
            .unwrap();
        assert_eq!(response.cart.checkout_list.len(), 2);

        // No selection means the first listed size
        let response = add_item_to_cart(&db, &state, "Retreat T-Shirt", 1, &BTreeMap::new())
            .await
            .unwrap();
        assert_eq!(response.cart.checkout_list.len(), 3);
        assert_eq!(response.cart.checkout_list[2].variants_label(), "Size: S");
    }

    #[tokio::test]
    async fn test_bad_selection_leaves_cart_untouched() {
        let db = stocked_db().await;
        let state = CartState::new();

        let err = add_item_to_cart(&db, &state, "Retreat T-Shirt", 1, &size("XXL"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(get_cart(&state).cart.is_empty());
    }

    #[tokio::test]
    async fn test_update_and_remove_line() {
        let db = stocked_db().await;
        let state = CartState::new();
        let added = add_item_to_cart(&db, &state, "Retreat T-Shirt", 1, &size("M"))
            .await
            .unwrap();
        let line_id = added.cart.checkout_list[0].id.clone();

        let updated = update_cart_quantity(&state, &line_id, 4).unwrap();
        assert_eq!(updated.total, Money::from_cents(6000));

        let err = update_cart_quantity(&state, &line_id, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let removed = remove_cart_item(&state, &line_id).unwrap();
        assert!(removed.cart.is_empty());

        let err = remove_cart_item(&state, &line_id).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_clear_keeps_payment_method() {
        let db = stocked_db().await;
        let state = CartState::new();
        add_item_to_cart(&db, &state, "Retreat T-Shirt", 1, &size("M")).await.unwrap();
        set_payment_method(&state, PaymentMethod::Venmo).unwrap();

        let cleared = clear_cart(&state).unwrap();

        assert!(cleared.cart.is_empty());
        assert_eq!(cleared.cart.payment_method, PaymentMethod::Venmo);
        assert_eq!(cleared.total, Money::zero());
    }
}
