//! # Cart Use Case
//!
//! Pure transformations of the in-progress cart.
//!
//! Every function takes the current cart by reference and returns either a
//! new cart or a typed failure; the input is never mutated. Holding the
//! "current" cart and serializing writers is the host's job.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operator Action         Function                 Result               │
//! │  ───────────────         ────────                 ──────               │
//! │                                                                         │
//! │  Tap item ──────────────► add_to_cart() ────────► merged or new line   │
//! │  Change quantity ───────► update_quantity() ────► re-priced line       │
//! │  Swipe away ────────────► remove_from_cart() ───► line dropped         │
//! │  Clear ─────────────────► clear_cart() ─────────► empty list           │
//! │  Checkout button ───────► validate_cart() ──────► first failing rule   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CheckoutItem, PaymentMethod, ReceiptData};
use crate::validation::{validate_line_name, validate_price, validate_quantity};

/// Adds a line to the cart.
///
/// ## Behavior
/// - Blank name, quantity ≤ 0 or total ≤ 0: `ValidationError`
/// - A line with the same name AND the same variant selections exists:
///   quantities and totals are summed into that line (`TooLarge` if
///   either sum overflows)
/// - Otherwise the item is appended as a new line
///
/// ## Example
/// ```rust
/// use retreat_core::{cart, CheckoutItem, Money, ReceiptData};
///
/// let cart = ReceiptData::new();
/// let cart = cart::add_to_cart(&cart, CheckoutItem::new("Bible", 1, Money::from_cents(2000))).unwrap();
/// let cart = cart::add_to_cart(&cart, CheckoutItem::new("Bible", 2, Money::from_cents(4000))).unwrap();
///
/// assert_eq!(cart.checkout_list.len(), 1);
/// assert_eq!(cart.checkout_list[0].quantity, 3);
/// ```
pub fn add_to_cart(cart: &ReceiptData, new_item: CheckoutItem) -> CoreResult<ReceiptData> {
    validate_line_name(&new_item.item_name)?;
    validate_quantity(new_item.quantity)?;
    validate_price(new_item.total_price, "total price")?;

    let mut updated = cart.clone();
    let selections = new_item.variants_map();

    match updated
        .checkout_list
        .iter_mut()
        .find(|line| line.item_name == new_item.item_name && line.variants_map() == selections)
    {
        Some(line) => {
            let quantity = line
                .quantity
                .checked_add(new_item.quantity)
                .ok_or_else(|| ValidationError::too_large("quantity"))?;
            let total_price = line
                .total_price
                .checked_add(new_item.total_price)
                .ok_or_else(|| ValidationError::too_large("total price"))?;

            line.quantity = quantity;
            line.total_price = total_price;
        }
        None => updated.checkout_list.push(new_item),
    }

    Ok(updated)
}

/// Removes the line with `item_id`.
///
/// Fails with `NotFound` when no line matches; the cart is unchanged.
pub fn remove_from_cart(cart: &ReceiptData, item_id: &str) -> CoreResult<ReceiptData> {
    let mut updated = cart.clone();
    updated.checkout_list.retain(|line| line.id != item_id);

    if updated.checkout_list.len() == cart.checkout_list.len() {
        return Err(CoreError::not_found("Cart item", item_id));
    }

    Ok(updated)
}

/// Sets a line's quantity, keeping its unit price.
///
/// ## Behavior
/// - `new_quantity` ≤ 0: `ValidationError`
/// - No line with `item_id`: `NotFound`
/// - Stored line has quantity ≤ 0 or total ≤ 0: `InvalidState` (its unit
///   price cannot be derived)
/// - Otherwise `total = total × new_quantity ÷ quantity`, rounded half-up
pub fn update_quantity(
    cart: &ReceiptData,
    item_id: &str,
    new_quantity: i64,
) -> CoreResult<ReceiptData> {
    validate_quantity(new_quantity)?;

    let mut updated = cart.clone();
    let line = updated
        .checkout_list
        .iter_mut()
        .find(|line| line.id == item_id)
        .ok_or_else(|| CoreError::not_found("Cart item", item_id))?;

    if line.quantity <= 0 || !line.total_price.is_positive() {
        return Err(CoreError::InvalidState(format!(
            "line '{}' has quantity {} and total {}, unit price is undefined",
            line.item_name, line.quantity, line.total_price
        )));
    }

    line.total_price = line
        .total_price
        .scale(new_quantity, line.quantity)
        .ok_or_else(|| CoreError::InvalidState(format!("cannot re-price line '{}'", line.item_name)))?;
    line.quantity = new_quantity;

    Ok(updated)
}

/// Returns the cart with no lines. Buyer, payment method and id are kept.
pub fn clear_cart(cart: &ReceiptData) -> ReceiptData {
    ReceiptData {
        checkout_list: Vec::new(),
        ..cart.clone()
    }
}

/// Sum of all line totals.
pub fn calculate_total(cart: &ReceiptData) -> Money {
    cart.total_price()
}

/// Sum of all line quantities.
pub fn get_item_count(cart: &ReceiptData) -> i64 {
    cart.total_quantity()
}

/// Checks the cart can be checked out.
///
/// Rules, in priority order (the first failure wins):
/// 1. cart is not empty → `EmptyCart`
/// 2. every quantity > 0
/// 3. every total > 0
/// 4. every item name is non-blank
pub fn validate_cart(cart: &ReceiptData) -> CoreResult<()> {
    if cart.checkout_list.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    if cart.checkout_list.iter().any(|line| line.quantity <= 0) {
        return Err(ValidationError::must_be_positive("quantity").into());
    }

    if cart.checkout_list.iter().any(|line| !line.total_price.is_positive()) {
        return Err(ValidationError::must_be_positive("total price").into());
    }

    if cart.checkout_list.iter().any(|line| line.item_name.trim().is_empty()) {
        return Err(ValidationError::required("item name").into());
    }

    Ok(())
}

/// Whether a line with this name and exactly these selections is present.
pub fn contains_item(
    cart: &ReceiptData,
    item_name: &str,
    variants_map: &BTreeMap<String, String>,
) -> bool {
    cart.checkout_list
        .iter()
        .any(|line| line.item_name == item_name && &line.variants_map() == variants_map)
}

/// Looks up a line by id.
pub fn get_item_by_id<'a>(cart: &'a ReceiptData, item_id: &str) -> CoreResult<&'a CheckoutItem> {
    cart.checkout_list
        .iter()
        .find(|line| line.id == item_id)
        .ok_or_else(|| CoreError::not_found("Cart item", item_id))
}

/// Records how the buyer intends to pay.
pub fn set_payment_method(cart: &ReceiptData, method: PaymentMethod) -> ReceiptData {
    ReceiptData {
        payment_method: method,
        ..cart.clone()
    }
}

/// Records the buyer's name on the cart (kept as entered).
pub fn set_buyer_name(cart: &ReceiptData, buyer_name: &str) -> ReceiptData {
    ReceiptData {
        buyer_name: buyer_name.to_string(),
        ..cart.clone()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
