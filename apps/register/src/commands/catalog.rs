//! # Catalog Commands
//!
//! The item grid the operator picks from.

use retreat_core::{catalog, DisplayItem, ItemVariant, Money};
use tracing::debug;

use crate::error::ApiError;
use crate::state::{CartState, DbState};

/// Catalog sorted by name, with `is_in_cart` reflecting the current cart.
pub async fn list_items(db: &DbState, cart: &CartState) -> Result<Vec<DisplayItem>, ApiError> {
    debug!("list_items command");
    let items = catalog::get_display_items(db.inner()).await?;
    Ok(catalog::sync_in_cart_flags(&items, &cart.snapshot()))
}

/// Adds a catalog entry.
///
/// ## Errors
/// - `VALIDATION_ERROR` for a blank or duplicate name, a non-positive price,
///   or malformed variants
pub async fn add_item(
    db: &DbState,
    name: &str,
    price: Money,
    variants: Vec<ItemVariant>,
) -> Result<DisplayItem, ApiError> {
    debug!(name = %name, price = %price, "add_item command");
    Ok(catalog::add_display_item(db.inner(), name, price, variants).await?)
}

pub async fn update_item(db: &DbState, item: DisplayItem) -> Result<DisplayItem, ApiError> {
    debug!(item_id = %item.id, "update_item command");
    Ok(catalog::update_display_item(db.inner(), item).await?)
}

pub async fn delete_item(db: &DbState, id: &str) -> Result<(), ApiError> {
    debug!(item_id = %id, "delete_item command");
    Ok(catalog::delete_display_item(db.inner(), id).await?)
}

/// Resolves an operator reference to a catalog entry: exact id first, then
/// case-insensitive name.
pub async fn find_item(db: &DbState, reference: &str) -> Result<DisplayItem, ApiError> {
    let items = catalog::get_display_items(db.inner()).await?;
    let reference = reference.trim();

    items
        .iter()
        .find(|item| item.id == reference)
        .or_else(|| items.iter().find(|item| item.name.eq_ignore_ascii_case(reference)))
        .cloned()
        .ok_or_else(|| ApiError::not_found("Display item", reference))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use retreat_core::{cart, CheckoutItem};
    use retreat_db::{Database, DbConfig};

    async fn test_db() -> DbState {
        DbState::new(Database::new(DbConfig::in_memory()).await.unwrap())
    }

    #[tokio::test]
    async fn test_list_marks_cart_items() {
        let db = test_db().await;
        let cart_state = CartState::new();
        add_item(&db, "Candle", Money::from_cents(500), Vec::new()).await.unwrap();
        add_item(&db, "Bible", Money::from_cents(2000), Vec::new()).await.unwrap();

        let line = CheckoutItem::new("Candle", 1, Money::from_cents(500));
        cart_state.update(|c| cart::add_to_cart(c, line)).unwrap();

        let items = list_items(&db, &cart_state).await.unwrap();
        let flags: Vec<_> = items.iter().map(|i| (i.name.as_str(), i.is_in_cart)).collect();
        assert_eq!(flags, vec![("Bible", false), ("Candle", true)]);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = test_db().await;
        add_item(&db, "Rosary", Money::from_cents(800), Vec::new()).await.unwrap();

        let err = add_item(&db, "rosary", Money::from_cents(900), Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_find_by_id_or_name() {
        let db = test_db().await;
        let added = add_item(&db, "Worship CD", Money::from_cents(1000), Vec::new())
            .await
            .unwrap();

        assert_eq!(find_item(&db, &added.id).await.unwrap(), added);
        assert_eq!(find_item(&db, "worship cd").await.unwrap(), added);

        let err = find_item(&db, "Hymnal").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_update_renames_item() {
        let db = test_db().await;
        let added = add_item(&db, "Candle", Money::from_cents(500), Vec::new()).await.unwrap();

        let renamed = update_item(
            &db,
            DisplayItem {
                name: " Beeswax Candle ".into(),
                ..added.clone()
            },
        )
        .await
        .unwrap();

        assert_eq!(renamed.id, added.id);
        assert_eq!(find_item(&db, "beeswax candle").await.unwrap().name, "Beeswax Candle");
    }

    #[tokio::test]
    async fn test_delete_missing_item() {
        let db = test_db().await;
        let err = delete_item(&db, "nope").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
