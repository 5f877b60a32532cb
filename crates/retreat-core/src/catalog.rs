//! # Catalog Use Case
//!
//! Inventory management for the item grid: add, edit, delete, list.
//!
//! `name` is the catalog's business key. Two entries may not share a name
//! ignoring case, because the cart merges lines by name.

use tracing::debug;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::store::CatalogStore;
use crate::types::{DisplayItem, ItemVariant, ReceiptData};
use crate::validation::{validate_item_name, validate_price, validate_variants};

fn check_item(items: &[DisplayItem], candidate: &DisplayItem) -> CoreResult<()> {
    validate_item_name(&candidate.name)?;
    validate_price(candidate.price, "price")?;
    validate_variants(&candidate.variants)?;

    let name = candidate.name.trim().to_lowercase();
    let taken = items
        .iter()
        .any(|other| other.id != candidate.id && other.name.trim().to_lowercase() == name);
    if taken {
        return Err(ValidationError::Duplicate {
            field: "item name".to_string(),
            value: candidate.name.trim().to_string(),
        }
        .into());
    }

    Ok(())
}

/// Creates a catalog entry and persists the catalog.
pub async fn add_display_item<S: CatalogStore>(
    store: &S,
    name: &str,
    price: Money,
    variants: Vec<ItemVariant>,
) -> CoreResult<DisplayItem> {
    let mut items = store.fetch_display_items().await?;
    let item = DisplayItem::new(name.trim(), price, variants);
    check_item(&items, &item)?;

    items.push(item.clone());
    store.update_display_items(items).await?;

    debug!(item_id = %item.id, name = %item.name, "Display item added");
    Ok(item)
}

/// Replaces the entry with the same id.
pub async fn update_display_item<S: CatalogStore>(store: &S, item: DisplayItem) -> CoreResult<DisplayItem> {
    let mut items = store.fetch_display_items().await?;
    let slot = items
        .iter()
        .position(|existing| existing.id == item.id)
        .ok_or_else(|| CoreError::not_found("Display item", item.id.as_str()))?;

    let item = DisplayItem {
        name: item.name.trim().to_string(),
        ..item
    };
    check_item(&items, &item)?;

    items[slot] = item.clone();
    store.update_display_items(items).await?;

    debug!(item_id = %item.id, "Display item updated");
    Ok(item)
}

pub async fn delete_display_item<S: CatalogStore>(store: &S, id: &str) -> CoreResult<()> {
    let mut items = store.fetch_display_items().await?;
    let before = items.len();
    items.retain(|item| item.id != id);

    if items.len() == before {
        return Err(CoreError::not_found("Display item", id));
    }

    store.update_display_items(items).await?;
    debug!(item_id = %id, "Display item deleted");
    Ok(())
}

/// Catalog sorted by name, ignoring case.
pub async fn get_display_items<S: CatalogStore>(store: &S) -> CoreResult<Vec<DisplayItem>> {
    let mut items = store.fetch_display_items().await?;
    items.sort_by_cached_key(|item| item.name.to_lowercase());
    Ok(items)
}

/// Marks each entry whose name appears on a cart line.
pub fn sync_in_cart_flags(items: &[DisplayItem], cart: &ReceiptData) -> Vec<DisplayItem> {
    items
        .iter()
        .map(|item| DisplayItem {
            is_in_cart: cart
                .checkout_list
                .iter()
                .any(|line| line.item_name == item.name),
            ..item.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::CheckoutItem;

    #[tokio::test]
    async fn test_add_and_list_sorted() {
        let store = MemoryStore::new();
        add_display_item(&store, "rosary", Money::from_cents(800), Vec::new())
            .await
            .unwrap();
        add_display_item(&store, " Bible ", Money::from_cents(2000), Vec::new())
            .await
            .unwrap();
        add_display_item(&store, "Candle", Money::from_cents(500), Vec::new())
            .await
            .unwrap();

        let names: Vec<_> = get_display_items(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, vec!["Bible", "Candle", "rosary"]);
    }

    #[tokio::test]
    async fn test_add_rejects_duplicates_and_bad_input() {
        let store = MemoryStore::new();
        add_display_item(&store, "Bible", Money::from_cents(2000), Vec::new())
            .await
            .unwrap();

        let dup = add_display_item(&store, "BIBLE", Money::from_cents(1000), Vec::new()).await;
        assert!(matches!(
            dup.unwrap_err(),
            CoreError::Validation(ValidationError::Duplicate { .. })
        ));

        assert!(add_display_item(&store, "", Money::from_cents(100), Vec::new()).await.is_err());
        assert!(add_display_item(&store, "Free", Money::zero(), Vec::new()).await.is_err());
        assert!(add_display_item(
            &store,
            "Shirt",
            Money::from_cents(1500),
            vec![ItemVariant::new("Size", Vec::<String>::new())]
        )
        .await
        .is_err());

        assert_eq!(store.fetch_display_items().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = MemoryStore::new();
        let bible = add_display_item(&store, "Bible", Money::from_cents(2000), Vec::new())
            .await
            .unwrap();
        let candle = add_display_item(&store, "Candle", Money::from_cents(500), Vec::new())
            .await
            .unwrap();

        // keeping its own name is fine, taking another's is not
        let repriced = DisplayItem {
            price: Money::from_cents(2200),
            ..bible.clone()
        };
        assert_eq!(
            update_display_item(&store, repriced).await.unwrap().price,
            Money::from_cents(2200)
        );

        let clash = DisplayItem {
            name: "candle".to_string(),
            ..bible.clone()
        };
        assert!(update_display_item(&store, clash).await.is_err());

        let ghost = DisplayItem::new("Ghost", Money::from_cents(100), Vec::new());
        assert!(matches!(
            update_display_item(&store, ghost).await.unwrap_err(),
            CoreError::NotFound { .. }
        ));

        delete_display_item(&store, &candle.id).await.unwrap();
        assert!(delete_display_item(&store, &candle.id).await.is_err());
        assert_eq!(store.fetch_display_items().await.unwrap().len(), 1);
    }

    #[test]
    fn test_sync_in_cart_flags() {
        let items = vec![
            DisplayItem::new("Bible", Money::from_cents(2000), Vec::new()),
            DisplayItem::new("Candle", Money::from_cents(500), Vec::new()),
        ];
        let cart = ReceiptData {
            checkout_list: vec![CheckoutItem::new("Candle", 1, Money::from_cents(500))],
            ..ReceiptData::new()
        };

        let flagged = sync_in_cart_flags(&items, &cart);
        assert!(!flagged[0].is_in_cart);
        assert!(flagged[1].is_in_cart);

        let cleared = sync_in_cart_flags(&flagged, &ReceiptData::new());
        assert!(cleared.iter().all(|item| !item.is_in_cart));
    }
}
