//! # First-Run Sample Catalog
//!
//! A fresh register starts with a small retreat-bookstore catalog so the
//! item grid is not empty on day one. The `sample_data_loaded` flag makes
//! this happen once per database.

use retreat_core::{CatalogStore, CoreResult, DisplayItem, ItemVariant, Money, SampleDataFlag};
use tracing::info;

use crate::pool::Database;

/// The catalog written on first run.
pub fn sample_catalog() -> Vec<DisplayItem> {
    vec![
        DisplayItem::new("Holy Bible (NRSV)", Money::from_cents(2000), Vec::new()),
        DisplayItem::new("Daily Prayer Journal", Money::from_cents(1200), Vec::new()),
        DisplayItem::new("Rosary", Money::from_cents(800), vec![ItemVariant::new("Bead", ["Wood", "Glass"])]),
        DisplayItem::new("Beeswax Candle", Money::from_cents(500), Vec::new()),
        DisplayItem::new(
            "Retreat T-Shirt",
            Money::from_cents(1500),
            vec![
                ItemVariant::new("Size", ["S", "M", "L", "XL"]),
                ItemVariant::new("Color", ["White", "Navy"]),
            ],
        ),
        DisplayItem::new(
            "Retreat Hoodie",
            Money::from_cents(3500),
            vec![ItemVariant::new("Size", ["S", "M", "L", "XL"])],
        ),
        DisplayItem::new("Worship CD", Money::from_cents(1000), Vec::new()),
    ]
}

/// Writes [`sample_catalog`] if the flag is unset, then sets the flag.
///
/// A catalog that already has entries is left alone; only the flag is set.
/// Returns whether sample items were written.
pub async fn load_sample_data_if_first_run<S>(store: &S) -> CoreResult<bool>
where
    S: CatalogStore + SampleDataFlag,
{
    if store.is_sample_data_loaded().await? {
        return Ok(false);
    }

    let wrote = if store.fetch_display_items().await?.is_empty() {
        let catalog = sample_catalog();
        info!(items = catalog.len(), "Loading sample catalog");
        store.update_display_items(catalog).await?;
        true
    } else {
        false
    };

    store.set_sample_data_loaded(true).await?;
    Ok(wrote)
}

impl Database {
    /// See [`load_sample_data_if_first_run`].
    pub async fn load_sample_data_if_first_run(&self) -> CoreResult<bool> {
        load_sample_data_if_first_run(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbConfig;
    use retreat_core::validation::validate_variants;
    use retreat_core::MemoryStore;

    #[test]
    fn test_sample_catalog_is_valid() {
        let catalog = sample_catalog();
        for item in &catalog {
            assert!(item.price.is_positive(), "{}", item.name);
            assert!(validate_variants(&item.variants).is_ok(), "{}", item.name);
        }

        let mut names: Vec<_> = catalog.iter().map(|i| i.name.to_lowercase()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), catalog.len());
    }

    #[tokio::test]
    async fn test_loads_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.load_sample_data_if_first_run().await.unwrap());
        let first = db.display_items().await.unwrap();
        assert_eq!(first.len(), sample_catalog().len());

        db.save_display_items(Vec::new()).await.unwrap();
        assert!(!db.load_sample_data_if_first_run().await.unwrap());
        assert!(db.display_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_existing_catalog_is_kept() {
        let own = DisplayItem::new("Icon Print", Money::from_cents(2500), Vec::new());
        let store = MemoryStore::with_display_items(vec![own.clone()]);

        assert!(!load_sample_data_if_first_run(&store).await.unwrap());
        assert_eq!(store.fetch_display_items().await.unwrap(), vec![own]);
        assert!(store.is_sample_data_loaded().await.unwrap());
    }
}
