//! # Export Commands
//!
//! Renders purchase history as CSV and hands it to a [`ShareTarget`].
//!
//! ```text
//! history::get_purchase_history(db)
//!        │
//!        ▼
//! config.reporter().render(kind, &receipts)     (CSV text)
//!        │
//!        ▼
//! share.share_csv(content, purchase_history_<millis>.csv)
//!        │
//!        ▼
//! ExportResponse { location, file_name, receipt_count }
//! ```

use chrono::Utc;
use retreat_core::report::{export_file_name, ReportKind};
use retreat_core::{history, ShareTarget};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{ConfigState, DbState};

/// Where an export ended up.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    /// What the share target reported (a file path for [`crate::share::FileShare`])
    pub location: String,
    pub file_name: String,
    pub receipt_count: usize,
}

/// CSV text for the CHECKED_OUT receipts, without delivering it.
pub async fn render_csv(db: &DbState, config: &ConfigState, kind: ReportKind) -> Result<String, ApiError> {
    let receipts = history::get_purchase_history(db.inner()).await?;
    Ok(config.reporter().render(kind, &receipts))
}

/// Renders the CHECKED_OUT receipts as `kind` and shares the file.
pub async fn export_csv<T: ShareTarget>(
    db: &DbState,
    config: &ConfigState,
    share: &T,
    kind: ReportKind,
) -> Result<ExportResponse, ApiError> {
    debug!(%kind, "export_csv command");

    let receipts = history::get_purchase_history(db.inner()).await?;
    let content = config.reporter().render(kind, &receipts);
    let file_name = export_file_name(Utc::now());

    let location = share.share_csv(&content, &file_name).await?;

    Ok(ExportResponse {
        location,
        file_name,
        receipt_count: receipts.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::checkout::{checkout, save_for_later};
    use crate::error::ErrorCode;
    use crate::share::FileShare;
    use crate::state::CartState;
    use retreat_core::{cart, CheckoutItem, CoreError, CoreResult, Money};
    use retreat_db::{Database, DbConfig};

    struct BrokenShare;

    impl ShareTarget for BrokenShare {
        async fn share_csv(&self, _content: &str, _file_name: &str) -> CoreResult<String> {
            Err(CoreError::Share("no share sheet".into()))
        }
    }

    async fn db_with_sales() -> DbState {
        let db = DbState::new(Database::new(DbConfig::in_memory()).await.unwrap());
        let state = CartState::new();

        let line = CheckoutItem::new("Bible", 2, Money::from_cents(4000));
        state.update(|c| cart::add_to_cart(c, line)).unwrap();
        checkout(&db, &state, "Jane").await.unwrap();

        let line = CheckoutItem::new("Candle", 1, Money::from_cents(500));
        state.update(|c| cart::add_to_cart(c, line)).unwrap();
        save_for_later(&db, &state, "Tom").await.unwrap();

        db
    }

    #[tokio::test]
    async fn test_export_writes_purchased_only() {
        let db = db_with_sales().await;
        let tmp = tempfile::tempdir().unwrap();
        let share = FileShare::new(tmp.path());

        let response = export_csv(&db, &ConfigState::default(), &share, ReportKind::ByItem)
            .await
            .unwrap();

        assert_eq!(response.receipt_count, 1);
        assert!(response.file_name.starts_with("purchase_history_"));
        assert!(response.file_name.ends_with(".csv"));

        let written = std::fs::read_to_string(&response.location).unwrap();
        assert_eq!(
            written,
            "Item Name,Total Quantity,Total Price\n\"Bible\",2,40.00\n\"Grand Total\",2,\"40.00\"\n"
        );
    }

    #[tokio::test]
    async fn test_render_matches_export_body() {
        let db = db_with_sales().await;
        let config = ConfigState::default();

        let csv = render_csv(&db, &config, ReportKind::Combined).await.unwrap();
        assert!(csv.starts_with("=== DETAILED PURCHASE HISTORY ==="));
        assert!(!csv.contains("Candle"));
    }

    #[tokio::test]
    async fn test_share_failure_surfaces() {
        let db = db_with_sales().await;

        let err = export_csv(&db, &ConfigState::default(), &BrokenShare, ReportKind::Detailed)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ShareError);
    }
}
