//! # Key-Value Repository
//!
//! Raw access to the `kv_store` table. Values are opaque text here; the
//! typed list accessors on [`crate::Database`] do the JSON encoding.
//!
//! ```text
//! ┌──────────────────────┬──────────────────────────────┬──────────────────────────┐
//! │ key                  │ value                        │ updated_at               │
//! ├──────────────────────┼──────────────────────────────┼──────────────────────────┤
//! │ display_items        │ [{"id":"…","name":"Bible"…}] │ 2024-03-05T09:07:00Z     │
//! │ receipt_list         │ [{"id":"…","buyerName":…}]   │ 2024-03-05T09:08:12Z     │
//! │ sample_data_loaded   │ true                         │ 2024-03-01T08:00:00Z     │
//! └──────────────────────┴──────────────────────────────┴──────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Key of the catalog blob.
pub const DISPLAY_ITEMS_KEY: &str = "display_items";

/// Key of the receipt history blob.
pub const RECEIPT_LIST_KEY: &str = "receipt_list";

/// Key of the first-run flag.
pub const SAMPLE_DATA_LOADED_KEY: &str = "sample_data_loaded";

/// Repository for raw key-value rows.
///
/// ## Usage
/// ```rust,ignore
/// let kv = db.kv();
/// kv.put_raw("receipt_list", "[]").await?;
/// assert_eq!(kv.get_raw("receipt_list").await?.as_deref(), Some("[]"));
/// ```
#[derive(Debug, Clone)]
pub struct KvRepository {
    pool: SqlitePool,
}

impl KvRepository {
    pub fn new(pool: SqlitePool) -> Self {
        KvRepository { pool }
    }

    /// Reads a value, `None` if the key was never written.
    pub async fn get_raw(&self, key: &str) -> DbResult<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get::<String, _>("value")))
    }

    /// Inserts or overwrites a value.
    pub async fn put_raw(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, bytes = value.len(), "Writing kv value");

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes a key.
    pub async fn delete(&self, key: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Key", key));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_put_get_overwrite_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let kv = db.kv();

        assert_eq!(kv.get_raw("greeting").await.unwrap(), None);

        kv.put_raw("greeting", "hello").await.unwrap();
        kv.put_raw("greeting", "peace be with you").await.unwrap();
        assert_eq!(
            kv.get_raw("greeting").await.unwrap().as_deref(),
            Some("peace be with you")
        );

        kv.delete("greeting").await.unwrap();
        assert_eq!(kv.get_raw("greeting").await.unwrap(), None);
        assert!(kv.delete("greeting").await.is_err());
    }
}
