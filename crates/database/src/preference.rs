//! Key/value preference storage.
//!
//! Holds small per-user settings; currently only the contact list sort
//! order.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::Result;

/// Preference key under which the sort order is stored.
pub const SORT_ORDER_KEY: &str = "sort_order";

/// Contact list sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Case-insensitive by name, A to Z.
    NameAsc,
    /// Case-insensitive by name, Z to A.
    NameDesc,
    /// Newest contacts first.
    RecentlyAdded,
}

impl SortOrder {
    /// Stable name used for persistence.
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::NameAsc => "NAME_ASC",
            SortOrder::NameDesc => "NAME_DESC",
            SortOrder::RecentlyAdded => "RECENTLY_ADDED",
        }
    }

    /// Parse a persisted name. Unknown values return `None`.
    pub fn parse(value: &str) -> Option<SortOrder> {
        match value {
            "NAME_ASC" => Some(SortOrder::NameAsc),
            "NAME_DESC" => Some(SortOrder::NameDesc),
            "RECENTLY_ADDED" => Some(SortOrder::RecentlyAdded),
            _ => None,
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::NameAsc
    }
}

/// Create or update a preference entry.
pub async fn set(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO preferences (key, value)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = datetime('now')
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a preference value by key.
pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value = sqlx::query_scalar::<_, String>(
        r#"
        SELECT value
        FROM preferences
        WHERE key = ?
        "#,
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;

    Ok(value)
}

/// Get the persisted sort order, falling back to [`SortOrder::NameAsc`]
/// when unset or unrecognized.
pub async fn get_sort_order(pool: &SqlitePool) -> Result<SortOrder> {
    let stored = get(pool, SORT_ORDER_KEY).await?;
    Ok(stored
        .as_deref()
        .and_then(SortOrder::parse)
        .unwrap_or_default())
}

/// Persist the sort order.
pub async fn set_sort_order(pool: &SqlitePool, order: SortOrder) -> Result<()> {
    set(pool, SORT_ORDER_KEY, order.as_str()).await
}
