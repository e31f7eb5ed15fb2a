//! Append-only log of committed writes, polled by live queries.

use sqlx::{Row, SqliteConnection};

use crate::db::DbPool;
use crate::models::{Change, Scope};

pub(crate) async fn record(conn: &mut SqliteConnection, change: &Change) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        "INSERT INTO changes (scope, key, context, timestamp) VALUES (?, ?, ?, ?) RETURNING ordinal",
    )
    .bind(change.scope.as_str())
    .bind(&change.key)
    .bind(&change.context)
    .bind(change.timestamp)
    .fetch_one(conn)
    .await?;

    Ok(row.get("ordinal"))
}

/// Changes in `scope` after `ordinal`, oldest first.
pub(crate) async fn since(pool: &DbPool, scope: Scope, ordinal: i64) -> Result<Vec<Change>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, String, i64)>(
        "SELECT ordinal, key, context, timestamp FROM changes WHERE scope = ? AND ordinal > ? ORDER BY ordinal LIMIT 100",
    )
    .bind(scope.as_str())
    .bind(ordinal)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(ordinal, key, context, timestamp)| Change {
            ordinal,
            scope,
            key,
            context,
            timestamp,
        })
        .collect())
}

/// Ordinal of the last change in `scope` written before `timestamp`.
pub(crate) async fn before(pool: &DbPool, scope: Scope, timestamp: i64) -> Result<i64, sqlx::Error> {
    let (ordinal,): (Option<i64>,) =
        sqlx::query_as("SELECT MAX(ordinal) FROM changes WHERE scope = ? AND timestamp < ?")
            .bind(scope.as_str())
            .bind(timestamp)
            .fetch_one(pool)
            .await?;
    Ok(ordinal.unwrap_or(0))
}
