//! Document collections stored in the `documents` table.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use riziq_console::{instant, DocumentCollection, SnapshotStream};
use riziq_types::{Document, Fields};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::changes;
use crate::db::{latest_ordinal, DbPool};
use crate::models::{Change, Scope, StoredDocument};
use crate::Error;

/// One named collection; every write is logged so live queries can follow it.
#[derive(Clone)]
pub struct SqliteCollection {
    pool: DbPool,
    name: String,
    poll_interval: Duration,
}

impl SqliteCollection {
    pub fn new(pool: DbPool, name: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            pool,
            name: name.into(),
            poll_interval,
        }
    }

    /// Every document, newest `order_by` first.
    pub async fn snapshot(&self, order_by: &str) -> Result<Vec<Document>, Error> {
        snapshot(&self.pool, &self.name, order_by).await
    }

    /// Stores `fields` under a caller-chosen id, replacing any document there.
    pub async fn put(&self, id: &str, fields: &Fields) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO documents (collection, id, fields, created_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(collection, id) DO UPDATE SET fields = excluded.fields",
        )
        .bind(&self.name)
        .bind(id)
        .bind(serde_json::to_string(fields)?)
        .bind(Utc::now().timestamp_millis())
        .execute(&mut *tx)
        .await?;
        changes::record(&mut *tx, &self.change()).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn find(&self, id: &str) -> Result<Option<Document>, Error> {
        let row = sqlx::query_as::<_, (String, String)>(
            "SELECT id, fields FROM documents WHERE collection = ? AND id = ?",
        )
        .bind(&self.name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| StoredDocument::from(row).decode()).transpose()
    }

    pub async fn patch(&self, id: &str, patch: Fields) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, (String, String)>(
            "SELECT id, fields FROM documents WHERE collection = ? AND id = ?",
        )
        .bind(&self.name)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let mut document = StoredDocument::from(row).decode()?;
        document.fields.extend(patch);

        sqlx::query("UPDATE documents SET fields = ? WHERE collection = ? AND id = ?")
            .bind(serde_json::to_string(&document.fields)?)
            .bind(&self.name)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        changes::record(&mut *tx, &self.change()).await?;
        tx.commit().await?;

        debug!(collection = %self.name, id, "document updated");
        Ok(())
    }

    pub async fn remove(&self, id: &str) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(&self.name)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        changes::record(&mut *tx, &self.change()).await?;
        tx.commit().await?;

        info!(collection = %self.name, id, "document deleted");
        Ok(())
    }

    fn change(&self) -> Change {
        Change::new(Scope::Collection, self.name.clone(), String::new())
    }
}

#[async_trait]
impl DocumentCollection for SqliteCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn watch(&self, order_by: &str) -> Result<SnapshotStream, riziq_console::Error> {
        let pool = self.pool.clone();
        let name = self.name.clone();
        let order_by = order_by.to_string();
        let poll_interval = self.poll_interval;
        let mut seen = latest_ordinal(&pool).await.map_err(Error::from)?;
        let first = snapshot(&pool, &name, &order_by).await?;

        let stream = async_stream::stream! {
            yield Ok::<_, riziq_console::Error>(first);

            loop {
                tokio::time::sleep(poll_interval).await;

                let changed = match changes::since(&pool, Scope::Collection, seen).await {
                    Ok(changed) => changed,
                    Err(e) => {
                        warn!(collection = %name, error = %e, "polling changes failed");
                        yield Err(riziq_console::Error::from(Error::from(e)));
                        break;
                    }
                };
                let Some(last) = changed.last() else {
                    continue;
                };
                seen = last.ordinal;
                if !changed.iter().any(|change| change.key == name) {
                    continue;
                }

                match snapshot(&pool, &name, &order_by).await {
                    Ok(documents) => yield Ok(documents),
                    Err(e) => {
                        yield Err(riziq_console::Error::from(e));
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }

    async fn get(&self, id: &str) -> Result<Option<Document>, riziq_console::Error> {
        Ok(self.find(id).await?)
    }

    async fn insert(&self, mut fields: Fields) -> Result<String, riziq_console::Error> {
        let id = Uuid::new_v4().simple().to_string();
        fields.insert(
            "createdAt".to_string(),
            Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
        self.put(&id, &fields).await?;
        info!(collection = %self.name, %id, "document created");
        Ok(id)
    }

    async fn update(&self, id: &str, patch: Fields) -> Result<(), riziq_console::Error> {
        Ok(self.patch(id, patch).await?)
    }

    async fn delete(&self, id: &str) -> Result<(), riziq_console::Error> {
        Ok(self.remove(id).await?)
    }
}

async fn snapshot(pool: &DbPool, name: &str, order_by: &str) -> Result<Vec<Document>, Error> {
    let rows = sqlx::query_as::<_, (String, String)>(
        "SELECT id, fields FROM documents WHERE collection = ? ORDER BY created_at DESC",
    )
    .bind(name)
    .fetch_all(pool)
    .await?;

    let mut documents = rows
        .into_iter()
        .map(|row| StoredDocument::from(row).decode())
        .collect::<Result<Vec<_>, _>>()?;
    documents.sort_by(|a, b| {
        let a = a.fields.get(order_by).and_then(instant);
        let b = b.fields.get(order_by).and_then(instant);
        b.cmp(&a)
    });
    Ok(documents)
}
