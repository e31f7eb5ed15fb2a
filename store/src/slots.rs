//! Local slots stored in the `slots` table.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use riziq_console::{SlotChange, SlotChanges, SlotStore};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::changes;
use crate::db::DbPool;
use crate::models::{Change, Scope};
use crate::Error;

/// One context's handle on the shared slots.
///
/// Every handle gets its own context id; [`SlotStore::changes`] reports only
/// writes made by other handles, which may live in other processes sharing
/// the same database file.
pub struct SqliteSlots {
    pool: DbPool,
    context: String,
    poll_interval: Duration,
}

impl SqliteSlots {
    pub fn new(pool: DbPool, poll_interval: Duration) -> Self {
        Self {
            pool,
            context: Uuid::new_v4().to_string(),
            poll_interval,
        }
    }

    /// Another context on the same database.
    pub fn open_context(&self) -> Self {
        Self::new(self.pool.clone(), self.poll_interval)
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    async fn load(&self, key: &str) -> Result<Option<String>, Error> {
        let row = sqlx::query_as::<_, (String,)>("SELECT value FROM slots WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO slots (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&mut *tx)
        .await?;
        let change = Change::new(Scope::Slot, key.to_string(), self.context.clone());
        changes::record(&mut *tx, &change).await?;
        tx.commit().await?;

        debug!(slot = key, context = %self.context, "slot written");
        Ok(())
    }
}

#[async_trait]
impl SlotStore for SqliteSlots {
    async fn read(&self, key: &str) -> Result<Option<String>, riziq_console::Error> {
        Ok(self.load(key).await?)
    }

    async fn write(&self, key: &str, value: String) -> Result<(), riziq_console::Error> {
        Ok(self.save(key, &value).await?)
    }

    fn changes(&self) -> SlotChanges {
        let pool = self.pool.clone();
        let me = self.context.clone();
        let poll_interval = self.poll_interval;
        let since = Utc::now().timestamp_micros();

        let stream = async_stream::stream! {
            let mut seen = match changes::before(&pool, Scope::Slot, since).await {
                Ok(ordinal) => ordinal,
                Err(e) => {
                    warn!(error = %e, "cannot follow slot changes");
                    return;
                }
            };

            loop {
                match changes::since(&pool, Scope::Slot, seen).await {
                    Ok(changed) => {
                        for change in changed {
                            seen = change.ordinal;
                            if change.context != me {
                                yield SlotChange { key: change.key };
                            }
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "polling slot changes failed");
                        return;
                    }
                }
                tokio::time::sleep(poll_interval).await;
            }
        };

        Box::pin(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_pool;
    use futures_util::StreamExt;

    async fn slots() -> SqliteSlots {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        SqliteSlots::new(pool, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn read_back_what_was_written() {
        let tab = slots().await;
        assert_eq!(tab.read("riziq_blogs").await.unwrap(), None);

        tab.write("riziq_blogs", "[1]".to_string()).await.unwrap();
        tab.write("riziq_blogs", "[2]".to_string()).await.unwrap();
        assert_eq!(tab.read("riziq_blogs").await.unwrap().as_deref(), Some("[2]"));
    }

    #[tokio::test]
    async fn only_other_contexts_are_reported() {
        let tab_a = slots().await;
        let tab_b = tab_a.open_context();
        let mut seen_by_a = tab_a.changes();

        tab_a.write("riziq_messages", "[]".to_string()).await.unwrap();
        tab_b.write("riziq_applications", "[]".to_string()).await.unwrap();

        let change = tokio::time::timeout(Duration::from_secs(1), seen_by_a.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(change.key, "riziq_applications");
    }

    #[tokio::test]
    async fn earlier_writes_are_not_replayed() {
        let tab_a = slots().await;
        let tab_b = tab_a.open_context();
        tab_b.write("riziq_jobs", "[]".to_string()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        let mut seen_by_a = tab_a.changes();
        let quiet = tokio::time::timeout(Duration::from_millis(50), seen_by_a.next()).await;
        assert!(quiet.is_err());
    }
}
