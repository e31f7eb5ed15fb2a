use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{Sqlite, SqlitePool, SqlitePoolOptions},
    Pool,
};
use tracing::info;

pub type DbPool = Pool<Sqlite>;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL,
        id TEXT NOT NULL,
        fields TEXT NOT NULL,
        created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now') * 1000),
        PRIMARY KEY (collection, id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS changes (
        ordinal INTEGER PRIMARY KEY AUTOINCREMENT,
        scope TEXT NOT NULL,
        key TEXT NOT NULL,
        context TEXT NOT NULL DEFAULT '',
        timestamp INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS slots (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        uid TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        claims TEXT NOT NULL DEFAULT '{}'
    )
    "#,
];

pub async fn ensure_database_file(url: &str) -> Result<(), sqlx::Error> {
    let exists = Sqlite::database_exists(url).await?;

    if !exists {
        Sqlite::create_database(url).await?;
    }

    Ok(())
}

/// Opens `database_url` and creates any missing tables.
///
/// An in-memory database lives only as long as its connection, so it gets a
/// single connection that is never recycled.
pub async fn init_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    ensure_database_file(database_url).await?;

    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(database_url)
            .await?
    } else {
        SqlitePool::connect(database_url).await?
    };

    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await?;
    }

    info!(url = %database_url, "database ready");
    Ok(pool)
}

/// Highest change ordinal recorded so far, or 0.
pub(crate) async fn latest_ordinal(pool: &DbPool) -> Result<i64, sqlx::Error> {
    let (latest,): (Option<i64>,) = sqlx::query_as("SELECT MAX(ordinal) FROM changes")
        .fetch_one(pool)
        .await?;
    Ok(latest.unwrap_or(0))
}
