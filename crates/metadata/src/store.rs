//! Metadata store trait and implementations.

use crate::error::{MetadataError, MetadataResult};
use crate::models::SongRow;
use crate::repos::SongRepo;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::collections::HashSet;
use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Ids bound per `DELETE` statement, well under SQLite's variable limit.
const DELETE_BATCH_SIZE: usize = 500;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore: SongRepo + Send + Sync {
    /// Run database migrations.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
    /// Advisory only: SQLite cannot cancel a running statement, so slow
    /// queries are logged rather than aborted.
    query_timeout: Duration,
}

impl SqliteStore {
    /// Create a new SQLite store.
    pub async fn new(
        path: impl AsRef<Path>,
        query_timeout_secs: Option<u64>,
    ) -> MetadataResult<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // SQLite permits limited write concurrency; a single connection avoids
            // persistent "database is locked" failures under axum concurrency.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        Self::with_pool(pool, query_timeout_secs).await
    }

    /// Create a private in-memory store (for tests and ephemeral runs).
    pub async fn in_memory() -> MetadataResult<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?;

        // The database lives exactly as long as its only connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;

        Self::with_pool(pool, None).await
    }

    async fn with_pool(pool: Pool<Sqlite>, query_timeout_secs: Option<u64>) -> MetadataResult<Self> {
        let query_timeout = Duration::from_secs(query_timeout_secs.unwrap_or(30));
        let store = Self {
            pool,
            query_timeout,
        };
        store.migrate().await?;

        debug!(
            query_timeout_secs = query_timeout.as_secs(),
            "SQLite metadata store ready (query timeout is advisory)"
        );
        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Await `query`, warning if it ran past the advisory timeout.
    async fn timed<T>(
        &self,
        op: &'static str,
        query: impl Future<Output = MetadataResult<T>>,
    ) -> MetadataResult<T> {
        let started = Instant::now();
        let result = query.await;
        let elapsed = started.elapsed();
        if elapsed > self.query_timeout {
            warn!(
                op,
                elapsed_ms = elapsed.as_millis() as u64,
                timeout_ms = self.query_timeout.as_millis() as u64,
                "SQLite query exceeded advisory timeout"
            );
        }
        result
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl SongRepo for SqliteStore {
    async fn create_song(&self, song: &SongRow) -> MetadataResult<()> {
        // No existence pre-check: the primary key decides, atomically.
        let insert = async {
            sqlx::query(
                "INSERT INTO songs (id, name, artist, album, duration, year, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(song.id)
            .bind(&song.name)
            .bind(&song.artist)
            .bind(&song.album)
            .bind(&song.duration)
            .bind(song.year)
            .bind(song.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    MetadataError::AlreadyExists(song.id)
                }
                other => MetadataError::Database(other),
            })
        };

        self.timed("create_song", insert).await?;
        Ok(())
    }

    async fn get_song(&self, id: i64) -> MetadataResult<Option<SongRow>> {
        let select = async {
            sqlx::query_as::<_, SongRow>(
                "SELECT id, name, artist, album, duration, year, created_at FROM songs WHERE id = ?",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(MetadataError::from)
        };

        self.timed("get_song", select).await
    }

    async fn delete_songs(&self, ids: &[i64]) -> MetadataResult<Vec<i64>> {
        let mut removed = HashSet::with_capacity(ids.len());

        for batch in ids.chunks(DELETE_BATCH_SIZE) {
            let placeholders = vec!["?"; batch.len()].join(", ");
            let sql = format!("DELETE FROM songs WHERE id IN ({placeholders}) RETURNING id");

            let delete = async {
                let mut query = sqlx::query_scalar::<_, i64>(&sql);
                for id in batch {
                    query = query.bind(*id);
                }
                query.fetch_all(&self.pool).await.map_err(MetadataError::from)
            };

            removed.extend(self.timed("delete_songs", delete).await?);
        }

        // RETURNING order is unspecified; report in request order, once per id.
        Ok(ids.iter().copied().filter(|id| removed.remove(id)).collect())
    }
}

/// SQL schema for SQLite.
const SCHEMA_SQL: &str = r#"
-- Song metadata, keyed by the id of the resource it describes
CREATE TABLE IF NOT EXISTS songs (
    id INTEGER PRIMARY KEY CHECK (id > 0),
    name TEXT NOT NULL,
    artist TEXT NOT NULL,
    album TEXT NOT NULL,
    duration TEXT NOT NULL,
    year INTEGER NOT NULL CHECK (year BETWEEN 1900 AND 2099),
    created_at TEXT NOT NULL
);
"#;
