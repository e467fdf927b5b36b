//! SQLite-backed scrobble store.
//!
//! Uses SQLx with SQLite for lightweight, embedded storage. Scrobble
//! timestamps are stored as epoch seconds; conversion to and from
//! `DateTime<Utc>` happens only at this boundary. De-duplication relies on
//! the schema's UNIQUE constraints plus `INSERT OR IGNORE`, so syncing an
//! overlapping page of history is idempotent.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Scrobble, Track};

use super::ScrobbleStore;

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "scrobble_minder.db";

/// Build a SQLite database URL from an optional path.
///
/// If no path is provided, uses [`DEFAULT_DB_NAME`] in the current directory.
pub fn db_url(path: Option<&std::path::Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// SQLite implementation of [`ScrobbleStore`].
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if necessary) the database at `db_url` and run
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if database creation, connection, or migration
    /// fails.
    pub async fn connect(db_url: &str) -> Result<Self> {
        if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
            sqlx::Sqlite::create_database(db_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| Error::config(format!("migration failed: {e}")))?;

        Ok(Self { pool })
    }

    /// Get or create a user by name. Idempotent: the same name always
    /// returns the same ID.
    async fn get_or_create_user(&self, name: &str) -> Result<i64> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        if let Some((id,)) = row {
            Ok(id)
        } else {
            let result = sqlx::query("INSERT INTO users (name) VALUES (?)")
                .bind(name)
                .execute(&self.pool)
                .await?;
            Ok(result.last_insert_rowid())
        }
    }

    /// Get or create a track by its identity triple.
    async fn get_or_create_track(&self, track: &Track) -> Result<i64> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM tracks WHERE title = ? AND artist = ? AND album = ?")
                .bind(&track.title)
                .bind(&track.artist_name)
                .bind(&track.album_name)
                .fetch_optional(&self.pool)
                .await?;

        if let Some((id,)) = row {
            Ok(id)
        } else {
            let result = sqlx::query("INSERT INTO tracks (title, artist, album) VALUES (?, ?, ?)")
                .bind(&track.title)
                .bind(&track.artist_name)
                .bind(&track.album_name)
                .execute(&self.pool)
                .await?;
            Ok(result.last_insert_rowid())
        }
    }
}

/// Convert a stored epoch value back into a scrobble, rejecting rows that
/// no longer form a valid timestamp.
fn row_to_scrobble(title: String, artist: String, album: String, epoch: i64) -> Result<Scrobble> {
    let timestamp = Utc
        .timestamp_opt(epoch, 0)
        .single()
        .ok_or_else(|| Error::invalid_scrobble(format!("stored timestamp {epoch} out of range")))?;
    Ok(Scrobble::new(Track::new(title, artist, album), timestamp))
}

#[async_trait]
impl ScrobbleStore for SqliteStore {
    async fn put_scrobbles(&self, username: &str, scrobbles: &[Scrobble]) -> Result<u64> {
        let user_id = self.get_or_create_user(username).await?;

        let mut inserted = 0u64;
        for scrobble in scrobbles {
            let track_id = self.get_or_create_track(&scrobble.track).await?;
            let result = sqlx::query(
                "INSERT OR IGNORE INTO scrobbles (user_id, track_id, timestamp) VALUES (?, ?, ?)",
            )
            .bind(user_id)
            .bind(track_id)
            .bind(scrobble.timestamp.timestamp())
            .execute(&self.pool)
            .await?;
            inserted += result.rows_affected();
        }

        debug!(username, total = scrobbles.len(), inserted, "stored scrobbles");
        Ok(inserted)
    }

    async fn scrobbles(&self, username: &str) -> Result<Vec<Scrobble>> {
        let rows: Vec<(String, String, String, i64)> = sqlx::query_as(
            "SELECT t.title, t.artist, t.album, s.timestamp
             FROM scrobbles s
             JOIN tracks t ON t.id = s.track_id
             JOIN users u ON u.id = s.user_id
             WHERE u.name = ?
             ORDER BY s.timestamp",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(title, artist, album, epoch)| row_to_scrobble(title, artist, album, epoch))
            .collect()
    }

    async fn scrobbles_in_period(
        &self,
        username: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Scrobble>> {
        let rows: Vec<(String, String, String, i64)> = sqlx::query_as(
            "SELECT t.title, t.artist, t.album, s.timestamp
             FROM scrobbles s
             JOIN tracks t ON t.id = s.track_id
             JOIN users u ON u.id = s.user_id
             WHERE u.name = ? AND s.timestamp >= ? AND s.timestamp <= ?
             ORDER BY s.timestamp",
        )
        .bind(username)
        .bind(start.timestamp())
        .bind(end.timestamp())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(title, artist, album, epoch)| row_to_scrobble(title, artist, album, epoch))
            .collect()
    }

    async fn last_update(&self, username: &str) -> Result<Option<DateTime<Utc>>> {
        let row: Option<(Option<i64>,)> =
            sqlx::query_as("SELECT last_update FROM users WHERE name = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        match row.and_then(|(epoch,)| epoch) {
            Some(epoch) => Ok(Utc.timestamp_opt(epoch, 0).single()),
            None => Ok(None),
        }
    }

    async fn set_last_update(&self, username: &str, at: DateTime<Utc>) -> Result<()> {
        let user_id = self.get_or_create_user(username).await?;
        sqlx::query("UPDATE users SET last_update = ? WHERE id = ?")
            .bind(at.timestamp())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
