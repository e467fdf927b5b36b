//! Scrobble persistence.
//!
//! A single storage abstraction ([`ScrobbleStore`]) with one SQLite
//! implementation. The aggregation code never depends on which backend is
//! in use - it only ever sees materialized [`Scrobble`] collections.

mod sqlite;

pub use sqlite::{DEFAULT_DB_NAME, SqliteStore, db_url};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::Scrobble;

/// Persistence operations for a user's listening history.
///
/// Implement this trait to substitute an in-memory store in tests.
#[async_trait]
pub trait ScrobbleStore: Send + Sync {
    /// Persist scrobbles for a user. Re-ingesting already-stored events is
    /// a no-op; returns the number of newly inserted rows.
    async fn put_scrobbles(&self, username: &str, scrobbles: &[Scrobble]) -> Result<u64>;

    /// All stored scrobbles for a user, timestamp ascending.
    async fn scrobbles(&self, username: &str) -> Result<Vec<Scrobble>>;

    /// Stored scrobbles for a user with `start <= timestamp <= end`,
    /// timestamp ascending.
    async fn scrobbles_in_period(
        &self,
        username: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Scrobble>>;

    /// When the user's history was last synced from the remote service.
    /// `None` for a user that has never been synced.
    async fn last_update(&self, username: &str) -> Result<Option<DateTime<Utc>>>;

    /// Record a successful sync.
    async fn set_last_update(&self, username: &str, at: DateTime<Utc>) -> Result<()>;
}
