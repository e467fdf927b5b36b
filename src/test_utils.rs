//! Test utilities and fixtures for scrobble-minder tests.
//!
//! This module provides common test helpers, mock collaborators, and
//! database utilities to reduce boilerplate in tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tempfile::TempDir;

use crate::error::Result;
use crate::lastfm::{LastFmApi, LastFmError};
use crate::model::{Scrobble, Track};
use crate::source::ScrobbleSource;
use crate::store::{ScrobbleStore, SqliteStore};

/// Parse an RFC 3339 timestamp; panics on bad fixtures.
pub fn utc(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .expect("test fixture timestamp must be valid RFC 3339")
        .with_timezone(&Utc)
}

/// A track whose three identity fields are derived from `name`.
pub fn track(name: &str) -> Track {
    Track::new(name, format!("{name} artist"), format!("{name} album"))
}

/// A scrobble of `track` at the given RFC 3339 instant.
pub fn scrobble_at(track: Track, at: &str) -> Scrobble {
    Scrobble::new(track, utc(at))
}

/// The three plays used by the reference aggregation scenario:
/// two on 2019-01-23, one on 2019-01-24.
pub fn sample_history() -> Vec<Scrobble> {
    vec![
        scrobble_at(
            Track::new("Rumors (With Sofia Carson)", "R3hab", "The Wave"),
            "2019-01-23T11:48:50Z",
        ),
        scrobble_at(
            Track::new("Feelin Like", "Flipp Dinero", "Feelin Like"),
            "2019-01-23T11:51:22Z",
        ),
        scrobble_at(
            Track::new("Splashin", "Rich the Kid", "Splashin"),
            "2019-01-24T12:00:00Z",
        ),
    ]
}

/// Creates a temporary SQLite store for testing.
///
/// The database lives in a temporary directory that is cleaned up when the
/// returned `TempDir` is dropped; keep it alive for the duration of the
/// test. Migrations are run automatically.
pub async fn temp_store() -> (SqliteStore, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");
    let db_url = format!("sqlite:{}", db_path.display());

    let store = SqliteStore::connect(&db_url)
        .await
        .expect("Failed to initialize test database");

    (store, dir)
}

/// [`ScrobbleSource`] that serves a fixed event set without any I/O.
pub struct FixedSource {
    events: Vec<Scrobble>,
}

impl FixedSource {
    pub fn new(events: Vec<Scrobble>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl ScrobbleSource for FixedSource {
    async fn get_events(&self, _username: &str) -> Result<Vec<Scrobble>> {
        Ok(self.events.clone())
    }
}

/// Mock last.fm client recording every call it receives.
pub struct MockLastFm {
    scrobbles: Vec<Scrobble>,
    /// Error to return (takes precedence over scrobbles; consumed by the
    /// first call)
    error: Mutex<Option<LastFmError>>,
    calls: Mutex<Vec<(String, Option<i64>, Option<i64>)>>,
}

impl MockLastFm {
    /// A mock that returns the given scrobbles on every call.
    pub fn returning(scrobbles: Vec<Scrobble>) -> Self {
        Self {
            scrobbles,
            error: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A mock whose first call fails with `error`.
    pub fn failing(error: LastFmError) -> Self {
        Self {
            scrobbles: Vec::new(),
            error: Mutex::new(Some(error)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The (username, from, to) arguments of every call so far.
    pub fn calls(&self) -> Vec<(String, Option<i64>, Option<i64>)> {
        self.calls.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl LastFmApi for MockLastFm {
    async fn recent_tracks(
        &self,
        username: &str,
        from: Option<i64>,
        to: Option<i64>,
    ) -> std::result::Result<Vec<Scrobble>, LastFmError> {
        self.calls
            .lock()
            .expect("mock lock poisoned")
            .push((username.to_string(), from, to));
        if let Some(error) = self.error.lock().expect("mock lock poisoned").take() {
            return Err(error);
        }
        Ok(self.scrobbles.clone())
    }
}

/// In-memory [`ScrobbleStore`] with the same de-duplication and ordering
/// semantics as the SQLite implementation.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    scrobbles: HashMap<String, Vec<Scrobble>>,
    last_update: HashMap<String, DateTime<Utc>>,
}

#[async_trait]
impl ScrobbleStore for MemoryStore {
    async fn put_scrobbles(&self, username: &str, scrobbles: &[Scrobble]) -> Result<u64> {
        let mut inner = self.inner.lock().expect("mock lock poisoned");
        let stored = inner.scrobbles.entry(username.to_string()).or_default();
        let mut inserted = 0u64;
        for scrobble in scrobbles {
            if !stored.contains(scrobble) {
                stored.push(scrobble.clone());
                inserted += 1;
            }
        }
        stored.sort();
        Ok(inserted)
    }

    async fn scrobbles(&self, username: &str) -> Result<Vec<Scrobble>> {
        let inner = self.inner.lock().expect("mock lock poisoned");
        Ok(inner.scrobbles.get(username).cloned().unwrap_or_default())
    }

    async fn scrobbles_in_period(
        &self,
        username: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Scrobble>> {
        let all = self.scrobbles(username).await?;
        Ok(all
            .into_iter()
            .filter(|s| start <= s.timestamp && s.timestamp <= end)
            .collect())
    }

    async fn last_update(&self, username: &str) -> Result<Option<DateTime<Utc>>> {
        let inner = self.inner.lock().expect("mock lock poisoned");
        Ok(inner.last_update.get(username).copied())
    }

    async fn set_last_update(&self, username: &str, at: DateTime<Utc>) -> Result<()> {
        let mut inner = self.inner.lock().expect("mock lock poisoned");
        inner.last_update.insert(username.to_string(), at);
        Ok(())
    }
}
