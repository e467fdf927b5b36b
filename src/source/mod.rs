//! Event-source collaborator: materialized scrobble sets per user.
//!
//! [`ScrobbleSource`] is the one capability the query layer needs - give me
//! the event set for a username. [`CachedScrobbleSource`] implements it by
//! layering an explicit per-username cache over the store and the remote
//! client:
//!
//! 1. an in-memory snapshot younger than the freshness window is returned
//!    as-is;
//! 2. otherwise the store's last-update watermark decides whether a remote
//!    fetch is needed, and how much of it (full history for a new user,
//!    incremental from the watermark otherwise).
//!
//! Each query gets its own snapshot clone, so aggregation never shares
//! mutable state across requests. Queries for different users proceed
//! independently.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::Result;
use crate::lastfm::LastFmApi;
use crate::model::Scrobble;
use crate::store::ScrobbleStore;

/// How long a synced history is considered current, in seconds.
pub const DEFAULT_FRESHNESS_SECS: i64 = 60;

/// The capability the query layer consumes: a materialized event set for
/// a username.
#[async_trait]
pub trait ScrobbleSource: Send + Sync {
    /// All known scrobbles for the user, refreshed from the remote
    /// service when the local copy is stale.
    async fn get_events(&self, username: &str) -> Result<Vec<Scrobble>>;
}

struct Snapshot {
    fetched_at: DateTime<Utc>,
    events: Vec<Scrobble>,
}

/// [`ScrobbleSource`] backed by a store, a remote client, and a
/// per-username snapshot cache with an explicit freshness window.
pub struct CachedScrobbleSource<C, S> {
    client: C,
    store: S,
    freshness: TimeDelta,
    snapshots: RwLock<HashMap<String, Snapshot>>,
}

impl<C: LastFmApi, S: ScrobbleStore> CachedScrobbleSource<C, S> {
    /// Create a source with the default freshness window.
    pub fn new(client: C, store: S) -> Self {
        Self::with_freshness_window(client, store, TimeDelta::seconds(DEFAULT_FRESHNESS_SECS))
    }

    /// Create a source with an explicit freshness window.
    pub fn with_freshness_window(client: C, store: S, freshness: TimeDelta) -> Self {
        Self {
            client,
            store,
            freshness,
            snapshots: RwLock::new(HashMap::new()),
        }
    }

    /// Bring the store up to date if the watermark says it is stale, then
    /// return the full stored history.
    async fn refresh(&self, username: &str, now: DateTime<Utc>) -> Result<Vec<Scrobble>> {
        match self.store.last_update(username).await? {
            None => {
                info!(username, "no stored history, fetching full history");
                let fetched = self.client.recent_tracks(username, None, None).await?;
                let inserted = self.store.put_scrobbles(username, &fetched).await?;
                self.store.set_last_update(username, now).await?;
                info!(username, fetched = fetched.len(), inserted, "initial sync complete");
            }
            Some(last) if now - last >= self.freshness => {
                let fetched = self
                    .client
                    .recent_tracks(username, Some(last.timestamp()), Some(now.timestamp()))
                    .await?;
                let inserted = self.store.put_scrobbles(username, &fetched).await?;
                self.store.set_last_update(username, now).await?;
                debug!(username, fetched = fetched.len(), inserted, "incremental sync complete");
            }
            Some(last) => {
                debug!(username, last_update = %last, "stored history is current");
            }
        }
        self.store.scrobbles(username).await
    }
}

#[async_trait]
impl<C: LastFmApi, S: ScrobbleStore> ScrobbleSource for CachedScrobbleSource<C, S> {
    async fn get_events(&self, username: &str) -> Result<Vec<Scrobble>> {
        let now = Utc::now();

        {
            let snapshots = self.snapshots.read().await;
            if let Some(snapshot) = snapshots.get(username) {
                if now - snapshot.fetched_at < self.freshness {
                    return Ok(snapshot.events.clone());
                }
            }
        }

        let events = self.refresh(username, now).await?;
        let mut snapshots = self.snapshots.write().await;
        snapshots.insert(
            username.to_string(),
            Snapshot {
                fetched_at: now,
                events: events.clone(),
            },
        );
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::lastfm::LastFmError;
    use crate::test_utils::{MemoryStore, MockLastFm, scrobble_at, track, utc};

    #[tokio::test]
    async fn test_new_user_triggers_full_fetch_and_persists() {
        let history = vec![scrobble_at(track("a"), "2019-01-23T11:48:50Z")];
        let client = MockLastFm::returning(history.clone());
        let source = CachedScrobbleSource::new(client, MemoryStore::default());

        let events = source.get_events("testuser").await.unwrap();
        assert_eq!(events, history);

        let calls = source.client.calls();
        assert_eq!(calls.len(), 1);
        // Full history: no epoch bounds.
        assert_eq!(calls[0], ("testuser".to_string(), None, None));
        assert_eq!(source.store.scrobbles("testuser").await.unwrap(), history);
        assert!(source.store.last_update("testuser").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_fresh_snapshot_skips_remote_and_store() {
        let history = vec![scrobble_at(track("a"), "2019-01-23T11:48:50Z")];
        let client = MockLastFm::returning(history.clone());
        let source = CachedScrobbleSource::new(client, MemoryStore::default());

        let first = source.get_events("testuser").await.unwrap();
        let second = source.get_events("testuser").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(source.client.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_watermark_triggers_incremental_fetch() {
        let stored = scrobble_at(track("old"), "2019-01-20T10:00:00Z");
        let fresh = scrobble_at(track("new"), "2019-01-23T11:48:50Z");
        let watermark = utc("2019-01-22T00:00:00Z");

        let store = MemoryStore::default();
        store.put_scrobbles("testuser", &[stored.clone()]).await.unwrap();
        store.set_last_update("testuser", watermark).await.unwrap();

        let client = MockLastFm::returning(vec![fresh.clone()]);
        let source = CachedScrobbleSource::new(client, store);

        let events = source.get_events("testuser").await.unwrap();
        assert_eq!(events, vec![stored, fresh]);

        let calls = source.client.calls();
        assert_eq!(calls.len(), 1);
        let (_, from, to) = calls[0].clone();
        assert_eq!(from, Some(watermark.timestamp()));
        assert!(to.is_some());
    }

    #[tokio::test]
    async fn test_current_watermark_serves_from_store_without_fetch() {
        let stored = scrobble_at(track("stored"), "2019-01-23T11:48:50Z");
        let store = MemoryStore::default();
        store.put_scrobbles("testuser", &[stored.clone()]).await.unwrap();
        store.set_last_update("testuser", Utc::now()).await.unwrap();

        let client = MockLastFm::returning(vec![scrobble_at(track("remote"), "2019-01-24T00:00:00Z")]);
        let source = CachedScrobbleSource::new(client, store);

        let events = source.get_events("testuser").await.unwrap();
        assert_eq!(events, vec![stored]);
        assert!(source.client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_zero_freshness_window_always_refreshes() {
        let client = MockLastFm::returning(vec![scrobble_at(track("a"), "2019-01-23T11:48:50Z")]);
        let source =
            CachedScrobbleSource::with_freshness_window(client, MemoryStore::default(), TimeDelta::zero());

        source.get_events("testuser").await.unwrap();
        source.get_events("testuser").await.unwrap();
        assert_eq!(source.client.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_user_error_propagates() {
        let client = MockLastFm::failing(LastFmError::UserNotFound("nobody".into()));
        let source = CachedScrobbleSource::new(client, MemoryStore::default());

        let result = source.get_events("nobody").await;
        assert!(matches!(
            result,
            Err(Error::LastFm(LastFmError::UserNotFound(_)))
        ));
    }
}
