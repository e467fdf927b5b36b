//! Sync command: fetch and persist the latest scrobbles for a user.

use tokio::runtime::Runtime;
use tracing::info;

use crate::config::Config;
use crate::lastfm::LastFmClient;
use crate::store::ScrobbleStore;

use super::{open_store, resolve_api_key};

/// Fetch a user's scrobbles from last.fm and store them.
///
/// A user with stored history gets an incremental fetch from the
/// last-update watermark; a new user gets their full history.
pub fn cmd_sync(
    rt: &Runtime,
    config: &Config,
    username: &str,
    api_key: Option<&str>,
    db: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let api_key = resolve_api_key(api_key, config)?;

    rt.block_on(async {
        let store = open_store(db, config).await?;
        let client = LastFmClient::new(api_key);

        let now = chrono::Utc::now();
        let watermark = store.last_update(username).await?;
        let from = watermark.map(|ts| ts.timestamp());
        match watermark {
            Some(ts) => info!(username, since = %ts, "incremental sync"),
            None => info!(username, "first sync, fetching full history"),
        }

        let fetched = client
            .recent_tracks(username, from, from.map(|_| now.timestamp()))
            .await?;
        let inserted = store.put_scrobbles(username, &fetched).await?;
        store.set_last_update(username, now).await?;

        println!(
            "Synced {}: {} scrobbles fetched, {} new.",
            username,
            fetched.len(),
            inserted
        );
        Ok(())
    })
}
