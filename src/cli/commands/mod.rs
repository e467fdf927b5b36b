//! CLI command definitions and dispatch.
//!
//! This module provides the command-line interface for scrobble-minder.
//! Each subcommand is implemented in its own submodule:
//! - `sync`: fetch and persist the latest scrobbles for a user
//! - `query`: period queries (scrobbles, rankings, frequency histogram)

mod query;
mod sync;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::lastfm::LastFmClient;
use crate::query::ScrobbleService;
use crate::source::CachedScrobbleSource;
use crate::store::{SqliteStore, db_url};

pub use query::{cmd_frequency, cmd_scrobbles, cmd_top_albums, cmd_top_artists, cmd_top_tracks};
pub use sync::cmd_sync;

/// Scrobble Minder CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch and store the latest scrobbles for a user
    Sync {
        /// last.fm username to sync
        username: String,
        /// last.fm API key (or set LASTFM_API_KEY env var)
        #[arg(short, long, env = "LASTFM_API_KEY")]
        api_key: Option<String>,
        /// Database path
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// List scrobbles in a period
    Scrobbles {
        /// last.fm username
        username: String,
        /// Period start (e.g. 2019-01-23 or 2019-01-23T11:48:50Z)
        #[arg(long)]
        start: String,
        /// Period end
        #[arg(long)]
        end: String,
        /// last.fm API key (or set LASTFM_API_KEY env var)
        #[arg(short, long, env = "LASTFM_API_KEY")]
        api_key: Option<String>,
        /// Database path
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Most played tracks in a period
    TopTracks {
        /// last.fm username
        username: String,
        /// Period start
        #[arg(long)]
        start: String,
        /// Period end
        #[arg(long)]
        end: String,
        /// Ranking size (default 5)
        #[arg(short, long)]
        limit: Option<usize>,
        /// last.fm API key (or set LASTFM_API_KEY env var)
        #[arg(short, long, env = "LASTFM_API_KEY")]
        api_key: Option<String>,
        /// Database path
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Most played artists in a period
    TopArtists {
        /// last.fm username
        username: String,
        /// Period start
        #[arg(long)]
        start: String,
        /// Period end
        #[arg(long)]
        end: String,
        /// Ranking size (default 5)
        #[arg(short, long)]
        limit: Option<usize>,
        /// last.fm API key (or set LASTFM_API_KEY env var)
        #[arg(short, long, env = "LASTFM_API_KEY")]
        api_key: Option<String>,
        /// Database path
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Most played albums in a period
    TopAlbums {
        /// last.fm username
        username: String,
        /// Period start
        #[arg(long)]
        start: String,
        /// Period end
        #[arg(long)]
        end: String,
        /// Ranking size (default 5)
        #[arg(short, long)]
        limit: Option<usize>,
        /// last.fm API key (or set LASTFM_API_KEY env var)
        #[arg(short, long, env = "LASTFM_API_KEY")]
        api_key: Option<String>,
        /// Database path
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Listening-frequency histogram for a period
    Frequency {
        /// last.fm username
        username: String,
        /// Period start
        #[arg(long)]
        start: String,
        /// Period end
        #[arg(long)]
        end: String,
        /// Bucket granularity: hours, days, weeks, months, years, weekdays
        #[arg(long, default_value = "days")]
        scale: String,
        /// last.fm API key (or set LASTFM_API_KEY env var)
        #[arg(short, long, env = "LASTFM_API_KEY")]
        api_key: Option<String>,
        /// Database path
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

/// Run the requested subcommand.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    let config = crate::config::load();

    match &cli.command {
        Commands::Sync { username, api_key, db } => {
            cmd_sync(&rt, &config, username, api_key.as_deref(), db.as_deref())
        }
        Commands::Scrobbles { username, start, end, api_key, db } => {
            cmd_scrobbles(&rt, &config, username, start, end, api_key.as_deref(), db.as_deref())
        }
        Commands::TopTracks { username, start, end, limit, api_key, db } => cmd_top_tracks(
            &rt,
            &config,
            username,
            start,
            end,
            *limit,
            api_key.as_deref(),
            db.as_deref(),
        ),
        Commands::TopArtists { username, start, end, limit, api_key, db } => cmd_top_artists(
            &rt,
            &config,
            username,
            start,
            end,
            *limit,
            api_key.as_deref(),
            db.as_deref(),
        ),
        Commands::TopAlbums { username, start, end, limit, api_key, db } => cmd_top_albums(
            &rt,
            &config,
            username,
            start,
            end,
            *limit,
            api_key.as_deref(),
            db.as_deref(),
        ),
        Commands::Frequency { username, start, end, scale, api_key, db } => cmd_frequency(
            &rt,
            &config,
            username,
            start,
            end,
            scale,
            api_key.as_deref(),
            db.as_deref(),
        ),
    }
}

/// Resolve the API key: CLI/env value first, then the config file.
fn resolve_api_key(arg: Option<&str>, config: &Config) -> anyhow::Result<String> {
    arg.map(str::to_string)
        .or_else(|| config.credentials.lastfm_api_key.clone())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "no last.fm API key: pass --api-key, set LASTFM_API_KEY, or add it to the config file"
            )
        })
}

/// Open the store at the CLI-supplied path, the configured path, or the
/// default location, in that order.
async fn open_store(
    arg: Option<&std::path::Path>,
    config: &Config,
) -> anyhow::Result<SqliteStore> {
    let path = arg.or(config.storage.db_path.as_deref());
    let store = SqliteStore::connect(&db_url(path)).await?;
    Ok(store)
}

/// Build the full query service: client, store, cached source.
async fn build_service(
    config: &Config,
    api_key: Option<&str>,
    db: Option<&std::path::Path>,
) -> anyhow::Result<ScrobbleService<CachedScrobbleSource<LastFmClient, SqliteStore>>> {
    let api_key = resolve_api_key(api_key, config)?;
    let store = open_store(db, config).await?;
    let client = LastFmClient::new(api_key);
    let freshness = chrono::TimeDelta::seconds(config.sync.freshness_secs as i64);
    let source = CachedScrobbleSource::with_freshness_window(client, store, freshness);
    Ok(ScrobbleService::new(source))
}
