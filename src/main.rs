//! Scrobble Minder - listening-history analytics for last.fm users.
//!
//! Fetches a user's scrobbles from last.fm, persists them locally, and
//! answers time-windowed queries: raw events, most-played
//! tracks/artists/albums, and listening-frequency histograms.

pub mod cli;
pub mod config;
pub mod error;
pub mod lastfm;
pub mod model;
pub mod query;
pub mod source;
pub mod stats;
pub mod store;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("scrobble_minder=info".parse()?))
        .init();

    cli::run_command(&args)
}
