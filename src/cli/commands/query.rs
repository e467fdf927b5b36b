//! Period query commands: raw scrobbles, rankings, frequency histogram.
//!
//! Every command resolves the user's event set through the cached source
//! (refreshing from last.fm when stale) and prints the report as JSON.

use serde::Serialize;
use std::path::Path;
use tokio::runtime::Runtime;

use crate::config::Config;

use super::build_service;

fn print_report<T: Serialize>(report: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// List scrobbles in `[start, end]`.
pub fn cmd_scrobbles(
    rt: &Runtime,
    config: &Config,
    username: &str,
    start: &str,
    end: &str,
    api_key: Option<&str>,
    db: Option<&Path>,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let service = build_service(config, api_key, db).await?;
        let report = service.scrobbles(username, start, end).await?;
        print_report(&report)
    })
}

/// Most played tracks in `[start, end]`.
pub fn cmd_top_tracks(
    rt: &Runtime,
    config: &Config,
    username: &str,
    start: &str,
    end: &str,
    limit: Option<usize>,
    api_key: Option<&str>,
    db: Option<&Path>,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let service = build_service(config, api_key, db).await?;
        let report = service.top_tracks(username, start, end, limit).await?;
        print_report(&report)
    })
}

/// Most played artists in `[start, end]`.
pub fn cmd_top_artists(
    rt: &Runtime,
    config: &Config,
    username: &str,
    start: &str,
    end: &str,
    limit: Option<usize>,
    api_key: Option<&str>,
    db: Option<&Path>,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let service = build_service(config, api_key, db).await?;
        let report = service.top_artists(username, start, end, limit).await?;
        print_report(&report)
    })
}

/// Most played albums in `[start, end]`.
pub fn cmd_top_albums(
    rt: &Runtime,
    config: &Config,
    username: &str,
    start: &str,
    end: &str,
    limit: Option<usize>,
    api_key: Option<&str>,
    db: Option<&Path>,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let service = build_service(config, api_key, db).await?;
        let report = service.top_albums(username, start, end, limit).await?;
        print_report(&report)
    })
}

/// Listening-frequency histogram for `[start, end]` at `scale`.
pub fn cmd_frequency(
    rt: &Runtime,
    config: &Config,
    username: &str,
    start: &str,
    end: &str,
    scale: &str,
    api_key: Option<&str>,
    db: Option<&Path>,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let service = build_service(config, api_key, db).await?;
        let report = service.frequency(username, start, end, scale).await?;
        print_report(&report)
    })
}
