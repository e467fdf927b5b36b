//! Query facade: parameter validation, orchestration, result shaping.
//!
//! [`ScrobbleService`] is the surface the calling layer (CLI, HTTP, ...)
//! talks to. It accepts primitive start/end/unit/limit values, validates
//! them here so the aggregation code never sees malformed input, obtains
//! the user's event set from the [`ScrobbleSource`] collaborator, and
//! wraps the aggregate in a response envelope carrying the resolved
//! window. No collaborator types leak through the reports.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::model::Scrobble;
use crate::source::ScrobbleSource;
use crate::stats::{
    self, AlbumPlays, ArtistPlays, PeriodUnit, TrackPlays, count_in_period, events_in_period,
};

/// Ranking size used when the caller does not supply one.
pub const DEFAULT_RANKING_LIMIT: usize = 5;

/// Raw scrobbles in a period.
#[derive(Debug, Serialize)]
pub struct ScrobblesReport {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub scrobbles: Vec<Scrobble>,
}

/// Most-played tracks in a period.
#[derive(Debug, Serialize)]
pub struct TopTracksReport {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub top_tracks: Vec<TrackPlays>,
}

/// Most-played artists in a period.
#[derive(Debug, Serialize)]
pub struct TopArtistsReport {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub top_artists: Vec<ArtistPlays>,
}

/// Most-played albums in a period.
#[derive(Debug, Serialize)]
pub struct TopAlbumsReport {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub top_albums: Vec<AlbumPlays>,
}

/// Listening-frequency histogram in a period.
#[derive(Debug, Serialize)]
pub struct FrequencyReport {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub frequency: BTreeMap<String, u64>,
}

/// Parse a caller-supplied timestamp.
///
/// Accepts RFC 3339 (`2019-01-23T11:48:50Z`), a space- or `T`-separated
/// date-time without zone, or a bare date (midnight). Values without a
/// zone are taken as UTC.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] naming the parameter on failure.
pub fn parse_timestamp(name: &str, value: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(Error::invalid_parameter(
        name,
        format!("failed to parse date from {value:?}"),
    ))
}

/// The query operations exposed to the calling layer.
pub struct ScrobbleService<S> {
    source: S,
}

impl<S: ScrobbleSource> ScrobbleService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Raw listening events with `start <= timestamp <= end`.
    pub async fn scrobbles(&self, username: &str, start: &str, end: &str) -> Result<ScrobblesReport> {
        let (start, end) = self.window(start, end)?;
        let events = self.source.get_events(username).await?;
        let scrobbles = events_in_period(&events, start, end)
            .into_iter()
            .cloned()
            .collect();
        Ok(ScrobblesReport { start, end, scrobbles })
    }

    /// Most-played tracks; `limit` defaults to [`DEFAULT_RANKING_LIMIT`].
    pub async fn top_tracks(
        &self,
        username: &str,
        start: &str,
        end: &str,
        limit: Option<usize>,
    ) -> Result<TopTracksReport> {
        let (start, end) = self.window(start, end)?;
        let events = self.source.get_events(username).await?;
        let limit = limit.unwrap_or(DEFAULT_RANKING_LIMIT);
        Ok(TopTracksReport {
            start,
            end,
            top_tracks: stats::top_tracks(&events, start, end, limit),
        })
    }

    /// Most-played artists, derived from the top-`limit` tracks.
    pub async fn top_artists(
        &self,
        username: &str,
        start: &str,
        end: &str,
        limit: Option<usize>,
    ) -> Result<TopArtistsReport> {
        let (start, end) = self.window(start, end)?;
        let events = self.source.get_events(username).await?;
        let limit = limit.unwrap_or(DEFAULT_RANKING_LIMIT);
        Ok(TopArtistsReport {
            start,
            end,
            top_artists: stats::top_artists(&events, start, end, limit),
        })
    }

    /// Most-played albums, derived from the top-`limit` tracks.
    pub async fn top_albums(
        &self,
        username: &str,
        start: &str,
        end: &str,
        limit: Option<usize>,
    ) -> Result<TopAlbumsReport> {
        let (start, end) = self.window(start, end)?;
        let events = self.source.get_events(username).await?;
        let limit = limit.unwrap_or(DEFAULT_RANKING_LIMIT);
        Ok(TopAlbumsReport {
            start,
            end,
            top_albums: stats::top_albums(&events, start, end, limit),
        })
    }

    /// Listening-frequency histogram at the given granularity.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedUnit`] if `unit` is not one of
    /// `hours`/`days`/`weeks`/`months`/`years`/`weekdays`.
    pub async fn frequency(
        &self,
        username: &str,
        start: &str,
        end: &str,
        unit: &str,
    ) -> Result<FrequencyReport> {
        let unit: PeriodUnit = unit.parse()?;
        let (start, end) = self.window(start, end)?;
        let events = self.source.get_events(username).await?;
        let frequency = count_in_period(&events, start, end, unit)
            .into_iter()
            .map(|(bucket, played)| (bucket_label(bucket, unit), played))
            .collect();
        Ok(FrequencyReport { start, end, frequency })
    }

    fn window(&self, start: &str, end: &str) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        Ok((parse_timestamp("start", start)?, parse_timestamp("end", end)?))
    }
}

/// Format a bucket-start timestamp for presentation.
///
/// Date granularities label buckets with the calendar day; hour buckets
/// keep the full timestamp.
fn bucket_label(bucket: DateTime<Utc>, unit: PeriodUnit) -> String {
    match unit {
        PeriodUnit::Hours => bucket.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => bucket.format("%Y-%m-%d").to_string(),
    }
}
