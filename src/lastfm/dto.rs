//! last.fm API Data Transfer Objects
//!
//! These types match EXACTLY what the last.fm API returns.
//! DO NOT add fields that aren't in the API response.
//! DO NOT use these types outside the lastfm module - convert to model types.
//!
//! API Reference: https://www.last.fm/api/show/user.getRecentTracks
//!
//! Numeric attributes arrive as JSON strings (`"totalPages": "42"`), so the
//! DTOs keep them as strings and the client parses them.

use serde::Deserialize;

/// Top-level `user.getRecentTracks` response
#[derive(Debug, Clone, Deserialize)]
pub struct RecentTracksResponse {
    pub recenttracks: RecentTracks,
}

/// The page of tracks plus pagination attributes
#[derive(Debug, Clone, Deserialize)]
pub struct RecentTracks {
    #[serde(default)]
    pub track: Vec<RecentTrack>,
    #[serde(rename = "@attr")]
    pub attr: RecentTracksAttr,
}

/// Pagination attributes (numeric, but delivered as strings)
#[derive(Debug, Clone, Deserialize)]
pub struct RecentTracksAttr {
    #[serde(rename = "totalPages")]
    pub total_pages: String,
}

/// One scrobbled (or currently playing) track
#[derive(Debug, Clone, Deserialize)]
pub struct RecentTrack {
    /// Track title
    pub name: String,
    pub artist: TextNode,
    pub album: TextNode,
    /// Absent for the currently-playing entry
    pub date: Option<ScrobbleDate>,
    #[serde(rename = "@attr")]
    pub attr: Option<RecentTrackAttr>,
}

/// last.fm wraps plain strings in `{"#text": ...}` nodes
#[derive(Debug, Clone, Deserialize)]
pub struct TextNode {
    #[serde(rename = "#text")]
    pub text: String,
}

/// Scrobble timestamp (epoch seconds; the display string is ignored)
#[derive(Debug, Clone, Deserialize)]
pub struct ScrobbleDate {
    pub uts: String,
}

/// Per-track attributes
#[derive(Debug, Clone, Deserialize)]
pub struct RecentTrackAttr {
    pub nowplaying: Option<String>,
}

/// Error response body
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub error: i64,
    pub message: String,
}

/// last.fm error code for an unknown username
pub const ERROR_USER_NOT_FOUND: i64 = 6;
