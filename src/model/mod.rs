//! Core data models for listening history.
//!
//! Defines the primary entities: [`Track`] and [`Scrobble`] (a single
//! recorded play of a track). These are plain value types - persistence
//! and remote-API representations convert to and from them at the edges.
//!
//! # Wire format
//!
//! Scrobbles serialize as `{"track": {"title", "artist", "album"}, "date": <ISO-8601>}`.
//! The `track`/`date` field names are shared by every persistence backend
//! and must not change.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::{Error, Result};

/// A track as scrobbled: identified by its (title, artist, album) triple.
///
/// Equality is exact, case-sensitive string match on all three fields.
/// Two field-wise identical tracks count toward the same aggregate no
/// matter where they came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    /// Track title
    pub title: String,
    /// Artist name
    #[serde(rename = "artist")]
    pub artist_name: String,
    /// Album name
    #[serde(rename = "album")]
    pub album_name: String,
}

impl Track {
    /// Create a new track.
    pub fn new(
        title: impl Into<String>,
        artist_name: impl Into<String>,
        album_name: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist_name: artist_name.into(),
            album_name: album_name.into(),
        }
    }
}

/// A single recorded play event: one track at one point in time.
///
/// Timestamps are always UTC so comparisons never depend on a local
/// timezone. Ordering is by timestamp (track fields break ties so that
/// ordering stays consistent with equality).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scrobble {
    /// The track that was played
    pub track: Track,
    /// When it was played (UTC)
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
}

impl Scrobble {
    /// Create a scrobble from a track and a UTC timestamp.
    pub fn new(track: Track, timestamp: DateTime<Utc>) -> Self {
        Self { track, timestamp }
    }

    /// Create a scrobble from an epoch-seconds value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidScrobble`] if the epoch value cannot be
    /// represented as a valid UTC timestamp.
    pub fn from_epoch(track: Track, epoch_secs: i64) -> Result<Self> {
        let timestamp = Utc
            .timestamp_opt(epoch_secs, 0)
            .single()
            .ok_or_else(|| Error::invalid_scrobble(format!("invalid timestamp {epoch_secs}")))?;
        Ok(Self { track, timestamp })
    }
}

impl PartialOrd for Scrobble {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scrobble {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp.cmp(&other.timestamp).then_with(|| {
            (&self.track.title, &self.track.artist_name, &self.track.album_name).cmp(&(
                &other.track.title,
                &other.track.artist_name,
                &other.track.album_name,
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{scrobble_at, track};

    #[test]
    fn test_track_equality_is_field_wise() {
        let a = Track::new("Rumors", "R3hab", "The Wave");
        let b = Track::new("Rumors", "R3hab", "The Wave");
        let c = Track::new("Rumors", "R3hab", "Rumors");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_track_equality_is_case_sensitive() {
        let a = Track::new("Ireti", "Moelogo", "Ireti");
        let b = Track::new("ireti", "Moelogo", "Ireti");
        assert_ne!(a, b);
    }

    #[test]
    fn test_scrobble_orders_by_timestamp() {
        let earlier = scrobble_at(track("b"), "2019-01-23T11:48:50Z");
        let later = scrobble_at(track("a"), "2019-01-24T12:00:00Z");
        assert!(earlier < later);
    }

    #[test]
    fn test_scrobble_equality_needs_timestamp_and_track() {
        let a = scrobble_at(track("a"), "2019-01-23T11:48:50Z");
        let b = scrobble_at(track("a"), "2019-01-23T11:48:50Z");
        let c = scrobble_at(track("b"), "2019-01-23T11:48:50Z");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_from_epoch_rejects_unrepresentable_timestamp() {
        let result = Scrobble::from_epoch(track("a"), i64::MAX);
        assert!(matches!(result, Err(Error::InvalidScrobble(_))));
    }

    #[test]
    fn test_wire_format_field_names() {
        let scrobble = scrobble_at(
            Track::new("Feelin Like", "Flipp Dinero", "Feelin Like"),
            "2019-01-23T11:51:22Z",
        );
        let json = serde_json::to_value(&scrobble).unwrap();
        assert_eq!(json["track"]["title"], "Feelin Like");
        assert_eq!(json["track"]["artist"], "Flipp Dinero");
        assert_eq!(json["track"]["album"], "Feelin Like");
        assert_eq!(json["date"], "2019-01-23T11:51:22Z");
    }

    #[test]
    fn test_wire_format_round_trips() {
        let json = r#"{"track":{"title":"Splashin","artist":"Rich the Kid","album":"Splashin"},"date":"2019-01-23T11:54:49Z"}"#;
        let scrobble: Scrobble = serde_json::from_str(json).unwrap();
        assert_eq!(scrobble.track.artist_name, "Rich the Kid");
        assert_eq!(serde_json::to_string(&scrobble).unwrap(), json);
    }

    #[test]
    fn test_wire_format_rejects_malformed_date() {
        let json = r#"{"track":{"title":"a","artist":"b","album":"c"},"date":"not-a-date"}"#;
        assert!(serde_json::from_str::<Scrobble>(json).is_err());
    }
}
