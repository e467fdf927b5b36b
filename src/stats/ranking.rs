//! Top-N rankings over a filtered event set.
//!
//! Grouping is by [`Track`] equality (the full title/artist/album triple),
//! with first-encounter order preserved so equal play counts rank in the
//! order the tracks first appeared in the event set. Repeated runs on the
//! same input always produce the same output.
//!
//! Artist and album rankings are derived from the top-N *tracks*: the track
//! ranking is folded by artist name (or album/artist pair), so plays of an
//! artist's tracks that fall outside the track top-N do not contribute.
//! This matches the behavior existing consumers depend on.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::model::{Scrobble, Track};

use super::period::events_in_period;

/// A track and how often it was played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackPlays {
    pub track: Track,
    pub played: u64,
}

/// An artist and how often their top-ranked tracks were played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistPlays {
    pub artist: String,
    pub played: u64,
}

/// An album and how often its top-ranked tracks were played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumPlays {
    pub album: String,
    pub artist: String,
    pub played: u64,
}

/// The `limit` most-played tracks in `[start, end]`, count descending.
///
/// Ties keep first-encounter order: the sort is stable and groups are
/// created in event iteration order.
pub fn top_tracks(
    events: &[Scrobble],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    limit: usize,
) -> Vec<TrackPlays> {
    let mut ranked = play_counts(events, start, end);
    ranked.sort_by(|a, b| b.played.cmp(&a.played));
    ranked.truncate(limit);
    ranked
}

/// The most-played artists in `[start, end]`, derived from the top
/// `limit` tracks.
pub fn top_artists(
    events: &[Scrobble],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    limit: usize,
) -> Vec<ArtistPlays> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut artists: Vec<ArtistPlays> = Vec::new();
    for entry in top_tracks(events, start, end, limit) {
        match index.get(&entry.track.artist_name) {
            Some(&i) => artists[i].played += entry.played,
            None => {
                index.insert(entry.track.artist_name.clone(), artists.len());
                artists.push(ArtistPlays {
                    artist: entry.track.artist_name,
                    played: entry.played,
                });
            }
        }
    }
    artists
}

/// The most-played albums in `[start, end]`, derived from the top
/// `limit` tracks.
pub fn top_albums(
    events: &[Scrobble],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    limit: usize,
) -> Vec<AlbumPlays> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut albums: Vec<AlbumPlays> = Vec::new();
    for entry in top_tracks(events, start, end, limit) {
        let key = (entry.track.album_name.clone(), entry.track.artist_name.clone());
        match index.get(&key) {
            Some(&i) => albums[i].played += entry.played,
            None => {
                index.insert(key, albums.len());
                albums.push(AlbumPlays {
                    album: entry.track.album_name,
                    artist: entry.track.artist_name,
                    played: entry.played,
                });
            }
        }
    }
    albums
}

/// Group the filtered events by track equality, counting plays.
///
/// Returns one entry per distinct track, in first-encounter order.
fn play_counts(events: &[Scrobble], start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<TrackPlays> {
    let mut index: HashMap<&Track, usize> = HashMap::new();
    let mut counts: Vec<TrackPlays> = Vec::new();
    for scrobble in events_in_period(events, start, end) {
        match index.get(&scrobble.track) {
            Some(&i) => counts[i].played += 1,
            None => {
                index.insert(&scrobble.track, counts.len());
                counts.push(TrackPlays {
                    track: scrobble.track.clone(),
                    played: 1,
                });
            }
        }
    }
    counts
}
