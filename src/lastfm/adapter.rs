//! Adapter layer: Convert last.fm DTOs to model types
//!
//! This is the ONLY place where DTO types are converted to model types.
//! This isolates API changes - if last.fm changes their response format,
//! only this file and dto.rs need to change.

use chrono::Utc;
use tracing::{debug, warn};

use super::dto;
use crate::model::{Scrobble, Track};

/// Convert one page of recent tracks into scrobbles.
///
/// Entries that cannot become a valid scrobble are dropped, never
/// coerced: a malformed `uts` is logged and skipped, and an entry with no
/// date at all is skipped unless it is the currently-playing track, which
/// gets stamped with the current time.
pub fn to_scrobbles(response: dto::RecentTracksResponse) -> Vec<Scrobble> {
    let mut scrobbles = Vec::with_capacity(response.recenttracks.track.len());
    for entry in response.recenttracks.track {
        let track = Track::new(entry.name, entry.artist.text, entry.album.text);
        match entry.date {
            Some(date) => match date.uts.parse::<i64>() {
                Ok(uts) => match Scrobble::from_epoch(track, uts) {
                    Ok(scrobble) => scrobbles.push(scrobble),
                    Err(e) => warn!(uts, error = %e, "discarding scrobble"),
                },
                Err(_) => warn!(uts = %date.uts, "discarding scrobble with malformed uts"),
            },
            None if is_now_playing(entry.attr.as_ref()) => {
                scrobbles.push(Scrobble::new(track, Utc::now()));
            }
            None => debug!(title = %track.title, "skipping entry without a timestamp"),
        }
    }
    scrobbles
}

fn is_now_playing(attr: Option<&dto::RecentTrackAttr>) -> bool {
    attr.and_then(|a| a.nowplaying.as_deref()) == Some("true")
}
