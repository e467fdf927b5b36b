//! Period aggregation over listening history.
//!
//! Pure functions that filter, bucket, and rank an in-memory collection of
//! [`Scrobble`](crate::model::Scrobble)s. Nothing here performs I/O or
//! mutates its input - every operation derives a new collection, so a
//! query's snapshot can be shared freely.
//!
//! [`period::events_in_period`] is the single filtering primitive; both the
//! histogram ([`period::count_in_period`]) and the rankings
//! ([`ranking::top_tracks`] and friends) are built on it so all query types
//! share one boundary semantics.

pub mod period;
pub mod ranking;

pub use period::{PeriodUnit, count_in_period, events_in_period};
pub use ranking::{AlbumPlays, ArtistPlays, TrackPlays, top_albums, top_artists, top_tracks};
