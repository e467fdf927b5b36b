//! last.fm remote client.
//!
//! Fetches a user's listening history via the `user.getRecentTracks` web
//! service method. The module is split the same way as every other remote
//! integration here:
//! - `client`: HTTP communication and pagination
//! - `dto`: types matching the API JSON exactly, never used outside this module
//! - `adapter`: the only place DTOs convert to [`model`](crate::model) types

mod adapter;
mod client;
mod dto;

pub use client::LastFmClient;

use async_trait::async_trait;

use crate::model::Scrobble;

/// Errors from the last.fm web service.
#[derive(Debug, thiserror::Error)]
pub enum LastFmError {
    /// The username does not exist on last.fm (API error code 6)
    #[error("last.fm user not found: {0}")]
    UserNotFound(String),

    /// Rate limited and retries were exhausted
    #[error("Rate limited by last.fm - try again later")]
    RateLimited,

    /// Transport-level failure; safe to retry
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The API reported an error other than an unknown user
    #[error("API request failed: {0}")]
    Api(String),
}

/// Trait for the recent-tracks lookup.
///
/// Implement this trait to substitute a mock for the real client in tests.
#[async_trait]
pub trait LastFmApi: Send + Sync {
    /// Fetch all scrobbles for a user, oldest bound first.
    ///
    /// `from`/`to` are optional epoch-second bounds for incremental
    /// fetches; `None` means the user's full history.
    async fn recent_tracks(
        &self,
        username: &str,
        from: Option<i64>,
        to: Option<i64>,
    ) -> Result<Vec<Scrobble>, LastFmError>;
}

#[async_trait]
impl LastFmApi for LastFmClient {
    async fn recent_tracks(
        &self,
        username: &str,
        from: Option<i64>,
        to: Option<i64>,
    ) -> Result<Vec<Scrobble>, LastFmError> {
        self.recent_tracks(username, from, to).await
    }
}
