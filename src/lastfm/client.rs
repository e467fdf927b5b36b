//! last.fm HTTP client
//!
//! Handles communication with the last.fm web service.
//! See: https://www.last.fm/api/show/user.getRecentTracks
//!
//! A full history spans many pages (200 scrobbles each); the client walks
//! `totalPages` and concatenates the results. 429 responses are retried a
//! bounded number of times with a delay before surfacing as
//! [`LastFmError::RateLimited`].

use std::time::Duration;

use tracing::{debug, warn};

use super::dto;
use super::{LastFmError, adapter};
use crate::model::Scrobble;

/// Scrobbles requested per page (the API maximum)
const PAGE_SIZE: u32 = 200;

/// How many times a rate-limited request is retried before giving up
const RATE_LIMIT_RETRIES: u32 = 3;

/// Delay before retrying a rate-limited request
const RATE_LIMIT_BACKOFF: Duration = Duration::from_millis(1100);

/// last.fm API client
pub struct LastFmClient {
    api_key: String,
    http_client: reqwest::Client,
    base_url: String,
}

impl LastFmClient {
    /// Create a new client with the given API key
    ///
    /// The client is configured to:
    /// - Accept gzip-compressed responses (reduces bandwidth)
    /// - Send a User-Agent header identifying the application
    pub fn new(api_key: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            api_key: api_key.into(),
            http_client,
            base_url: "https://ws.audioscrobbler.com/2.0/".to_string(),
        }
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch all scrobbles for a user within the optional epoch bounds.
    ///
    /// Walks every page of the paginated response. Entries that cannot be
    /// converted (no usable timestamp) are dropped by the adapter.
    pub async fn recent_tracks(
        &self,
        username: &str,
        from: Option<i64>,
        to: Option<i64>,
    ) -> Result<Vec<Scrobble>, LastFmError> {
        let mut scrobbles = Vec::new();
        let mut page = 1u32;
        let mut total_pages = 1u32;

        while page <= total_pages {
            let response = self.fetch_page(username, page, from, to).await?;
            total_pages = response
                .recenttracks
                .attr
                .total_pages
                .parse()
                .map_err(|_| {
                    LastFmError::Parse(format!(
                        "non-numeric totalPages: {}",
                        response.recenttracks.attr.total_pages
                    ))
                })?;
            scrobbles.extend(adapter::to_scrobbles(response));
            debug!(username, page, total_pages, "fetched scrobble page");
            page += 1;
        }

        Ok(scrobbles)
    }

    /// Fetch a single page, retrying on rate limits.
    async fn fetch_page(
        &self,
        username: &str,
        page: u32,
        from: Option<i64>,
        to: Option<i64>,
    ) -> Result<dto::RecentTracksResponse, LastFmError> {
        let mut attempts = 0;
        loop {
            let mut request = self
                .http_client
                .get(&self.base_url)
                .query(&[
                    ("method", "user.getRecentTracks"),
                    ("user", username),
                    ("format", "json"),
                    ("api_key", &self.api_key),
                ])
                .query(&[("limit", PAGE_SIZE), ("page", page)]);
            if let Some(from) = from {
                request = request.query(&[("from", from)]);
            }
            if let Some(to) = to {
                request = request.query(&[("to", to)]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| LastFmError::Network(e.to_string()))?;
            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                if attempts >= RATE_LIMIT_RETRIES {
                    return Err(LastFmError::RateLimited);
                }
                attempts += 1;
                warn!(username, page, attempts, "rate limited, backing off");
                tokio::time::sleep(RATE_LIMIT_BACKOFF).await;
                continue;
            }

            let body = response
                .text()
                .await
                .map_err(|e| LastFmError::Network(e.to_string()))?;

            // The API reports errors in the body; an unknown user must be
            // distinguished from a transient failure.
            if let Ok(error) = serde_json::from_str::<dto::ApiError>(&body) {
                if error.error == dto::ERROR_USER_NOT_FOUND {
                    return Err(LastFmError::UserNotFound(username.to_string()));
                }
                return Err(LastFmError::Api(error.message));
            }

            if !status.is_success() {
                return Err(LastFmError::Network(format!(
                    "HTTP {}: {}",
                    status,
                    status.canonical_reason().unwrap_or("Unknown")
                )));
            }

            return serde_json::from_str(&body).map_err(|e| LastFmError::Parse(e.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = LastFmClient::new("key");
        assert_eq!(client.base_url, "https://ws.audioscrobbler.com/2.0/");
    }

    #[test]
    fn test_client_with_custom_url() {
        let client = LastFmClient::with_base_url("key", "http://localhost:8080");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_user_not_found_body_is_classified() {
        let body = r#"{"error": 6, "message": "User not found"}"#;
        let parsed: dto::ApiError = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error, dto::ERROR_USER_NOT_FOUND);
    }

    #[test]
    fn test_success_body_does_not_parse_as_error() {
        let body = r#"{"recenttracks": {"track": [], "@attr": {"page": "1", "totalPages": "0", "total": "0"}}}"#;
        assert!(serde_json::from_str::<dto::ApiError>(body).is_err());
        assert!(serde_json::from_str::<dto::RecentTracksResponse>(body).is_ok());
    }
}
