use futures::StreamExt;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::entry::FeedEntry;
use crate::config::{Config, ConfigError};

/// Hard cap on proxy response bodies.
const MAX_RESPONSE_SIZE: usize = 2 * 1024 * 1024; // 2MB

/// Errors that can occur while fetching entries through the proxy.
///
/// The sync layer treats every variant the same way (the refresh
/// silently fails and the last known entries stay on screen), but the
/// distinction matters for logging and tests.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// The proxy was reachable and reported an application-level error
    #[error("Feed proxy reported an error: {0}")]
    Server(String),
    /// The response matched neither the success nor the error envelope
    #[error("Unrecognized proxy response")]
    UnknownResponse,
    /// Response body exceeded the size limit
    #[error("Response too large")]
    ResponseTooLarge,
}

// ============================================================================
// Response Envelope
// ============================================================================

// The proxy wraps everything in `data`: a successful lookup carries
// `data.feed.entries`, an application error carries `data.message`.

#[derive(Deserialize)]
struct Envelope {
    data: Option<Payload>,
}

#[derive(Deserialize)]
struct Payload {
    feed: Option<FeedPayload>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct FeedPayload {
    #[serde(default)]
    entries: Vec<FeedEntry>,
}

// ============================================================================
// Client
// ============================================================================

/// Client for the feed-aggregation proxy.
///
/// Performs a single round trip per fetch; the proxy does the actual
/// Atom/RSS parsing and hands back pre-parsed entries as JSON.
#[derive(Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    proxy_url: Url,
    timeout: Duration,
}

impl FeedClient {
    pub fn new(proxy_url: Url, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            proxy_url,
            timeout,
        }
    }

    /// Build a client from a validated [`Config`].
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.proxy()?,
            Duration::from_secs(config.fetch_timeout_secs),
        ))
    }

    /// Fetch up to `max_count` entries of `feed_url` through the proxy.
    ///
    /// An absent or empty `data.feed.entries` path yields an empty
    /// vector; callers must not assume non-empty.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Transport`] / [`FetchError::Timeout`] - no usable response at all
    /// - [`FetchError::Server`] - the proxy answered with `data.message`
    /// - [`FetchError::UnknownResponse`] - response shape not recognized
    /// - [`FetchError::ResponseTooLarge`] - body over the size limit
    pub async fn fetch(
        &self,
        feed_url: &str,
        max_count: u32,
    ) -> Result<Vec<FeedEntry>, FetchError> {
        let mut url = self.proxy_url.clone();
        url.query_pairs_mut()
            .append_pair("v", "1.0")
            .append_pair("num", &max_count.to_string())
            .append_pair("q", feed_url);

        let response = tokio::time::timeout(self.timeout, self.http.get(url).send())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(FetchError::Transport)?;

        // The proxy reports application errors in-band, so a non-success
        // status still goes through envelope normalization below.
        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), feed = %feed_url, "Proxy returned non-success status");
        }

        let bytes = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;

        let envelope: Envelope = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!(error = %e, feed = %feed_url, "Proxy response is not valid JSON");
                return Err(FetchError::UnknownResponse);
            }
        };

        let Some(payload) = envelope.data else {
            return Err(FetchError::UnknownResponse);
        };

        if let Some(feed) = payload.feed {
            tracing::debug!(feed = %feed_url, count = feed.entries.len(), "Fetched feed entries");
            return Ok(feed.entries);
        }

        match payload.message {
            Some(message) => Err(FetchError::Server(message)),
            None => Err(FetchError::UnknownResponse),
        }
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Transport)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FEED_URL: &str = "https://example.com/feed/atom";

    fn client_for(server: &MockServer) -> FeedClient {
        FeedClient::new(Url::parse(&server.uri()).unwrap(), Duration::from_secs(5))
    }

    fn success_body(entries: serde_json::Value) -> serde_json::Value {
        json!({ "data": { "feed": { "entries": entries } } })
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body(json!([
                { "link": "https://example.com/a", "title": "A" },
                { "link": "https://example.com/b", "title": "B" }
            ]))))
            .mount(&mock_server)
            .await;

        let entries = client_for(&mock_server).fetch(FEED_URL, 30).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].link, "https://example.com/a");
        assert_eq!(entries[1].title, "B");
    }

    #[tokio::test]
    async fn test_fetch_sends_proxy_query_params() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("v", "1.0"))
            .and(query_param("num", "7"))
            .and(query_param("q", FEED_URL))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body(json!([]))))
            .expect(1)
            .mount(&mock_server)
            .await;

        let entries = client_for(&mock_server).fetch(FEED_URL, 7).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_missing_entries_yields_empty() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "feed": {} } })),
            )
            .mount(&mock_server)
            .await;

        let entries = client_for(&mock_server).fetch(FEED_URL, 30).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_server_message_is_surfaced() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "message": "Feed could not be loaded." } })),
            )
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .fetch(FEED_URL, 30)
            .await
            .unwrap_err();
        match err {
            FetchError::Server(message) => assert_eq!(message, "Feed could not be loaded."),
            e => panic!("Expected Server error, got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_error_envelope_on_500_still_surfaces_message() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({ "data": { "message": "backend down" } })),
            )
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .fetch(FEED_URL, 30)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Server(m) if m == "backend down"));
    }

    #[tokio::test]
    async fn test_unrecognized_shape_is_unknown() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .fetch(FEED_URL, 30)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::UnknownResponse));
    }

    #[tokio::test]
    async fn test_non_json_body_is_unknown() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway error</html>"))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .fetch(FEED_URL, 30)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::UnknownResponse));
    }

    #[tokio::test]
    async fn test_timeout_expiry() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(success_body(json!([])))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let client = FeedClient::new(
            Url::parse(&mock_server.uri()).unwrap(),
            Duration::from_millis(50),
        );
        let err = client.fetch(FEED_URL, 30).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout));
    }

    #[tokio::test]
    async fn test_oversized_response_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_bytes(vec![b'a'; MAX_RESPONSE_SIZE + 1]),
            )
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .fetch(FEED_URL, 30)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::ResponseTooLarge));
    }
}
