//! Core `QueryResolver` trait and the `SummaryResolver` implementation.
//!
//! `SummaryResolver` calls a page-summary REST endpoint
//! (`GET {base_url}/{urlEncodedQuery}`) and returns the record's `extract`.
//! All connection details come from [`LookupConfig`]; nothing is hardcoded.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::LookupConfig;

/// Answer used when the service has a page but no summary text for it.
pub const NO_SUMMARY: &str = "No summary available.";

// ---------------------------------------------------------------------------
// LookupError
// ---------------------------------------------------------------------------

/// Every way a lookup can fail.  Callers treat all variants alike.
#[derive(Debug, Error)]
pub enum LookupError {
    /// HTTP transport or connection error.
    #[error("lookup request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("lookup timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("lookup returned HTTP {0}")]
    Status(u16),

    /// The response body was not the expected JSON record.
    #[error("failed to parse lookup response: {0}")]
    Parse(String),
}

impl LookupError {
    /// `true` when the service reported that no page exists.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::Status(404))
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::Timeout
        } else {
            LookupError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// QueryResolver trait
// ---------------------------------------------------------------------------

/// Turns a free-text query into a short textual answer.
///
/// The query is expected to be non-empty and trimmed; blank input is
/// rejected before it gets here.
#[async_trait]
pub trait QueryResolver: Send + Sync {
    async fn resolve(&self, query: &str) -> Result<String, LookupError>;
}

// ---------------------------------------------------------------------------
// SummaryResolver
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SummaryRecord {
    #[serde(default)]
    extract: Option<String>,
}

pub struct SummaryResolver {
    client: reqwest::Client,
    base_url: String,
}

impl SummaryResolver {
    /// Build a `SummaryResolver` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default client is used as a last-resort
    /// fallback if the builder fails.
    pub fn from_config(config: &LookupConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// URL of the summary record for `query`; the query is one encoded path
    /// segment.
    pub fn summary_url(&self, query: &str) -> String {
        format!("{}/{}", self.base_url, encode_component(query))
    }
}

/// Percent-encode `segment` leaving `A-Z a-z 0-9 - _ . ! ~ * ' ( )` as is.
fn encode_component(segment: &str) -> String {
    const KEPT: [(&str, &str); 5] = [
        ("%21", "!"),
        ("%27", "'"),
        ("%28", "("),
        ("%29", ")"),
        ("%2A", "*"),
    ];
    KEPT.iter()
        .fold(urlencoding::encode(segment).into_owned(), |acc, (escaped, raw)| {
            acc.replace(escaped, raw)
        })
}

#[async_trait]
impl QueryResolver for SummaryResolver {
    async fn resolve(&self, query: &str) -> Result<String, LookupError> {
        let url = self.summary_url(query);
        log::debug!("resolver: GET {url}");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            log::debug!("resolver: {query:?} → HTTP {status}");
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let record: SummaryRecord =
            serde_json::from_str(&body).map_err(|e| LookupError::Parse(e.to_string()))?;

        Ok(record
            .extract
            .filter(|extract| !extract.is_empty())
            .unwrap_or_else(|| NO_SUMMARY.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve one canned HTTP response; yields the base URL and the request
    /// line that was received.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let request_line = request.lines().next().unwrap_or_default().to_string();

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            let _ = tx.send(request_line);
        });

        (format!("http://{addr}/page/summary"), rx)
    }

    fn resolver(base_url: &str) -> SummaryResolver {
        SummaryResolver::from_config(&LookupConfig {
            base_url: base_url.into(),
            timeout_secs: 5,
            ..LookupConfig::default()
        })
    }

    #[test]
    fn query_is_encoded_as_one_path_segment() {
        let r = resolver("https://example.org/summary/");
        assert_eq!(
            r.summary_url("Godzilla vs Kong/2021?"),
            "https://example.org/summary/Godzilla%20vs%20Kong%2F2021%3F"
        );
    }

    #[test]
    fn punctuation_marks_stay_literal() {
        let r = resolver("https://example.org/summary");
        assert_eq!(
            r.summary_url("Spider-Man (2002)"),
            "https://example.org/summary/Spider-Man%20(2002)"
        );
        assert_eq!(
            r.summary_url("Don't Look Up!*~"),
            "https://example.org/summary/Don't%20Look%20Up!*~"
        );
        assert_eq!(r.summary_url("100%"), "https://example.org/summary/100%25");
    }

    #[tokio::test]
    async fn returns_extract_on_success() {
        let (base, request) =
            serve_once("200 OK", r#"{"title":"Godzilla","extract":"Godzilla is a monster."}"#)
                .await;

        let answer = resolver(&base).resolve("Godzilla").await.unwrap();

        assert_eq!(answer, "Godzilla is a monster.");
        assert_eq!(request.await.unwrap(), "GET /page/summary/Godzilla HTTP/1.1");
    }

    #[tokio::test]
    async fn missing_extract_falls_back() {
        let (base, _) = serve_once("200 OK", r#"{"title":"Stub"}"#).await;
        assert_eq!(resolver(&base).resolve("Stub").await.unwrap(), NO_SUMMARY);
    }

    #[tokio::test]
    async fn empty_extract_falls_back() {
        let (base, _) = serve_once("200 OK", r#"{"extract":""}"#).await;
        assert_eq!(resolver(&base).resolve("Stub").await.unwrap(), NO_SUMMARY);
    }

    #[tokio::test]
    async fn not_found_is_a_lookup_failure() {
        let (base, _) = serve_once("404 Not Found", r#"{"type":"not_found"}"#).await;
        let err = resolver(&base).resolve("xyzzy").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_failure() {
        let (base, _) = serve_once("200 OK", "<html>not json</html>").await;
        let err = resolver(&base).resolve("Godzilla").await.unwrap_err();
        assert!(matches!(err, LookupError::Parse(_)));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_request_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = resolver(&format!("http://{addr}"))
            .resolve("Godzilla")
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::Request(_) | LookupError::Timeout));
    }

    #[test]
    fn resolver_is_object_safe() {
        let r: Box<dyn QueryResolver> = Box::new(resolver("http://localhost"));
        drop(r);
    }
}
