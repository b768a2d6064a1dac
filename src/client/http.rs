//! HTTP Transport
//!
//! Thin wrapper around reqwest issuing the one GET or POST each
//! lookup operation needs. Applies the per-call timeout, classifies
//! non-success statuses, and captures the service's rate-limit
//! headers from every response.
//!
//! No retries: a timeout or transport failure surfaces immediately as
//! an API error.

use crate::client::rate_limiter::ResponseMetadata;
use crate::error::{IpApiError, Result};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// HTTP transport for the ip-api.com endpoints
#[derive(Debug)]
pub struct HttpTransport {
    /// Inner reqwest client
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(|e| IpApiError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// GET a JSON resource
    pub async fn get_json<R>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<(R, ResponseMetadata)>
    where
        R: DeserializeOwned,
    {
        let (body, metadata) = self.get_text(url, query).await?;
        let parsed = serde_json::from_str(&body).map_err(|e| {
            IpApiError::Api(format!(
                "failed to parse response: {}. Body: {}",
                e,
                truncate_body(&body)
            ))
        })?;
        Ok((parsed, metadata))
    }

    /// GET a resource as raw text (xml, csv, line formats)
    pub async fn get_text(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<(String, ResponseMetadata)> {
        debug!(url, "dispatching GET request");
        let response = self.client.get(url).query(query).send().await?;
        let (response, metadata) = Self::classify_status(response).await?;
        Ok((response.text().await?, metadata))
    }

    /// POST a JSON body and parse the JSON response (batch endpoint)
    pub async fn post_json<T, R>(
        &self,
        url: &str,
        query: &[(&str, String)],
        body: &T,
    ) -> Result<(R, ResponseMetadata)>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        debug!(url, "dispatching POST request");
        let response = self
            .client
            .post(url)
            .query(query)
            .json(body)
            .send()
            .await?;
        let (response, metadata) = Self::classify_status(response).await?;

        let body = response.text().await?;
        let parsed = serde_json::from_str(&body).map_err(|e| {
            IpApiError::Api(format!(
                "failed to parse response: {}. Body: {}",
                e,
                truncate_body(&body)
            ))
        })?;
        Ok((parsed, metadata))
    }

    /// Turn non-success HTTP statuses into errors, keeping whatever
    /// rate-limit metadata the response carried
    async fn classify_status(response: Response) -> Result<(Response, ResponseMetadata)> {
        let status = response.status();
        let metadata = ResponseMetadata::from_headers(response.headers());

        if status.is_success() {
            return Ok((response, metadata));
        }

        if status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(IpApiError::Api(
                "batch request validation failed (over 100 entries or malformed body)".to_string(),
            ));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let msg = match metadata.seconds_until_reset {
                Some(ttl) => format!("server rate limit exceeded, resets in {} seconds", ttl),
                None => "server rate limit exceeded".to_string(),
            };
            return Err(IpApiError::Api(msg));
        }

        let body = response.text().await.unwrap_or_default();
        Err(IpApiError::Api(format!(
            "request failed with status {}: {}",
            status,
            truncate_body(&body)
        )))
    }
}

/// Cap a response body for inclusion in error messages, backing off
/// to the previous char boundary so multi-byte UTF-8 never splits
fn truncate_body(body: &str) -> &str {
    const MAX_LEN: usize = 500;

    if body.len() <= MAX_LEN {
        return body;
    }
    let mut end = MAX_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transport_creation() {
        let transport = HttpTransport::new(Duration::from_secs(10));
        assert!(transport.is_ok());
    }

    #[tokio::test]
    async fn test_get_json_classifies_422() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/json/8.8.8.8")
            .with_status(422)
            .create_async()
            .await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let url = format!("{}/json/8.8.8.8", server.url());
        let err = transport
            .get_json::<serde_json::Value>(&url, &[])
            .await
            .unwrap_err();

        assert!(matches!(err, IpApiError::Api(_)));
        assert!(err.to_string().contains("validation failed"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_json_classifies_429_with_ttl() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/json/8.8.8.8")
            .with_status(429)
            .with_header("X-Ttl", "23")
            .create_async()
            .await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let url = format!("{}/json/8.8.8.8", server.url());
        let err = transport
            .get_json::<serde_json::Value>(&url, &[])
            .await
            .unwrap_err();

        assert!(matches!(err, IpApiError::Api(_)));
        assert!(err.to_string().contains("23 seconds"));
        mock.assert_async().await;
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        // Byte 500 lands inside the two-byte 'é'
        let body = format!("{}é and more", "x".repeat(499));
        let truncated = truncate_body(&body);
        assert_eq!(truncated.len(), 499);
        assert!(truncated.chars().all(|c| c == 'x'));

        let short = "ééé";
        assert_eq!(truncate_body(short), short);
    }

    #[tokio::test]
    async fn test_parse_error_with_multibyte_body_over_limit() {
        let mut server = mockito::Server::new_async().await;
        let body = format!("{}é définitivement pas du JSON", "x".repeat(499));
        let _mock = server
            .mock("GET", "/json/8.8.8.8")
            .with_status(200)
            .with_body(&body)
            .create_async()
            .await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let url = format!("{}/json/8.8.8.8", server.url());
        let err = transport
            .get_json::<serde_json::Value>(&url, &[])
            .await
            .unwrap_err();

        assert!(matches!(err, IpApiError::Api(_)));
        assert!(err.to_string().contains("failed to parse response"));
    }

    #[tokio::test]
    async fn test_get_json_undecodable_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/json")
            .with_status(200)
            .with_body("<html>definitely not json</html>")
            .create_async()
            .await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let url = format!("{}/json", server.url());
        let err = transport
            .get_json::<serde_json::Value>(&url, &[])
            .await
            .unwrap_err();

        assert!(matches!(err, IpApiError::Api(_)));
        assert!(err.to_string().contains("failed to parse response"));
    }
}
