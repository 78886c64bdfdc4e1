//! Raw engine transport — GET/POST returning JSON values.
//!
//! The transport is the single point of failure translation: it never
//! raises. Connection refusal, timeouts and non-2xx statuses all come back
//! as `{"error": "..."}` objects, letting each layer above decide whether
//! the fault is fatal. Callers must check for an `error` key (the typed
//! layer in [`crate::client`] does this once, centrally).

use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, error};

/// Abstraction over the engine's HTTP surface, so skills and the control
/// loop can be exercised against an in-memory fake.
#[async_trait]
pub trait EngineTransport: Send + Sync {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Value;
    async fn post(&self, path: &str, body: &Value) -> Value;
}

/// reqwest-backed transport.
///
/// Connections are established lazily by the pool and reused across calls;
/// dropping the transport releases them on every exit path, so there is no
/// separate close step to forget.
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout_secs: f64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs_f64(timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn translate_send_error(&self, url: &str, e: &reqwest::Error) -> Value {
        if e.is_connect() {
            error!(url, "Engine unreachable");
            json!({ "error": format!("connection refused: {}", self.base_url) })
        } else if e.is_timeout() {
            error!(url, "Engine request timed out");
            json!({ "error": format!("request timed out: {url}") })
        } else {
            error!(url, error = %e, "Engine request failed");
            json!({ "error": e.to_string() })
        }
    }

    /// Decode a response: 2xx bodies parse as the payload; non-2xx bodies
    /// are used as the error payload when they parse, otherwise a generic
    /// error object carries the status description.
    async fn decode(response: reqwest::Response, url: &str) -> Value {
        let status = response.status();
        if status.is_success() {
            match response.json::<Value>().await {
                Ok(value) => value,
                Err(e) => json!({ "error": format!("invalid response body: {e}") }),
            }
        } else {
            error!(url, status = %status, "Engine returned error status");
            match response.json::<Value>().await {
                Ok(value) => value,
                Err(_) => json!({ "error": format!("HTTP {status}") }),
            }
        }
    }
}

#[async_trait]
impl EngineTransport for HttpTransport {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Value {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");
        let mut request = self.client.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }
        match request.send().await {
            Ok(response) => Self::decode(response, &url).await,
            Err(e) => self.translate_send_error(&url, &e),
        }
    }

    async fn post(&self, path: &str, body: &Value) -> Value {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "POST");
        match self.client.post(&url).json(body).send().await {
            Ok(response) => Self::decode(response, &url).await,
            Err(e) => self.translate_send_error(&url, &e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connection_refused_becomes_error_object() {
        // Port 9 (discard) is never serving HTTP locally.
        let transport = HttpTransport::new("http://127.0.0.1:9", 1.0);
        let result = transport.get("/api/health", &[]).await;
        let message = result["error"].as_str().unwrap();
        assert!(
            message.contains("127.0.0.1:9"),
            "error should name the endpoint: {message}"
        );
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let transport = HttpTransport::new("http://localhost:8080/", 10.0);
        assert_eq!(transport.base_url(), "http://localhost:8080");
    }
}
