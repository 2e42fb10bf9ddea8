// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Status sources.
//!
//! A [`StatusSource`] performs one cancellable fetch of the status resource
//! and returns the decoded JSON body.

use std::future::Future;

use log::debug;
use reqwest::header::ACCEPT;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Base URL for BattleMetrics server resources.
pub const BATTLEMETRICS_SERVERS_URL: &str = "https://api.battlemetrics.com/servers";

/// Build the BattleMetrics endpoint for a server id.
#[must_use]
pub fn battlemetrics_endpoint(server_id: &str) -> String {
    format!("{BATTLEMETRICS_SERVERS_URL}/{}", server_id.trim())
}

/// Errors from a single fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("status endpoint responded {0}")]
    Status(u16),

    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request cancelled")]
    Cancelled,
}

/// A cancellable fetch of the status resource.
pub trait StatusSource {
    /// Fetch and decode the status body.
    ///
    /// Implementations should return [`FetchError::Cancelled`] as soon as
    /// `cancel` fires.
    fn fetch(&self, cancel: CancellationToken) -> impl Future<Output = Result<Value, FetchError>> + Send;
}

/// HTTP status source backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpStatusSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpStatusSource {
    #[must_use]
    pub fn new(endpoint: String) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch_body(&self) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl StatusSource for HttpStatusSource {
    async fn fetch(&self, cancel: CancellationToken) -> Result<Value, FetchError> {
        debug!("Fetching server status from {}", self.endpoint);

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(FetchError::Cancelled),
            result = self.fetch_body() => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP response on a loopback port.
    ///
    /// Returns the endpoint URL and a handle yielding the raw request head.
    async fn serve_once(response: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request: Vec<u8> = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{addr}/servers/36230853"), handle)
    }

    fn asked_for_json(request: &str) -> bool {
        request
            .lines()
            .any(|line| line.eq_ignore_ascii_case("accept: application/json"))
    }

    #[test]
    fn test_battlemetrics_endpoint() {
        assert_eq!(
            battlemetrics_endpoint("36230853"),
            "https://api.battlemetrics.com/servers/36230853"
        );
        assert_eq!(
            battlemetrics_endpoint(" 42 "),
            "https://api.battlemetrics.com/servers/42"
        );
    }

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(FetchError::Status(500).to_string(), "status endpoint responded 500");
        assert_eq!(FetchError::Cancelled.to_string(), "request cancelled");
    }

    #[tokio::test]
    async fn test_cancelled_token_short_circuits() {
        let source = HttpStatusSource::new("http://127.0.0.1:9/status".to_string());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = source.fetch(cancel).await;
        assert!(matches!(result, Err(FetchError::Cancelled)));
    }

    #[tokio::test]
    async fn test_fetch_decodes_body() {
        let (endpoint, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 37\r\nConnection: close\r\n\r\n{\"data\":{\"attributes\":{\"players\":5}}}",
        )
        .await;
        let source = HttpStatusSource::new(endpoint);

        let body = source.fetch(CancellationToken::new()).await.unwrap();
        assert_eq!(body["data"]["attributes"]["players"], 5);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /servers/36230853 "));
        assert!(asked_for_json(&request));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_status() {
        let (endpoint, server) = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let source = HttpStatusSource::new(endpoint);

        let result = source.fetch(CancellationToken::new()).await;
        assert!(matches!(result, Err(FetchError::Status(500))));
        assert!(asked_for_json(&server.await.unwrap()));
    }

    #[tokio::test]
    async fn test_malformed_body_maps_to_json_error() {
        let (endpoint, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 3\r\nConnection: close\r\n\r\n{x]",
        )
        .await;
        let source = HttpStatusSource::new(endpoint);

        let result = source.fetch(CancellationToken::new()).await;
        assert!(matches!(result, Err(FetchError::Json(_))));
        assert!(asked_for_json(&server.await.unwrap()));
    }
}
