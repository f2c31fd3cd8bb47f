//! Single-request executor for the remote API.
//!
//! Issues one HTTP call and classifies the outcome by status class: 2xx is a
//! success carrying body and headers, 4xx and 5xx keep their status and body,
//! and everything else (1xx/3xx, connection faults, timeouts) is a transport
//! error. Retry and failover decisions live one level up.

use std::time::Duration;

use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as ReqwestClient, Method};
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;

/// A successful (2xx) API response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Response status
    pub status: reqwest::StatusCode,
    /// Raw response body text
    pub body: String,
    /// Response headers
    pub headers: HeaderMap,
}

impl ApiResponse {
    /// Credential carried in the `authorization` response header, if any.
    pub(crate) fn authorization_header(&self) -> Option<String> {
        self.headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok()).map(str::to_string)
    }
}

pub(crate) struct ApiTransport {
    http: ReqwestClient,
    base_url: String,
}

impl ApiTransport {
    pub(crate) fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Transport(format!("failed to build HTTP client: {err}")))?;

        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
    }

    /// Issue one request with JSON headers and an optional bearer credential.
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "sending API request");

        let mut request = self
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header("Accept-Charset", "utf-8");

        if let Some(token) = bearer {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response =
            request.send().await.map_err(|err| ApiError::Transport(err.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|err| ApiError::Transport(format!("failed to read response body: {err}")))?;
        debug!(%url, %status, "received API response");

        match status.as_u16() / 100 {
            2 => Ok(ApiResponse { status, body, headers }),
            4 => Err(ApiError::Client { status, body }),
            5 => Err(ApiError::Server { status, body }),
            _ => Err(ApiError::Transport(format!("unexpected response status {status}"))),
        }
    }
}
