//! Transport adapter shared by both backend clients
//!
//! Every call carries a JSON content type, no credentials, and the configured
//! timeout. Failures are logged as `API Error [<url>]: <body-or-message>`.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::mapper::extract_error_message;

/// JSON-over-HTTP client bound to one backend base URL
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> DiscoveryResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| DiscoveryError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> DiscoveryResult<T> {
        let url = self.url(path);
        let response = self.send(self.client.get(&url).query(query), &url).await?;
        decode(response, &url).await
    }

    /// GET that treats 404 and an empty/`null` body as absence.
    pub async fn get_optional_json(&self, path: &str) -> DiscoveryResult<Option<Value>> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_failure(&url, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::warn!("API Error [{}]: not found", url);
            return Ok(None);
        }
        let response = ensure_success(response, &url).await?;

        let body = response
            .text()
            .await
            .map_err(|e| transport_failure(&url, e))?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(&body)?;
        Ok(Some(value).filter(|v| !v.is_null()))
    }

    pub async fn post_json<B, T>(&self, path: &str, body: Option<&B>) -> DiscoveryResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let mut request = self.client.post(&url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = self.send(request, &url).await?;
        decode(response, &url).await
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> DiscoveryResult<Response> {
        tracing::debug!("request {}", url);
        let response = request.send().await.map_err(|e| transport_failure(url, e))?;
        ensure_success(response, url).await
    }
}

fn transport_failure(url: &str, err: reqwest::Error) -> DiscoveryError {
    let message = if err.is_timeout() {
        format!("Request timed out: {}", err)
    } else {
        err.to_string()
    };
    tracing::error!("API Error [{}]: {}", url, message);
    DiscoveryError::Transport {
        url: url.to_string(),
        status: err.status().map(|s| s.as_u16()),
        message,
    }
}

async fn ensure_success(response: Response, url: &str) -> DiscoveryResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let logged = if body.trim().is_empty() {
        format!("Request failed with status code {}", status.as_u16())
    } else {
        body.clone()
    };
    tracing::error!("API Error [{}]: {}", url, logged);

    Err(DiscoveryError::Transport {
        url: url.to_string(),
        status: Some(status.as_u16()),
        message: extract_error_message(&body).unwrap_or(logged),
    })
}

async fn decode<T: DeserializeOwned>(response: Response, url: &str) -> DiscoveryResult<T> {
    response.json::<T>().await.map_err(|e| {
        tracing::error!("API Error [{}]: {}", url, e);
        DiscoveryError::Decode(format!("{}: {}", url, e))
    })
}
