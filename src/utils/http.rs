//! HTTP utilities for calling geocoding APIs

use crate::error::{Result, SearchError};
use crate::types::QueryParams;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "-rust/", env!("CARGO_PKG_VERSION"));

/// HTTP client wrapper shared by the search engine
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with a custom timeout
    pub fn with_timeout(timeout_ms: u64) -> Result<Self> {
        let timeout = Duration::from_millis(timeout_ms);
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    /// Configured request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Make a GET request and deserialize the JSON response
    pub async fn get_json<T>(&self, url: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        log::trace!("GET {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        self.handle_response_json(response).await
    }

    fn map_send_error(&self, error: reqwest::Error) -> SearchError {
        if error.is_timeout() {
            SearchError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            error.into()
        }
    }

    /// Check the status and deserialize the body as JSON
    async fn handle_response_json<T>(&self, response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();

        if status.is_success() {
            // Decode from text so malformed bodies surface as ParseError
            let body = response.text().await.map_err(|e| self.map_send_error(e))?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let status_code = status.as_u16();
            let response_body = response.text().await.ok();
            log::debug!("request failed with status {status_code}");

            if status_code == 429 {
                return Err(SearchError::RateLimit(format!(
                    "Request failed with status: {status}"
                )));
            }

            Err(SearchError::HttpError {
                message: format!("Request failed with status: {status}"),
                status_code: Some(status_code),
                response_body,
            })
        }
    }
}

/// Build a URL with query parameters appended in key order
pub fn build_url(base_url: &str, params: &QueryParams) -> Result<String> {
    let mut url = Url::parse(base_url)?;

    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }

    Ok(url.to_string())
}

/// Decode the query string of a URL back into parameters
pub fn query_params(url: &str) -> Result<QueryParams> {
    let url = Url::parse(url)?;
    Ok(url.query_pairs().into_owned().collect())
}
