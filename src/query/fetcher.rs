//! HTTP fetcher backed by the API service.

use std::time::Duration;

use futures_util::FutureExt;
use serde::Deserialize;
use url::Url;

use crate::query::{Fetcher, QueryError, QueryFuture, QueryKey};

/// Error body returned by the API on 4xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Resolves query keys as GET requests relative to a base URL.
#[derive(Debug, Clone)]
pub struct ApiFetcher {
    client: reqwest::Client,
    base: Url,
}

impl ApiFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, QueryError> {
        let base = Url::parse(base_url).map_err(|e| QueryError::InvalidKey(format!("{}: {}", base_url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QueryError::Transport(e.to_string()))?;
        Ok(Self { client, base })
    }

    /// Absolute URL for `key`.
    pub fn url_for(&self, key: &QueryKey) -> Result<Url, QueryError> {
        self.base
            .join(key.as_str())
            .map_err(|e| QueryError::InvalidKey(format!("{}: {}", key, e)))
    }
}

impl Fetcher for ApiFetcher {
    fn fetch(&self, key: &QueryKey) -> QueryFuture {
        let client = self.client.clone();
        let url = self.url_for(key);
        async move {
            let url = url?;
            let response = client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| QueryError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let message = match response.json::<ErrorBody>().await {
                    Ok(body) => body.error,
                    Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
                };
                tracing::debug!(url = %url, status = %status, "API returned error status");
                return Err(QueryError::Status {
                    status: status.as_u16(),
                    message,
                });
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| QueryError::Decode(e.to_string()))
        }
        .boxed()
    }
}
