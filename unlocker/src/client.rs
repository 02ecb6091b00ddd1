use std::collections::BTreeMap;

use common::{
    env_config::UnlockerConfig,
    error::{AppError, Res},
};
use reqwest::{Client, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

use crate::dtos::UnlockRequest;

/// Drops everything from the first `?` on and trims surrounding whitespace.
pub fn clean_url(url: &str) -> String {
    url.trim()
        .split('?')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Thin wrapper around the proxy API. Cheap to clone; the underlying
/// `reqwest::Client` keeps one connection pool per process.
#[derive(Clone)]
pub struct UnlockerClient {
    http: Client,
    config: UnlockerConfig,
}

impl UnlockerClient {
    pub fn new(config: UnlockerConfig) -> Res<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(UnlockerClient { http, config })
    }

    /// Fetches the raw HTML of a storefront page. The query string is
    /// stripped before the request leaves the process.
    pub async fn fetch_page(&self, url: &str) -> Res<String> {
        let clean = clean_url(url);
        let envelope = UnlockRequest {
            url: &clean,
            body: None,
            zone: &self.config.zone,
            format: "raw",
            method: "GET",
            country: &self.config.country,
            headers: BTreeMap::new(),
        };

        log::debug!("Fetching page {} through unlocker", clean);
        let response = self.send(&envelope).await?;
        response.text().await.map_err(AppError::from)
    }

    /// Sends a JSON POST to `url` through the proxy and decodes the JSON reply.
    pub async fn post_json<B, R>(&self, url: &str, body: &B, headers: &[(&str, &str)]) -> Res<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let headers = headers
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        let envelope = UnlockRequest {
            url,
            body: Some(serde_json::to_string(body)?),
            zone: &self.config.zone,
            format: "raw",
            method: "POST",
            country: &self.config.country,
            headers,
        };

        log::debug!("Posting to {} through unlocker", url);
        let response = self.send(&envelope).await?;
        response.json::<R>().await.map_err(AppError::from)
    }

    async fn send(&self, envelope: &UnlockRequest<'_>) -> Res<reqwest::Response> {
        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(envelope)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    log::warn!("Unlocker request for {} timed out", envelope.url);
                    AppError::UpstreamFetch {
                        status: StatusCode::GATEWAY_TIMEOUT.as_u16(),
                    }
                } else {
                    AppError::from(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            log::warn!(
                "Unlocker returned {} for {} {}",
                status,
                envelope.method,
                envelope.url
            );
            return Err(AppError::UpstreamFetch {
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}
