//! Access to the remote city store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::domain::{City, CityId, NewCity};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid city store url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },
    #[error("{url} responded with {status}")]
    Status { url: String, status: StatusCode },
    #[error("failed to decode response from {url}: {source}")]
    Decode { url: String, source: reqwest::Error },
    #[error("city store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CityStore: Send + Sync {
    async fn list(&self) -> Result<Vec<City>, StoreError>;
    async fn get(&self, id: CityId) -> Result<City, StoreError>;
    async fn create(&self, city: &NewCity) -> Result<City, StoreError>;
    async fn delete(&self, id: CityId) -> Result<(), StoreError>;
}

/// `CityStore` speaking the `/cities` REST surface.
pub struct HttpCityStore {
    http: Client,
    base_url: String,
}

impl HttpCityStore {
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        Url::parse(base_url).map_err(|source| StoreError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(StoreError::Client)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn cities_url(&self) -> String {
        format!("{}/cities", self.base_url)
    }

    fn city_url(&self, id: CityId) -> String {
        format!("{}/cities/{id}", self.base_url)
    }

    async fn send(
        &self,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, StoreError> {
        let response = request.send().await.map_err(|source| StoreError::Transport {
            url: url.to_string(),
            source,
        })?;
        let status = response.status();
        debug!(%url, %status, "city store responded");
        if !status.is_success() {
            return Err(StoreError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        url: &str,
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        response.json().await.map_err(|source| StoreError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl CityStore for HttpCityStore {
    async fn list(&self) -> Result<Vec<City>, StoreError> {
        let url = self.cities_url();
        let response = self.send(&url, self.http.get(&url)).await?;
        Self::decode(&url, response).await
    }

    async fn get(&self, id: CityId) -> Result<City, StoreError> {
        let url = self.city_url(id);
        let response = self.send(&url, self.http.get(&url)).await?;
        Self::decode(&url, response).await
    }

    async fn create(&self, city: &NewCity) -> Result<City, StoreError> {
        let url = self.cities_url();
        // `json` also sets `Content-Type: application/json`.
        let response = self.send(&url, self.http.post(&url).json(city)).await?;
        Self::decode(&url, response).await
    }

    async fn delete(&self, id: CityId) -> Result<(), StoreError> {
        let url = self.city_url(id);
        self.send(&url, self.http.delete(&url)).await?;
        Ok(())
    }
}
