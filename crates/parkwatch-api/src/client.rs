//! HTTP client for the parking backend.
//!
//! Wraps `reqwest` with the backend's error conventions: a non-2xx status,
//! an `"error"` field, or `"success": false` in the body all surface as
//! [`ApiError::BadResponse`]. Reads are retried on transient failures when a
//! retry budget is configured; `park-vehicle` is never retried.

use std::time::Duration;

use parkwatch_core::LocalPoint;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::retry::retry_with_backoff;
use crate::types::{
    HealthStatus, JunctionStatus, MapData, ParkVehicleRequest, ParkVehicleResult, ParkingStatus,
    Predictions, Recommendations, SystemStats,
};

/// Client for the parking backend's JSON API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ParkingApiClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl ParkingApiClient {
    /// Creates a client for the backend at `base_url` with retries disabled.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the `reqwest::Client` cannot be
    /// constructed, or [`ApiError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so endpoint paths are appended under
        // any base path prefix.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Enables retry with back-off for read endpoints.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// `GET /api/system-stats`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Network`], [`ApiError::BadResponse`], or [`ApiError::Deserialize`].
    pub async fn system_stats(&self) -> Result<SystemStats, ApiError> {
        self.get_json("api/system-stats", &[]).await
    }

    /// `GET /api/parking-status`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Network`], [`ApiError::BadResponse`], or [`ApiError::Deserialize`].
    pub async fn parking_status(&self) -> Result<ParkingStatus, ApiError> {
        self.get_json("api/parking-status", &[]).await
    }

    /// `GET /api/recommendations?lat=..&lng=..` for a point in the local grid.
    ///
    /// # Errors
    ///
    /// [`ApiError::Network`], [`ApiError::BadResponse`], or [`ApiError::Deserialize`].
    pub async fn recommendations(&self, at: LocalPoint) -> Result<Recommendations, ApiError> {
        let lat = at.lat.to_string();
        let lng = at.lng.to_string();
        self.get_json("api/recommendations", &[("lat", &lat), ("lng", &lng)])
            .await
    }

    /// `GET /api/junction-status`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Network`], [`ApiError::BadResponse`], or [`ApiError::Deserialize`].
    pub async fn junction_status(&self) -> Result<JunctionStatus, ApiError> {
        self.get_json("api/junction-status", &[]).await
    }

    /// `GET /api/predictions`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Network`], [`ApiError::BadResponse`], or [`ApiError::Deserialize`].
    pub async fn predictions(&self) -> Result<Predictions, ApiError> {
        self.get_json("api/predictions", &[]).await
    }

    /// `GET /api/map-data`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Network`], [`ApiError::BadResponse`], or [`ApiError::Deserialize`].
    pub async fn map_data(&self) -> Result<MapData, ApiError> {
        self.get_json("api/map-data", &[]).await
    }

    /// `GET /health`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Network`], [`ApiError::BadResponse`], or [`ApiError::Deserialize`].
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json("health", &[]).await
    }

    /// `POST /api/park-vehicle {destination}`. Single attempt.
    ///
    /// # Errors
    ///
    /// [`ApiError::Network`], [`ApiError::BadResponse`], or [`ApiError::Deserialize`].
    pub async fn park_vehicle(&self, destination: &str) -> Result<ParkVehicleResult, ApiError> {
        let url = self.endpoint_url("api/park-vehicle", &[]);
        let response = self
            .client
            .post(url.clone())
            .json(&ParkVehicleRequest { destination })
            .send()
            .await?;
        let body = Self::read_body(&url, response).await?;
        Self::decode(&url, body)
    }

    /// Builds an endpoint URL with percent-encoded query parameters.
    fn endpoint_url(&self, path: &str, query: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}{path}", self.base_url.path()));
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint_url(path, query);
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self.client.get(url.clone()).send().await?;
                let body = Self::read_body(&url, response).await?;
                Self::decode(&url, body)
            }
        })
        .await
    }

    /// Reads the body as JSON and applies the backend's error conventions.
    async fn read_body(
        url: &Url,
        response: reqwest::Response,
    ) -> Result<serde_json::Value, ApiError> {
        let status = response.status();
        let text = response.text().await?;
        let parsed = serde_json::from_str::<serde_json::Value>(&text);

        if !status.is_success() {
            let message = parsed
                .as_ref()
                .ok()
                .and_then(error_message)
                .unwrap_or_else(|| status.to_string());
            return Err(ApiError::BadResponse {
                endpoint: url.path().to_owned(),
                status: Some(status.as_u16()),
                message,
            });
        }

        let body = parsed.map_err(|e| ApiError::Deserialize {
            context: url.path().to_owned(),
            source: e,
        })?;

        check_api_error(url, &body)?;
        Ok(body)
    }

    fn decode<T>(url: &Url, body: serde_json::Value) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(body).map_err(|e| ApiError::Deserialize {
            context: url.path().to_owned(),
            source: e,
        })
    }
}

/// Extracts an application-level error message from a body, if it carries one.
fn error_message(body: &serde_json::Value) -> Option<String> {
    match body.get("error")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(obj) => Some(
            obj.get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown error")
                .to_owned(),
        ),
        other => Some(other.to_string()),
    }
}

/// Rejects 2xx bodies that still flag failure.
fn check_api_error(url: &Url, body: &serde_json::Value) -> Result<(), ApiError> {
    let flagged_unsuccessful =
        body.get("success").and_then(serde_json::Value::as_bool) == Some(false);
    if let Some(message) = error_message(body) {
        return Err(ApiError::BadResponse {
            endpoint: url.path().to_owned(),
            status: None,
            message,
        });
    }
    if flagged_unsuccessful {
        let message = body
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("request was not successful")
            .to_owned();
        return Err(ApiError::BadResponse {
            endpoint: url.path().to_owned(),
            status: None,
            message,
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
