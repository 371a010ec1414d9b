//! Routing HTTP client.
//!
//! Async client for a HERE-style vehicle routing API. Handles
//! authentication, concurrency limiting and conversion of wire responses
//! into route sections.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use tokio::sync::Semaphore;

use super::RouteProvider;
use super::convert::convert_routes;
use super::error::RoutingError;
use super::types::{RouteSection, RoutesResponse, Waypoint};

/// Default base URL for the routing API.
const DEFAULT_BASE_URL: &str = "https://router.hereapi.com";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Configuration for the routing client.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// API key for authentication. May be empty; every request then fails
    /// with [`RoutingError::NotConfigured`] and callers fall back to
    /// estimated legs.
    pub api_key: String,
    /// Base URL for the API (defaults to production routing)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl RoutingConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Routing API client.
///
/// Requests car routes through an ordered list of waypoints. Uses a
/// semaphore to limit concurrent requests and avoid rate limiting.
#[derive(Debug, Clone)]
pub struct RoutingClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    semaphore: Arc<Semaphore>,
}

impl RoutingClient {
    /// Create a new routing client with the given configuration.
    pub fn new(config: RoutingConfig) -> Result<Self, RoutingError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Request a car route visiting `waypoints` in order.
    ///
    /// Intermediate waypoints become `via` parameters; dwell times are
    /// passed along so the router can account for them in time-dependent
    /// traffic estimates.
    async fn request_route(
        &self,
        waypoints: &[Waypoint],
        departure: DateTime<Utc>,
    ) -> Result<Vec<RouteSection>, RoutingError> {
        if self.api_key.is_empty() {
            return Err(RoutingError::NotConfigured);
        }

        if waypoints.len() < 2 {
            return Ok(Vec::new());
        }

        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| RoutingError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = format!("{}/v8/routes", self.base_url);

        let origin = &waypoints[0];
        let destination = &waypoints[waypoints.len() - 1];

        let mut query: Vec<(&str, String)> = vec![
            ("transportMode", "car".to_string()),
            ("origin", origin.point.to_string()),
        ];

        for via in &waypoints[1..waypoints.len() - 1] {
            let value = if via.dwell_mins > 0 {
                format!("{}!stopDuration={}", via.point, via.dwell_mins * 60)
            } else {
                via.point.to_string()
            };
            query.push(("via", value));
        }

        query.push(("destination", destination.point.to_string()));
        query.push((
            "departureTime",
            departure.to_rfc3339_opts(SecondsFormat::Secs, true),
        ));
        query.push(("return", "summary,polyline".to_string()));
        query.push(("apikey", self.api_key.clone()));

        let response = self.http.get(&url).query(&query).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(RoutingError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RoutingError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RoutingError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let parsed: RoutesResponse =
            serde_json::from_str(&body).map_err(|e| RoutingError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        convert_routes(&parsed, waypoints.len())
    }
}

#[async_trait]
impl RouteProvider for RoutingClient {
    async fn plan_route(
        &self,
        waypoints: &[Waypoint],
        departure: DateTime<Utc>,
    ) -> Result<Vec<RouteSection>, RoutingError> {
        self.request_route(waypoints, departure).await
    }
}
