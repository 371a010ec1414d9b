//! Caching layer for routing responses.
//!
//! Route planning is the most expensive call the engine makes, and
//! itinerary edits frequently repeat it: insert, remove, reorder and
//! refresh all rebuild legs over near-identical waypoint lists. Responses
//! are cached keyed by a quantised waypoint fingerprint plus a
//! time-bucketed departure, which bounds cache cardinality while keeping
//! traffic-dependent durations reasonably fresh.
//!
//! Failures are never cached; a degraded routing service is retried on the
//! next rebuild.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache as MokaCache;

use crate::routing::{RouteProvider, RouteSection, RoutingClient, RoutingError, Waypoint};

/// Cache key for planned routes: waypoint fingerprint plus departure bucket.
///
/// Coordinates are quantised to 1e-4 degrees (roughly 11 meters), dwell to
/// whole minutes, departure to `bucket_mins`-sized buckets.
type RouteKey = (Vec<(i64, i64, i64)>, i64);

/// Cached route entry.
type RouteEntry = Arc<Vec<RouteSection>>;

/// Configuration for the route cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,

    /// Departure time bucket size in minutes.
    pub bucket_mins: u16,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 1000,
            bucket_mins: 5,
        }
    }
}

/// Route provider with caching.
///
/// Wraps a [`RoutingClient`] and caches successful route plans.
pub struct CachedRouter {
    client: RoutingClient,
    routes: MokaCache<RouteKey, RouteEntry>,
    bucket_mins: u16,
}

impl CachedRouter {
    /// Create a new cached router.
    pub fn new(client: RoutingClient, config: &CacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            client,
            routes,
            // A zero bucket would divide by zero below.
            bucket_mins: config.bucket_mins.max(1),
        }
    }

    /// Quantise a route request into its cache key.
    fn route_key(&self, waypoints: &[Waypoint], departure: DateTime<Utc>) -> RouteKey {
        let fingerprint = waypoints
            .iter()
            .map(|w| {
                (
                    (w.point.lat() * 1e4).round() as i64,
                    (w.point.lng() * 1e4).round() as i64,
                    w.dwell_mins,
                )
            })
            .collect();

        let bucket = departure
            .timestamp()
            .div_euclid(i64::from(self.bucket_mins) * 60);

        (fingerprint, bucket)
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.routes.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.routes.invalidate_all();
    }
}

#[async_trait]
impl RouteProvider for CachedRouter {
    async fn plan_route(
        &self,
        waypoints: &[Waypoint],
        departure: DateTime<Utc>,
    ) -> Result<Vec<RouteSection>, RoutingError> {
        let key = self.route_key(waypoints, departure);

        if let Some(cached) = self.routes.get(&key).await {
            return Ok((*cached).clone());
        }

        let sections = self.client.plan_route(waypoints, departure).await?;

        self.routes.insert(key, Arc::new(sections.clone())).await;

        Ok(sections)
    }
}
