//! Tunable parameters for the itinerary engine.

/// Configuration for leg building and classification.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Distance assigned to a placeholder leg when routing is unavailable
    /// (miles).
    pub fallback_leg_miles: f64,

    /// Travel time assigned to a placeholder leg when routing is
    /// unavailable (minutes).
    pub fallback_leg_mins: i64,

    /// Average speed above which a leg counts as highway driving (mph).
    pub highway_mph: f64,

    /// Average speed above which a leg counts as backroad driving (mph).
    /// At or below this, it is city driving.
    pub backroad_mph: f64,
}

impl EngineConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        fallback_leg_miles: f64,
        fallback_leg_mins: i64,
        highway_mph: f64,
        backroad_mph: f64,
    ) -> Self {
        Self {
            fallback_leg_miles,
            fallback_leg_mins,
            highway_mph,
            backroad_mph,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fallback_leg_miles: 5.0,
            fallback_leg_mins: 15,
            highway_mph: 45.0,
            backroad_mph: 22.0,
        }
    }
}
