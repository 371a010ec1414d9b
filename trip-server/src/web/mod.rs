//! Web layer for the trip planner.
//!
//! Provides the JSON HTTP API over the itinerary engine.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::create_router;
pub use state::AppState;
