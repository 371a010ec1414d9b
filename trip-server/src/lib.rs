//! Road trip planning server.
//!
//! A backend that keeps multi-day road trip itineraries consistent:
//! ordered stints and stops, routed driving legs, computed arrival and
//! departure times, and rolled-up distances and dates.

pub mod cache;
pub mod domain;
pub mod itinerary;
pub mod routing;
pub mod store;
pub mod web;
