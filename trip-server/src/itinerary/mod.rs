//! The itinerary consistency engine.
//!
//! Trips decompose into ordered stints, stints into ordered stops joined
//! by legs. This module keeps that structure coherent under mutation:
//! stop sequences stay contiguous, legs are rebuilt from the routing
//! provider (or placeholder estimates) whenever the stop list changes,
//! stop timelines are rewalked, and distance/duration totals roll up from
//! legs to stints to the trip.
//!
//! [`ItineraryService`] is the entry point; everything else supports it.

mod aggregates;
mod config;
mod error;
mod legs;
mod sequence;
mod service;
mod timeline;


pub use config::EngineConfig;
pub use error::{EngineError, EntityKind};
pub use service::{
    ItineraryService, NewPlace, NewStint, NewStop, NewTrip, StintTimeline, TimelineEvent,
    TimelineEventKind, TripTimeline,
};
