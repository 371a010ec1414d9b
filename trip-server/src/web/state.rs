//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedRouter;
use crate::itinerary::ItineraryService;

/// Shared application state.
///
/// Contains the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// The itinerary engine, backed by the cached routing client
    pub engine: Arc<ItineraryService<CachedRouter>>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(engine: ItineraryService<CachedRouter>) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
