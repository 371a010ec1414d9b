use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use trip_server::cache::{CacheConfig, CachedRouter};
use trip_server::itinerary::{EngineConfig, ItineraryService};
use trip_server::routing::{RoutingClient, RoutingConfig};
use trip_server::store::Database;
use trip_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Get credentials from environment
    let api_key = std::env::var("ROUTING_API_KEY").unwrap_or_else(|_| {
        tracing::warn!("ROUTING_API_KEY not set; routing calls will fail and legs will be estimated");
        String::new()
    });

    // Create routing client
    let mut routing_config = RoutingConfig::new(api_key);
    if let Ok(base_url) = std::env::var("ROUTING_BASE_URL") {
        routing_config = routing_config.with_base_url(base_url);
    }
    let routing_client =
        RoutingClient::new(routing_config).expect("Failed to create routing client");

    // Create cached router
    let cache_config = CacheConfig::default();
    let cached_router = CachedRouter::new(routing_client, &cache_config);

    // Create the store and the itinerary engine
    let db = Arc::new(Database::new());
    let engine = ItineraryService::new(db, cached_router, EngineConfig::default());

    // Build app state and router
    let state = AppState::new(engine);
    let app = create_router(state);

    // Bind and serve
    let addr = std::env::var("LISTEN_ADDR")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)));
    println!("Trip planner listening on http://{addr}");
    println!();
    println!("API endpoints:");
    println!("  GET    /health                  - Health check");
    println!("  POST   /trips                   - Create a trip");
    println!("  GET    /trips/:id               - Fetch a trip");
    println!("  GET    /trips/:id/timeline      - Chronological trip view");
    println!("  POST   /trips/:id/stints        - Create a stint");
    println!("  POST   /stints/:id/stops        - Add a stop");
    println!("  GET    /stints/:id/stops        - List stops");
    println!("  GET    /stints/:id/legs         - List legs");
    println!("  PUT    /stints/:id/stops/order  - Reorder stops");
    println!("  POST   /stints/:id/refresh      - Recompute stint totals");
    println!("  DELETE /stops/:id               - Remove a stop");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
