//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::domain::{GeoPoint, StintId, StopId, StopKind, TripId, UserId};
use crate::itinerary::{EngineError, NewPlace, NewStint, NewStop, NewTrip};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/trips", post(create_trip))
        .route("/trips/:id", get(get_trip))
        .route("/trips/:id/timeline", get(trip_timeline))
        .route("/trips/:id/stints", post(create_stint))
        .route("/stints/:id/stops", get(list_stops).post(add_stop))
        .route("/stints/:id/legs", get(list_legs))
        .route("/stints/:id/stops/order", put(reorder_stops))
        .route("/stints/:id/refresh", post(refresh_stint))
        .route("/stops/:id", delete(remove_stop))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Identity of the caller, taken from the `x-requester-id` header.
///
/// There is no session handling here; an upstream proxy authenticates the
/// user and injects the header, and the engine only needs the id for
/// ownership checks.
fn requester(headers: &HeaderMap) -> Result<UserId, AppError> {
    let raw = headers
        .get("x-requester-id")
        .ok_or_else(|| AppError::BadRequest {
            message: "missing x-requester-id header".to_string(),
        })?
        .to_str()
        .map_err(|_| AppError::BadRequest {
            message: "x-requester-id is not valid UTF-8".to_string(),
        })?;

    Uuid::parse_str(raw)
        .map(UserId::from)
        .map_err(|_| AppError::BadRequest {
            message: format!("x-requester-id is not a UUID: {raw}"),
        })
}

/// Validate raw coordinates from a request body.
fn parse_point(lat: f64, lng: f64) -> Result<GeoPoint, AppError> {
    GeoPoint::new(lat, lng).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })
}

/// Parse an optional stop kind, defaulting to a pitstop.
fn parse_kind(kind: Option<&str>) -> Result<StopKind, AppError> {
    match kind {
        None => Ok(StopKind::Pitstop),
        Some(raw) => StopKind::parse(raw).map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        }),
    }
}

fn to_place(body: PlaceBody) -> Result<NewPlace, AppError> {
    Ok(NewPlace {
        name: body.name,
        point: parse_point(body.lat, body.lng)?,
    })
}

/// Create a trip.
async fn create_trip(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateTripRequest>,
) -> Result<impl IntoResponse, AppError> {
    let requester = requester(&headers)?;

    let trip = state
        .engine
        .create_trip(NewTrip { title: req.title }, requester)
        .await?;

    Ok((StatusCode::CREATED, Json(TripResult::from_trip(&trip))))
}

/// Fetch a trip.
async fn get_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
) -> Result<Json<TripResult>, AppError> {
    let trip = state.engine.trip(trip_id).await?;
    Ok(Json(TripResult::from_trip(&trip)))
}

/// Fetch the chronological view of a trip.
async fn trip_timeline(
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
) -> Result<Json<TripTimelineResponse>, AppError> {
    let timeline = state.engine.trip_timeline(trip_id).await?;
    Ok(Json(TripTimelineResponse::from_timeline(&timeline)))
}

/// Create a stint within a trip.
async fn create_stint(
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
    headers: HeaderMap,
    Json(req): Json<CreateStintRequest>,
) -> Result<impl IntoResponse, AppError> {
    let requester = requester(&headers)?;
    let origin = req.origin.map(to_place).transpose()?;

    let new = NewStint {
        name: req.name,
        sequence: req.sequence,
        start_time: req.start_time,
        origin,
    };
    let stint = state.engine.create_stint(trip_id, new, requester).await?;

    Ok((StatusCode::CREATED, Json(StintResult::from_stint(&stint))))
}

/// Add a stop to a stint.
async fn add_stop(
    State(state): State<AppState>,
    Path(stint_id): Path<StintId>,
    headers: HeaderMap,
    Json(req): Json<AddStopRequest>,
) -> Result<impl IntoResponse, AppError> {
    let requester = requester(&headers)?;

    let new = NewStop {
        name: req.name,
        point: parse_point(req.lat, req.lng)?,
        kind: parse_kind(req.kind.as_deref())?,
        duration_mins: req.duration_mins.unwrap_or(0),
        sequence: req.sequence,
    };
    let stop = state
        .engine
        .add_stop(req.trip_id, stint_id, new, requester)
        .await?;

    Ok((StatusCode::CREATED, Json(StopResult::from_stop(&stop))))
}

/// Remove a stop from its stint.
async fn remove_stop(
    State(state): State<AppState>,
    Path(stop_id): Path<StopId>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let requester = requester(&headers)?;
    state.engine.remove_stop(stop_id, requester).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reorder the stops of a stint.
async fn reorder_stops(
    State(state): State<AppState>,
    Path(stint_id): Path<StintId>,
    headers: HeaderMap,
    Json(req): Json<ReorderStopsRequest>,
) -> Result<Json<StopListResponse>, AppError> {
    let requester = requester(&headers)?;

    let order: Vec<(StopId, u32)> = req.stops.iter().map(|s| (s.id, s.sequence)).collect();
    let stops = state
        .engine
        .reorder_stops(stint_id, &order, requester)
        .await?;

    Ok(Json(StopListResponse {
        stops: stops.iter().map(StopResult::from_stop).collect(),
    }))
}

/// Recompute a stint's derived distance and duration.
async fn refresh_stint(
    State(state): State<AppState>,
    Path(stint_id): Path<StintId>,
) -> Result<StatusCode, AppError> {
    state.engine.update_stint_distance(stint_id).await?;
    state.engine.update_stint_duration(stint_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List a stint's stops in order.
async fn list_stops(
    State(state): State<AppState>,
    Path(stint_id): Path<StintId>,
) -> Result<Json<StopListResponse>, AppError> {
    let stops = state.engine.stops_by_stint(stint_id).await?;
    Ok(Json(StopListResponse {
        stops: stops.iter().map(StopResult::from_stop).collect(),
    }))
}

/// List a stint's legs in order.
async fn list_legs(
    State(state): State<AppState>,
    Path(stint_id): Path<StintId>,
) -> Result<Json<LegListResponse>, AppError> {
    let legs = state.engine.legs_by_stint(stint_id).await?;
    Ok(Json(LegListResponse {
        legs: legs.iter().map(LegResult::from_leg).collect(),
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Forbidden { message: String },
    NotFound { message: String },
    Conflict { message: String },
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        let message = e.to_string();
        match e {
            EngineError::NotFound { .. } => AppError::NotFound { message },
            EngineError::Forbidden(_) => AppError::Forbidden { message },
            EngineError::Conflict(_) => AppError::Conflict { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Forbidden { message } => (StatusCode::FORBIDDEN, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
        };

        tracing::warn!(%status, %message, "request rejected");

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
