pub mod air_quality;
pub mod compare;
pub mod config;
pub mod error;
pub mod exposure;
pub mod geocoding;
pub mod gpx_export;
pub mod models;
pub mod routing;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::air_quality::AirQualitySource;
use crate::config::Settings;
use crate::error::RouteError;
use crate::geocoding::Geocoder;
use crate::gpx_export::encode_routes_as_gpx;
use crate::models::{
    ApiError, CommuteRequest, CommuteResponse, CompareRequest, Coordinate, Location, RoutePair,
};

#[derive(Clone)]
pub struct AppState {
    pub geocoder: Arc<dyn Geocoder>,
    pub air_quality: Arc<dyn AirQualitySource>,
    pub settings: Arc<Settings>,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/routes/compare", post(compare_handler))
        .route("/api/commute", post(commute_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Geometry only: both routes between two coordinates, no collaborators involved.
async fn compare_handler(
    Json(req): Json<CompareRequest>,
) -> Result<Json<RoutePair>, (StatusCode, Json<ApiError>)> {
    compare::compare(req.start, req.end)
        .map(Json)
        .map_err(api_error)
}

/// Full pipeline: geocode, synthesize routes, measure, score.
async fn commute_handler(
    State(state): State<AppState>,
    Json(req): Json<CommuteRequest>,
) -> Result<Json<CommuteResponse>, (StatusCode, Json<ApiError>)> {
    tracing::info!("Commute request: {:?} -> {:?}", req.start, req.end);

    let (start, end) = tokio::join!(
        resolve(state.geocoder.as_ref(), &req.start),
        resolve(state.geocoder.as_ref(), &req.end)
    );
    let (start, end) = (start.map_err(api_error)?, end.map_err(api_error)?);

    let routes = compare::compare(start, end).map_err(api_error)?;

    let radius_km = state.settings.measurement_radius_km;
    let (sample_a, sample_b) = exposure::sample_points(&routes).map_err(api_error)?;
    let (reading_a, reading_b) = tokio::join!(
        state.air_quality.measure(sample_a, radius_km),
        state.air_quality.measure(sample_b, radius_km)
    );

    let fallback = req.fallback.unwrap_or(state.settings.fallback);
    let policy = req.duration_policy.unwrap_or(state.settings.duration_policy);
    let exposure =
        exposure::assess(&routes, reading_a, reading_b, fallback, policy).map_err(api_error)?;

    if exposure.route_a.fallback_used || exposure.route_b.fallback_used {
        tracing::warn!(
            "Measurement unavailable (A: {}, B: {}), using fallback readings {:?}",
            exposure.route_a.fallback_used,
            exposure.route_b.fallback_used,
            fallback
        );
    }

    let gpx_base64 = encode_routes_as_gpx(&routes).map_err(api_error)?;

    tracing::info!(
        "Route A {:.2} km / {} min, Route B {:.2} km / {} min, {} cigarettes",
        routes.route_a.distance_km,
        routes.route_a.duration_min,
        routes.route_b.distance_km,
        routes.route_b.duration_min,
        exposure.cigarette_equivalent
    );

    Ok(Json(CommuteResponse {
        start,
        end,
        routes,
        exposure,
        gpx_base64,
    }))
}

async fn resolve(geocoder: &dyn Geocoder, location: &Location) -> Result<Coordinate, RouteError> {
    match location {
        Location::Point(coord) => routing::ensure_valid(*coord),
        Location::Address(address) => geocoder
            .resolve(address)
            .await
            .ok_or_else(|| RouteError::UnresolvableAddress(address.clone())),
    }
}

fn api_error(err: RouteError) -> (StatusCode, Json<ApiError>) {
    let (status, message) = match &err {
        RouteError::InvalidCoordinate { .. }
        | RouteError::DegenerateInput(_)
        | RouteError::InvalidOffset(_) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        RouteError::UnresolvableAddress(address) => (
            StatusCode::NOT_FOUND,
            format!("Could not find address '{address}'. Try adding the city name."),
        ),
        RouteError::Gpx(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    };
    if status.is_server_error() {
        tracing::error!("request failed: {err}");
    } else {
        tracing::debug!("request rejected: {err}");
    }
    (status, Json(ApiError { message }))
}
