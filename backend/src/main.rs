use std::sync::Arc;

use backend::{
    AppState, create_router,
    air_quality::OpenAqClient,
    config::Settings,
    geocoding::{CachedGeocoder, NominatimGeocoder},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,tower_http=info,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env().expect("valid configuration");

    let nominatim = NominatimGeocoder::new(
        settings.nominatim_url.clone(),
        &settings.nominatim_user_agent,
        settings.geocoder_timeout,
    )
    .expect("build geocoding client");
    let geocoder = CachedGeocoder::new(nominatim, settings.geocode_cache_size);
    let air_quality = OpenAqClient::new(
        settings.openaq_url.clone(),
        settings.openaq_api_key.clone(),
        settings.measurement_timeout,
    )
    .expect("build air quality client");

    tracing::info!("geocoding via {}", settings.nominatim_url);
    tracing::info!(
        "air quality via {} (radius {} km, fallbacks A={} B={})",
        settings.openaq_url,
        settings.measurement_radius_km,
        settings.fallback.route_a,
        settings.fallback.route_b
    );

    let addr = settings.bind_addr;
    let state = AppState {
        geocoder: Arc::new(geocoder),
        air_quality: Arc::new(air_quality),
        settings: Arc::new(settings),
    };
    let app = create_router(state);

    tracing::info!("starting backend on http://{addr}");
    tracing::info!("API endpoints:");
    tracing::info!("  POST /api/commute - Compare exposure between two addresses or coordinates");
    tracing::info!("  POST /api/routes/compare - Route geometry only");
    tracing::info!("  GET /api/health - Liveness");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener");
    axum::serve(listener, app).await.expect("serve");
}
