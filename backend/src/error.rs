use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("coordinate out of range: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },
    #[error("a path needs at least 2 points, got {0}")]
    DegenerateInput(usize),
    #[error("waypoint offset must be a non-negative number of degrees, got {0}")]
    InvalidOffset(f64),
    #[error("could not resolve address '{0}'")]
    UnresolvableAddress(String),
    #[error("failed to build GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
}

/// Failures inside the geocoding and measurement clients. These never cross the
/// client boundary; they are logged and turned into an absent result.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("no results")]
    Empty,
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}
