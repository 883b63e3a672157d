pub use shared::{
    ApiError, CommuteRequest, CommuteResponse, CompareRequest, Coordinate, DurationPolicy,
    ExposureReport, FallbackReadings, HealthImpactCategory, Location, Recommendation,
    RouteDescriptor, RouteExposure, RoutePair,
};

/// A pollutant concentration (PM2.5, µg/m³). `None` means no data, which is not the same as 0.
pub type PollutionReading = Option<f64>;
