use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn interpolate(self, other: Self, t: f64) -> Self {
        Self {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180]. NaN is never valid.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Either a resolved position or a free-text address still to be geocoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Point(Coordinate),
    Address(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub path: Vec<Coordinate>,
    pub distance_km: f64,
    pub duration_min: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePair {
    /// Direct route.
    pub route_a: RouteDescriptor,
    /// Bowed detour.
    pub route_b: RouteDescriptor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthImpactCategory {
    Good,
    Moderate,
    UnhealthyForSensitive,
    Unhealthy,
    Hazardous,
    /// Only used when no reading is available.
    Unknown,
}

impl HealthImpactCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Good => "Good (Safe)",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitive => "Unhealthy for Sensitive",
            Self::Unhealthy => "Unhealthy",
            Self::Hazardous => "Hazardous",
            Self::Unknown => "Unknown",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Good => "green",
            Self::Moderate => "#FFC300",
            Self::UnhealthyForSensitive => "orange",
            Self::Unhealthy => "red",
            Self::Hazardous => "purple",
            Self::Unknown => "gray",
        }
    }

    /// Rank in declaration order; `Unknown` sorts after `Hazardous`.
    pub fn severity_rank(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallbackReadings {
    pub route_a: f64,
    pub route_b: f64,
}

impl Default for FallbackReadings {
    fn default() -> Self {
        Self {
            route_a: 55.0,
            route_b: 35.0,
        }
    }
}

/// Which route duration scales the cigarette equivalent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationPolicy {
    #[default]
    RouteA,
    RouteB,
    Mean,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    TakeRouteB,
    SimilarExposure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteExposure {
    pub sample_point: Coordinate,
    /// Raw measurement, `None` when the measurement source had no data.
    pub reading: Option<f64>,
    /// Value used for arithmetic once fallbacks are substituted.
    pub effective_reading: f64,
    pub category: HealthImpactCategory,
    pub fallback_used: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureReport {
    pub route_a: RouteExposure,
    pub route_b: RouteExposure,
    pub cigarette_equivalent: f64,
    pub duration_policy: DurationPolicy,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareRequest {
    pub start: Coordinate,
    pub end: Coordinate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommuteRequest {
    pub start: Location,
    pub end: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackReadings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_policy: Option<DurationPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommuteResponse {
    pub start: Coordinate,
    pub end: Coordinate,
    pub routes: RoutePair,
    pub exposure: ExposureReport,
    pub gpx_base64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}
