use crate::error::RouteError;
use crate::models::{
    Coordinate, DurationPolicy, ExposureReport, FallbackReadings, HealthImpactCategory,
    PollutionReading, Recommendation, RouteDescriptor, RouteExposure, RoutePair,
};
use crate::routing::representative_point;

/// Cumulative 24h PM2.5 exposure (µg/m³) roughly equivalent to smoking one cigarette.
const PM25_PER_CIGARETTE: f64 = 22.0;
const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Inclusive upper bounds, checked in ascending order.
const CATEGORY_THRESHOLDS: [(f64, HealthImpactCategory); 4] = [
    (12.0, HealthImpactCategory::Good),
    (35.0, HealthImpactCategory::Moderate),
    (55.0, HealthImpactCategory::UnhealthyForSensitive),
    (150.0, HealthImpactCategory::Unhealthy),
];

pub fn classify(reading: PollutionReading) -> HealthImpactCategory {
    let Some(value) = reading else {
        return HealthImpactCategory::Unknown;
    };

    CATEGORY_THRESHOLDS
        .iter()
        .find(|(upper, _)| value <= *upper)
        .map(|(_, category)| *category)
        .unwrap_or(HealthImpactCategory::Hazardous)
}

/// Convert a PM2.5 difference over a commute into "cigarettes smoked".
///
/// ```text
/// cigarettes = (|diff| / 22) * (duration_min / 1440)
/// ```
///
/// Rounded to 4 decimals. Only the magnitude is returned; which route is
/// better is left to the caller.
pub fn cigarette_equivalent(reading_diff: f64, duration_min: f64) -> f64 {
    if reading_diff == 0.0 {
        return 0.0;
    }

    let day_fraction = duration_min / MINUTES_PER_DAY;
    let cigarettes = (reading_diff.abs() / PM25_PER_CIGARETTE) * day_fraction;
    round_to(cigarettes, 4)
}

/// Duration in minutes that scales the cigarette metric under `policy`.
pub fn policy_duration(policy: DurationPolicy, route_a: &RouteDescriptor, route_b: &RouteDescriptor) -> f64 {
    match policy {
        DurationPolicy::RouteA => route_a.duration_min,
        DurationPolicy::RouteB => route_b.duration_min,
        DurationPolicy::Mean => (route_a.duration_min + route_b.duration_min) / 2.0,
        DurationPolicy::Max => route_a.duration_min.max(route_b.duration_min),
    }
}

/// Build the exposure report for a pair of routes.
///
/// `reading_a`/`reading_b` are the raw measurements at each route's
/// representative point. Absent readings are classified `Unknown` and replaced
/// by the matching value from `fallback` for the arithmetic, with
/// `fallback_used` set so the degradation stays visible.
///
/// Fails with `DegenerateInput` if either route has an empty path.
pub fn assess(
    routes: &RoutePair,
    reading_a: PollutionReading,
    reading_b: PollutionReading,
    fallback: FallbackReadings,
    policy: DurationPolicy,
) -> Result<ExposureReport, RouteError> {
    let (sample_a, sample_b) = sample_points(routes)?;
    let route_a = route_exposure(sample_a, reading_a, fallback.route_a);
    let route_b = route_exposure(sample_b, reading_b, fallback.route_b);

    let duration = policy_duration(policy, &routes.route_a, &routes.route_b);
    let diff = route_a.effective_reading - route_b.effective_reading;
    let cigarettes = cigarette_equivalent(diff, duration);

    let recommendation = if route_b.effective_reading < route_a.effective_reading {
        Recommendation::TakeRouteB
    } else {
        Recommendation::SimilarExposure
    };

    tracing::debug!(
        "exposure: A={:.2} ({}), B={:.2} ({}), diff={:.2} over {:.0} min -> {} cigarettes",
        route_a.effective_reading,
        route_a.category.label(),
        route_b.effective_reading,
        route_b.category.label(),
        diff,
        duration,
        cigarettes
    );

    Ok(ExposureReport {
        route_a,
        route_b,
        cigarette_equivalent: cigarettes,
        duration_policy: policy,
        recommendation,
    })
}

/// Where pollution is measured for each route: its representative point.
pub fn sample_points(routes: &RoutePair) -> Result<(Coordinate, Coordinate), RouteError> {
    Ok((sample_point(&routes.route_a)?, sample_point(&routes.route_b)?))
}

fn sample_point(route: &RouteDescriptor) -> Result<Coordinate, RouteError> {
    representative_point(&route.path).ok_or(RouteError::DegenerateInput(route.path.len()))
}

fn route_exposure(sample_point: Coordinate, reading: PollutionReading, fallback: f64) -> RouteExposure {
    RouteExposure {
        sample_point,
        reading,
        effective_reading: reading.unwrap_or(fallback),
        category: classify(reading),
        fallback_used: reading.is_none(),
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
