use crate::error::RouteError;
use crate::exposure::round_to;
use crate::models::{Coordinate, RouteDescriptor, RoutePair};
use crate::routing::{approximate_distance_km, distance_km, generate_waypoints, DEFAULT_POINT_COUNT};

const MINUTES_PER_HOUR: f64 = 60.0;

/// How a synthesized route differs from the straight line between endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteProfile {
    /// Peak latitude bow in decimal degrees.
    pub offset_deg: f64,
    /// Multiplier applied to the direct distance.
    pub detour_factor: f64,
    /// Assumed average speed.
    pub speed_kmh: f64,
}

impl RouteProfile {
    /// Straight line at average city speed.
    pub const DIRECT: Self = Self {
        offset_deg: 0.0,
        detour_factor: 1.0,
        speed_kmh: 30.0,
    };

    /// 20% longer, bowed path on faster roads.
    pub const DETOUR: Self = Self {
        offset_deg: 0.03,
        detour_factor: 1.2,
        speed_kmh: 35.0,
    };

    pub fn duration_min(&self, distance_km: f64) -> f64 {
        (distance_km / self.speed_kmh * MINUTES_PER_HOUR).round()
    }

    /// `reported_km` is the rounded figure shown to callers; `travel_km` is the
    /// unrounded distance the duration is timed over.
    fn describe(
        &self,
        start: Coordinate,
        end: Coordinate,
        reported_km: f64,
        travel_km: f64,
        point_count: usize,
    ) -> Result<RouteDescriptor, RouteError> {
        // A zero-length trip has no detour to draw.
        let offset = if start == end { 0.0 } else { self.offset_deg };
        Ok(RouteDescriptor {
            path: generate_waypoints(start, end, offset, point_count)?,
            distance_km: reported_km,
            duration_min: self.duration_min(travel_km),
        })
    }
}

/// Synthesize the direct route (A) and the detour (B) between two points.
///
/// Route A's distance is the great-circle distance rounded to 2 decimals;
/// route B's is route A's reported distance times the detour factor, rounded
/// again. Durations are whole minutes timed over the unrounded distances
/// (great-circle for A, great-circle times the detour factor for B).
/// When `start == end` both paths collapse to repeated copies of that point.
///
/// Pure: no I/O and no hidden state, so identical inputs give identical output.
pub fn compare(start: Coordinate, end: Coordinate) -> Result<RoutePair, RouteError> {
    compare_with_points(start, end, DEFAULT_POINT_COUNT)
}

pub fn compare_with_points(
    start: Coordinate,
    end: Coordinate,
    point_count: usize,
) -> Result<RoutePair, RouteError> {
    let great_circle_km = distance_km(start, end)?;
    let direct_km = great_circle_km * RouteProfile::DIRECT.detour_factor;
    let detour_km = great_circle_km * RouteProfile::DETOUR.detour_factor;

    // B's reported distance scales A's reported one so the two stay consistent.
    let reported_a = round_to(direct_km, 2);
    let reported_b = round_to(reported_a * RouteProfile::DETOUR.detour_factor, 2);

    let route_a = RouteProfile::DIRECT.describe(start, end, reported_a, direct_km, point_count)?;
    let route_b = RouteProfile::DETOUR.describe(start, end, reported_b, detour_km, point_count)?;

    tracing::debug!(
        "compared routes: A {:.2} km / {} min, B {:.2} km / {} min (drawn path {:.2} km)",
        route_a.distance_km,
        route_a.duration_min,
        route_b.distance_km,
        route_b.duration_min,
        approximate_distance_km(&route_b.path)
    );

    Ok(RoutePair { route_a, route_b })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::haversine_km;

    const CONNAUGHT_PLACE: Coordinate = Coordinate {
        lat: 28.6315,
        lon: 77.2167,
    };
    const INDIA_GATE: Coordinate = Coordinate {
        lat: 28.6129,
        lon: 77.2295,
    };

    #[test]
    fn direct_and_detour_routes() {
        let routes = compare(CONNAUGHT_PLACE, INDIA_GATE).unwrap();

        assert_eq!(routes.route_a.path.len(), DEFAULT_POINT_COUNT);
        assert_eq!(routes.route_b.path.len(), DEFAULT_POINT_COUNT);
        assert_eq!(routes.route_a.path[0], CONNAUGHT_PLACE);
        assert_eq!(routes.route_b.path[10], INDIA_GATE);
        assert!(routes.route_b.path[5].lat > routes.route_a.path[5].lat);

        // ~2.4 km at 30 km/h
        assert!(routes.route_a.distance_km > 2.2 && routes.route_a.distance_km < 2.7);
        assert_eq!(routes.route_a.duration_min, 5.0);
        assert_eq!(routes.route_b.duration_min, 5.0);
    }

    #[test]
    fn detour_distance_derives_from_direct() {
        let routes = compare(CONNAUGHT_PLACE, INDIA_GATE).unwrap();
        assert_eq!(
            routes.route_b.distance_km,
            round_to(routes.route_a.distance_km * 1.2, 2)
        );
    }

    #[test]
    fn durations_follow_unrounded_distance_and_speed() {
        let start = Coordinate { lat: 45.0, lon: 5.0 };
        let end = Coordinate { lat: 45.3, lon: 5.0 };
        let raw = haversine_km(start, end);
        let routes = compare(start, end).unwrap();

        assert_eq!(routes.route_a.duration_min, (raw / 30.0 * 60.0).round());
        assert_eq!(routes.route_b.duration_min, (raw * 1.2 / 35.0 * 60.0).round());
        // Distances are reported with at most 2 decimals.
        assert_eq!(routes.route_a.distance_km, round_to(routes.route_a.distance_km, 2));
    }

    #[test]
    fn rounding_the_distance_does_not_push_duration_over_half_minute() {
        // 2.2496 km takes 4.499 min at 30 km/h; the reported 2.25 km would be 4.5.
        let start = Coordinate { lat: 0.0, lon: 0.0 };
        let end = Coordinate {
            lat: 0.020231,
            lon: 0.0,
        };
        let raw = haversine_km(start, end);
        assert!((raw / 30.0 * 60.0) < 4.5);

        let routes = compare(start, end).unwrap();
        assert_eq!(routes.route_a.distance_km, 2.25);
        assert_eq!(routes.route_b.distance_km, 2.7);
        assert_eq!(routes.route_a.duration_min, 4.0);
        assert_eq!(routes.route_b.duration_min, 5.0);
    }

    #[test]
    fn compare_is_idempotent() {
        let first = compare(CONNAUGHT_PLACE, INDIA_GATE).unwrap();
        let second = compare(CONNAUGHT_PLACE, INDIA_GATE).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.route_b.distance_km.to_bits(),
            second.route_b.distance_km.to_bits()
        );
    }

    #[test]
    fn identical_endpoints_give_zero_routes() {
        let routes = compare(INDIA_GATE, INDIA_GATE).unwrap();
        assert_eq!(routes.route_a.distance_km, 0.0);
        assert_eq!(routes.route_b.distance_km, 0.0);
        assert_eq!(routes.route_a.duration_min, 0.0);
        assert_eq!(routes.route_b.duration_min, 0.0);
        assert!(routes.route_a.path.iter().all(|p| *p == INDIA_GATE));
        assert!(routes.route_b.path.iter().all(|p| *p == INDIA_GATE));
        assert_eq!(routes.route_b.path.len(), DEFAULT_POINT_COUNT);
    }

    #[test]
    fn invalid_coordinates_fail_fast() {
        let bad = Coordinate {
            lat: -95.0,
            lon: 0.0,
        };
        assert!(matches!(
            compare(bad, INDIA_GATE),
            Err(RouteError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn custom_point_count() {
        let routes = compare_with_points(CONNAUGHT_PLACE, INDIA_GATE, 3).unwrap();
        assert_eq!(routes.route_a.path.len(), 3);
        assert!(matches!(
            compare_with_points(CONNAUGHT_PLACE, INDIA_GATE, 1),
            Err(RouteError::DegenerateInput(1))
        ));
    }
}
