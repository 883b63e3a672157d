use crate::error::RouteError;
use crate::models::Coordinate;

const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Waypoints per synthesized path.
pub const DEFAULT_POINT_COUNT: usize = 11;

/// Build an ordered path from `start` to `end`.
///
/// With `offset == 0` the points lie on the straight (lat/lon linear) segment.
/// With `offset > 0` a parabolic bow `(1 - (2f - 1)^2) * offset` is added to the
/// latitude of each point, zero at both ends and exactly `offset` at the midpoint.
///
/// The bow is applied to latitude only, not perpendicular to the segment, so
/// every detour bends north regardless of the route's heading.
///
/// A negative or non-finite `offset` is rejected with `InvalidOffset`.
pub fn generate_waypoints(
    start: Coordinate,
    end: Coordinate,
    offset: f64,
    point_count: usize,
) -> Result<Vec<Coordinate>, RouteError> {
    if point_count < 2 {
        return Err(RouteError::DegenerateInput(point_count));
    }
    if !offset.is_finite() || offset < 0.0 {
        return Err(RouteError::InvalidOffset(offset));
    }
    ensure_valid(start)?;
    ensure_valid(end)?;

    let last = point_count - 1;
    let mut path = Vec::with_capacity(point_count);

    for i in 0..point_count {
        // Endpoints are exact copies of start and end.
        let point = if i == 0 {
            start
        } else if i == last {
            end
        } else {
            let f = i as f64 / last as f64;
            let mut point = start.interpolate(end, f);
            if offset > 0.0 {
                point.lat += bow(f, offset);
            }
            point
        };
        path.push(point);
    }

    Ok(path)
}

fn bow(f: f64, offset: f64) -> f64 {
    (1.0 - (2.0 * f - 1.0).powi(2)) * offset
}

/// The point used to sample pollution for a path: the one at ~50% of its length.
pub fn representative_point(path: &[Coordinate]) -> Option<Coordinate> {
    path.get(path.len() / 2).copied()
}

/// Great-circle distance with range checks on both inputs.
pub fn distance_km(a: Coordinate, b: Coordinate) -> Result<f64, RouteError> {
    ensure_valid(a)?;
    ensure_valid(b)?;
    Ok(haversine_km(a, b))
}

pub fn approximate_distance_km(path: &[Coordinate]) -> f64 {
    path.windows(2).map(|w| haversine_km(w[0], w[1])).sum()
}

pub fn ensure_valid(coord: Coordinate) -> Result<Coordinate, RouteError> {
    if coord.is_valid() {
        Ok(coord)
    } else {
        Err(RouteError::InvalidCoordinate {
            lat: coord.lat,
            lon: coord.lon,
        })
    }
}

pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}
