use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};

use crate::error::RouteError;
use crate::models::{Coordinate, RoutePair};

pub const ROUTE_A_NAME: &str = "Route A (Direct)";
pub const ROUTE_B_NAME: &str = "Route B (Green)";

/// Both routes as one GPX 1.1 document with a track each, base64-encoded.
pub fn encode_routes_as_gpx(routes: &RoutePair) -> Result<String, RouteError> {
    let mut gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some("ecocommute".into()),
        ..Default::default()
    };
    gpx.tracks.push(to_track(ROUTE_A_NAME, &routes.route_a.path));
    gpx.tracks.push(to_track(ROUTE_B_NAME, &routes.route_b.path));

    let mut buffer = Vec::new();
    gpx::write(&gpx, &mut buffer)?;
    Ok(BASE64.encode(buffer))
}

fn to_track(name: &str, path: &[Coordinate]) -> Track {
    let mut track = Track {
        name: Some(name.into()),
        ..Default::default()
    };

    let mut segment = TrackSegment::new();
    for waypoint in path.iter().map(to_waypoint) {
        segment.points.push(waypoint);
    }
    track.segments.push(segment);
    track
}

fn to_waypoint(coord: &Coordinate) -> Waypoint {
    Waypoint::new(Point::new(coord.lon, coord.lat))
}
