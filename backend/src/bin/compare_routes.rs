use backend::{
    compare::compare_with_points,
    config::parse_policy,
    exposure::assess,
    gpx_export::encode_routes_as_gpx,
    models::{Coordinate, DurationPolicy, FallbackReadings},
    routing::DEFAULT_POINT_COUNT,
};
use clap::Parser;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Compare the direct and detour commute between two coordinates, offline"
)]
struct Args {
    /// Start coordinate as "LAT,LON"
    #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
    start: Coordinate,

    /// End coordinate as "LAT,LON"
    #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
    end: Coordinate,

    /// PM2.5 measured on route A; omit when unavailable
    #[arg(long)]
    reading_a: Option<f64>,
    #[arg(long)]
    reading_b: Option<f64>,

    /// Substituted for a missing route A reading
    #[arg(long, default_value_t = FallbackReadings::default().route_a)]
    fallback_a: f64,
    #[arg(long, default_value_t = FallbackReadings::default().route_b)]
    fallback_b: f64,

    /// route-a, route-b, mean or max
    #[arg(long, value_parser = parse_duration_policy, default_value = "route-a")]
    duration_policy: DurationPolicy,

    /// Waypoints per path
    #[arg(long, default_value_t = DEFAULT_POINT_COUNT)]
    points: usize,

    /// Include the base64 GPX export in the output
    #[arg(long)]
    gpx: bool,
}

fn parse_coordinate(raw: &str) -> Result<Coordinate, String> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got '{raw}'"))?;
    let parse = |v: &str| v.trim().parse::<f64>().map_err(|err| format!("'{v}': {err}"));
    Ok(Coordinate {
        lat: parse(lat)?,
        lon: parse(lon)?,
    })
}

fn parse_duration_policy(raw: &str) -> Result<DurationPolicy, String> {
    parse_policy(raw).ok_or_else(|| format!("unknown duration policy '{raw}'"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    tracing::info!("comparing routes {:?} -> {:?}", args.start, args.end);

    let routes = compare_with_points(args.start, args.end, args.points)?;
    let fallback = FallbackReadings {
        route_a: args.fallback_a,
        route_b: args.fallback_b,
    };
    let exposure = assess(
        &routes,
        args.reading_a,
        args.reading_b,
        fallback,
        args.duration_policy,
    )?;
    if exposure.route_a.fallback_used || exposure.route_b.fallback_used {
        tracing::warn!("missing reading replaced by fallback {:?}", fallback);
    }

    let gpx_base64 = if args.gpx {
        Some(encode_routes_as_gpx(&routes)?)
    } else {
        None
    };

    let output = json!({
        "start": args.start,
        "end": args.end,
        "routes": routes,
        "exposure": exposure,
        "gpx_base64": gpx_base64,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lat_lon_pairs() {
        let coord = parse_coordinate("28.6315, 77.2167").unwrap();
        assert_eq!(coord, Coordinate { lat: 28.6315, lon: 77.2167 });
        assert!(parse_coordinate("28.6315").is_err());
        assert!(parse_coordinate("north,77").is_err());
    }

    #[test]
    fn cli_defaults() {
        let args = Args::parse_from(["compare_routes", "--start", "28.6315,77.2167", "--end", "28.6129,77.2295"]);
        assert_eq!(args.points, 11);
        assert_eq!(args.fallback_a, 55.0);
        assert_eq!(args.fallback_b, 35.0);
        assert_eq!(args.duration_policy, DurationPolicy::RouteA);
        assert!(args.reading_a.is_none());
    }

    #[test]
    fn cli_accepts_southern_and_western_coordinates() {
        let args = Args::parse_from([
            "compare_routes",
            "--start",
            "-33.8688,151.2093",
            "--end",
            "-33.8568,151.2153",
            "--reading-b",
            "8.5",
            "--duration-policy",
            "max",
        ]);
        assert_eq!(args.start.lat, -33.8688);
        assert_eq!(args.reading_b, Some(8.5));
        assert_eq!(args.duration_policy, DurationPolicy::Max);
    }
}
