use std::{env, net::SocketAddr, num::NonZeroUsize, str::FromStr, time::Duration};

use crate::air_quality::DEFAULT_RADIUS_KM;
use crate::models::{DurationPolicy, FallbackReadings};

const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_USER_AGENT: &str = "ecocommute-backend/0.1";
const DEFAULT_OPENAQ_URL: &str = "https://api.openaq.org/v2";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings, read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub nominatim_url: String,
    pub nominatim_user_agent: String,
    pub geocoder_timeout: Duration,
    pub geocode_cache_size: NonZeroUsize,
    pub openaq_url: String,
    pub openaq_api_key: Option<String>,
    pub measurement_timeout: Duration,
    pub measurement_radius_km: f64,
    /// Readings substituted when a route has no measurement.
    pub fallback: FallbackReadings,
    pub duration_policy: DurationPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            nominatim_user_agent: DEFAULT_USER_AGENT.to_string(),
            geocoder_timeout: Duration::from_secs(10),
            geocode_cache_size: NonZeroUsize::new(256).unwrap(),
            openaq_url: DEFAULT_OPENAQ_URL.to_string(),
            openaq_api_key: None,
            measurement_timeout: Duration::from_secs(5),
            measurement_radius_km: DEFAULT_RADIUS_KM,
            fallback: FallbackReadings::default(),
            duration_policy: DurationPolicy::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            bind_addr: parse_or(get("BIND_ADDR"), "BIND_ADDR", defaults.bind_addr)?,
            nominatim_url: get("NOMINATIM_URL").unwrap_or(defaults.nominatim_url),
            nominatim_user_agent: get("NOMINATIM_USER_AGENT").unwrap_or(defaults.nominatim_user_agent),
            geocoder_timeout: Duration::from_secs(parse_or(
                get("GEOCODER_TIMEOUT_SECS"),
                "GEOCODER_TIMEOUT_SECS",
                defaults.geocoder_timeout.as_secs(),
            )?),
            geocode_cache_size: parse_or(
                get("GEOCODE_CACHE_SIZE"),
                "GEOCODE_CACHE_SIZE",
                defaults.geocode_cache_size,
            )?,
            openaq_url: get("OPENAQ_URL").unwrap_or(defaults.openaq_url),
            openaq_api_key: get("OPENAQ_API_KEY"),
            measurement_timeout: Duration::from_secs(parse_or(
                get("MEASUREMENT_TIMEOUT_SECS"),
                "MEASUREMENT_TIMEOUT_SECS",
                defaults.measurement_timeout.as_secs(),
            )?),
            measurement_radius_km: parse_radius(get("MEASUREMENT_RADIUS_KM"), defaults.measurement_radius_km)?,
            fallback: FallbackReadings {
                route_a: parse_or(get("FALLBACK_PM25_A"), "FALLBACK_PM25_A", defaults.fallback.route_a)?,
                route_b: parse_or(get("FALLBACK_PM25_B"), "FALLBACK_PM25_B", defaults.fallback.route_b)?,
            },
            duration_policy: match get("DURATION_POLICY") {
                Some(raw) => parse_policy(&raw).ok_or(ConfigError::Invalid {
                    key: "DURATION_POLICY",
                    value: raw,
                })?,
                None => defaults.duration_policy,
            },
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

/// The search radius must be a finite, strictly positive number of kilometres.
fn parse_radius(raw: Option<String>, default: f64) -> Result<f64, ConfigError> {
    let key = "MEASUREMENT_RADIUS_KM";
    let radius: f64 = parse_or(raw.clone(), key, default)?;
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(ConfigError::Invalid {
            key,
            value: raw.unwrap_or_else(|| radius.to_string()),
        })
    }
}

/// Accepts `route_a`, `route-a`, `mean`, ... case-insensitively.
pub fn parse_policy(raw: &str) -> Option<DurationPolicy> {
    match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "route_a" | "a" => Some(DurationPolicy::RouteA),
        "route_b" | "b" => Some(DurationPolicy::RouteB),
        "mean" | "average" => Some(DurationPolicy::Mean),
        "max" => Some(DurationPolicy::Max),
        _ => None,
    }
}
