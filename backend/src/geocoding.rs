use std::{num::NonZeroUsize, sync::Mutex, time::Duration};

use async_trait::async_trait;
use lru::LruCache;
use reqwest::Client;
use serde::Deserialize;

use crate::error::ClientError;
use crate::models::Coordinate;

/// Resolves free-text addresses to coordinates.
///
/// Implementations apply their own timeout and return `None` on any failure
/// (no match, ambiguous input, network error) instead of an error.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, address: &str) -> Option<Coordinate>;
}

/// Geocoder backed by a Nominatim `/search` endpoint.
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    /// Nominatim's usage policy requires an identifying User-Agent.
    pub fn new(base_url: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn search(&self, address: &str) -> Result<Coordinate, ClientError> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        let places: Vec<NominatimPlace> = response.json().await?;
        first_place(&places)
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, address: &str) -> Option<Coordinate> {
        match self.search(address).await {
            Ok(coord) => {
                tracing::debug!("geocoded '{address}' to {:?}", coord);
                Some(coord)
            }
            Err(err) => {
                tracing::warn!("geocoding '{address}' failed: {err}");
                None
            }
        }
    }
}

fn first_place(places: &[NominatimPlace]) -> Result<Coordinate, ClientError> {
    let place = places.first().ok_or(ClientError::Empty)?;
    let parse = |raw: &str| {
        raw.trim()
            .parse::<f64>()
            .map_err(|err| ClientError::InvalidPayload(format!("'{raw}': {err}")))
    };
    let coord = Coordinate {
        lat: parse(&place.lat)?,
        lon: parse(&place.lon)?,
    };
    if !coord.is_valid() {
        return Err(ClientError::InvalidPayload(format!(
            "coordinate out of range: {coord:?}"
        )));
    }
    Ok(coord)
}

/// LRU cache of successful lookups in front of another geocoder.
///
/// Misses are never cached so a transient outage does not stick.
pub struct CachedGeocoder<G> {
    inner: G,
    cache: Mutex<LruCache<String, Coordinate>>,
}

impl<G: Geocoder> CachedGeocoder<G> {
    pub fn new(inner: G, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn cache_key(address: &str) -> String {
        address.trim().to_lowercase()
    }

    fn cached(&self, key: &str) -> Option<Coordinate> {
        self.cache.lock().ok()?.get(key).copied()
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    async fn resolve(&self, address: &str) -> Option<Coordinate> {
        let key = Self::cache_key(address);
        if let Some(coord) = self.cached(&key) {
            tracing::debug!("geocode cache hit for '{address}'");
            return Some(coord);
        }

        let coord = self.inner.resolve(address).await?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, coord);
        }
        Some(coord)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingGeocoder {
        calls: AtomicUsize,
        answer: Option<Coordinate>,
    }

    #[async_trait]
    impl Geocoder for CountingGeocoder {
        async fn resolve(&self, _address: &str) -> Option<Coordinate> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }

    fn place(lat: &str, lon: &str) -> NominatimPlace {
        NominatimPlace {
            lat: lat.into(),
            lon: lon.into(),
        }
    }

    #[test]
    fn parses_nominatim_payload() {
        let body = r#"[{"place_id": 1, "lat": "28.6129", "lon": "77.2295", "display_name": "India Gate"}]"#;
        let places: Vec<NominatimPlace> = serde_json::from_str(body).unwrap();
        let coord = first_place(&places).unwrap();
        assert_eq!(
            coord,
            Coordinate {
                lat: 28.6129,
                lon: 77.2295
            }
        );
    }

    #[test]
    fn empty_result_is_an_error() {
        assert!(matches!(first_place(&[]), Err(ClientError::Empty)));
    }

    #[test]
    fn rejects_garbage_and_out_of_range() {
        assert!(matches!(
            first_place(&[place("north", "77.2")]),
            Err(ClientError::InvalidPayload(_))
        ));
        assert!(matches!(
            first_place(&[place("128.0", "77.2")]),
            Err(ClientError::InvalidPayload(_))
        ));
    }

    #[tokio::test]
    async fn cache_reuses_successful_lookups() {
        let inner = CountingGeocoder {
            calls: AtomicUsize::new(0),
            answer: Some(Coordinate { lat: 1.0, lon: 2.0 }),
        };
        let geocoder = CachedGeocoder::new(inner, NonZeroUsize::new(4).unwrap());

        assert!(geocoder.resolve("India Gate, Delhi").await.is_some());
        assert!(geocoder.resolve("  india gate, delhi ").await.is_some());
        assert_eq!(geocoder.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cache_does_not_remember_misses() {
        let inner = CountingGeocoder {
            calls: AtomicUsize::new(0),
            answer: None,
        };
        let geocoder = CachedGeocoder::new(inner, NonZeroUsize::new(4).unwrap());

        assert!(geocoder.resolve("nowhere").await.is_none());
        assert!(geocoder.resolve("nowhere").await.is_none());
        assert_eq!(geocoder.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unreachable_server_resolves_to_none() {
        let geocoder = NominatimGeocoder::new(
            "http://127.0.0.1:9",
            "backend-tests",
            Duration::from_millis(200),
        )
        .unwrap();
        assert!(geocoder.resolve("Connaught Place").await.is_none());
    }
}
