use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::ClientError;
use crate::exposure::round_to;
use crate::models::{Coordinate, PollutionReading};

/// Search radius around a sample point.
pub const DEFAULT_RADIUS_KM: f64 = 10.0;
/// Number of most recent measurements averaged into one reading.
pub const RECENT_MEASUREMENTS: usize = 5;

/// Source of PM2.5 readings near a coordinate.
///
/// Implementations apply their own timeout and return `None` on any failure
/// rather than raising.
#[async_trait]
pub trait AirQualitySource: Send + Sync {
    async fn measure(&self, at: Coordinate, radius_km: f64) -> PollutionReading;
}

/// Client for the OpenAQ v2 `/measurements` endpoint.
pub struct OpenAqClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MeasurementsPage {
    #[serde(default)]
    results: Vec<Measurement>,
}

#[derive(Debug, Deserialize)]
struct Measurement {
    value: Option<f64>,
}

impl OpenAqClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn latest_pm25(&self, at: Coordinate, radius_km: f64) -> Result<f64, ClientError> {
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(ClientError::InvalidPayload(format!("search radius {radius_km} km")));
        }
        let radius_m = (radius_km * 1000.0).round() as u64;
        let mut request = self
            .client
            .get(format!("{}/measurements", self.base_url))
            .query(&[
                ("coordinates", format!("{},{}", at.lat, at.lon)),
                ("radius", radius_m.to_string()),
                ("parameter", "pm25".to_string()),
                ("limit", RECENT_MEASUREMENTS.to_string()),
                ("order_by", "datetime".to_string()),
                ("sort", "desc".to_string()),
            ]);
        if let Some(key) = &self.api_key {
            request = request.header("X-API-Key", key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        let page: MeasurementsPage = response.json().await?;
        average_reading(&page.results).ok_or(ClientError::Empty)
    }
}

#[async_trait]
impl AirQualitySource for OpenAqClient {
    async fn measure(&self, at: Coordinate, radius_km: f64) -> PollutionReading {
        match self.latest_pm25(at, radius_km).await {
            Ok(value) => {
                tracing::debug!("PM2.5 near {:?}: {value}", at);
                Some(value)
            }
            Err(err) => {
                tracing::warn!("air quality lookup near {:?} failed: {err}", at);
                None
            }
        }
    }
}

/// Mean of the non-null values, rounded to 2 decimals.
fn average_reading(results: &[Measurement]) -> Option<f64> {
    let values: Vec<f64> = results.iter().filter_map(|m| m.value).collect();
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some(round_to(mean, 2))
}
