use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::model::{CityQuery, WeatherObservation};

use super::{FETCH_TIMEOUT, WeatherProvider};

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        let http = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { api_key, http }
    }

    async fn fetch_current(&self, query: &CityQuery) -> Result<WeatherObservation> {
        let url = "http://api.weatherapi.com/v1/current.json";
        let q = query.qualified();

        let res = self
            .http
            .get(url)
            .query(&[("key", self.api_key.as_str()), ("q", q.as_str())])
            .send()
            .await
            .context("Failed to send request to WeatherAPI.com (current)")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read WeatherAPI current response body")?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "WeatherAPI current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: WaResponse =
            serde_json::from_str(&body).context("Failed to parse WeatherAPI current JSON")?;

        Ok(observation_from_current(parsed))
    }
}

fn observation_from_current(parsed: WaResponse) -> WeatherObservation {
    let ts = parsed.current.last_updated_epoch.or(parsed.location.localtime_epoch);
    let observation_time = ts.and_then(unix_to_utc).unwrap_or_else(Utc::now);

    let city = format!("{}, {}", parsed.location.name, parsed.location.country);

    WeatherObservation {
        provider: "weatherapi".to_string(),
        city,
        temperature_c: parsed.current.temp_c,
        humidity_pct: parsed.current.humidity,
        // Millibars and hectopascals are the same unit.
        pressure_hpa: parsed.current.pressure_mb,
        wind_speed_kmh: parsed.current.wind_kph,
        rainfall_1h_mm: parsed.current.precip_mm,
        description: parsed.current.condition.text,
        observation_time,
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
    localtime_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    humidity: f64,
    pressure_mb: f64,
    wind_kph: f64,
    #[serde(default)]
    precip_mm: f64,
    condition: WaCondition,
    last_updated_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn current_observation(&self, query: &CityQuery) -> Result<WeatherObservation> {
        self.fetch_current(query).await
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX { format!("{}...", &body[..MAX]) } else { body.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURRENT: &str = r#"{
        "location": {
            "name": "Chennai",
            "country": "India",
            "localtime_epoch": 1719900000
        },
        "current": {
            "temp_c": 31.2,
            "humidity": 78,
            "pressure_mb": 1006.0,
            "wind_kph": 22.3,
            "precip_mm": 1.2,
            "condition": {"text": "Patchy rain nearby"},
            "last_updated_epoch": 1719899700
        }
    }"#;

    #[test]
    fn maps_payload_without_unit_conversion() {
        let parsed: WaResponse = serde_json::from_str(CURRENT).unwrap();
        let obs = observation_from_current(parsed);

        assert_eq!(obs.city, "Chennai, India");
        // WeatherAPI already reports km/h and mb (= hPa).
        assert_eq!(obs.wind_speed_kmh, 22.3);
        assert_eq!(obs.pressure_hpa, 1006.0);
        assert_eq!(obs.rainfall_1h_mm, 1.2);
        assert_eq!(obs.description, "Patchy rain nearby");
    }

    #[test]
    fn missing_precip_defaults_to_zero() {
        let body = CURRENT.replace(r#""precip_mm": 1.2,"#, "");
        let parsed: WaResponse = serde_json::from_str(&body).unwrap();
        let obs = observation_from_current(parsed);

        assert_eq!(obs.rainfall_1h_mm, 0.0);
    }
}
