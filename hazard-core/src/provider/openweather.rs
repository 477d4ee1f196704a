use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::model::{CityQuery, WeatherObservation};

use super::{FETCH_TIMEOUT, WeatherProvider};

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        let http = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { api_key, http }
    }

    async fn fetch_current(&self, query: &CityQuery) -> Result<WeatherObservation> {
        let url = "https://api.openweathermap.org/data/2.5/weather";
        let q = query.qualified();

        let res = self
            .http
            .get(url)
            .query(&[
                ("q", q.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        Ok(observation_from_current(parsed))
    }
}

fn observation_from_current(parsed: OwCurrentResponse) -> WeatherObservation {
    let observation_time = unix_to_utc(parsed.dt).unwrap_or_else(Utc::now);

    let description = parsed
        .weather
        .first()
        .map(|w| w.description.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    WeatherObservation {
        provider: "openweather".to_string(),
        city: parsed.name,
        temperature_c: parsed.main.temp,
        humidity_pct: parsed.main.humidity,
        pressure_hpa: parsed.main.pressure,
        // OpenWeather reports wind in m/s; the pipeline works in km/h.
        wind_speed_kmh: parsed.wind.speed * 3.6,
        rainfall_1h_mm: parsed.rain.unwrap_or_default().one_hour,
        description,
        observation_time,
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwRain {
    #[serde(rename = "1h", default)]
    one_hour: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    rain: Option<OwRain>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_observation(&self, query: &CityQuery) -> Result<WeatherObservation> {
        self.fetch_current(query).await
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAINY: &str = r#"{
        "name": "Mumbai",
        "dt": 1719900000,
        "main": {"temp": 27.4, "humidity": 92, "pressure": 1002},
        "weather": [{"description": "moderate rain"}],
        "wind": {"speed": 10.0},
        "rain": {"1h": 3.5}
    }"#;

    const DRY: &str = r#"{
        "name": "Jaipur",
        "dt": 1719900000,
        "main": {"temp": 41.0, "humidity": 14, "pressure": 1008},
        "weather": [],
        "wind": {"speed": 2.5}
    }"#;

    #[test]
    fn maps_payload_and_converts_wind_to_kmh() {
        let parsed: OwCurrentResponse = serde_json::from_str(RAINY).unwrap();
        let obs = observation_from_current(parsed);

        assert_eq!(obs.city, "Mumbai");
        assert_eq!(obs.wind_speed_kmh, 36.0);
        assert_eq!(obs.rainfall_1h_mm, 3.5);
        assert_eq!(obs.description, "moderate rain");
        assert_eq!(obs.pressure_hpa, 1002.0);
    }

    #[test]
    fn missing_rain_block_means_zero_rainfall() {
        let parsed: OwCurrentResponse = serde_json::from_str(DRY).unwrap();
        let obs = observation_from_current(parsed);

        assert_eq!(obs.rainfall_1h_mm, 0.0);
        assert_eq!(obs.description, "Unknown");
    }

    #[test]
    fn rain_block_without_hourly_reading_defaults_to_zero() {
        let body = RAINY.replace(r#""rain": {"1h": 3.5}"#, r#""rain": {"3h": 9.0}"#);
        let parsed: OwCurrentResponse = serde_json::from_str(&body).unwrap();
        let obs = observation_from_current(parsed);

        assert_eq!(obs.rainfall_1h_mm, 0.0);
    }
}
