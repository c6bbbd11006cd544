//! Open-Meteo current weather. Free and keyless; reports no humidity in the
//! `current_weather` block.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    http::{endpoint, get_json},
    model::{Conditions, Coordinates},
};

use super::WeatherProvider;

pub const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
}

impl Default for OpenMeteoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenMeteoProvider {
    pub fn new() -> Self {
        Self {
            base_url: OPEN_METEO_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    temperature: f64,
    windspeed: f64,
    winddirection: f64,
    weathercode: Option<i32>,
    time: String,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    current_weather: OmCurrentWeather,
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    fn name(&self) -> &str {
        "openmeteo"
    }

    async fn current(&self, at: Coordinates) -> Result<Conditions> {
        let url = endpoint(&self.base_url, "v1/forecast");

        let request = self.http.get(url).query(&[
            ("latitude", at.latitude.to_string()),
            ("longitude", at.longitude.to_string()),
            ("current_weather", "true".to_string()),
            ("windspeed_unit", "ms".to_string()),
            ("timezone", "GMT".to_string()),
        ]);

        let parsed: OmResponse = get_json(request, "Open-Meteo current weather").await?;
        let cw = parsed.current_weather;

        // GMT timezone: local times are UTC, minute precision.
        let observation_time = NaiveDateTime::parse_from_str(&cw.time, "%Y-%m-%dT%H:%M")
            .with_context(|| format!("Invalid Open-Meteo observation time '{}'", cw.time))?
            .and_utc();

        Ok(Conditions {
            temperature_c: cw.temperature,
            wind_speed_mps: cw.windspeed,
            wind_direction_deg: cw.winddirection,
            observation_time,
            humidity_pct: None,
            description: cw.weathercode.and_then(wmo_description).map(str::to_string),
            icon: None,
        })
    }
}

/// Human-readable text for a WMO weather interpretation code.
/// See: https://open-meteo.com/en/docs#weathervariables
pub fn wmo_description(code: i32) -> Option<&'static str> {
    let text = match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 | 63 => "Rain",
        65 => "Heavy rain",
        66 | 67 => "Freezing rain",
        71 | 73 | 75 | 77 => "Snow",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 | 96 | 99 => "Thunderstorm",
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn parses_current_weather_block() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "22.72"))
            .and(query_param("longitude", "75.86"))
            .and(query_param("current_weather", "true"))
            .and(query_param("windspeed_unit", "ms"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": 22.75,
                "longitude": 75.875,
                "current_weather": {
                    "temperature": 27.4,
                    "windspeed": 2.9,
                    "winddirection": 305,
                    "weathercode": 3,
                    "is_day": 1,
                    "time": "2024-05-01T12:00"
                }
            })))
            .mount(&server)
            .await;

        let provider = OpenMeteoProvider::new().with_base_url(server.uri());
        let c = provider
            .current(Coordinates {
                latitude: 22.72,
                longitude: 75.86,
            })
            .await
            .unwrap();

        assert_eq!(c.temperature_c, 27.4);
        assert_eq!(c.wind_speed_mps, 2.9);
        assert_eq!(c.wind_direction_deg, 305.0);
        assert_eq!(c.description.as_deref(), Some("Overcast"));
        assert_eq!(c.humidity_pct, None);
        assert_eq!(c.observation_time.to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }

    #[tokio::test]
    async fn missing_current_block_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": 0.0
            })))
            .mount(&server)
            .await;

        let provider = OpenMeteoProvider::new().with_base_url(server.uri());
        let origin = Coordinates {
            latitude: 0.0,
            longitude: 0.0,
        };
        assert!(provider.current(origin).await.is_err());
    }

    #[test]
    fn wmo_codes_map_to_text() {
        assert_eq!(wmo_description(0), Some("Clear sky"));
        assert_eq!(wmo_description(95), Some("Thunderstorm"));
        assert_eq!(wmo_description(-1), None);
    }
}
