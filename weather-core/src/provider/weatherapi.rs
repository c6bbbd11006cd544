use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    http::{endpoint, get_json, unix_to_utc},
    model::{Conditions, Coordinates},
};

use super::WeatherProvider;

pub const WEATHERAPI_BASE_URL: &str = "https://api.weatherapi.com";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: WEATHERAPI_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    localtime_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    humidity: Option<u8>,
    wind_kph: f64,
    wind_degree: f64,
    condition: Option<WaCondition>,
    last_updated_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: Option<WaLocation>,
    current: WaCurrent,
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    fn name(&self) -> &str {
        "weatherapi"
    }

    async fn current(&self, at: Coordinates) -> Result<Conditions> {
        let url = endpoint(&self.base_url, "v1/current.json");
        let q = format!("{},{}", at.latitude, at.longitude);

        let request = self
            .http
            .get(url)
            .query(&[("key", self.api_key.as_str()), ("q", q.as_str())]);
        let parsed: WaResponse = get_json(request, "WeatherAPI current weather").await?;

        let ts = parsed
            .current
            .last_updated_epoch
            .or(parsed.location.and_then(|l| l.localtime_epoch));
        let observation_time = ts.and_then(unix_to_utc).unwrap_or_else(Utc::now);

        let (description, icon) = match parsed.current.condition {
            Some(c) => (c.text, c.icon),
            None => (None, None),
        };

        Ok(Conditions {
            temperature_c: parsed.current.temp_c,
            wind_speed_mps: parsed.current.wind_kph / 3.6,
            wind_direction_deg: parsed.current.wind_degree,
            observation_time,
            humidity_pct: parsed.current.humidity,
            description,
            icon,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ORIGIN: Coordinates = Coordinates {
        latitude: 0.0,
        longitude: 0.0,
    };

    async fn provider_for(body: serde_json::Value) -> (MockServer, WeatherApiProvider) {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let provider = WeatherApiProvider::new("KEY".into())

            .with_base_url(server.uri());
        (server, provider)
    }

    #[tokio::test]
    async fn queries_by_coordinate_pair() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .and(query_param("key", "KEY"))
            .and(query_param("q", "22.72,75.86"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "location": {
                    "name": "Indore",
                    "country": "India",
                    "localtime_epoch": 1_700_000_500
                },
                "current": {
                    "last_updated_epoch": 1_700_000_000,
                    "temp_c": 30.0,
                    "feelslike_c": 32.0,
                    "humidity": 40,
                    "wind_kph": 18.0,
                    "wind_degree": 270,
                    "condition": {
                        "text": "Sunny",
                        "icon": "//cdn.weatherapi.com/weather/64x64/day/113.png"
                    }
                }
            })))
            .mount(&server)
            .await;

        let provider = WeatherApiProvider::new("KEY".into())

            .with_base_url(server.uri());
        let c = provider
            .current(Coordinates {
                latitude: 22.72,
                longitude: 75.86,
            })
            .await
            .unwrap();

        assert_eq!(c.temperature_c, 30.0);
        assert!((c.wind_speed_mps - 5.0).abs() < 1e-9);
        assert_eq!(c.wind_direction_deg, 270.0);
        assert_eq!(c.humidity_pct, Some(40));
        assert_eq!(c.description.as_deref(), Some("Sunny"));
        assert_eq!(c.observation_time.timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn falls_back_to_location_time() {
        let (_server, provider) = provider_for(serde_json::json!({
            "location": { "localtime_epoch": 1_700_000_500 },
            "current": { "temp_c": 1.0, "wind_kph": 0.0, "wind_degree": 10 }
        }))
        .await;

        let c = provider.current(ORIGIN).await.unwrap();

        assert_eq!(c.observation_time.timestamp(), 1_700_000_500);
        assert_eq!(c.humidity_pct, None);
        assert_eq!(c.icon, None);
    }

    #[tokio::test]
    async fn missing_wind_direction_is_an_error() {
        let (_server, provider) = provider_for(serde_json::json!({
            "current": { "temp_c": 1.0, "humidity": 60, "wind_kph": 7.2 }
        }))
        .await;

        let err = provider.current(ORIGIN).await.unwrap_err();

        assert!(err.to_string().contains("Failed to parse WeatherAPI current weather JSON"));
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let provider = WeatherApiProvider::new("KEY".into())

            .with_base_url(server.uri());
        let err = provider.current(ORIGIN).await.unwrap_err();

        assert!(err.to_string().contains("Failed to parse WeatherAPI current weather JSON"));
    }
}
