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

pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: OPENWEATHER_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    dt: Option<i64>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn name(&self) -> &str {
        "openweather"
    }

    async fn current(&self, at: Coordinates) -> Result<Conditions> {
        let url = endpoint(&self.base_url, "data/2.5/weather");

        let request = self.http.get(url).query(&[
            ("lat", at.latitude.to_string()),
            ("lon", at.longitude.to_string()),
            ("units", "metric".to_string()),
            ("appid", self.api_key.clone()),
        ]);

        let parsed: OwCurrentResponse = get_json(request, "OpenWeather current weather").await?;

        let observation_time = parsed.dt.and_then(unix_to_utc).unwrap_or_else(Utc::now);
        let (description, icon) = match parsed.weather.into_iter().next() {
            Some(w) => (w.description, w.icon),
            None => (None, None),
        };

        Ok(Conditions {
            temperature_c: parsed.main.temp,
            wind_speed_mps: parsed.wind.speed,
            wind_direction_deg: parsed.wind.deg,
            observation_time,
            humidity_pct: parsed.main.humidity,
            description,
            icon,
        })
    }
}
