use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    http::{endpoint, get_json},
    model::Candidate,
    provider::openweather::OPENWEATHER_BASE_URL,
};

use super::Geocoder;

/// OpenWeather direct geocoding (`/geo/1.0/direct`).
#[derive(Debug, Clone)]
pub struct OpenWeatherGeocoder {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherGeocoder {
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
struct OwPlace {
    name: String,
    lat: f64,
    lon: f64,
    /// ISO 3166 country code.
    country: String,
    state: Option<String>,
}

impl From<OwPlace> for Candidate {
    fn from(p: OwPlace) -> Self {
        Candidate {
            display_name: p.name,
            region: p.state,
            country_code: Some(p.country.clone()),
            country: p.country,
            latitude: p.lat,
            longitude: p.lon,
        }
    }
}

#[async_trait]
impl Geocoder for OpenWeatherGeocoder {
    async fn search(&self, name: &str, limit: u8) -> Result<Vec<Candidate>> {
        let url = endpoint(&self.base_url, "geo/1.0/direct");
        let limit = limit.to_string();

        let request = self.http.get(url).query(&[
            ("q", name),
            ("limit", limit.as_str()),
            ("appid", self.api_key.as_str()),
        ]);

        let places: Vec<OwPlace> = get_json(request, "OpenWeather geocoding").await?;
        Ok(places.into_iter().map(Candidate::from).collect())
    }
}
