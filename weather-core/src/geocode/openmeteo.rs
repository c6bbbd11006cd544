use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    http::{endpoint, get_json},
    model::Candidate,
};

use super::Geocoder;

pub const OPEN_METEO_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";

#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    base_url: String,
    http: Client,
}

impl Default for OpenMeteoGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenMeteoGeocoder {
    pub fn new() -> Self {
        Self {
            base_url: OPEN_METEO_GEOCODING_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct OmPlace {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    country_code: Option<String>,
    admin1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmSearchResponse {
    // Absent entirely when nothing matches.
    #[serde(default)]
    results: Vec<OmPlace>,
}

impl From<OmPlace> for Candidate {
    fn from(p: OmPlace) -> Self {
        Candidate {
            display_name: p.name,
            region: p.admin1,
            country: p.country.or_else(|| p.country_code.clone()).unwrap_or_default(),
            country_code: p.country_code,
            latitude: p.latitude,
            longitude: p.longitude,
        }
    }
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    async fn search(&self, name: &str, limit: u8) -> Result<Vec<Candidate>> {
        let url = endpoint(&self.base_url, "v1/search");
        let count = limit.to_string();

        let request = self.http.get(url).query(&[
            ("name", name),
            ("count", count.as_str()),
            ("language", "en"),
            ("format", "json"),
        ]);

        let parsed: OmSearchResponse = get_json(request, "Open-Meteo geocoding").await?;
        Ok(parsed.results.into_iter().map(Candidate::from).collect())
    }
}
