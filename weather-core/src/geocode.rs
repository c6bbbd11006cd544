use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    geocode::{openmeteo::OpenMeteoGeocoder, openweather::OpenWeatherGeocoder},
    model::Candidate,
    provider::ProviderId,
};

pub mod openmeteo;
pub mod openweather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeocoderId {
    OpenMeteo,
    OpenWeather,
}

impl GeocoderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeocoderId::OpenMeteo => "openmeteo",
            GeocoderId::OpenWeather => "openweather",
        }
    }

    /// Whether candidates carry full country names. OpenWeather only reports ISO codes.
    pub fn reports_country_names(&self) -> bool {
        matches!(self, GeocoderId::OpenMeteo)
    }

    pub const fn all() -> &'static [GeocoderId] {
        &[GeocoderId::OpenMeteo, GeocoderId::OpenWeather]
    }
}

impl std::fmt::Display for GeocoderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for GeocoderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "openmeteo" => Ok(GeocoderId::OpenMeteo),
            "openweather" => Ok(GeocoderId::OpenWeather),
            _ => Err(anyhow::anyhow!(
                "Unknown geocoder '{value}'. Supported geocoders: openmeteo, openweather."
            )),
        }
    }
}

/// Forward geocoding: place name to candidate locations.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Up to `limit` matches for `name`, in the order the upstream ranks them.
    async fn search(&self, name: &str, limit: u8) -> anyhow::Result<Vec<Candidate>>;
}

pub fn geocoder_from_config(id: GeocoderId, config: &Config) -> anyhow::Result<Box<dyn Geocoder>> {
    let base_url = config.geocoding.base_url.clone();

    let boxed: Box<dyn Geocoder> = match id {
        GeocoderId::OpenMeteo => {
            let g = OpenMeteoGeocoder::new();
            Box::new(match base_url {
                Some(url) => g.with_base_url(url),
                None => g,
            })
        }
        GeocoderId::OpenWeather => {
            // Shares the weather provider's key and endpoint.
            let api_key = config.provider_api_key(ProviderId::OpenWeather).ok_or_else(|| {
                anyhow::anyhow!(
                    "The openweather geocoder needs an API key.\n\
                     Hint: run `weather configure openweather` and enter your API key."
                )
            })?;
            let g = OpenWeatherGeocoder::new(api_key.to_owned());
            let base_url = base_url
                .or_else(|| config.provider_base_url(ProviderId::OpenWeather).map(str::to_owned));
            Box::new(match base_url {
                Some(url) => g.with_base_url(url),
                None => g,
            })
        }
    };

    Ok(boxed)
}

pub fn default_geocoder_from_config(config: &Config) -> anyhow::Result<Box<dyn Geocoder>> {
    geocoder_from_config(config.default_geocoder_id()?, config)
}
