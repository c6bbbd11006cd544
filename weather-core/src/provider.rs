use crate::{
    Config,
    model::{Conditions, Coordinates},
    provider::{
        openmeteo::OpenMeteoProvider, openweather::OpenWeatherProvider,
        weatherapi::WeatherApiProvider,
    },
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod openmeteo;
pub mod openweather;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenMeteo,
    OpenWeather,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenMeteo => "openmeteo",
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenMeteo, ProviderId::OpenWeather, ProviderId::WeatherApi]
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ProviderId::OpenMeteo)
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openmeteo" => Ok(ProviderId::OpenMeteo),
            "openweather" => Ok(ProviderId::OpenWeather),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. \
                 Supported providers: openmeteo, openweather, weatherapi."
            )),
        }
    }
}

/// A current-conditions source addressed by coordinates.
///
/// Implementations report whatever optional fields their upstream carries and
/// leave the rest as `None`.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Short identifier stored on every reading, e.g. "openweather".
    fn name(&self) -> &str;

    async fn current(&self, at: Coordinates) -> anyhow::Result<Conditions>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let base_url = config.provider_base_url(id).map(str::to_owned);

    let api_key = || {
        config.provider_api_key(id).map(str::to_owned).ok_or_else(|| {
            anyhow::anyhow!(
                "No API key configured for provider '{id}'.\n\
                     Hint: run `weather configure {id}` and enter your API key."
            )
        })
    };

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::OpenMeteo => {
            let p = OpenMeteoProvider::new();
            Box::new(match base_url {
                Some(url) => p.with_base_url(url),
                None => p,
            })
        }
        ProviderId::OpenWeather => {
            let p = OpenWeatherProvider::new(api_key()?);
            Box::new(match base_url {
                Some(url) => p.with_base_url(url),
                None => p,
            })
        }
        ProviderId::WeatherApi => {
            let p = WeatherApiProvider::new(api_key()?);
            Box::new(match base_url {
                Some(url) => p.with_base_url(url),
                None => p,
            })
        }
    };

    Ok(boxed)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}
