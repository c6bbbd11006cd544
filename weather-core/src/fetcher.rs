use crate::{
    error::SearchError,
    model::{Candidate, WeatherReading},
    provider::WeatherProvider,
};

/// Turns a chosen candidate into a labelled [`WeatherReading`].
#[derive(Debug)]
pub struct WeatherFetcher {
    provider: Box<dyn WeatherProvider>,
}

impl WeatherFetcher {
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    pub async fn fetch(&self, candidate: &Candidate) -> Result<WeatherReading, SearchError> {
        match self.provider.current(candidate.coordinates()).await {
            Ok(conditions) => {
                let reading = WeatherReading::new(self.provider.name(), candidate, conditions);
                tracing::info!(
                    provider = self.provider.name(),
                    location = %reading.location_label,
                    temperature_c = reading.temperature_c,
                    "fetched current weather"
                );
                Ok(reading)
            }
            Err(err) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    lat = candidate.latitude,
                    lon = candidate.longitude,
                    error = %format!("{err:#}"),
                    "weather request failed"
                );
                Err(SearchError::WeatherUnavailable)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Conditions, Coordinates};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    #[derive(Debug)]
    struct Fixed(Option<Conditions>);

    #[async_trait]
    impl WeatherProvider for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn current(&self, _at: Coordinates) -> anyhow::Result<Conditions> {
            self.0.clone().ok_or_else(|| anyhow::anyhow!("status 500"))
        }
    }

    fn indore() -> Candidate {
        Candidate {
            display_name: "Indore".into(),
            region: Some("Madhya Pradesh".into()),
            country: "India".into(),
            country_code: Some("IN".into()),
            latitude: 22.72,
            longitude: 75.86,
        }
    }

    #[tokio::test]
    async fn reading_carries_candidate_label_and_coordinates() {
        let conditions = Conditions {
            temperature_c: 31.0,
            wind_speed_mps: 2.0,
            wind_direction_deg: 180.0,
            observation_time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            humidity_pct: None,
            description: Some("Clear sky".into()),
            icon: None,
        };
        let fetcher = WeatherFetcher::new(Box::new(Fixed(Some(conditions))));

        let reading = fetcher.fetch(&indore()).await.unwrap();

        assert_eq!(reading.provider, "fixed");
        assert_eq!(reading.location_label, "Indore, Madhya Pradesh, India");
        assert_eq!((reading.latitude, reading.longitude), (22.72, 75.86));
        assert_eq!(reading.humidity_pct, None);
        assert_eq!(reading.description.as_deref(), Some("Clear sky"));
    }

    #[tokio::test]
    async fn provider_failure_is_weather_unavailable() {
        let fetcher = WeatherFetcher::new(Box::new(Fixed(None)));
        assert_eq!(fetcher.fetch(&indore()).await, Err(SearchError::WeatherUnavailable));
    }
}
