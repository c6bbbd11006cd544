use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::SearchError;

/// A trimmed, non-empty place name typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query(String);

impl Query {
    /// Trim the raw input and reject it when nothing is left.
    pub fn parse(raw: &str) -> Result<Self, SearchError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Query {
    type Error = SearchError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl FromStr for Query {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One geocoding match for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub display_name: String,
    pub region: Option<String>,
    pub country: String,
    /// ISO 3166-1 alpha-2 code when the geocoder reports one.
    pub country_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Candidate {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// "Name, Region, Country", skipping parts that are empty or repeat the name.
    pub fn label(&self) -> String {
        let mut parts = vec![self.display_name.as_str()];

        for part in [self.region.as_deref(), Some(self.country.as_str())].into_iter().flatten() {
            let part = part.trim();
            if !part.is_empty() && !parts.contains(&part) {
                parts.push(part);
            }
        }

        parts.join(", ")
    }
}

/// A provider's current conditions before they are tied to a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    pub temperature_c: f64,
    pub wind_speed_mps: f64,
    pub wind_direction_deg: f64,
    pub observation_time: DateTime<Utc>,
    pub humidity_pct: Option<u8>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub provider: String,
    pub location_label: String,
    pub latitude: f64,
    pub longitude: f64,
    pub temperature_c: f64,
    pub wind_speed_mps: f64,
    pub wind_direction_deg: f64,
    pub observation_time: DateTime<Utc>,
    pub humidity_pct: Option<u8>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

impl WeatherReading {
    pub fn new(provider: &str, candidate: &Candidate, conditions: Conditions) -> Self {
        Self {
            provider: provider.to_string(),
            location_label: candidate.label(),
            latitude: candidate.latitude,
            longitude: candidate.longitude,
            temperature_c: conditions.temperature_c,
            wind_speed_mps: conditions.wind_speed_mps,
            wind_direction_deg: conditions.wind_direction_deg,
            observation_time: conditions.observation_time,
            humidity_pct: conditions.humidity_pct,
            description: conditions.description,
            icon: conditions.icon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, region: Option<&str>, country: &str) -> Candidate {
        Candidate {
            display_name: name.to_string(),
            region: region.map(str::to_string),
            country: country.to_string(),
            country_code: None,
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    #[test]
    fn query_is_trimmed() {
        let q = Query::parse("  Indore \n").expect("non-empty query");
        assert_eq!(q.as_str(), "Indore");
    }

    #[test]
    fn blank_queries_are_rejected() {
        for raw in ["", "   ", "\t\n"] {
            assert_eq!(Query::parse(raw), Err(SearchError::EmptyQuery));
        }
        assert!("  ".parse::<Query>().is_err());
    }

    #[test]
    fn label_joins_available_parts() {
        let c = candidate("Indore", Some("Madhya Pradesh"), "India");
        assert_eq!(c.label(), "Indore, Madhya Pradesh, India");
    }

    #[test]
    fn label_skips_missing_and_repeated_parts() {
        assert_eq!(candidate("Indore", None, "IN").label(), "Indore, IN");
        assert_eq!(candidate("Singapore", Some(""), "Singapore").label(), "Singapore");
    }
}
