//! Place name → candidate locations, with optional region filtering.

use crate::{
    config::DEFAULT_GEOCODING_LIMIT,
    error::SearchError,
    geocode::Geocoder,
    model::{Candidate, Query},
};

/// Restricts candidates to a country and/or region. Matching is case-insensitive;
/// `country` accepts either the country name or its ISO code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionFilter {
    country: Option<String>,
    region: Option<String>,
}

impl RegionFilter {
    /// `None` when both parts are absent or blank.
    pub fn new(country: Option<String>, region: Option<String>) -> Option<Self> {
        let clean = |s: Option<String>| s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let (country, region) = (clean(country), clean(region));

        if country.is_none() && region.is_none() {
            return None;
        }
        Some(Self { country, region })
    }

    pub fn country(country: impl Into<String>) -> Option<Self> {
        Self::new(Some(country.into()), None)
    }

    /// True when the country is given as a name rather than a two-letter ISO code.
    pub fn names_country(&self) -> bool {
        self.country
            .as_deref()
            .is_some_and(|c| c.len() != 2 || !c.chars().all(|ch| ch.is_ascii_alphabetic()))
    }

    pub fn matches(&self, candidate: &Candidate) -> bool {
        let eq = |a: &str, b: &str| a.trim().to_lowercase() == b.to_lowercase();

        let country_ok = self.country.as_deref().is_none_or(|want| {
            eq(&candidate.country, want)
                || candidate.country_code.as_deref().is_some_and(|code| eq(code, want))
        });
        let region_ok = self
            .region
            .as_deref()
            .is_none_or(|want| candidate.region.as_deref().is_some_and(|r| eq(r, want)));

        country_ok && region_ok
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Exactly one match; no user interaction needed.
    Single(Candidate),
    /// Two or more matches in upstream order, for the user to choose from.
    Ambiguous(Vec<Candidate>),
}

#[derive(Debug)]
pub struct Resolver {
    geocoder: Box<dyn Geocoder>,
    filter: Option<RegionFilter>,
    limit: u8,
}

impl Resolver {
    pub fn new(geocoder: Box<dyn Geocoder>) -> Self {
        Self {
            geocoder,
            filter: None,
            limit: DEFAULT_GEOCODING_LIMIT,
        }
    }

    pub fn with_filter(mut self, filter: Option<RegionFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_limit(mut self, limit: u8) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub async fn resolve(&self, query: &Query) -> Result<Resolution, SearchError> {
        let found = match self.geocoder.search(query.as_str(), self.limit).await {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(query = %query, error = %format!("{err:#}"), "geocoding failed");
                return Err(SearchError::ResolutionUnavailable);
            }
        };

        if found.is_empty() {
            tracing::info!(query = %query, "no geocoding matches");
            return Err(SearchError::NotFound);
        }

        let upstream = found.len();
        let mut remaining = match &self.filter {
            Some(filter) => found.into_iter().filter(|c| filter.matches(c)).collect(),
            None => found,
        };

        tracing::debug!(query = %query, upstream, kept = remaining.len(), "geocoding matches");

        match remaining.len() {
            0 => Err(SearchError::NoMatchingRegion),
            1 => Ok(Resolution::Single(remaining.remove(0))),
            _ => Ok(Resolution::Ambiguous(remaining)),
        }
    }
}
