//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Geocoding and weather provider abstractions with HTTP backends
//! - The search workflow: resolve a city name, disambiguate, fetch conditions
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod geocode;
mod http;
pub mod model;
pub mod provider;
pub mod resolver;
pub mod workflow;

pub use config::{Config, FilterConfig, GeocodingConfig, ProviderConfig};
pub use error::{SearchError, SelectionError};
pub use fetcher::WeatherFetcher;
pub use geocode::{Geocoder, GeocoderId};
pub use model::{Candidate, Conditions, Coordinates, Query, WeatherReading};
pub use provider::{ProviderId, WeatherProvider};
pub use resolver::{RegionFilter, Resolution, Resolver};
pub use workflow::{SearchState, StateObserver, Workflow};
