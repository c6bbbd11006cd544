//! User-facing failures of a search.
//!
//! Every variant renders as one short message. Upstream detail (status codes,
//! parse errors) is logged where the failure happens and never carried here.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("Please enter a city name.")]
    EmptyQuery,

    #[error("City not found.")]
    NotFound,

    #[error("No matching city in the selected country or region.")]
    NoMatchingRegion,

    #[error("Could not look up that city right now. Please try again.")]
    ResolutionUnavailable,

    #[error("Failed to fetch weather data. Please try again.")]
    WeatherUnavailable,
}

/// Misuse of [`crate::Workflow::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("There are no candidates waiting for a selection.")]
    NotAwaitingSelection,

    #[error("Candidate {index} does not exist (only {len} to choose from).")]
    OutOfRange { index: usize, len: usize },
}
