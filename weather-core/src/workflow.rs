//! Search orchestration: one live [`SearchState`], replaced on every
//! transition, with a generation counter so that a superseded search can
//! never overwrite the state of a newer one.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::{
    Config,
    error::{SearchError, SelectionError},
    fetcher::WeatherFetcher,
    geocode::default_geocoder_from_config,
    model::{Candidate, Query, WeatherReading},
    provider::default_provider_from_config,
    resolver::{Resolution, Resolver},
};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Searching { query: Query },
    AwaitingSelection { candidates: Vec<Candidate> },
    Fetching { candidate: Candidate },
    Ready(WeatherReading),
    Failed(SearchError),
}

impl SearchState {
    /// A network call is outstanding; input should be disabled.
    pub fn is_busy(&self) -> bool {
        matches!(self, SearchState::Searching { .. } | SearchState::Fetching { .. })
    }

    pub fn reading(&self) -> Option<&WeatherReading> {
        match self {
            SearchState::Ready(reading) => Some(reading),
            _ => None,
        }
    }

    pub fn candidates(&self) -> Option<&[Candidate]> {
        match self {
            SearchState::AwaitingSelection { candidates } => Some(candidates),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<SearchError> {
        match self {
            SearchState::Failed(err) => Some(*err),
            _ => None,
        }
    }
}

/// Receives every state the workflow applies, in order.
///
/// Called while the workflow's state lock is held: implementations must not
/// call back into the [`Workflow`].
pub trait StateObserver: Send + Sync {
    fn on_transition(&self, generation: u64, state: &SearchState);
}

#[derive(Debug, Default)]
struct Inner {
    generation: u64,
    state: SearchState,
}

pub struct Workflow {
    resolver: Resolver,
    fetcher: WeatherFetcher,
    inner: Mutex<Inner>,
    observer: Option<Arc<dyn StateObserver>>,
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("resolver", &self.resolver)
            .field("fetcher", &self.fetcher)
            .field("inner", &*self.inner.lock())
            .finish_non_exhaustive()
    }
}

impl Workflow {
    pub fn new(resolver: Resolver, fetcher: WeatherFetcher) -> Self {
        Self {
            resolver,
            fetcher,
            inner: Mutex::new(Inner::default()),
            observer: None,
        }
    }

    /// Build from the configured default geocoder, provider, filter and limit.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let filter = config.region_filter();
        let geocoder = config.default_geocoder_id()?;
        if !geocoder.reports_country_names() && filter.as_ref().is_some_and(|f| f.names_country()) {
            tracing::warn!(
                %geocoder,
                country = config.filter.country.as_deref().unwrap_or_default(),
                "geocoder only reports ISO country codes; a country name will match nothing"
            );
        }

        let resolver = Resolver::new(default_geocoder_from_config(config)?)
            .with_filter(filter)
            .with_limit(config.geocoding_limit());
        let fetcher = WeatherFetcher::new(default_provider_from_config(config)?);

        Ok(Self::new(resolver, fetcher))
    }

    pub fn with_observer(mut self, observer: Arc<dyn StateObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn state(&self) -> SearchState {
        self.inner.lock().state.clone()
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Start a new search, superseding any search still in flight.
    ///
    /// Returns the live state once this search has settled. If a newer search
    /// started meanwhile, that search's state is returned instead and this
    /// search's results are dropped.
    pub async fn submit(&self, input: &str) -> SearchState {
        let query = match Query::parse(input) {
            Ok(query) => query,
            Err(err) => {
                self.begin(SearchState::Failed(err));
                return self.state();
            }
        };

        let generation = self.begin(SearchState::Searching {
            query: query.clone(),
        });

        match self.resolver.resolve(&query).await {
            Ok(Resolution::Single(candidate)) => {
                let fetching = SearchState::Fetching {
                    candidate: candidate.clone(),
                };
                if self.apply(generation, fetching) {
                    self.fetch(generation, candidate).await;
                }
            }
            Ok(Resolution::Ambiguous(candidates)) => {
                self.apply(generation, SearchState::AwaitingSelection { candidates });
            }
            Err(err) => {
                self.apply(generation, SearchState::Failed(err));
            }
        }

        self.state()
    }

    /// Pick one of the pending candidates by index and fetch its weather.
    pub async fn select(&self, index: usize) -> Result<SearchState, SelectionError> {
        let (generation, candidate) = {
            let mut inner = self.inner.lock();

            let SearchState::AwaitingSelection { candidates } = &inner.state else {
                return Err(SelectionError::NotAwaitingSelection);
            };
            let candidate = candidates.get(index).cloned().ok_or(SelectionError::OutOfRange {
                index,
                len: candidates.len(),
            })?;

            inner.state = SearchState::Fetching {
                candidate: candidate.clone(),
            };
            self.notify(inner.generation, &inner.state);

            (inner.generation, candidate)
        };

        self.fetch(generation, candidate).await;
        Ok(self.state())
    }

    async fn fetch(&self, generation: u64, candidate: Candidate) {
        let next = match self.fetcher.fetch(&candidate).await {
            Ok(reading) => SearchState::Ready(reading),
            Err(err) => SearchState::Failed(err),
        };
        self.apply(generation, next);
    }

    /// Bump the generation and replace the state wholesale.
    fn begin(&self, state: SearchState) -> u64 {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.state = state;
        self.notify(inner.generation, &inner.state);
        inner.generation
    }

    /// Replace the state unless `generation` has been superseded.
    fn apply(&self, generation: u64, state: SearchState) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            tracing::debug!(
                stale = generation,
                current = inner.generation,
                "discarding result of superseded search"
            );
            return false;
        }

        inner.state = state;
        self.notify(generation, &inner.state);
        true
    }

    fn notify(&self, generation: u64, state: &SearchState) {
        if let Some(observer) = &self.observer {
            observer.on_transition(generation, state);
        }
    }
}
