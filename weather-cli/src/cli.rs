use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, InquireError, Password, Select, Text};
use weather_core::{Config, GeocoderId, ProviderId, SearchState, Workflow};

use crate::render::{ProgressRenderer, candidate_option, print_state};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather by city name")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name: "openmeteo", "openweather" or "weatherapi".
        provider: String,
    },

    /// Show current weather for a city.
    Show {
        /// City or place name.
        city: String,

        #[command(flatten)]
        options: SearchOptions,
    },

    /// Look up cities one after another until cancelled (Esc / Ctrl-C).
    Interactive {
        #[command(flatten)]
        options: SearchOptions,
    },
}

/// Per-invocation overrides of the stored configuration.
#[derive(Debug, Clone, Default, Args)]
pub struct SearchOptions {
    /// Weather provider to use instead of the configured default.
    #[arg(long)]
    pub provider: Option<String>,

    /// Geocoder to use instead of the configured default.
    #[arg(long)]
    pub geocoder: Option<String>,

    /// Only accept matches in this country (name or ISO code).
    #[arg(long)]
    pub country: Option<String>,

    /// Only accept matches in this region / state.
    #[arg(long)]
    pub region: Option<String>,

    /// Maximum number of geocoding matches to consider.
    #[arg(long)]
    pub limit: Option<u8>,
}

impl SearchOptions {
    fn apply(&self, config: &mut Config) -> anyhow::Result<()> {
        if let Some(p) = &self.provider {
            config.set_default_provider(ProviderId::try_from(p.as_str())?);
        }
        if let Some(g) = &self.geocoder {
            config.set_default_geocoder(GeocoderId::try_from(g.as_str())?);
        }
        if self.country.is_some() {
            config.filter.country = self.country.clone();
        }
        if self.region.is_some() {
            config.filter.region = self.region.clone();
        }
        if self.limit.is_some() {
            config.geocoding.limit = self.limit;
        }
        Ok(())
    }

    fn workflow(&self) -> anyhow::Result<Workflow> {
        let mut config = Config::load()?;
        self.apply(&mut config)?;

        let (provider, geocoder) = (config.default_provider_id()?, config.default_geocoder_id()?);
        tracing::debug!(
            %provider,
            %geocoder,
            limit = config.geocoding_limit(),
            "building search workflow"
        );

        Ok(Workflow::from_config(&config)?.with_observer(Arc::new(ProgressRenderer)))
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Show { city, options } => {
                let workflow = options.workflow()?;
                let state = workflow.submit(&city).await;
                let state = settle(&workflow, state).await?;

                // anyhow prints the failure message on exit.
                if let SearchState::Failed(err) = state {
                    return Err(err.into());
                }
                print_state(&state);
                Ok(())
            }
            Command::Interactive { options } => {
                let workflow = options.workflow()?;

                loop {
                    let input = match Text::new("City:").prompt() {
                        Ok(input) => input,
                        Err(
                            InquireError::OperationCanceled | InquireError::OperationInterrupted,
                        ) => break,
                        Err(err) => return Err(err).context("Failed to read city name"),
                    };

                    let state = workflow.submit(&input).await;
                    let state = settle(&workflow, state).await?;
                    print_state(&state);
                }

                Ok(())
            }
        }
    }
}

/// Ask the user to pick when the search stopped at several candidates.
async fn settle(workflow: &Workflow, state: SearchState) -> anyhow::Result<SearchState> {
    let SearchState::AwaitingSelection { candidates } = &state else {
        return Ok(state);
    };

    let options: Vec<String> = candidates.iter().map(candidate_option).collect();
    let picked = match Select::new("Several places match. Which one?", options).raw_prompt() {
        Ok(picked) => picked,
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            return Ok(state);
        }
        Err(err) => return Err(err).context("Failed to read location choice"),
    };

    Ok(workflow.select(picked.index).await?)
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    if id.requires_api_key() && wants_new_api_key(&config, id)? {
        let api_key = Password::new(&format!("API key for {id}:"))
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?;
        let api_key = api_key.trim().to_string();
        if api_key.is_empty() {
            anyhow::bail!("API key must not be empty");
        }
        store_api_key(&mut config, id, api_key);
    }

    let base_url = Text::new("Custom base URL (leave empty for the public endpoint):")
        .prompt()
        .context("Failed to read base URL")?;
    let base_url = Some(base_url.trim().to_string()).filter(|s| !s.is_empty());
    config.set_provider_base_url(id, base_url);

    if !is_default(&config, id)
        && Confirm::new(&format!("Use {id} by default?"))
            .with_default(true)
            .prompt()
            .context("Failed to read confirmation")?
    {
        config.set_default_provider(id);
    }

    config.save()?;
    println!("Saved {id} settings to {}", Config::config_file_path()?.display());

    Ok(())
}

/// A stored key is only replaced when the user says so.
fn wants_new_api_key(config: &Config, id: ProviderId) -> anyhow::Result<bool> {
    if !config.is_provider_configured(id) {
        return Ok(true);
    }

    Confirm::new(&format!("Replace the stored API key for {id}?"))
        .with_default(false)
        .prompt()
        .context("Failed to read confirmation")
}

/// Stores the key without touching the default provider; `configure` asks about that separately.
fn store_api_key(config: &mut Config, id: ProviderId, api_key: String) {
    let previous = config.default_provider.take();
    config.upsert_provider_api_key(id, api_key);
    config.default_provider = previous;
}

fn is_default(config: &Config, id: ProviderId) -> bool {
    config.default_provider_id().ok() == Some(id)
}
