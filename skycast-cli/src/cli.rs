use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, InquireError, Password, PasswordDisplayMode, Select, Text};
use skycast_core::{
    CachingFetcher, ConditionIcons, Config, Normalizer, ProviderId, UnitSystem, WeatherFetcher,
    WeatherRequest, WeatherService,
    provider::{default_fetcher_from_config, fetcher_from_config},
};

use crate::render::DashboardView;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials and default units for a provider.
    Configure {
        /// "openweather" or "weatherapi".
        provider: ProviderId,
    },

    /// Show the weather dashboard for a location.
    Show {
        /// City name, "lat,lon", postcode or anything the provider accepts.
        location: String,

        /// Provider to use instead of the configured default.
        #[arg(long)]
        provider: Option<ProviderId>,

        /// "metric" or "imperial"; defaults to the configured units.
        #[arg(long)]
        units: Option<UnitSystem>,

        /// Hour of day (0-23) the hourly window starts at; defaults to now.
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=23))]
        hour: Option<u32>,

        /// Print the normalized report as JSON.
        #[arg(long)]
        json: bool,

        /// Also list the next few hourly records across days.
        #[arg(long)]
        hourly: bool,
    },

    /// Prompt for locations in a loop; repeated lookups are served from cache.
    Interactive {
        /// Provider to use instead of the configured default.
        #[arg(long)]
        provider: Option<ProviderId>,
    },
}

impl Cli {
    pub async fn run(self, icons: Arc<ConditionIcons>) -> Result<()> {
        match self.command {
            Command::Configure { provider } => configure(provider),
            Command::Show { location, provider, units, hour, json, hourly } => {
                let config = Config::load()?;
                let fetcher = resolve_fetcher(&config, provider)?;
                let service = WeatherService::new(fetcher, Normalizer::new(icons));

                let mut request = WeatherRequest::new(location, units.unwrap_or(config.units()));
                if let Some(hour) = hour {
                    request = request.at_hour(hour);
                }

                let dashboard = service
                    .dashboard(&request)
                    .await
                    .with_context(|| format!("Could not get weather for '{}'", request.location))?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&dashboard)?);
                } else {
                    print!("{}", DashboardView::new(&dashboard).with_upcoming(hourly));
                }

                Ok(())
            }
            Command::Interactive { provider } => {
                let config = Config::load()?;
                let fetcher = resolve_fetcher(&config, provider)?;
                interactive(config, fetcher, icons).await
            }
        }
    }
}

fn resolve_fetcher(
    config: &Config,
    provider: Option<ProviderId>,
) -> Result<Box<dyn WeatherFetcher>> {
    tracing::debug!(?provider, default = ?config.default_provider, "Resolving weather provider");
    match provider {
        Some(id) => fetcher_from_config(id, config),
        None => default_fetcher_from_config(config),
    }
}

fn configure(id: ProviderId) -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new(&format!("{id} API key:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }

    let units = select_units("Default units:", config.units())?;

    let make_default = match config.default_provider_id() {
        Ok(current) if current != id => {
            Confirm::new(&format!("Make {id} the default provider (currently {current})?"))
                .with_default(false)
                .prompt()?
        }
        _ => false,
    };

    config.upsert_provider_api_key(id, api_key.to_string());
    config.units = Some(units);
    if make_default {
        config.set_default_provider(id);
    }

    let path = config.save()?;
    println!("Saved {id} configuration to {}", path.display());

    Ok(())
}

async fn interactive(
    config: Config,
    fetcher: Box<dyn WeatherFetcher>,
    icons: Arc<ConditionIcons>,
) -> Result<()> {
    let fetcher = CachingFetcher::new(fetcher, config.cache_ttl());
    let service = WeatherService::new(fetcher, Normalizer::new(icons));
    let mut units = config.units();

    loop {
        let input = match Text::new("Location:")
            .with_help_message("leave empty or press Esc to quit")
            .prompt()
        {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let location = input.trim();
        if location.is_empty() {
            break;
        }

        units = select_units("Units:", units)?;

        match service.dashboard(&WeatherRequest::new(location, units)).await {
            Ok(dashboard) => println!("{}", DashboardView::new(&dashboard)),
            Err(e) => eprintln!("Could not get weather for '{location}': {e}"),
        }
    }

    Ok(())
}

fn select_units(prompt: &str, current: UnitSystem) -> Result<UnitSystem> {
    let options = UnitSystem::all().to_vec();
    let cursor = options.iter().position(|u| *u == current).unwrap_or(0);

    Ok(Select::new(prompt, options).with_starting_cursor(cursor).prompt()?)
}
