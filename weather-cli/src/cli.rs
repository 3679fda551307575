use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Confirm, Select, Text};
use std::{process::ExitCode, sync::Arc};

use weather_core::{
    Config, Coordinates, FixedLocation, IpLocation, LocationProvider, ScreenController,
    ScreenError, ScreenSettings, TcpProbe, UnitSystem, provider::provider_from_config,
};

use crate::terminal::TerminalUi;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "localweather", version, about = "Current weather where you are")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the API key, units, region and location lookup.
    Configure,

    /// Show current weather for your location.
    Show {
        /// Latitude of a fixed location; requires --lon.
        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,

        /// Longitude of a fixed location; requires --lat.
        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,

        /// Unit system requested from the API: metric, imperial or standard.
        #[arg(long)]
        units: Option<UnitSystem>,

        /// Region code for the temperature suffix, e.g. "US".
        #[arg(long)]
        region: Option<String>,

        /// Print the display model as JSON.
        #[arg(long)]
        json: bool,

        /// Never prompt; undecided location consent counts as denied.
        #[arg(long)]
        no_input: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { lat, lon, units, region, json, no_input } => {
                let mut config = Config::load()?;
                if let Some(units) = units {
                    config.units = units;
                }
                if region.is_some() {
                    config.region = region;
                }

                let fixed = match (lat, lon) {
                    (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)?),
                    _ => config.location.fixed()?,
                };

                let mut ui = TerminalUi::new(json, no_input);
                let result = match fixed {
                    Some(coordinates) => {
                        let (result, _) =
                            show(FixedLocation::new(coordinates), &config, &mut ui).await?;
                        result
                    }
                    None => {
                        let location = IpLocation::new(
                            config.location.ip_lookup_url.as_str(),
                            config.location.ip_lookup,
                            config.location_consent,
                            config.request_timeout(),
                        )?;
                        let (result, location) = show(location, &config, &mut ui).await?;

                        if location.consent() != config.location_consent {
                            config.location_consent = location.consent();
                            let path = config.save()?;
                            tracing::debug!(path = %path.display(), "saved location consent");
                        }
                        result
                    }
                };

                match result {
                    Ok(()) => Ok(ExitCode::SUCCESS),
                    Err(err) => {
                        if !err.shown_as_notice() {
                            eprintln!("{}", err.user_message());
                        }
                        Ok(ExitCode::FAILURE)
                    }
                }
            }
        }
    }
}

/// Run one screen cycle; Ctrl-C cancels it. Returns the location provider for
/// the caller to persist any consent it collected.
async fn show<L: LocationProvider>(
    location: L,
    config: &Config,
    ui: &mut TerminalUi,
) -> anyhow::Result<(Result<(), ScreenError>, L)> {
    let api_key = config.resolved_api_key()?;
    let weather = Arc::new(provider_from_config(config)?);
    let probe = TcpProbe::for_url(&config.base_url, config.request_timeout())
        .context("Invalid base_url in config")?;

    let settings = ScreenSettings {
        units: config.units,
        api_key,
        locale_region: config.locale_region(),
        fix_timeout: config.fix_timeout(),
    };

    let mut screen = ScreenController::new(location, weather, Box::new(probe), settings, Local);

    let token = screen.cancel_token();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let result = screen.run_cycle(ui).await.map(|_| ());
    ctrl_c.abort();

    Ok((result, screen.into_location()))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Text::new("OpenWeather API key:")
        .with_initial_value(config.api_key.as_deref().unwrap_or_default())
        .prompt()?;
    if api_key.trim().is_empty() {
        anyhow::bail!("API key must not be empty");
    }
    config.set_api_key(api_key);

    let start = UnitSystem::all().iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Unit system:", UnitSystem::all().to_vec())
        .with_starting_cursor(start)
        .prompt()?;

    let region = Text::new("Region code for the temperature suffix (empty = from locale):")
        .with_initial_value(config.region.as_deref().unwrap_or_default())
        .prompt()?;
    config.region = Some(region.trim().to_ascii_uppercase()).filter(|r| !r.is_empty());

    config.location.ip_lookup = Confirm::new("Look up your location from your IP address?")
        .with_default(config.location.ip_lookup)
        .prompt()?;

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}
