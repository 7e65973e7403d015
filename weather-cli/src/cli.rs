use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};
use std::sync::Arc;
use weathertap_core::{
    Config, Controller, Event, Geolocator, LocationQuery, Phase, TemperatureUnit, Theme,
    ViewState,
    geolocation::{self, FixedGeolocator, parse_coordinates},
    provider,
    render::{share_text, share_url},
    session::{self, SessionHandle, SessionOptions},
};

use crate::{interactive, terminal::TerminalTheme};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weathertap", version, about = "Current weather and a 3-day forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com key and display preferences.
    Configure,

    /// Show weather for a city, postal code or "lat,lon".
    Show {
        query: String,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Show weather for the current location.
    Locate {
        /// Use these coordinates ("lat,lon") instead of looking them up.
        #[arg(long)]
        coords: Option<String>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Print a shareable message and WhatsApp link for a location.
    Share {
        query: String,

        #[arg(long)]
        unit: Option<TemperatureUnit>,
    },

    /// Prompt-driven session (the default).
    Interactive,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ViewArgs {
    /// Temperature unit: c or f.
    #[arg(long)]
    unit: Option<TemperatureUnit>,

    /// Include sunrise, sunset, feels-like and wind direction.
    #[arg(long)]
    advanced: bool,

    /// Use the light colour theme.
    #[arg(long)]
    light: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => configure(),
            Command::Show { query, view } => {
                let config = load_config()?;
                let (state, term) = search(&config, &view, &query).await?;

                print_once(&term, &state)
            }
            Command::Locate { coords, view } => {
                let config = load_config()?;
                let geolocator: Arc<dyn Geolocator> = match coords {
                    Some(raw) => {
                        let parsed = parse_coordinates(&raw).ok_or_else(|| {
                            anyhow!("Invalid coordinates '{raw}', expected \"lat,lon\"")
                        })?;
                        Arc::new(FixedGeolocator::new(Some(parsed)))
                    }
                    None => geolocation::geolocator_from_config(&config)?,
                };
                let (handle, term) = start_session(&config, &view, geolocator)?;

                let state = interactive::locate(&handle).await?;

                print_once(&term, &state)
            }
            Command::Share { query, unit } => {
                let config = load_config()?;
                let view = ViewArgs {
                    unit,
                    ..ViewArgs::default()
                };
                let (state, _term) = search(&config, &view, &query).await?;

                let text = share_text(&state).ok_or_else(|| {
                    anyhow!(state.error.clone().unwrap_or_else(|| "No weather data".into()))
                })?;
                println!("{text}\n");
                println!("{}", share_url(&text));
                Ok(())
            }
            Command::Interactive => {
                let config = load_config()?;
                let geolocator = geolocation::geolocator_from_config(&config)?;
                let (handle, term) = start_session(&config, &ViewArgs::default(), geolocator)?;

                interactive::run(&handle, &term).await?;
                handle.shutdown().await;
                Ok(())
            }
        }
    }
}

fn load_config() -> anyhow::Result<Config> {
    Ok(Config::load()?.with_env_overrides())
}

/// Runs one fetch cycle for `raw`. Blank queries are rejected up front and
/// geolocation is never consulted.
async fn search(
    config: &Config,
    view: &ViewArgs,
    raw: &str,
) -> anyhow::Result<(ViewState, Arc<TerminalTheme>)> {
    let query = LocationQuery::new(raw)?;
    let geolocator = Arc::new(FixedGeolocator::unsupported());
    let (handle, term) = start_session(config, view, geolocator)?;

    handle
        .dispatch(Event::QueryChanged(query.as_str().to_string()))
        .await?;
    handle.dispatch(Event::Submit).await?;
    let state = handle.wait_idle().await?;
    handle.shutdown().await;

    Ok((state, term))
}

fn start_session(
    config: &Config,
    view: &ViewArgs,
    geolocator: Arc<dyn Geolocator>,
) -> anyhow::Result<(SessionHandle, Arc<TerminalTheme>)> {
    let fetcher = provider::fetcher_from_config(config)?;

    let theme = if view.light { Theme::Light } else { config.theme() };
    let unit = view.unit.unwrap_or_else(|| config.unit());

    let mut state = ViewState::new(theme, unit);
    state.show_advanced = view.advanced;

    let term = Arc::new(TerminalTheme::new(theme));
    let handle = session::start(
        Controller::new(state),
        fetcher,
        geolocator,
        term.clone(),
        SessionOptions::default(),
    );

    Ok((handle, term))
}

/// One-shot commands never show the location hint.
fn print_once(term: &TerminalTheme, state: &ViewState) -> anyhow::Result<()> {
    if state.phase() == Phase::Failed {
        return Err(anyhow!(state.error.clone().unwrap_or_default()));
    }

    let mut state = state.clone();
    state.show_location_hint = false;
    print!("{}", term.draw(&state));
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = Password::new("WeatherAPI.com API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if key.trim().is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }
    config.set_api_key(key);

    let unit = Select::new(
        "Default temperature unit:",
        vec![TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit],
    )
    .prompt()
    .context("Failed to read temperature unit")?;
    config.default_unit = Some(unit);

    let theme = Select::new("Colour theme:", vec!["dark", "light"])
        .prompt()
        .context("Failed to read theme")?;
    config.theme = Some(if theme == "light" { Theme::Light } else { Theme::Dark });

    config.save()?;
    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}
