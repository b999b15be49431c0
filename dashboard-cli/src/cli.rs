use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use dashboard_core::{Config, Dashboard, LookupError, View, source_from_config};
use inquire::{InquireError, Password, Select, Text};

use crate::render;

const DEFAULT_CITY: &str = "São Paulo";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Real-time weather dashboard")]
pub struct Cli {
    /// Runs an interactive session when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key, time zone and description language.
    Configure,

    /// Look a city up once and print a single view.
    Show {
        /// City name, passed to the API as typed.
        city: String,

        #[arg(long, value_enum, default_value_t = ViewArg::Current)]
        view: ViewArg,
    },

    /// Prompt for cities and views until cancelled (Esc or Ctrl-C).
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewArg {
    Current,
    Forecast,
    Chart,
    History,
}

impl From<ViewArg> for View {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::Current => View::Current,
            ViewArg::Forecast => View::Forecast,
            ViewArg::Chart => View::Chart,
            ViewArg::History => View::History,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => configure(),
            Command::Show { city, view } => {
                let mut dashboard = open_dashboard()?;
                submit(&mut dashboard, &city, view.into()).await?;
                Ok(())
            }
            Command::Interactive => {
                let mut dashboard = open_dashboard()?;
                session(&mut dashboard).await
            }
        }
    }
}

/// Fails when the API key or time zone is unusable; nothing renders without them.
fn open_dashboard() -> anyhow::Result<Dashboard> {
    let config = Config::from_env_and_file().context("Failed to load configuration")?;
    let timezone = config.timezone()?;
    let source = source_from_config(&config)?;
    tracing::debug!(%timezone, lang = config.lang(), "configuration loaded");

    Ok(Dashboard::new(source, timezone))
}

async fn submit(dashboard: &mut Dashboard, city: &str, view: View) -> Result<(), LookupError> {
    let panel = dashboard.submit(city, view).await?;
    println!("{}", render::panel(&panel, dashboard.timezone()));
    Ok(())
}

async fn session(dashboard: &mut Dashboard) -> anyhow::Result<()> {
    println!("🌦️  Real-time weather dashboard\n");

    let mut city = DEFAULT_CITY.to_string();

    loop {
        let Some(input) = cancellable(Text::new("City name:").with_default(&city).prompt())? else {
            break;
        };
        let Some(view) = cancellable(Select::new("View:", View::all().to_vec()).prompt())? else {
            break;
        };

        match submit(dashboard, &input, view).await {
            Ok(()) => {}
            Err(err @ LookupError::EmptyCity) => println!("ℹ️  {err}"),
            Err(err) => eprintln!("❌ {err}"),
        }
        if !input.trim().is_empty() {
            city = input;
        }
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.api_key = Some(api_key.trim().to_string());
    }

    // Suggest the machine's zone so days split where the user expects.
    let current_tz = config
        .timezone
        .clone()
        .or_else(dashboard_core::config::system_timezone)
        .unwrap_or_else(|| "UTC".to_string());
    let timezone = Text::new("Time zone (IANA name):").with_default(&current_tz).prompt()?;
    config.timezone = Some(timezone.trim().to_string());
    config.timezone()?;

    let lang = Text::new("Description language:").with_default(config.lang()).prompt()?;
    config.lang = Some(lang.trim().to_string());

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

/// Maps Esc / Ctrl-C to `None` so the session loop can end cleanly.
fn cancellable<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
