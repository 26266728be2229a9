use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor::Show,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod addresses;
mod app;
mod cli;
mod config;
mod metrics;
mod report;
mod severity;
mod units;
mod weather;
mod weatherapi;

use crate::addresses::{AddressBook, SaveOutcome};
use crate::app::{run_app, App};
use crate::cli::{AddressAction, Args, Command, ShowArgs};
use crate::config::Config;
use crate::severity::rain_report;
use crate::weather::{nearby_storms, Observation};
use crate::weatherapi::{geocode::Place, WeatherApi};

enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    Discard,
}

fn init_tracing(target: LogTarget) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "wx_typhoon=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match target {
        LogTarget::Stderr => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init()
        }
        LogTarget::Discard => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::sink))
            .init(),
    }
    Ok(())
}

/// Location given on the command line, else the last one used, else the
/// configured default.
fn resolve_location(explicit: Option<String>, book: &AddressBook, config: &Config) -> Result<String> {
    if let Some(location) = explicit.filter(|l| !l.trim().is_empty()) {
        return Ok(location);
    }
    if let Some(location) = book.last_used()? {
        return Ok(location);
    }
    config
        .address
        .clone()
        .context("No location given and none saved; pass one, e.g. `wx-typhoon show \"Asia/Manila\"`")
}

/// Geocodes a location and records it in the address log.
fn locate(api: &WeatherApi, book: &AddressBook, location: &str) -> Result<Place> {
    let place = api.geocode(location)?;
    match book.save(&place.address)? {
        SaveOutcome::Saved | SaveOutcome::Duplicate => {}
        SaveOutcome::Empty => tracing::warn!("Geocoder returned an empty address for '{}'", location),
    }
    Ok(place)
}

fn fetch_observation(api: &WeatherApi, place: &Place) -> Result<Observation> {
    let forecast = api
        .forecast(place.latitude, place.longitude)
        .context("Unable to fetch weather data")?;
    Ok(Observation::from_forecast(forecast))
}

/// Calls the wrapped function when dropped.
struct OnDrop<F: FnMut()>(F);

impl<F: FnMut()> Drop for OnDrop<F> {
    fn drop(&mut self) {
        (self.0)()
    }
}

fn restore_terminal() {
    if let Err(err) = disable_raw_mode() {
        tracing::warn!("Failed to leave raw mode: {}", err);
    }
    if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, Show) {
        tracing::warn!("Failed to restore terminal: {}", err);
    }
}

fn run_dashboard(api: &WeatherApi, place: &Place, config: &Config, opts: &ShowArgs) -> Result<()> {
    let region = opts.region.unwrap_or(config.region);
    let mut app = App::new(
        &place.address,
        region,
        config.radii_km.clone(),
        Duration::from_secs(config.refresh_secs),
    );

    // setup terminal
    enable_raw_mode()?;
    let _restore = OnDrop(restore_terminal);
    execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    run_app(&mut terminal, &mut app, || fetch_observation(api, place)).context("dashboard failed")
}

fn show(config: &Config, book: &AddressBook, opts: ShowArgs) -> Result<()> {
    config.require_keys()?;
    let api = WeatherApi::new(config)?;
    let location = resolve_location(opts.location.clone(), book, config)?;
    let place = locate(&api, book, &location)?;

    if opts.print {
        let region = opts.region.unwrap_or(config.region);
        let observation = fetch_observation(&api, &place)?;
        print!("{}", report::render(&place.address, &observation, region));
        Ok(())
    } else {
        run_dashboard(&api, &place, config, &opts)
    }
}

fn storms(config: &Config, book: &AddressBook, location: Option<String>, radii_km: Vec<f64>) -> Result<()> {
    config.require_keys()?;
    let api = WeatherApi::new(config)?;
    let location = resolve_location(location, book, config)?;
    let place = locate(&api, book, &location)?;
    let observation = fetch_observation(&api, &place)?;

    let radii = if radii_km.is_empty() {
        config.radii_km.clone()
    } else {
        radii_km
    };

    println!("{}", place.address);
    println!(
        "{}",
        rain_report(observation.precip_mm, observation.wind_kph, observation.forecast_pair())
    );
    for radius in radii {
        let found = nearby_storms(place.latitude, place.longitude, &observation.alerts, radius);
        println!();
        for line in report::storm_lines(&found, radius) {
            println!("{line}");
        }
    }
    Ok(())
}

fn addresses(book: &AddressBook, action: AddressAction) -> Result<()> {
    match action {
        AddressAction::List => {
            for address in book.load()? {
                println!("{address}");
            }
        }
        AddressAction::Delete { address } => {
            if !book.delete(&address)? {
                anyhow::bail!("Address '{address}' not found");
            }
            println!("Address '{}' deleted", address.trim().to_uppercase());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let command = args.command.unwrap_or_default();
    let config = Config::load(&args.config)?;

    let target = match (&command, &config.log_file) {
        (Command::Show(ShowArgs { print: false, .. }), Some(path)) => LogTarget::File(path.as_path()),
        (Command::Show(ShowArgs { print: false, .. }), None) => LogTarget::Discard,
        _ => LogTarget::Stderr,
    };
    init_tracing(target)?;
    tracing::debug!("Loaded config from {}", args.config.display());

    let book = AddressBook::new(&config.address_log, &config.temp_log);
    match command {
        Command::Show(opts) => show(&config, &book, opts),
        Command::Storms { location, radii_km } => storms(&config, &book, location, radii_km),
        Command::Addresses { action } => addresses(&book, action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_restore_runs_when_setup_fails() {
        let restored = Cell::new(false);
        let setup = |fail: bool| -> io::Result<()> {
            let _restore = OnDrop(|| restored.set(true));
            if fail {
                return Err(io::Error::other("not a terminal"));
            }
            Ok(())
        };

        assert!(setup(true).is_err());
        assert!(restored.get());

        restored.set(false);
        assert!(setup(false).is_ok());
        assert!(restored.get());
    }
}
