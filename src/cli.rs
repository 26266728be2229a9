use std::path::PathBuf;

use clap::builder::{styling::AnsiColor, Styles};
use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::config::check_radius;
use crate::severity::Region;

const ABOUT: &str = "Weather and typhoon watch TUI";

const LONG_ABOUT: &str = "
TUI for watching current weather, heat stress, wind chill and typhoon-level rain for a location.

The location may be a street address, a city or a time zone name (e.g. Asia/Manila); it is
geocoded with OpenCage and the weather comes from WeatherAPI.com. API keys are read from
config.json or the WEATHERAPI_KEY and OPENCAGE_KEY environment variables.

Every location that resolves is saved, so subsequent runs use the last location unless another
is given.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(short, long, default_value = "config.json", help = "Path to the JSON config file")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show current conditions (dashboard unless --print)
    Show(ShowArgs),

    /// List storm alerts near a location
    Storms {
        #[arg(help = "Address, city or time zone name")]
        location: Option<String>,

        #[arg(
            long = "radius",
            value_name = "KM",
            value_parser = parse_radius,
            allow_negative_numbers = true,
            help = "Search radius; repeat for several"
        )]
        radii_km: Vec<f64>,
    },

    /// Manage saved addresses
    Addresses {
        #[command(subcommand)]
        action: AddressAction,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Show(ShowArgs::default())
    }
}

fn parse_radius(value: &str) -> Result<f64, String> {
    let radius: f64 = value.parse().map_err(|_| format!("'{value}' is not a number"))?;
    check_radius(radius)
}

#[derive(ClapArgs, Debug, Default)]
pub struct ShowArgs {
    #[arg(help = "Address, city or time zone name")]
    pub location: Option<String>,

    #[arg(short, long, help = "Climate region (default, tropical, arctic, coastal, desert, mountain, temperate)")]
    pub region: Option<Region>,

    #[arg(short, long, help = "Print a one-shot report instead of the dashboard")]
    pub print: bool,
}

#[derive(Subcommand, Debug)]
pub enum AddressAction {
    /// List saved addresses, newest first
    List,

    /// Remove a saved address
    Delete { address: String },
}
