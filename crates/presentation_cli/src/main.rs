//! IETT feeds CLI
//!
//! Runs configured feed entries against an iett-middle backend and offers
//! one-shot commands for inspecting the backend.

#![allow(clippy::print_stdout)]

mod run;
mod setup_flow;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use application::{
    ConfigEntry, EntryData, EntryRegistry, IntegrationSetup, MiddleApiConnector, MiddleApiPort,
};
use clap::{Parser, Subcommand};
use domain::{RouteCode, StopCode};
use infrastructure::{AppConfig, IettMiddleConnector, init_telemetry};

/// IETT feeds CLI
#[derive(Parser)]
#[command(name = "iett-cli")]
#[command(author, version, about = "Istanbul bus feeds from an iett-middle backend", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: ./config.toml if present)
    #[arg(short, long, global = true, env = "IETT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Feed selection shared by `state` and `add-entry`
#[derive(clap::Args, Debug, Clone)]
struct FeedArgs {
    /// Backend URL (default: middle.base_url from the configuration)
    #[arg(short, long)]
    url: Option<String>,

    /// Feed type: all_fleet, route_fleet, stop_arrivals, route_schedule, route_announcements
    #[arg(short, long)]
    feed: String,

    /// Route code, e.g. 500T
    #[arg(long)]
    route: Option<String>,

    /// Stop code, e.g. 220602
    #[arg(long)]
    stop: Option<String>,

    /// Only arrivals passing this stop
    #[arg(long)]
    via: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up every configured entry and keep refreshing until Ctrl-C
    Run,

    /// Refresh one feed once and print its sensor state as JSON
    State(FeedArgs),

    /// Check that the backend answers /health
    Health {
        /// Backend URL (default: middle.base_url from the configuration)
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Run the setup flow and print the resulting [[entries]] block
    ///
    /// Example: iett-cli add-entry --feed route_fleet --route 500T >> config.toml
    AddEntry(FeedArgs),

    /// Query supplementary backend endpoints
    Lookup {
        /// Backend URL (default: middle.base_url from the configuration)
        #[arg(short, long)]
        url: Option<String>,

        #[command(subcommand)]
        query: LookupQuery,
    },
}

#[derive(Subcommand, Debug)]
enum LookupQuery {
    /// Ordered stops of a route
    RouteStops {
        /// Route code
        route: String,
    },
    /// Details of one stop
    Stop {
        /// Stop code
        code: String,
    },
    /// Stops around a coordinate
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Depots of the operator
    Garages,
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Entry data for a feed selection, falling back to `default_url`
fn entry_data(args: &FeedArgs, default_url: &str) -> EntryData {
    EntryData {
        middle_url: args.url.clone().unwrap_or_else(|| default_url.to_string()),
        feed_type: args.feed.clone(),
        hat_kodu: args.route.clone(),
        dcode: args.stop.clone(),
        via: args.via.clone(),
    }
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    config.validate().map_err(anyhow::Error::msg)?;

    // -v flags override the configured filter
    let telemetry = match log_filter_from_verbosity(cli.verbose) {
        Some(filter) => config.telemetry.clone().with_filter(filter),
        None => config.telemetry.clone(),
    };
    init_telemetry(&telemetry)?;

    let connector = Arc::new(IettMiddleConnector::new(config.middle.clone())?);
    let default_url = config.middle.base_url.clone();

    match cli.command {
        Commands::Run => run::run(&config).await?,

        Commands::State(args) => {
            let entry = ConfigEntry::from_data(entry_data(&args, &default_url))?;
            let registry = EntryRegistry::new();
            IntegrationSetup::new(connector)
                .setup_entry(&registry, &entry)
                .await?;

            let states: Vec<_> = registry
                .sensors(&entry.entry_id)
                .iter()
                .map(|sensor| sensor.state())
                .collect();
            match states.as_slice() {
                [state] => print_json(state)?,
                _ => print_json(&states)?,
            }
        },

        Commands::Health { url } => {
            let url = url.unwrap_or(default_url);
            let api = connector.connect(&url)?;
            if api.is_healthy().await {
                println!("✅ {url} is healthy");
            } else {
                println!("❌ {url} is not reachable");
                std::process::exit(1);
            }
        },

        Commands::AddEntry(args) => {
            let configured = config
                .config_entries()?
                .into_iter()
                .filter_map(|entry| entry.unique_id);
            let entry =
                setup_flow::create_entry(connector, configured, &args, &default_url).await?;
            print!("{}", infrastructure::EntryConfig::from(&entry).to_toml()?);
        },

        Commands::Lookup { url, query } => {
            let api = connector.connect(&url.unwrap_or(default_url))?;
            match query {
                LookupQuery::RouteStops { route } => {
                    print_json(&api.route_stops(&RouteCode::new(route)?).await?)?;
                },
                LookupQuery::Stop { code } => {
                    print_json(&api.stop_detail(&StopCode::new(code)?).await?)?;
                },
                LookupQuery::Nearby { lat, lon } => {
                    print_json(&api.nearby_stops(lat, lon).await?)?;
                },
                LookupQuery::Garages => print_json(&api.garages().await?)?,
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_verbosity_zero_uses_config() {
        assert_eq!(log_filter_from_verbosity(0), None);
    }

    #[test]
    fn log_filter_verbosity_one() {
        assert_eq!(log_filter_from_verbosity(1), Some("info"));
    }

    #[test]
    fn log_filter_verbosity_two() {
        assert_eq!(log_filter_from_verbosity(2), Some("debug"));
    }

    #[test]
    fn log_filter_verbosity_three_or_more() {
        assert_eq!(log_filter_from_verbosity(3), Some("trace"));
        assert_eq!(log_filter_from_verbosity(10), Some("trace"));
    }

    #[test]
    fn entry_data_falls_back_to_default_url() {
        let args = FeedArgs {
            url: None,
            feed: "route_fleet".to_string(),
            route: Some("500T".to_string()),
            stop: None,
            via: None,
        };
        let data = entry_data(&args, "http://iett-middle.lan:8000");
        assert_eq!(data.middle_url, "http://iett-middle.lan:8000");
        assert_eq!(data.hat_kodu.as_deref(), Some("500T"));
        assert!(data.dcode.is_none());
    }

    #[test]
    fn entry_data_prefers_explicit_url() {
        let args = FeedArgs {
            url: Some("http://other".to_string()),
            feed: "stop_arrivals".to_string(),
            route: None,
            stop: Some("220602".to_string()),
            via: Some("113333".to_string()),
        };
        let data = entry_data(&args, "http://unused");
        assert_eq!(data.middle_url, "http://other");
        assert_eq!(data.via.as_deref(), Some("113333"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn lookup_nearby_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "iett-cli", "lookup", "nearby", "--lat", "41.01", "--lon", "-29.05",
        ])
        .unwrap();
        match cli.command {
            Commands::Lookup {
                query: LookupQuery::Nearby { lat, lon },
                ..
            } => {
                assert!((lat - 41.01).abs() < f64::EPSILON);
                assert!((lon + 29.05).abs() < f64::EPSILON);
            },
            _ => unreachable!("expected lookup nearby"),
        }
    }
}
