//! Route map CLI.
//!
//! Loads a TOML route configuration and exercises it from the command line:
//! validating patterns, resolving paths, generating paths and dispatching.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::json;

use routemap::config::{load_config, RouteMapConfig};
use routemap::observability::{logging, metrics};
use routemap::{Params, RouteMap};

#[derive(Parser)]
#[command(name = "routemap")]
#[command(about = "Inspect and exercise a route map configuration", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "routemap.toml")]
    config: PathBuf,

    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and print the compiled rules
    Check,
    /// Print every rule matching a path, longest hash first
    Resolve { path: String },
    /// Build a path from a route pattern and parameters
    Hash {
        #[arg(short, long)]
        route: String,

        /// Parameter as key=value (repeatable)
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Navigate to a fragment and dispatch it to the configured methods
    Dispatch {
        fragment: String,

        /// Print Prometheus metrics after dispatching
        #[arg(long)]
        metrics: bool,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got {raw}"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            let config = setup(&cli.config, cli.log_level)?;
            check(&config)?;
        }
        Commands::Resolve { path } => {
            let config = setup(&cli.config, cli.log_level)?;
            let map = load_map(&config, false)?;
            println!("{}", serde_json::to_string_pretty(&map.matches(&path)?)?);
        }
        Commands::Hash { route, params } => {
            logging::init(cli.log_level.as_deref().unwrap_or("info"));
            let params: Params = params.into_iter().collect();
            println!("{}", RouteMap::new().hash(&route, &params)?);
        }
        Commands::Dispatch { fragment, metrics: print_metrics } => {
            let config = setup(&cli.config, cli.log_level)?;
            let handle = if print_metrics || config.observability.metrics_enabled {
                Some(metrics::init_metrics()?)
            } else {
                None
            };

            let mut map = load_map(&config, true)?;
            map.go(&fragment);
            map.handler(&())?;

            if let Some(handle) = handle {
                print!("{}", handle.render());
            }
        }
    }

    Ok(())
}

/// Load the configuration and start logging, preferring the CLI log level.
fn setup(path: &Path, log_level: Option<String>) -> Result<RouteMapConfig, Box<dyn std::error::Error>> {
    let config = load_config(path)?;
    let level = log_level.unwrap_or_else(|| config.observability.log_level.clone());
    logging::init(&level);

    tracing::info!(
        path = ?path,
        rules = config.rules.len(),
        prefix = %config.prefix,
        "Configuration loaded"
    );
    Ok(config)
}

fn check(config: &RouteMapConfig) -> Result<(), Box<dyn std::error::Error>> {
    let map = RouteMap::new();
    let mut compiled = Vec::new();
    for rule in &config.rules {
        let route = map.compile(&rule.route)?;
        compiled.push(json!({
            "route": rule.route,
            "method": rule.method,
            "page": route.page,
            "rules": route.rules,
        }));
    }
    println!("{}", serde_json::to_string_pretty(&compiled)?);
    Ok(())
}

/// Build a route map with one handler per configured method. Printing
/// handlers write each dispatched method and its arguments to stdout.
fn load_map(config: &RouteMapConfig, printing: bool) -> Result<RouteMap, Box<dyn std::error::Error>> {
    let mut map = RouteMap::from_config(config)?;
    for rule in &config.rules {
        let method = rule.method.clone();
        map.register_handler(rule.method.clone(), move |args, _| {
            if printing {
                println!("{} {}", method, json!(args));
            }
        });
    }
    map.set_default_handler(|path, _| println!("no route matched {path}"));
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_command_needs_no_config() {
        let cli = Cli::try_parse_from([
            "routemap", "--config", "missing.toml", "hash", "--route", "/a/:id", "-p", "id=5",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("missing.toml"));
        match cli.command {
            Commands::Hash { route, params } => {
                assert_eq!(route, "/a/:id");
                assert_eq!(params, vec![("id".to_string(), "5".to_string())]);
            }
            _ => panic!("expected the hash command"),
        }
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("q=a=b").unwrap(), ("q".into(), "a=b".into()));
        assert!(parse_param("novalue").is_err());
    }
}
