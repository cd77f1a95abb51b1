mod feed;
mod fetch;
mod history;
mod hourly;
mod weather;
mod web;

use clap::{Parser, Subcommand};
use std::fs;
use std::process::ExitCode;
use std::sync::Arc;

use crate::hourly::{HourOffset, HourSource, ProxyClient};
use crate::web::Config;

#[derive(Parser)]
#[command(name = "balloon-o-mat")]
#[command(about = "Balloon telemetry proxy and history aggregator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Aggregate recent history once and print it as JSON
    History {
        #[arg(short, long)]
        config: Option<String>,
        #[arg(long)]
        max_hours_back: Option<u8>,
        /// Base URL of a running instance to read hours through
        #[arg(long)]
        proxy: Option<String>,
    },
    /// Fetch a single hourly snapshot and print it as JSON
    Hour {
        hour: String,
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Parse a saved feed body
    Parse { file: String },
    /// Print current weather at a point
    Weather {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(config.as_deref()).await,
        Commands::History {
            config,
            max_hours_back,
            proxy,
        } => history(config.as_deref(), max_hours_back, proxy).await,
        Commands::Hour { hour, config } => hour_snapshot(&hour, config.as_deref()).await,
        Commands::Parse { file } => parse(&file),
        Commands::Weather { lat, lon, config } => weather(lat, lon, config.as_deref()).await,
    }
}

fn load_config(path: Option<&str>) -> Option<Config> {
    match Config::load(path) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            None
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error encoding output: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn serve(config_path: Option<&str>) -> ExitCode {
    let Some(config) = load_config(config_path) else {
        return ExitCode::FAILURE;
    };

    match web::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn history(
    config_path: Option<&str>,
    max_hours_back: Option<u8>,
    proxy: Option<String>,
) -> ExitCode {
    let Some(mut config) = load_config(config_path) else {
        return ExitCode::FAILURE;
    };
    if proxy.is_some() {
        config.history.proxy_url = proxy;
    }

    let aggregator = match web::state::build_aggregator(&config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error creating HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let data = aggregator.get_history(max_hours_back).await;
    eprintln!("{} positions", data.len());
    print_json(&data)
}

async fn hour_snapshot(raw: &str, config_path: Option<&str>) -> ExitCode {
    let hour: HourOffset = match raw.parse() {
        Ok(h) => h,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let Some(config) = load_config(config_path) else {
        return ExitCode::FAILURE;
    };

    let source: Arc<dyn HourSource> = match &config.history.proxy_url {
        Some(url) => match config.feed.http_client() {
            Ok(http) => Arc::new(ProxyClient::new(http, url.clone(), ProxyClient::default_policy())),
            Err(e) => {
                eprintln!("Error creating HTTP client: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => match config.feed.client(config.feed.retry_policy()) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                eprintln!("Error creating HTTP client: {}", e);
                return ExitCode::FAILURE;
            }
        },
    };

    match source.get_hour(hour).await {
        Ok(records) => {
            eprintln!("Hour {}: {} positions", hour, records.len());
            print_json(&records)
        }
        Err(e) => {
            eprintln!("Error fetching hour {}: {}", hour, e);
            ExitCode::FAILURE
        }
    }
}

fn parse(path: &str) -> ExitCode {
    let body = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let records = feed::parse_feed(&body);
    eprintln!("Parsed {} positions", records.len());
    print_json(&records)
}

async fn weather(lat: f64, lon: f64, config_path: Option<&str>) -> ExitCode {
    let Some(config) = load_config(config_path) else {
        return ExitCode::FAILURE;
    };

    let client = match config.weather.client() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error creating HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match client.current(lat, lon).await {
        Ok(report) => print_json(&report),
        Err(e) => {
            eprintln!("Weather data temporarily unavailable: {}", e);
            ExitCode::FAILURE
        }
    }
}
