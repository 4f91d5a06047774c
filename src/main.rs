mod advice;
mod api;
mod cli;
mod config;
mod core;
mod daemon;
mod engine;
mod fan;
mod monitor;
mod util;

use crate::api::{ApiClient, DEFAULT_TRAINING_SAMPLES, TelemetrySource};
use crate::cli::report;
use crate::config::AppConfig;
use crate::util::error::{AppError, PayloadError};
use chrono::Utc;
use clap::Parser;
use serde_json::Value;
use std::error::Error;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Analyze gaming and development suitability of the monitored machine
    Analyze,
    /// Show cooling fan status
    Fans,
    /// Show the dashboard summary: current usage, trends and open issues
    Dashboard,
    /// List detected hardware issues
    Issues {
        /// Include resolved issues
        #[clap(long)]
        all: bool,
    },
    /// Mark a hardware issue as resolved
    Resolve { id: u64 },
    /// Ask the backend to collect a metrics sample now
    Collect,
    /// Retrain the backend's anomaly detection model
    Train {
        #[clap(long, default_value_t = DEFAULT_TRAINING_SAMPLES)]
        samples: u32,
    },
    /// Show aggregated metrics statistics
    Stats {
        #[clap(long, default_value_t = 7)]
        days: u32,
    },
    /// Show stored metrics samples, one page at a time
    History {
        #[clap(long, default_value_t = 7)]
        days: u32,
        #[clap(long, default_value_t = 1)]
        page: u32,
    },
    /// Analyze saved backend responses without contacting the backend
    Offline {
        /// JSON file with a metrics sample
        #[clap(long)]
        metrics: PathBuf,
        /// JSON file with the system-info payload
        #[clap(long)]
        system_info: PathBuf,
        /// JSON file with fan readings, used when system info carries none
        #[clap(long)]
        fans: Option<PathBuf>,
    },
    /// Poll the backend continuously and log state changes
    Daemon {
        #[clap(long)]
        verbose: bool,
    },
}

fn read_json(path: &Path) -> Result<Value, AppError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| AppError::Payload(PayloadError::Json(e)))
}

fn run_offline(
    metrics_path: &Path,
    system_info_path: &Path,
    fans_path: Option<&Path>,
) -> Result<(), AppError> {
    let metrics = monitor::parse_metrics(&read_json(metrics_path)?)?;
    let mut inventory = monitor::parse_system_info(&read_json(system_info_path)?)?;

    if inventory.fans.is_empty() {
        if let Some(path) = fans_path {
            inventory.fans = monitor::parse_fans(&read_json(path)?)?;
        }
    }

    let report = monitor::build_system_report(metrics, inventory, Utc::now());
    print!("{}", report::render_analysis(&report));
    Ok(())
}

fn run_command(command: Commands, config: AppConfig) -> Result<(), AppError> {
    if let Commands::Offline {
        metrics,
        system_info,
        fans,
    } = &command
    {
        return run_offline(metrics, system_info, fans.as_deref());
    }
    if let Commands::Daemon { verbose } = command {
        return daemon::run_daemon(config, verbose);
    }

    let client = ApiClient::new(&config.api)?;

    match command {
        Commands::Analyze => {
            let report = monitor::collect_system_report(&client)?;
            print!("{}", report::render_analysis(&report));
        }
        Commands::Fans => print!("{}", report::render_fans(&client.fans()?)),
        Commands::Dashboard => print!("{}", report::render_dashboard(&client.dashboard()?)),
        Commands::Issues { all } => print!("{}", report::render_issues(&client.issues(!all)?)),
        Commands::Resolve { id } => {
            let issue = client.resolve_issue(id)?;
            println!(
                "Issue #{} ({}) marked as resolved",
                issue.id, issue.issue_type
            );
        }
        Commands::Collect => {
            let sample = client.collect_metrics()?;
            println!(
                "Collected sample: CPU {:.1}%, Memory {:.1}%, Disk {:.1}%{}",
                sample.cpu_percent.unwrap_or_default(),
                sample.memory_percent.unwrap_or_default(),
                sample.disk_usage_percent.unwrap_or_default(),
                if sample.is_anomaly { " [anomaly]" } else { "" }
            );
        }
        Commands::Train { samples } => {
            print!("{}", report::render_training(&client.train_model(samples)?));
        }
        Commands::Stats { days } => {
            let stats = client.statistics(days)?;
            print!("{}", report::render_statistics(&stats, days));
        }
        Commands::History { days, page } => {
            let page = page.max(1);
            let history = client.metrics_history(days, page)?;
            print!("{}", report::render_history(&history, page));
        }
        Commands::Offline { .. } | Commands::Daemon { .. } => {}
    }

    Ok(())
}

// Causes worth printing after the top-level message; a cause whose text the
// message above it already includes is skipped
fn error_causes(error: &dyn Error) -> Vec<String> {
    let mut printed = error.to_string();
    let mut causes = Vec::new();
    let mut source = error.source();

    while let Some(cause) = source {
        let text = cause.to_string();
        if !printed.contains(&text) {
            causes.push(text.clone());
        }
        printed = text;
        source = cause.source();
    }
    causes
}

fn main() {
    let cli = Cli::parse();

    // The daemon narrows this further from its own config
    let default_filter = if matches!(cli.command, Some(Commands::Daemon { .. })) {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let config = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {e}. Using default values.");
            AppConfig::default()
        }
    };

    let command_result = match cli.command {
        Some(command) => run_command(command, config),
        None => {
            println!("Welcome to rigscope! Use --help for commands.");
            // token is skipped when serializing
            match toml::to_string_pretty(&config) {
                Ok(effective) => println!("Current effective configuration:\n{effective}"),
                Err(e) => eprintln!("Could not render configuration: {e}"),
            }
            Ok(())
        }
    };

    if let Err(e) = command_result {
        eprintln!("Error executing command: {e}");
        for cause in error_causes(&e) {
            eprintln!("Caused by: {cause}");
        }

        if let AppError::Api(api_error) = &e {
            if api_error.is_unauthorized() {
                eprintln!(
                    "Hint: the backend rejected the request. \
                     Set an API token in the config file or via {}.",
                    config::TOKEN_ENV
                );
            }
        }

        std::process::exit(1);
    }
}
