//! QueueSmart Console - composition root for the queue engine
//!
//! Seeds an in-memory desk from configuration, then shows queues or
//! replays an admin script against them. Nothing is persisted.

mod render;
mod script;
mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use queuesmart_core::application::QueueDesk;
use queuesmart_core::port::id_provider::UuidProvider;
use queuesmart_core::port::time_provider::SystemTimeProvider;

use settings::{Settings, DEFAULT_CONFIG_PATH};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_LOG_FILTER: &str = "queuesmart_core=info,queuesmart_console=info";

#[derive(Parser)]
#[command(name = "queuesmart")]
#[command(about = "QueueSmart queue engine console", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Seed/config file (TOML); missing file means built-in reference queues
    #[arg(long, global = true, env = "QUEUESMART_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show seeded queues
    Show {
        /// Only this service
        #[arg(short, long)]
        service: Option<String>,
    },

    /// List services
    Services,

    /// Replay an admin script against the seeded queues
    Replay {
        /// Script file (one command per line)
        script: PathBuf,
    },
}

fn init_logging() -> Result<()> {
    let log_format =
        std::env::var("QUEUESMART_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?;

    // Logs go to stderr so tables and JSON on stdout stay clean
    match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    info!("QueueSmart console v{} starting", VERSION);

    let settings = Settings::load(&cli.config)?;

    // DI wiring
    let desk = QueueDesk::new(
        Arc::new(UuidProvider),
        Arc::new(SystemTimeProvider),
        settings.engine.clone(),
    );
    settings.seed(&desk)?;

    match cli.command {
        Commands::Show { service } => {
            let services = match service {
                Some(id) => vec![desk.service(&id)?],
                None => desk.services()?,
            };

            if cli.json {
                let snapshots = services
                    .iter()
                    .map(|s| desk.snapshot(&s.id))
                    .collect::<queuesmart_core::Result<Vec<_>>>()?;
                println!("{}", serde_json::to_string_pretty(&snapshots)?);
            } else {
                for service in &services {
                    render::print_queue(service, &desk.snapshot(&service.id)?);
                }
            }
        }

        Commands::Services => {
            let services = desk.services()?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&services)?);
            } else {
                render::print_services(&services, &desk.snapshots()?);
            }
        }

        Commands::Replay { script: path } => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read script {}", path.display()))?;
            let reports = script::run(&desk, &text)?;

            if cli.json {
                let output = json!({
                    "steps": reports,
                    "queues": desk.snapshots()?,
                    "history": desk.history()?,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                for report in &reports {
                    render::print_step(report);
                    if let Some(snapshot) = &report.snapshot {
                        render::print_queue(&desk.service(&snapshot.service_id)?, snapshot);
                    }
                }

                let rejected = reports.iter().filter(|r| !r.ok).count();
                println!();
                if rejected == 0 {
                    println!("{}", "✓ Script completed".green().bold());
                } else {
                    println!(
                        "{}",
                        format!("Script completed with {} rejected step(s)", rejected)
                            .yellow()
                            .bold()
                    );
                }
                println!();

                for service in desk.services()? {
                    render::print_queue(&service, &desk.snapshot(&service.id)?);
                }
                render::print_history(&desk.history()?);
            }
        }
    }

    Ok(())
}
