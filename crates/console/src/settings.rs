//! Console settings and seed data
//!
//! Sources, later ones winning:
//! 1. Built-in defaults (the reference QueueSmart queues)
//! 2. Optional TOML file (`--config`, default `~/.queuesmart/seed.toml`)
//! 3. `QUEUESMART__*` environment variables
//!    (e.g. `QUEUESMART__ENGINE__ALMOST_READY_THRESHOLD_MINUTES=10`)

use anyhow::{Context, Result};
use queuesmart_core::application::{EngineConfig, QueueDesk};
use queuesmart_core::domain::{ServiceDraft, ServicePriority};
use serde::Deserialize;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "~/.queuesmart/seed.toml";
const ENV_PREFIX: &str = "QUEUESMART";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineConfig,
    pub services: Vec<SeedService>,
}

/// A service and the people already waiting in it
#[derive(Debug, Clone, Deserialize)]
pub struct SeedService {
    pub id: String,
    pub name: String,
    pub description: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub priority: ServicePriority,
    #[serde(default = "default_open")]
    pub open: bool,
    /// Display names in queue order; the first is at the counter
    #[serde(default)]
    pub queue: Vec<String>,
}

fn default_open() -> bool {
    true
}

impl SeedService {
    fn new(
        id: &str,
        name: &str,
        description: &str,
        duration_minutes: u32,
        priority: ServicePriority,
        open: bool,
        queue: &[&str],
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            duration_minutes,
            priority,
            open,
            queue: queue.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            services: vec![
                SeedService::new(
                    "customer-support",
                    "Customer Support",
                    "General customer queries and issue resolution",
                    15,
                    ServicePriority::High,
                    true,
                    &["James Wilson", "Sarah Ahmed", "Carlos Rivera", "Emily Chen"],
                ),
                SeedService::new(
                    "technical-assistance",
                    "Technical Assistance",
                    "Hardware and software technical support",
                    30,
                    ServicePriority::Medium,
                    true,
                    &["Mike Johnson", "Priya Patel"],
                ),
                SeedService::new(
                    "billing-inquiry",
                    "Billing Inquiry",
                    "Invoice, payment, and billing questions",
                    10,
                    ServicePriority::Low,
                    true,
                    &["Tom Baker", "Lisa Wong", "David Kim"],
                ),
                SeedService::new(
                    "account-management",
                    "Account Management",
                    "Account creation, updates, and closures",
                    20,
                    ServicePriority::Medium,
                    false,
                    &[],
                ),
            ],
        }
    }
}

impl Settings {
    /// Load settings from an optional TOML file plus environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let path = shellexpand::tilde(path).into_owned();

        let settings: Settings = config::Config::builder()
            .add_source(config::File::new(&path, config::FileFormat::Toml).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?
            .try_deserialize()
            .context("Invalid configuration")?;

        info!(
            config_path = %path,
            services = settings.services.len(),
            "Configuration loaded"
        );
        Ok(settings)
    }

    /// Register every seed service and fill its queue.
    ///
    /// Closed services are opened for seeding and closed again afterwards.
    pub fn seed(&self, desk: &QueueDesk) -> Result<()> {
        for seed in &self.services {
            let draft = ServiceDraft::new(
                seed.name.as_str(),
                seed.description.as_str(),
                i64::from(seed.duration_minutes),
                seed.priority,
            );
            desk.register_service(seed.id.as_str(), &draft)
                .with_context(|| format!("Failed to seed service {}", seed.id))?;

            for name in &seed.queue {
                desk.join(&seed.id, name)
                    .with_context(|| format!("Failed to seed {} into {}", name, seed.id))?;
            }
            if !seed.queue.is_empty() {
                desk.start_serving(&seed.id)?;
            }
            if !seed.open {
                desk.set_service_open(&seed.id, false)?;
            }
        }
        Ok(())
    }
}
