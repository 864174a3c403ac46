//! Daemon configuration
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. optional config file (`--config` / `TASKHUB_CONFIG`)
//! 3. environment variables `TASKHUB__<SECTION>__<KEY>` (e.g. `TASKHUB__RPC__PORT=9600`)

use anyhow::{bail, Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::Path;
use taskhub_api_rpc::{RpcServerConfig, ThrottleConfig};
use taskhub_core::application::RelayConfig;
use taskhub_core::port::MaintenanceConfig;
use taskhub_infra_amqp::AmqpConfig;

const ENV_PREFIX: &str = "TASKHUB";
const ENV_SEPARATOR: &str = "__";
const MIN_JWT_SECRET_LEN: usize = 32;
/// About a century; keeps the purge cutoff in range
const MAX_RETENTION_DAYS: i64 = 36_500;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub rpc: RpcServerConfig,
    pub amqp: AmqpConfig,
    pub auth: AuthSettings,
    pub relay: RelayConfig,
    pub maintenance: MaintenanceSettings,
    pub throttle: ThrottleConfig,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite file path (`~` expanded) or `:memory:`
    pub path: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "~/.taskhub/taskhub.db".to_string(),
        }
    }
}

impl DatabaseSettings {
    pub fn expanded_path(&self) -> String {
        shellexpand::tilde(&self.path).into_owned()
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub issuer: String,
    /// First registered account becomes ADMIN
    pub bootstrap_admin: bool,
    pub hash_iterations: u32,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: 3600,
            issuer: "taskhub".to_string(),
            bootstrap_admin: true,
            hash_iterations: 10_000,
        }
    }
}

// Keep the secret out of logs
impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("issuer", &self.issuer)
            .field("bootstrap_admin", &self.bootstrap_admin)
            .field("hash_iterations", &self.hash_iterations)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MaintenanceSettings {
    pub enabled: bool,
    pub interval_hours: u64,
    pub delivered_retention_days: i64,
    pub vacuum_fragmentation_percent: f64,
}

impl Default for MaintenanceSettings {
    fn default() -> Self {
        let defaults = MaintenanceConfig::default();
        Self {
            enabled: true,
            interval_hours: 24,
            delivered_retention_days: defaults.delivered_retention_days,
            vacuum_fragmentation_percent: defaults.vacuum_fragmentation_percent,
        }
    }
}

impl MaintenanceSettings {
    pub fn to_config(&self) -> MaintenanceConfig {
        MaintenanceConfig {
            delivered_retention_days: self.delivered_retention_days,
            vacuum_fragmentation_percent: self.vacuum_fragmentation_percent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub format: LogFormat,
    /// Used when `RUST_LOG` is unset
    pub filter: String,
    /// Directory for daily-rotated JSON log files
    pub directory: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            filter: "taskhub=info".to_string(),
            directory: None,
        }
    }
}

impl Settings {
    /// Load from defaults, an optional file and the process environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }
        Self::from_builder(builder.add_source(environment()))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings: Settings = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            bail!("auth.jwt_secret must be set (TASKHUB__AUTH__JWT_SECRET)");
        }
        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            bail!(
                "auth.jwt_secret must be at least {} bytes",
                MIN_JWT_SECRET_LEN
            );
        }
        if self.auth.token_ttl_secs <= 0 {
            bail!("auth.token_ttl_secs must be positive");
        }
        if self.relay.batch_size <= 0 {
            bail!("relay.batch_size must be positive");
        }
        if self.maintenance.interval_hours == 0 {
            bail!("maintenance.interval_hours must be positive");
        }
        if !(0..=MAX_RETENTION_DAYS).contains(&self.maintenance.delivered_retention_days) {
            bail!(
                "maintenance.delivered_retention_days must be between 0 and {}",
                MAX_RETENTION_DAYS
            );
        }
        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_SEPARATOR)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}
