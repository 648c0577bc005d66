//! Worker configuration loading from file and environment variables.

use serde::Deserialize;
use std::time::Duration;
use switchboard_routing::{DepartmentEntry, DepartmentRegistry, RegistryError};
use switchboard_transfer::ControlPlaneConfig;
use thiserror::Error;

/// Top-level worker configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// LiveKit control plane credentials.
    #[serde(default)]
    pub livekit: ControlPlaneConfig,

    /// Department destinations.
    #[serde(default = "default_departments")]
    pub departments: Vec<DepartmentConfig>,

    /// Transfer sequencing settings.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// One routable department.
#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentConfig {
    /// Name spoken to the caller.
    pub name: String,

    /// Touch-tone digit selecting this department.
    pub dtmf_digit: String,

    /// Destination address. Must be set (file or environment) before the
    /// worker accepts calls.
    #[serde(default)]
    pub transfer_to: String,

    /// Additional spoken selector tokens.
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Transfer sequencing settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    /// Seconds between announcing a transfer and executing it.
    #[serde(default = "default_grace_seconds")]
    pub grace_seconds: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "switchboard_agent=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_grace_seconds() -> u64 {
    switchboard_routing::DEFAULT_GRACE_INTERVAL.as_secs()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_departments() -> Vec<DepartmentConfig> {
    vec![
        DepartmentConfig {
            name: "Billing".to_string(),
            dtmf_digit: "1".to_string(),
            transfer_to: String::new(),
            aliases: Vec::new(),
        },
        DepartmentConfig {
            name: "Tech Support".to_string(),
            dtmf_digit: "2".to_string(),
            transfer_to: String::new(),
            aliases: vec!["technical support".to_string()],
        },
        DepartmentConfig {
            name: "Customer Service".to_string(),
            dtmf_digit: "3".to_string(),
            transfer_to: String::new(),
            aliases: Vec::new(),
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            livekit: ControlPlaneConfig::default(),
            departments: default_departments(),
            routing: RoutingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            grace_seconds: default_grace_seconds(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The control plane credentials are incomplete.
    #[error(transparent)]
    ControlPlane(#[from] switchboard_transfer::TransferError),

    /// The department table is invalid.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `SWITCHBOARD_LIVEKIT_URL` overrides `livekit.url`
/// - `SWITCHBOARD_LIVEKIT_API_KEY` overrides `livekit.api_key`
/// - `SWITCHBOARD_LIVEKIT_API_SECRET` overrides `livekit.api_secret`
/// - `SWITCHBOARD_GRACE_SECONDS` overrides `routing.grace_seconds`
/// - `SWITCHBOARD_LOG_LEVEL` overrides `logging.level`
/// - `SWITCHBOARD_LOG_JSON` overrides `logging.json` (set to "true")
/// - `BILLING_PHONE_NUMBER`, `TECH_SUPPORT_PHONE_NUMBER` and
///   `CUSTOMER_SERVICE_PHONE_NUMBER` override the destination of the
///   matching department
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    // Environment variable overrides
    if let Ok(url) = std::env::var("SWITCHBOARD_LIVEKIT_URL") {
        config.livekit.url = url;
    }
    if let Ok(api_key) = std::env::var("SWITCHBOARD_LIVEKIT_API_KEY") {
        config.livekit.api_key = api_key;
    }
    if let Ok(api_secret) = std::env::var("SWITCHBOARD_LIVEKIT_API_SECRET") {
        config.livekit.api_secret = api_secret;
    }
    if let Ok(grace) = std::env::var("SWITCHBOARD_GRACE_SECONDS") {
        if let Ok(parsed) = grace.parse() {
            config.routing.grace_seconds = parsed;
        }
    }
    if let Ok(level) = std::env::var("SWITCHBOARD_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("SWITCHBOARD_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    for (name, var) in [
        ("Billing", "BILLING_PHONE_NUMBER"),
        ("Tech Support", "TECH_SUPPORT_PHONE_NUMBER"),
        ("Customer Service", "CUSTOMER_SERVICE_PHONE_NUMBER"),
    ] {
        if let Ok(number) = std::env::var(var) {
            if let Some(department) = config.departments.iter_mut().find(|d| d.name == name) {
                department.transfer_to = number;
            }
        }
    }

    Ok(config)
}

impl Config {
    /// Validates the control plane credentials and builds the department
    /// registry. Any missing destination or credential aborts startup;
    /// the worker must never accept calls it cannot route.
    pub fn build_registry(&self) -> Result<DepartmentRegistry, ConfigError> {
        self.livekit.validate()?;

        let entries = self
            .departments
            .iter()
            .map(|department| {
                let mut entry = DepartmentEntry::new(
                    &department.name,
                    &department.transfer_to,
                    &department.dtmf_digit,
                );
                entry.aliases = department.aliases.clone();
                entry
            })
            .collect();

        Ok(DepartmentRegistry::from_entries(entries)?)
    }

    pub fn grace_interval(&self) -> Duration {
        Duration::from_secs(self.routing.grace_seconds)
    }
}
