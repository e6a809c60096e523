//! Worker settings loaded from a YAML file and the environment.
//!
//! Every value can be overridden with a `PIGEON_` prefixed variable using
//! `__` between nesting levels, e.g. `PIGEON_CAMPAIGN__SMTP_HOST`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::errors::Error;

/// Environment variable naming the settings file (without extension).
pub const CONFIG_PATH_VAR: &str = "PIGEON_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/default";

/// Settings of one campaign run.
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignSettings {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// `From` address; falls back to `username`.
    #[serde(default)]
    pub sender: Option<String>,
    /// Connect with TLS right away instead of upgrading via STARTTLS.
    #[serde(default)]
    pub implicit_tls: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub tracking_url: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_batch_delay_secs")]
    pub batch_delay_secs: u64,
    #[serde(default = "default_group_filter")]
    pub group_filter: String,
    #[serde(default = "default_group_field")]
    pub group_field: String,
    pub recipients_path: PathBuf,
    #[serde(default = "default_subject_path")]
    pub subject_path: PathBuf,
    #[serde(default = "default_body_path")]
    pub body_path: PathBuf,
}

impl CampaignSettings {
    pub fn load() -> Result<Self, Error> {
        load_section("campaign")
    }

    pub fn sender(&self) -> &str {
        self.sender.as_deref().unwrap_or(&self.username)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_secs(self.batch_delay_secs)
    }
}

/// Settings of the open tracking service.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

impl TrackerSettings {
    /// Loads the `tracker` section; every field has a default, so the
    /// section itself may be absent.
    pub fn load() -> Result<Self, Error> {
        match load_section("tracker") {
            Err(Error::Settings(config::ConfigError::NotFound(_))) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn listen_address(&self) -> Result<SocketAddr, Error> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid listen address {}: {e}", self.host)))
    }
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: default_database_url(),
        }
    }
}

fn load_section<T: DeserializeOwned>(section: &str) -> Result<T, Error> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let settings = Config::builder()
        .add_source(File::with_name(&path).required(false))
        .add_source(
            Environment::with_prefix("PIGEON")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    Ok(settings.get::<T>(section)?)
}

fn default_smtp_port() -> u16 {
    587
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_batch_size() -> usize {
    10
}

fn default_batch_delay_secs() -> u64 {
    60
}

fn default_group_filter() -> String {
    "all".to_string()
}

fn default_group_field() -> String {
    "department".to_string()
}

fn default_subject_path() -> PathBuf {
    PathBuf::from("subject.txt")
}

fn default_body_path() -> PathBuf {
    PathBuf::from("body.html")
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5010
}

fn default_database_url() -> String {
    "email_tracking.db".to_string()
}
