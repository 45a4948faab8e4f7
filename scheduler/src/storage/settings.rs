//! Settings file management

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::filesys::file::File;
use crate::logs::LogLevel;

/// Orchestrator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit JSON log lines
    #[serde(default)]
    pub json_logs: bool,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Cluster state service configuration
    #[serde(default)]
    pub cluster_state: RemoteSettings,

    /// Task scheduler service configuration
    #[serde(default)]
    pub scheduler: RemoteSettings,

    /// Timeout for calls to remote services, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Environments created at startup
    #[serde(default)]
    pub environments: Vec<EnvironmentSeed>,

    /// Instances per cluster, used when no cluster state service is configured
    #[serde(default)]
    pub clusters: HashMap<String, Vec<String>>,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            json_logs: false,
            server: ServerSettings::default(),
            cluster_state: RemoteSettings::default(),
            scheduler: RemoteSettings::default(),
            request_timeout_secs: default_request_timeout(),
            environments: Vec::new(),
            clusters: HashMap::new(),
        }
    }
}

impl Settings {
    /// Read settings from a JSON file, falling back to defaults when the file
    /// does not exist
    pub async fn load(file: &File) -> Result<Self, AppError> {
        match file.read_json::<Self>().await? {
            Some(settings) => {
                settings.validate()?;
                Ok(settings)
            }
            None => {
                info!(
                    "Settings file {} not found, using defaults",
                    file.path().display()
                );
                Ok(Self::default())
            }
        }
    }

    /// Reject values that would make the orchestrator unusable
    pub fn validate(&self) -> Result<(), AppError> {
        if self.request_timeout_secs == 0 {
            return Err(AppError::ConfigError(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Remote service settings.
///
/// Without a base URL the in-process implementation is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteSettings {
    #[serde(default)]
    pub base_url: Option<String>,
}

/// An environment to create at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentSeed {
    pub name: String,
    pub task_definition: String,
    pub cluster: String,
}
