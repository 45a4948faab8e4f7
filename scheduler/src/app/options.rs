//! Application configuration options

use std::collections::HashMap;
use std::time::Duration;

use crate::storage::settings::{EnvironmentSeed, Settings};

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Server configuration
    pub server: ServerOptions,

    /// Cluster state service base URL; the static provider is used when unset
    pub cluster_state_url: Option<String>,

    /// Task scheduler base URL; the local scheduler is used when unset
    pub scheduler_url: Option<String>,

    /// Timeout for calls to remote services
    pub request_timeout: Duration,

    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,

    /// Environments created at startup
    pub environments: Vec<EnvironmentSeed>,

    /// Instances per cluster for the static provider
    pub clusters: HashMap<String, Vec<String>>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            server: ServerOptions::default(),
            cluster_state_url: None,
            scheduler_url: None,
            request_timeout: Duration::from_secs(30),
            max_shutdown_delay: Duration::from_secs(30),
            environments: Vec::new(),
            clusters: HashMap::new(),
        }
    }
}

impl From<&Settings> for AppOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            server: ServerOptions {
                host: settings.server.host.clone(),
                port: settings.server.port,
            },
            cluster_state_url: settings.cluster_state.base_url.clone(),
            scheduler_url: settings.scheduler.base_url.clone(),
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
            environments: settings.environments.clone(),
            clusters: settings.clusters.clone(),
            ..Default::default()
        }
    }
}

/// HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}
