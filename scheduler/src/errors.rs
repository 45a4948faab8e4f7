//! Error types for the deployment orchestrator

use std::fmt;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The collaborator call that was in flight when a deployment operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    FetchEnvironment,
    AddDeployment,
    ListInstances,
    StartTask,
    UpdateDeployment,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::FetchEnvironment => "fetch environment",
            Step::AddDeployment => "add deployment",
            Step::ListInstances => "list instances",
            Step::StartTask => "start task",
            Step::UpdateDeployment => "update deployment",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the deployment service
#[derive(Error, Debug)]
pub enum DeploymentError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Environment not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("No instances available in cluster {0}")]
    NoInstances(String),

    #[error("Dependency failure during {step}: {source}")]
    DependencyFailure {
        step: Step,
        #[source]
        source: BoxError,
    },
}

impl DeploymentError {
    pub fn dependency(step: Step, source: impl Into<BoxError>) -> Self {
        DeploymentError::DependencyFailure {
            step,
            source: source.into(),
        }
    }

    /// Short machine-readable code, used by the HTTP layer
    pub fn code(&self) -> &'static str {
        match self {
            DeploymentError::InvalidInput(_) => "invalid_input",
            DeploymentError::NotFound(_) => "not_found",
            DeploymentError::Conflict(_) => "conflict",
            DeploymentError::NoInstances(_) => "no_instances",
            DeploymentError::DependencyFailure { .. } => "dependency_failure",
        }
    }
}

/// Errors raised by an environment store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The snapshot token no longer matches the stored environment
    #[error("Environment {name} was modified concurrently (expected token {expected}, found {actual})")]
    Conflict {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Environment not found: {0}")]
    EnvironmentNotFound(String),

    #[error("Environment already exists: {0}")]
    EnvironmentExists(String),

    #[error("Deployment {deployment_id} not found in environment {environment}")]
    DeploymentNotFound {
        environment: String,
        deployment_id: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Storage error: {0}")]
    Backend(String),
}

/// Errors raised by the JSON HTTP client backing the remote collaborators
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("{method} {url} responded {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },
}

/// Errors raised by a cluster state provider
#[derive(Error, Debug)]
pub enum ClusterStateError {
    #[error("Cluster state client error: {0}")]
    Client(#[from] ClientError),

    #[error("Cluster state error: {0}")]
    Other(String),
}

/// Errors raised by a task scheduler
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Scheduler client error: {0}")]
    Client(#[from] ClientError),

    #[error("Scheduler error: {0}")]
    Other(String),
}

/// Application-level errors (configuration, server, process lifecycle)
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    ClientError(#[from] ClientError),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),
}
