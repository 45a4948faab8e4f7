//! Deployment models

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::generate_uuid;

/// Lifecycle status of a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    /// Recorded, placement not started
    Pending,

    /// Placement attempted on the cluster's instances
    InProgress,

    /// Finished successfully
    Completed,

    /// Finished unsuccessfully
    Failed,
}

impl DeploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentStatus::Pending => "pending",
            DeploymentStatus::InProgress => "in_progress",
            DeploymentStatus::Completed => "completed",
            DeploymentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health of a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentHealth {
    Healthy,
    Unhealthy,
}

/// An instance the scheduler could not place the task on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedInstance {
    /// Container instance identifier
    pub instance: String,

    /// Reason reported by the scheduler
    pub reason: String,
}

impl FailedInstance {
    pub fn new(instance: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            reason: reason.into(),
        }
    }
}

/// One rollout attempt of a task definition onto an environment's instances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    /// Unique deployment ID, also used as the placement run token
    pub id: String,

    /// Task definition being rolled out
    pub task_definition: String,

    /// Number of instances targeted, zero until instances are discovered
    pub desired_task_count: usize,

    /// Current status
    pub status: DeploymentStatus,

    /// Current health
    pub health: DeploymentHealth,

    /// When the deployment was created
    pub start_time: DateTime<Utc>,

    /// When the deployment reached a terminal state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    /// Instances that rejected the task, in scheduler order
    #[serde(default)]
    pub failed_instances: Vec<FailedInstance>,
}

impl Deployment {
    /// Create a new pending deployment for a task definition
    pub fn new(task_definition: impl Into<String>) -> Self {
        Self {
            id: generate_uuid(),
            task_definition: task_definition.into(),
            desired_task_count: 0,
            status: DeploymentStatus::Pending,
            health: DeploymentHealth::Healthy,
            start_time: Utc::now(),
            end_time: None,
            failed_instances: Vec::new(),
        }
    }

    /// Mark the deployment as in progress after a placement attempt.
    ///
    /// The deployment turns unhealthy as soon as one instance failed.
    pub fn into_in_progress(
        self,
        desired_task_count: usize,
        failed_instances: Vec<FailedInstance>,
    ) -> Self {
        let health = if failed_instances.is_empty() {
            DeploymentHealth::Healthy
        } else {
            DeploymentHealth::Unhealthy
        };

        Self {
            desired_task_count,
            status: DeploymentStatus::InProgress,
            health,
            failed_instances,
            ..self
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == DeploymentStatus::InProgress
    }
}
