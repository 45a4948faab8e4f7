//! Environment models

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::StoreError;
use crate::models::deployment::Deployment;
use crate::utils::generate_uuid;

/// A named rollout target: one cluster, one desired task definition, and the
/// history of deployments made against it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Unique environment name
    pub name: String,

    /// Task definition deployments roll out
    pub desired_task_definition: String,

    /// Cluster the environment's instances live in
    pub cluster: String,

    /// Version token, replaced by the store on every mutation
    pub token: String,

    /// Deployments keyed by ID
    #[serde(default)]
    pub deployments: HashMap<String, Deployment>,
}

impl Environment {
    /// Create a new environment with a fresh token and no deployments
    pub fn new(
        name: impl Into<String>,
        desired_task_definition: impl Into<String>,
        cluster: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let name = name.into();
        let desired_task_definition = desired_task_definition.into();
        let cluster = cluster.into();

        if name.is_empty() {
            return Err(StoreError::ValidationError(
                "environment name should not be empty".to_string(),
            ));
        }
        if desired_task_definition.is_empty() {
            return Err(StoreError::ValidationError(
                "task definition should not be empty".to_string(),
            ));
        }
        if cluster.is_empty() {
            return Err(StoreError::ValidationError(
                "cluster should not be empty".to_string(),
            ));
        }

        Ok(Self {
            name,
            desired_task_definition,
            cluster,
            token: generate_uuid(),
            deployments: HashMap::new(),
        })
    }

    /// Get a deployment by ID
    pub fn deployment(&self, deployment_id: &str) -> Option<&Deployment> {
        self.deployments.get(deployment_id)
    }

    /// Find an in-progress deployment other than `excluding`
    pub fn in_progress_deployment(&self, excluding: &str) -> Option<&Deployment> {
        self.deployments
            .values()
            .find(|d| d.id != excluding && d.is_in_progress())
    }
}
