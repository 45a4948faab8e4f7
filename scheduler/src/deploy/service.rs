//! Deployment service
//!
//! Rolls an environment's desired task definition out across the instances of
//! its cluster. The service holds no mutable state of its own; concurrent
//! requests against one environment are serialized by the store's token check.
//!
//! A rollout is always recorded before anything else happens. It is then
//! either started right away or, when another deployment of the environment is
//! already in progress, left pending.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::cluster::ClusterState;
use crate::errors::{DeploymentError, Step, StoreError};
use crate::models::deployment::Deployment;
use crate::models::environment::Environment;
use crate::placement::TaskScheduler;
use crate::store::EnvironmentStore;

/// Orchestrates deployments of environments onto their clusters
#[derive(Clone)]
pub struct DeploymentService {
    store: Arc<dyn EnvironmentStore>,
    cluster_state: Arc<dyn ClusterState>,
    scheduler: Arc<dyn TaskScheduler>,
}

impl DeploymentService {
    /// Create a new deployment service
    pub fn new(
        store: Arc<dyn EnvironmentStore>,
        cluster_state: Arc<dyn ClusterState>,
        scheduler: Arc<dyn TaskScheduler>,
    ) -> Self {
        Self {
            store,
            cluster_state,
            scheduler,
        }
    }

    /// Create a deployment of the environment's desired task definition.
    ///
    /// An empty `token` skips the staleness check; otherwise it must match the
    /// environment's current token.
    ///
    /// Returns the pending deployment when another deployment is already in
    /// progress, or the in-progress deployment after placement. Instances
    /// that failed placement are reported in the result, not as an error.
    pub async fn create_deployment(
        &self,
        environment_name: &str,
        token: &str,
    ) -> Result<Deployment, DeploymentError> {
        require("environment name", environment_name)?;

        let environment = self.fetch_environment(environment_name).await?;
        if !token.is_empty() && token != environment.token {
            warn!(
                "Rejecting deployment of {}: token {} is outdated",
                environment_name, token
            );
            return Err(DeploymentError::Conflict(format!(
                "token {} is outdated for environment {}",
                token, environment_name
            )));
        }

        let deployment = Deployment::new(environment.desired_task_definition.clone());
        info!(
            "Creating deployment {} of {} for environment {}",
            deployment.id, deployment.task_definition, environment_name
        );

        let environment = self
            .store
            .add_deployment(&environment, deployment.clone())
            .await
            .map_err(|e| store_failure(Step::AddDeployment, e))?;

        if let Some(in_progress) = environment.in_progress_deployment(&deployment.id) {
            warn!(
                "Deployment {} of environment {} is in progress, leaving {} pending",
                in_progress.id, environment_name, deployment.id
            );
            return Ok(deployment);
        }

        let instances = self
            .cluster_state
            .list_instances(&environment.cluster)
            .await
            .map_err(|e| {
                error!("Listing instances of {} failed: {}", environment.cluster, e);
                DeploymentError::dependency(Step::ListInstances, e)
            })?;
        if instances.is_empty() {
            return Err(DeploymentError::NoInstances(environment.cluster.clone()));
        }
        debug!(
            "Cluster {} has {} instances",
            environment.cluster,
            instances.len()
        );

        let output = self
            .scheduler
            .start_task(
                &environment.cluster,
                &instances,
                &deployment.id,
                &deployment.task_definition,
            )
            .await
            .map_err(|e| {
                error!("Starting tasks for deployment {} failed: {}", deployment.id, e);
                DeploymentError::dependency(Step::StartTask, e)
            })?;
        for failure in &output.failures {
            warn!(
                "Deployment {} failed on instance {}: {}",
                deployment.id, failure.instance, failure.reason
            );
        }

        let deployment = deployment.into_in_progress(instances.len(), output.failures);
        self.store
            .update_deployment(&environment, deployment.clone())
            .await
            .map_err(|e| store_failure(Step::UpdateDeployment, e))?;

        info!(
            "Deployment {} in progress on {} instances ({} failed)",
            deployment.id,
            deployment.desired_task_count,
            deployment.failed_instances.len()
        );
        Ok(deployment)
    }

    /// Get a deployment of an environment.
    ///
    /// Returns `None` if the environment has no deployment with that ID.
    pub async fn get_deployment(
        &self,
        environment_name: &str,
        deployment_id: &str,
    ) -> Result<Option<Deployment>, DeploymentError> {
        require("environment name", environment_name)?;
        require("deployment ID", deployment_id)?;

        let mut environment = self.fetch_environment(environment_name).await?;
        Ok(environment.deployments.remove(deployment_id))
    }

    /// List every deployment of an environment, in no particular order
    pub async fn list_deployments(
        &self,
        environment_name: &str,
    ) -> Result<Vec<Deployment>, DeploymentError> {
        require("environment name", environment_name)?;

        let environment = self.fetch_environment(environment_name).await?;
        Ok(environment.deployments.into_values().collect())
    }

    async fn fetch_environment(&self, name: &str) -> Result<Environment, DeploymentError> {
        match self.store.get_environment(name).await {
            Ok(Some(environment)) => Ok(environment),
            Ok(None) => Err(DeploymentError::NotFound(name.to_string())),
            Err(e) => Err(store_failure(Step::FetchEnvironment, e)),
        }
    }
}

fn require(field: &str, value: &str) -> Result<(), DeploymentError> {
    if value.is_empty() {
        return Err(DeploymentError::InvalidInput(format!(
            "{} should not be empty",
            field
        )));
    }
    Ok(())
}

/// Map a store error, keeping optimistic-check failures apart
fn store_failure(step: Step, err: StoreError) -> DeploymentError {
    error!("Store call '{}' failed: {}", step, err);
    match err {
        StoreError::Conflict { .. } => DeploymentError::Conflict(err.to_string()),
        err => DeploymentError::dependency(step, err),
    }
}
