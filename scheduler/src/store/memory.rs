//! In-memory environment store

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::StoreError;
use crate::models::deployment::Deployment;
use crate::models::environment::Environment;
use crate::store::EnvironmentStore;
use crate::utils::generate_uuid;

/// In-memory environment store.
///
/// Records live only as long as the process. Every successful write issues a
/// fresh token, and every write is checked against the caller's snapshot
/// token under the write lock.
#[derive(Debug, Default)]
pub struct MemoryEnvironmentStore {
    environments: RwLock<HashMap<String, Environment>>,
}

impl MemoryEnvironmentStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and persist a new environment
    pub async fn create_environment(
        &self,
        name: &str,
        task_definition: &str,
        cluster: &str,
    ) -> Result<Environment, StoreError> {
        let environment = Environment::new(name, task_definition, cluster)?;

        let mut environments = self.environments.write().await;
        if environments.contains_key(name) {
            return Err(StoreError::EnvironmentExists(name.to_string()));
        }

        debug!("Created environment {} on cluster {}", name, cluster);
        environments.insert(environment.name.clone(), environment.clone());
        Ok(environment)
    }

    /// Insert or replace an environment as-is, token included
    pub async fn put_environment(&self, environment: Environment) {
        let mut environments = self.environments.write().await;
        environments.insert(environment.name.clone(), environment);
    }

    /// List all environments
    pub async fn list_environments(&self) -> Vec<Environment> {
        let environments = self.environments.read().await;
        environments.values().cloned().collect()
    }

    /// Number of stored environments
    pub async fn len(&self) -> usize {
        self.environments.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Look up the stored record for `snapshot` and verify its token
fn checked_entry<'a>(
    environments: &'a mut HashMap<String, Environment>,
    snapshot: &Environment,
) -> Result<&'a mut Environment, StoreError> {
    let stored = environments
        .get_mut(&snapshot.name)
        .ok_or_else(|| StoreError::EnvironmentNotFound(snapshot.name.clone()))?;

    if stored.token != snapshot.token {
        return Err(StoreError::Conflict {
            name: snapshot.name.clone(),
            expected: snapshot.token.clone(),
            actual: stored.token.clone(),
        });
    }

    Ok(stored)
}

#[async_trait]
impl EnvironmentStore for MemoryEnvironmentStore {
    async fn get_environment(&self, name: &str) -> Result<Option<Environment>, StoreError> {
        let environments = self.environments.read().await;
        Ok(environments.get(name).cloned())
    }

    async fn add_deployment(
        &self,
        snapshot: &Environment,
        deployment: Deployment,
    ) -> Result<Environment, StoreError> {
        let mut environments = self.environments.write().await;
        let stored = checked_entry(&mut environments, snapshot)?;

        if stored.deployments.contains_key(&deployment.id) {
            return Err(StoreError::ValidationError(format!(
                "deployment {} already exists in environment {}",
                deployment.id, stored.name
            )));
        }

        stored.deployments.insert(deployment.id.clone(), deployment);
        stored.token = generate_uuid();
        Ok(stored.clone())
    }

    async fn update_deployment(
        &self,
        snapshot: &Environment,
        deployment: Deployment,
    ) -> Result<Environment, StoreError> {
        let mut environments = self.environments.write().await;
        let stored = checked_entry(&mut environments, snapshot)?;

        if !stored.deployments.contains_key(&deployment.id) {
            return Err(StoreError::DeploymentNotFound {
                environment: stored.name.clone(),
                deployment_id: deployment.id,
            });
        }

        stored.deployments.insert(deployment.id.clone(), deployment);
        stored.token = generate_uuid();
        Ok(stored.clone())
    }
}
