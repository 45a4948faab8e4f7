//! Environment storage backends.
//!
//! An environment store owns the durable, versioned environment records.
//! Writes are guarded by the snapshot's token: a write against a snapshot
//! whose token no longer matches the stored record fails with
//! [`StoreError::Conflict`] and leaves the record untouched.

pub mod memory;

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::models::deployment::Deployment;
use crate::models::environment::Environment;

pub use memory::MemoryEnvironmentStore;

/// Backend for environment records
#[async_trait]
pub trait EnvironmentStore: Send + Sync {
    /// Fetch an environment by name.
    ///
    /// Returns `None` if no environment with that name exists.
    async fn get_environment(&self, name: &str) -> Result<Option<Environment>, StoreError>;

    /// Append a new deployment to the environment described by `snapshot`.
    ///
    /// Returns the updated environment, carrying a new token.
    async fn add_deployment(
        &self,
        snapshot: &Environment,
        deployment: Deployment,
    ) -> Result<Environment, StoreError>;

    /// Replace an existing deployment (matched by ID) in the environment
    /// described by `snapshot`.
    ///
    /// Returns the updated environment, carrying a new token.
    async fn update_deployment(
        &self,
        snapshot: &Environment,
        deployment: Deployment,
    ) -> Result<Environment, StoreError>;
}
