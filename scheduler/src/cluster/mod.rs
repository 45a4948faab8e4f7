//! Cluster state providers
//!
//! A cluster state provider answers which container instances currently exist
//! in a cluster.

pub mod fixed;
pub mod remote;

use async_trait::async_trait;

use crate::errors::ClusterStateError;

pub use fixed::StaticClusterState;
pub use remote::ClusterStateClient;

/// Source of live container instances
#[async_trait]
pub trait ClusterState: Send + Sync {
    /// List the identifiers of every container instance in `cluster`
    async fn list_instances(&self, cluster: &str) -> Result<Vec<String>, ClusterStateError>;
}
