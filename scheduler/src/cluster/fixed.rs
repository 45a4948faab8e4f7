//! Cluster state backed by a fixed instance map

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::cluster::ClusterState;
use crate::errors::ClusterStateError;

/// Cluster state provider with a configured set of instances per cluster.
///
/// Unknown clusters have no instances.
#[derive(Debug, Default)]
pub struct StaticClusterState {
    clusters: RwLock<HashMap<String, Vec<String>>>,
}

impl StaticClusterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the instances of a cluster
    pub fn set_instances(&self, cluster: impl Into<String>, instances: Vec<String>) {
        let mut clusters = self.clusters.write().unwrap_or_else(|e| e.into_inner());
        clusters.insert(cluster.into(), instances);
    }

    /// Remove a cluster
    pub fn remove_cluster(&self, cluster: &str) {
        let mut clusters = self.clusters.write().unwrap_or_else(|e| e.into_inner());
        clusters.remove(cluster);
    }
}

#[async_trait]
impl ClusterState for StaticClusterState {
    async fn list_instances(&self, cluster: &str) -> Result<Vec<String>, ClusterStateError> {
        let clusters = self.clusters.read().unwrap_or_else(|e| e.into_inner());
        Ok(clusters.get(cluster).cloned().unwrap_or_default())
    }
}
