//! Cluster state service client

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cluster::ClusterState;
use crate::errors::ClusterStateError;
use crate::http::client::HttpClient;

const FILTER_INSTANCES_PATH: &str = "/v1/instances/filter";

/// A container instance as reported by the cluster state service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInstance {
    #[serde(rename = "containerInstanceARN")]
    pub container_instance_arn: String,

    #[serde(default, rename = "clusterARN")]
    pub cluster_arn: Option<String>,

    #[serde(default)]
    pub status: Option<String>,
}

/// One page of the instance listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInstancePage {
    #[serde(default)]
    pub items: Vec<ContainerInstance>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Cluster state provider backed by a remote cluster state service
pub struct ClusterStateClient {
    http_client: HttpClient,
}

impl ClusterStateClient {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl ClusterState for ClusterStateClient {
    async fn list_instances(&self, cluster: &str) -> Result<Vec<String>, ClusterStateError> {
        let mut instances = Vec::new();
        let mut next_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        loop {
            let page: ContainerInstancePage = {
                let mut query = vec![("cluster", cluster)];
                if let Some(token) = next_token.as_deref() {
                    query.push(("nextToken", token));
                }
                self.http_client.get(FILTER_INSTANCES_PATH, &query).await?
            };
            debug!(
                "Cluster {} page returned {} instances",
                cluster,
                page.items.len()
            );

            instances.extend(page.items.into_iter().map(|i| i.container_instance_arn));

            match page.next_token {
                Some(token) if !token.is_empty() => {
                    // A repeated token would page forever
                    if !seen_tokens.insert(token.clone()) {
                        return Err(ClusterStateError::Other(format!(
                            "repeated page token {} while listing cluster {}",
                            token, cluster
                        )));
                    }
                    next_token = Some(token);
                }
                _ => break,
            }
        }

        Ok(instances)
    }
}
