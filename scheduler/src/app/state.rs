//! Application state management

use std::sync::Arc;

use tracing::info;

use crate::app::options::AppOptions;
use crate::cluster::{ClusterState, ClusterStateClient, StaticClusterState};
use crate::deploy::service::DeploymentService;
use crate::errors::AppError;
use crate::http::client::HttpClient;
use crate::placement::{LocalScheduler, TaskScheduler, TaskSchedulerClient};
use crate::store::MemoryEnvironmentStore;

/// Main application state
pub struct AppState {
    /// Environment records
    pub store: Arc<MemoryEnvironmentStore>,

    /// Deployment orchestration
    pub service: DeploymentService,
}

impl AppState {
    /// Initialize application state and create the configured environments
    pub async fn init(options: &AppOptions) -> Result<Self, AppError> {
        info!("Initializing application state...");

        let store = Arc::new(MemoryEnvironmentStore::new());
        for seed in &options.environments {
            store
                .create_environment(&seed.name, &seed.task_definition, &seed.cluster)
                .await?;
            info!("Created environment {} on cluster {}", seed.name, seed.cluster);
        }

        let cluster_state: Arc<dyn ClusterState> = match &options.cluster_state_url {
            Some(url) => {
                info!("Using cluster state service at {}", url);
                let http_client = HttpClient::new(url, options.request_timeout)?;
                Arc::new(ClusterStateClient::new(http_client))
            }
            None => {
                info!("Using static cluster state ({} clusters)", options.clusters.len());
                let cluster_state = StaticClusterState::new();
                for (cluster, instances) in &options.clusters {
                    cluster_state.set_instances(cluster.clone(), instances.clone());
                }
                Arc::new(cluster_state)
            }
        };

        let scheduler: Arc<dyn TaskScheduler> = match &options.scheduler_url {
            Some(url) => {
                info!("Using task scheduler at {}", url);
                let http_client = HttpClient::new(url, options.request_timeout)?;
                Arc::new(TaskSchedulerClient::new(http_client))
            }
            None => {
                info!("Using local task scheduler");
                Arc::new(LocalScheduler::new())
            }
        };

        let service = DeploymentService::new(store.clone(), cluster_state, scheduler);

        Ok(Self { store, service })
    }
}
