//! Server state

use std::sync::Arc;

use crate::deploy::service::DeploymentService;
use crate::store::MemoryEnvironmentStore;

/// Server state shared across handlers
pub struct ServerState {
    pub store: Arc<MemoryEnvironmentStore>,
    pub service: DeploymentService,
}

impl ServerState {
    pub fn new(store: Arc<MemoryEnvironmentStore>, service: DeploymentService) -> Self {
        Self { store, service }
    }
}
