//! Task placement models

use serde::{Deserialize, Serialize};

use crate::models::deployment::FailedInstance;

/// A task started on a container instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedTask {
    /// Task identifier assigned by the scheduler
    pub task: String,

    /// Instance the task was placed on
    pub instance: String,
}

/// Outcome of a placement request.
///
/// `failures` can be non-empty even when the request as a whole succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartTaskOutput {
    pub tasks: Vec<PlacedTask>,
    pub failures: Vec<FailedInstance>,
}
