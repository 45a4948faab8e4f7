//! In-process task scheduler

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::SchedulerError;
use crate::models::deployment::FailedInstance;
use crate::models::placement::{PlacedTask, StartTaskOutput};
use crate::placement::TaskScheduler;
use crate::utils::generate_uuid;

#[derive(Debug, Default)]
struct LocalSchedulerState {
    /// Instances that reject placement, with the reason they report
    rejections: HashMap<String, String>,

    /// Results of completed runs, keyed by run token
    runs: HashMap<String, StartTaskOutput>,
}

/// Scheduler that places tasks in memory.
///
/// Placement succeeds on every instance except those registered with
/// [`LocalScheduler::reject_instance`]. Results are remembered per run token,
/// so repeating a run returns the first result without placing again.
#[derive(Debug, Default)]
pub struct LocalScheduler {
    state: RwLock<LocalSchedulerState>,
}

impl LocalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make placement on `instance` fail with `reason`
    pub fn reject_instance(&self, instance: impl Into<String>, reason: impl Into<String>) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.rejections.insert(instance.into(), reason.into());
    }

    /// Result of a previous run
    pub fn run(&self, run_token: &str) -> Option<StartTaskOutput> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.runs.get(run_token).cloned()
    }

    /// Number of distinct runs performed
    pub fn run_count(&self) -> usize {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.runs.len()
    }
}

#[async_trait]
impl TaskScheduler for LocalScheduler {
    async fn start_task(
        &self,
        cluster: &str,
        instances: &[String],
        run_token: &str,
        task_definition: &str,
    ) -> Result<StartTaskOutput, SchedulerError> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());

        if let Some(previous) = state.runs.get(run_token) {
            debug!("Run {} already placed, returning previous result", run_token);
            return Ok(previous.clone());
        }

        let mut output = StartTaskOutput::default();
        for instance in instances {
            match state.rejections.get(instance) {
                Some(reason) => {
                    warn!("Placement of {} on {} rejected: {}", task_definition, instance, reason);
                    output
                        .failures
                        .push(FailedInstance::new(instance.clone(), reason.clone()));
                }
                None => output.tasks.push(PlacedTask {
                    task: format!("{}/{}", cluster, generate_uuid()),
                    instance: instance.clone(),
                }),
            }
        }

        state.runs.insert(run_token.to_string(), output.clone());
        Ok(output)
    }
}
