//! Remote task scheduler client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::SchedulerError;
use crate::http::client::HttpClient;
use crate::models::deployment::FailedInstance;
use crate::models::placement::{PlacedTask, StartTaskOutput};
use crate::placement::TaskScheduler;

const START_TASK_PATH: &str = "/v1/tasks/start";

/// Start task request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTaskRequest {
    pub cluster: String,
    pub container_instances: Vec<String>,
    pub started_by: String,
    pub task_definition: String,
}

/// A started task in the scheduler's response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    #[serde(rename = "taskArn")]
    pub task_arn: String,

    #[serde(rename = "containerInstanceArn")]
    pub container_instance_arn: String,
}

/// A failed placement in the scheduler's response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    pub arn: String,

    #[serde(default)]
    pub reason: String,
}

/// Start task response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartTaskResponse {
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,

    #[serde(default)]
    pub failures: Vec<FailureRecord>,
}

impl From<StartTaskResponse> for StartTaskOutput {
    fn from(response: StartTaskResponse) -> Self {
        StartTaskOutput {
            tasks: response
                .tasks
                .into_iter()
                .map(|t| PlacedTask {
                    task: t.task_arn,
                    instance: t.container_instance_arn,
                })
                .collect(),
            failures: response
                .failures
                .into_iter()
                .map(|f| FailedInstance::new(f.arn, f.reason))
                .collect(),
        }
    }
}

/// Task scheduler backed by a remote scheduling service
pub struct TaskSchedulerClient {
    http_client: HttpClient,
}

impl TaskSchedulerClient {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl TaskScheduler for TaskSchedulerClient {
    async fn start_task(
        &self,
        cluster: &str,
        instances: &[String],
        run_token: &str,
        task_definition: &str,
    ) -> Result<StartTaskOutput, SchedulerError> {
        let request = StartTaskRequest {
            cluster: cluster.to_string(),
            container_instances: instances.to_vec(),
            started_by: run_token.to_string(),
            task_definition: task_definition.to_string(),
        };

        debug!(
            "Starting {} on {} instances in {} (run {})",
            task_definition,
            instances.len(),
            cluster,
            run_token
        );
        let response: StartTaskResponse = self.http_client.post(START_TASK_PATH, &request).await?;
        Ok(response.into())
    }
}
