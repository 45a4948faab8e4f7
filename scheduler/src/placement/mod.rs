//! Task schedulers
//!
//! A task scheduler starts a task definition on a set of container instances
//! and reports, per instance, whether placement succeeded.

pub mod local;
pub mod remote;

use async_trait::async_trait;

use crate::errors::SchedulerError;
use crate::models::placement::StartTaskOutput;

pub use local::LocalScheduler;
pub use remote::TaskSchedulerClient;

/// Backend that places tasks onto container instances
#[async_trait]
pub trait TaskScheduler: Send + Sync {
    /// Start `task_definition` on every instance in `instances`.
    ///
    /// `run_token` identifies the placement run; repeating a call with the
    /// same token must not place the task twice.
    async fn start_task(
        &self,
        cluster: &str,
        instances: &[String],
        run_token: &str,
        task_definition: &str,
    ) -> Result<StartTaskOutput, SchedulerError>;
}
