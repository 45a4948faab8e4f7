//! rolloutd
//!
//! Rolls an environment's desired task definition out across the container
//! instances of its cluster, with at most one rollout in progress per
//! environment.
//!
//! The [`deploy::DeploymentService`] drives each rollout through three
//! collaborators, each behind a trait with an in-process and a remote
//! implementation:
//!
//! - [`store::EnvironmentStore`]: versioned environment records
//! - [`cluster::ClusterState`]: live container instances per cluster
//! - [`placement::TaskScheduler`]: task placement onto instances

pub mod app;
pub mod cluster;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod models;
pub mod placement;
pub mod server;
pub mod storage;
pub mod store;
pub mod utils;
