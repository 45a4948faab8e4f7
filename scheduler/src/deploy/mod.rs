//! Deployment module

pub mod service;

pub use service::DeploymentService;
