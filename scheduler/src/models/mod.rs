//! Data models

pub mod deployment;
pub mod environment;
pub mod placement;
