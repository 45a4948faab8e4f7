//! HTTP client for remote collaborators

pub mod client;
