//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::{DeploymentError, StoreError};
use crate::models::deployment::Deployment;
use crate::server::state::ServerState;
use crate::store::EnvironmentStore;
use crate::utils::version_info;

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

/// Error returned by handlers
#[derive(Debug)]
pub enum ApiError {
    Deployment(DeploymentError),
    Store(StoreError),
    NotFound(String),
}

impl From<DeploymentError> for ApiError {
    fn from(err: DeploymentError) -> Self {
        ApiError::Deployment(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Deployment(err) => {
                let status = match &err {
                    DeploymentError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    DeploymentError::NotFound(_) => StatusCode::NOT_FOUND,
                    DeploymentError::Conflict(_) => StatusCode::CONFLICT,
                    DeploymentError::NoInstances(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    DeploymentError::DependencyFailure { .. } => StatusCode::BAD_GATEWAY,
                };
                (status, err.code(), err.to_string())
            }
            ApiError::Store(err) => {
                let (status, code) = match &err {
                    StoreError::ValidationError(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
                    StoreError::EnvironmentExists(_) | StoreError::Conflict { .. } => {
                        (StatusCode::CONFLICT, "conflict")
                    }
                    StoreError::EnvironmentNotFound(_) | StoreError::DeploymentNotFound { .. } => {
                        (StatusCode::NOT_FOUND, "not_found")
                    }
                    StoreError::Backend(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
                };
                (status, code, err.to_string())
            }
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
        };

        if status.is_server_error() {
            error!("Request failed: {}", message);
        }

        let body = ErrorResponse {
            code: code.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    let version = version_info();
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "rolloutd".to_string(),
        version: version.version,
    })
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    Json(version_info())
}

/// Create environment request
#[derive(Debug, Deserialize)]
pub struct CreateEnvironmentRequest {
    pub name: String,
    pub task_definition: String,
    pub cluster: String,
}

/// Create environment handler
pub async fn create_environment_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<CreateEnvironmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let environment = state
        .store
        .create_environment(&request.name, &request.task_definition, &request.cluster)
        .await?;
    Ok((StatusCode::CREATED, Json(environment)))
}

/// Get environment handler
pub async fn get_environment_handler(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    match state.store.get_environment(&name).await? {
        Some(environment) => Ok(Json(environment)),
        None => Err(ApiError::NotFound(format!("environment {} not found", name))),
    }
}

/// Query parameters accepted when creating a deployment
#[derive(Debug, Default, Deserialize)]
pub struct CreateDeploymentQuery {
    pub token: Option<String>,
}

/// Create deployment handler.
///
/// The concurrency token is taken from `If-Match`, then `?token=`.
pub async fn create_deployment_handler(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
    Query(query): Query<CreateDeploymentQuery>,
    headers: HeaderMap,
) -> Result<Json<Deployment>, ApiError> {
    let token = match if_match_token(&headers)? {
        Some(token) => token,
        None => query.token.unwrap_or_default(),
    };

    let deployment = state.service.create_deployment(&name, &token).await?;
    Ok(Json(deployment))
}

/// Entity tag from `If-Match`, without the weak prefix and quotes
fn if_match_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(value) = headers.get(header::IF_MATCH) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| {
        DeploymentError::InvalidInput("If-Match header is not valid ASCII".to_string())
    })?;
    let tag = value.trim();
    let tag = tag.strip_prefix("W/").unwrap_or(tag);
    Ok(Some(tag.trim_matches('"').to_string()))
}

/// Deployment list response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeploymentListResponse {
    pub items: Vec<Deployment>,
}

/// List deployments handler
pub async fn list_deployments_handler(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
) -> Result<Json<DeploymentListResponse>, ApiError> {
    let items = state.service.list_deployments(&name).await?;
    Ok(Json(DeploymentListResponse { items }))
}

/// Get deployment handler
pub async fn get_deployment_handler(
    State(state): State<Arc<ServerState>>,
    Path((name, id)): Path<(String, String)>,
) -> Result<Json<Deployment>, ApiError> {
    match state.service.get_deployment(&name, &id).await? {
        Some(deployment) => Ok(Json(deployment)),
        None => Err(ApiError::NotFound(format!(
            "deployment {} not found in environment {}",
            id, name
        ))),
    }
}
