use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

use crate::error::{AdmissionError, VnfError};
use crate::nfv::VnfDescriptor;
use crate::slicing::{QosSpec, ServiceType, SliceId};
use super::dashboard::DashboardServer;

pub fn routes() -> Router<DashboardServer> {
    Router::new()
        .route("/api/v1/slices", post(create_slice).get(list_slices))
        .route(
            "/api/v1/slices/:id",
            get(get_slice).put(update_slice).delete(delete_slice),
        )
        .route("/api/v1/slices/:id/status", get(slice_status))
        .route(
            "/api/v1/slices/:id/vnfs/:vnf_id",
            post(attach_vnf).delete(detach_vnf),
        )
        .route("/api/v1/vnf/catalog", post(register_vnf))
        .route("/api/v1/vnf/instances", post(create_vnf).get(list_vnfs))
        .route(
            "/api/v1/vnf/instances/:id",
            get(vnf_status).delete(terminate_vnf),
        )
        .route("/api/v1/predictor/accuracy", get(predictor_accuracy))
}

/// Maps core errors onto the HTTP surface without leaking internals.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.message }))).into_response()
    }
}

impl From<AdmissionError> for ApiError {
    fn from(err: AdmissionError) -> Self {
        let status = match &err {
            AdmissionError::NotFound(_) => StatusCode::NOT_FOUND,
            AdmissionError::DuplicateId(_) => StatusCode::CONFLICT,
            AdmissionError::InsufficientCapacity { .. } => StatusCode::CONFLICT,
            AdmissionError::InvalidQos(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<VnfError> for ApiError {
    fn from(err: VnfError) -> Self {
        let status = match &err {
            VnfError::DuplicateType(_) => StatusCode::CONFLICT,
            VnfError::UnknownType(_) => StatusCode::NOT_FOUND,
            VnfError::InstanceNotFound(_) => StatusCode::NOT_FOUND,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

#[derive(Deserialize)]
pub struct CreateSliceRequest {
    pub name: String,
    pub qos_requirements: QosSpec,
    pub service_type: ServiceType,
}

#[derive(Deserialize)]
pub struct UpdateSliceRequest {
    pub qos_requirements: Option<QosSpec>,
    pub service_type: Option<ServiceType>,
}

#[derive(Deserialize)]
pub struct RegisterVnfRequest {
    pub vnf_type: String,
    #[serde(flatten)]
    pub descriptor: VnfDescriptor,
}

#[derive(Deserialize)]
pub struct VnfConfig {
    pub vnf_type: String,
    pub instance_name: String,
    #[serde(default = "default_network")]
    pub network: String,
    #[serde(default)]
    pub config: HashMap<String, String>,
}

fn default_network() -> String {
    "default".to_string()
}

async fn create_slice(
    State(server): State<DashboardServer>,
    Json(request): Json<CreateSliceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let slice_id = server
        .arbiter
        .create_slice(&request.name, request.qos_requirements, request.service_type)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "slice_id": slice_id }))))
}

async fn list_slices(State(server): State<DashboardServer>) -> impl IntoResponse {
    let slices = server.arbiter.list_slices().await;
    Json(json!({ "slices": slices }))
}

async fn get_slice(
    State(server): State<DashboardServer>,
    Path(id): Path<SliceId>,
) -> Result<impl IntoResponse, ApiError> {
    let slice = server
        .arbiter
        .get_slice(id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Slice not found: {id}")))?;
    Ok(Json(slice))
}

async fn slice_status(
    State(server): State<DashboardServer>,
    Path(id): Path<SliceId>,
) -> Result<impl IntoResponse, ApiError> {
    let status = server.arbiter.get_slice_status(id).await?;
    Ok(Json(status))
}

async fn update_slice(
    State(server): State<DashboardServer>,
    Path(id): Path<SliceId>,
    Json(request): Json<UpdateSliceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    server
        .arbiter
        .update_slice(id, request.qos_requirements, request.service_type)
        .await?;
    Ok(Json(json!({ "slice_id": id, "status": "updated" })))
}

async fn delete_slice(
    State(server): State<DashboardServer>,
    Path(id): Path<SliceId>,
) -> Result<impl IntoResponse, ApiError> {
    server.arbiter.delete_slice(id).await?;
    Ok(Json(json!({ "slice_id": id, "status": "deleted" })))
}

async fn attach_vnf(
    State(server): State<DashboardServer>,
    Path((id, vnf_id)): Path<(SliceId, String)>,
) -> Result<impl IntoResponse, ApiError> {
    if !server.vnf_manager.exists(&vnf_id) {
        return Err(VnfError::InstanceNotFound(vnf_id).into());
    }
    let attached = server.arbiter.attach_vnf(id, &vnf_id).await?;
    Ok(Json(json!({ "slice_id": id, "vnf_id": vnf_id, "attached": attached })))
}

async fn detach_vnf(
    State(server): State<DashboardServer>,
    Path((id, vnf_id)): Path<(SliceId, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let detached = server.arbiter.detach_vnf(id, &vnf_id).await?;
    Ok(Json(json!({ "slice_id": id, "vnf_id": vnf_id, "detached": detached })))
}

async fn register_vnf(
    State(server): State<DashboardServer>,
    Json(request): Json<RegisterVnfRequest>,
) -> Result<impl IntoResponse, ApiError> {
    server
        .vnf_manager
        .register_vnf(&request.vnf_type, request.descriptor)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "vnf_type": request.vnf_type, "status": "registered" })),
    ))
}

async fn create_vnf(
    State(server): State<DashboardServer>,
    Json(config): Json<VnfConfig>,
) -> Result<impl IntoResponse, ApiError> {
    let instance_id = server.vnf_manager.instantiate_vnf(
        &config.vnf_type,
        &config.instance_name,
        &config.network,
        Some(config.config),
    )?;
    Ok((StatusCode::CREATED, Json(json!({ "instance_id": instance_id }))))
}

async fn list_vnfs(State(server): State<DashboardServer>) -> impl IntoResponse {
    Json(json!({ "vnfs": server.vnf_manager.list_active() }))
}

async fn vnf_status(
    State(server): State<DashboardServer>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let status = server
        .vnf_manager
        .vnf_status(&id)
        .ok_or_else(|| ApiError::not_found(format!("VNF instance not found: {id}")))?;
    Ok(Json(status))
}

async fn terminate_vnf(
    State(server): State<DashboardServer>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    server.vnf_manager.terminate_vnf(&id)?;
    Ok(Json(json!({ "instance_id": id, "status": "terminated" })))
}

async fn predictor_accuracy(
    State(server): State<DashboardServer>,
) -> Result<impl IntoResponse, ApiError> {
    let predictor = server
        .predictor
        .as_ref()
        .ok_or_else(|| ApiError::not_found("Resource predictor is not enabled"))?;
    Ok(Json(json!({
        "model_version": predictor.model_version(),
        "mean_relative_error_pct": predictor.accuracy(),
    })))
}
