use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{CreateDoctorRequest, DoctorError};
use crate::services::doctor::DoctorService;

fn map_doctor_error(e: DoctorError) -> AppError {
    match e {
        DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
        DoctorError::HasAppointments => {
            AppError::Conflict("Doctor still has appointments; delete them first".to_string())
        }
        DoctorError::Validation(msg) => AppError::Validation(msg),
        DoctorError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    tracing::info!("Adding a new doctor: {} {}", request.first_name, request.last_name);

    let doctor_service = DoctorService::new(&state);

    let doctor = doctor_service.create_doctor(request).await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    tracing::info!("Fetching all doctors");

    let doctor_service = DoctorService::new(&state);

    let doctors = doctor_service.list_doctors().await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    tracing::info!("Fetching doctor with ID: {}", doctor_id);

    let doctor_service = DoctorService::new(&state);

    let doctor = doctor_service.get_doctor(doctor_id).await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    tracing::info!("Attempting to delete doctor with ID: {}", doctor_id);

    let doctor_service = DoctorService::new(&state);

    doctor_service.delete_doctor(doctor_id).await
        .map_err(map_doctor_error)?;

    Ok(StatusCode::NO_CONTENT)
}
