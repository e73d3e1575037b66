// libs/appointment-cell/src/handlers.rs
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

use crate::models::{AppointmentError, CreateAppointmentRequest};
use crate::services::booking::AppointmentBookingService;

fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
        AppointmentError::SlotCapacityExceeded => AppError::BadRequest(e.to_string()),
        AppointmentError::Validation(msg) => AppError::Validation(msg),
        AppointmentError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    tracing::info!("Adding new appointment for doctor ID {}", request.doctor_id);

    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service.book_appointment(request).await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
    Path((doctor_id, date)): Path<(Uuid, String)>,
) -> Result<Json<Value>, AppError> {
    tracing::info!("Fetching appointments for doctor ID {} on date {}", doctor_id, date);

    let booking_service = AppointmentBookingService::new(&state);

    let appointments = booking_service.list_appointments(doctor_id, &date).await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    tracing::info!("Deleting appointment with ID: {}", appointment_id);

    let booking_service = AppointmentBookingService::new(&state);

    booking_service.delete_appointment(appointment_id).await
        .map_err(map_appointment_error)?;

    Ok(StatusCode::NO_CONTENT)
}
