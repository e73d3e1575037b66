// libs/appointment-cell/src/services/booking.rs
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;
use chrono::Utc;
use std::sync::Arc;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    Appointment, AppointmentError, AppointmentKind, CreateAppointmentRequest,
    validate_time,
};
use crate::services::capacity::SlotCapacityService;

pub struct AppointmentBookingService {
    supabase: Arc<SupabaseClient>,
    capacity_service: SlotCapacityService,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let capacity_service = SlotCapacityService::new(Arc::clone(&supabase));

        Self {
            supabase,
            capacity_service,
        }
    }

    /// Book an appointment into a slot, subject to the slot capacity rule.
    pub async fn book_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!("Booking appointment for doctor {} on {} at {}",
              request.doctor_id, request.date, request.time);

        // Validation runs before any storage access.
        let kind = self.validate_booking_request(&request)?;

        self.verify_doctor_exists(request.doctor_id).await?;

        let appointment_data = json!({
            "id": Uuid::new_v4(),
            "doctor_id": request.doctor_id,
            "patient_first_name": request.patient_first_name,
            "patient_last_name": request.patient_last_name,
            "date": request.date,
            "time": request.time,
            "kind": kind.to_string(),
            "created_at": Utc::now().to_rfc3339()
        });

        let appointment = self.capacity_service
            .insert_guarded(request.doctor_id, &request.date, &request.time, appointment_data)
            .await?;

        info!("Appointment {} booked successfully with doctor {}",
              appointment.id, appointment.doctor_id);
        Ok(appointment)
    }

    /// List all appointments for a doctor on a given date.
    pub async fn list_appointments(
        &self,
        doctor_id: Uuid,
        date: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Fetching appointments for doctor {} on {}", doctor_id, date);

        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&select=*",
            doctor_id,
            urlencoding::encode(date),
        );

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
        ).await.map_err(|e| AppointmentError::Database(e.to_string()))?;

        let appointments: Vec<Appointment> = result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::Database(
                format!("Failed to parse appointments: {}", e)
            ))?;

        Ok(appointments)
    }

    /// Get appointment by ID
    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
        ).await.map_err(|e| AppointmentError::Database(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        let appointment: Appointment = serde_json::from_value(result[0].clone())
            .map_err(|e| AppointmentError::Database(
                format!("Failed to parse appointment: {}", e)
            ))?;

        Ok(appointment)
    }

    /// Delete appointment by ID.
    pub async fn delete_appointment(&self, appointment_id: Uuid) -> Result<(), AppointmentError> {
        debug!("Deleting appointment: {}", appointment_id);

        self.get_appointment(appointment_id).await?;

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let _removed: Vec<Value> = self.supabase.request_returning(
            Method::DELETE,
            &path,
            None,
        ).await.map_err(|e| AppointmentError::Database(e.to_string()))?;

        debug!("Appointment {} deleted", appointment_id);
        Ok(())
    }

    fn validate_booking_request(
        &self,
        request: &CreateAppointmentRequest,
    ) -> Result<AppointmentKind, AppointmentError> {
        if request.patient_first_name.trim().is_empty()
            || request.patient_last_name.trim().is_empty() {
            return Err(AppointmentError::Validation(
                "patient_first_name and patient_last_name must be non-empty".to_string()
            ));
        }

        validate_time(&request.time)?;

        request.kind.parse::<AppointmentKind>()
    }

    async fn verify_doctor_exists(&self, doctor_id: Uuid) -> Result<(), AppointmentError> {
        let path = format!("/rest/v1/doctors?id=eq.{}&select=id", doctor_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
        ).await.map_err(|e| AppointmentError::Database(e.to_string()))?;

        if result.is_empty() {
            warn!("Doctor not found for booking: {}", doctor_id);
            return Err(AppointmentError::DoctorNotFound);
        }

        Ok(())
    }
}
