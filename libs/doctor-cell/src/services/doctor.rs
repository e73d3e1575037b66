use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;
use chrono::Utc;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Doctor, CreateDoctorRequest, DoctorError};

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Create a new doctor record
    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        debug!("Creating doctor: {} {}", request.first_name, request.last_name);

        if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
            return Err(DoctorError::Validation(
                "first_name and last_name must be non-empty".to_string()
            ));
        }

        let doctor_data = json!({
            "id": Uuid::new_v4(),
            "first_name": request.first_name,
            "last_name": request.last_name,
            "created_at": Utc::now().to_rfc3339()
        });

        let result: Vec<Value> = self.supabase.request_returning(
            Method::POST,
            "/rest/v1/doctors",
            Some(doctor_data),
        ).await.map_err(|e| DoctorError::Database(e.to_string()))?;

        if result.is_empty() {
            return Err(DoctorError::Database("Failed to create doctor".to_string()));
        }

        let doctor: Doctor = serde_json::from_value(result[0].clone())
            .map_err(|e| DoctorError::Database(format!("Failed to parse created doctor: {}", e)))?;

        debug!("Doctor created successfully with ID: {}", doctor.id);
        Ok(doctor)
    }

    /// List all doctors
    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        debug!("Fetching all doctors");

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            "/rest/v1/doctors?select=*",
            None,
        ).await.map_err(|e| DoctorError::Database(e.to_string()))?;

        let doctors: Vec<Doctor> = result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Doctor>, _>>()
            .map_err(|e| DoctorError::Database(format!("Failed to parse doctors: {}", e)))?;

        Ok(doctors)
    }

    /// Get doctor by ID
    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor: {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
        ).await.map_err(|e| DoctorError::Database(e.to_string()))?;

        if result.is_empty() {
            warn!("Doctor not found: {}", doctor_id);
            return Err(DoctorError::NotFound);
        }

        let doctor: Doctor = serde_json::from_value(result[0].clone())
            .map_err(|e| DoctorError::Database(format!("Failed to parse doctor: {}", e)))?;

        Ok(doctor)
    }

    /// Delete doctor by ID. Refuses while appointments still reference the
    /// doctor so the store never holds orphaned rows.
    pub async fn delete_doctor(&self, doctor_id: Uuid) -> Result<(), DoctorError> {
        debug!("Deleting doctor: {}", doctor_id);

        self.get_doctor(doctor_id).await?;

        let count = self.count_doctor_appointments(doctor_id).await?;
        if count > 0 {
            warn!("Refusing to delete doctor {} with {} appointments", doctor_id, count);
            return Err(DoctorError::HasAppointments);
        }

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let _removed: Vec<Value> = self.supabase.request_returning(
            Method::DELETE,
            &path,
            None,
        ).await.map_err(|e| DoctorError::Database(e.to_string()))?;

        debug!("Doctor {} deleted", doctor_id);
        Ok(())
    }

    async fn count_doctor_appointments(&self, doctor_id: Uuid) -> Result<usize, DoctorError> {
        let path = format!("/rest/v1/appointments?doctor_id=eq.{}&select=id", doctor_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
        ).await.map_err(|e| DoctorError::Database(e.to_string()))?;

        Ok(result.len())
    }
}
