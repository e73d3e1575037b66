// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveTime, Timelike, Utc};
use std::fmt;
use std::str::FromStr;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_first_name: String,
    pub patient_last_name: String,
    // Plain YYYY-MM-DD text; no calendar-existence check is applied.
    pub date: String,
    // HH:MM text, quarter-hour aligned (see validate_time).
    pub time: String,
    pub kind: AppointmentKind,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn patient_full_name(&self) -> String {
        format!("{} {}", self.patient_first_name, self.patient_last_name)
    }
}

/// Closed set of appointment kinds. The wire/storage form is the exact
/// display text; everything inside the service works with the variants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AppointmentKind {
    #[serde(rename = "New Patient")]
    NewPatient,
    #[serde(rename = "Follow-up")]
    FollowUp,
}

impl fmt::Display for AppointmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentKind::NewPatient => write!(f, "New Patient"),
            AppointmentKind::FollowUp => write!(f, "Follow-up"),
        }
    }
}

impl FromStr for AppointmentKind {
    type Err = AppointmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New Patient" => Ok(AppointmentKind::NewPatient),
            "Follow-up" => Ok(AppointmentKind::FollowUp),
            other => Err(AppointmentError::Validation(
                format!("Unknown appointment kind: {}", other)
            )),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub doctor_id: Uuid,
    pub patient_first_name: String,
    pub patient_last_name: String,
    pub date: String,
    pub time: String,
    // Free text at the boundary, parsed into AppointmentKind before any
    // storage access.
    pub kind: String,
}

// ==============================================================================
// VALIDATION
// ==============================================================================

/// Parse an HH:MM time-of-day string and require the minute component to
/// land on a quarter hour.
pub fn validate_time(value: &str) -> Result<NaiveTime, AppointmentError> {
    let time = NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|e| AppointmentError::Validation(
            format!("Invalid time format or value: {}", e)
        ))?;

    if time.minute() % 15 != 0 {
        return Err(AppointmentError::Validation(
            "Time must be in 15-minute increments".to_string()
        ));
    }

    Ok(time)
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("No more than 3 appointments can be added at the same time slot for a given doctor")]
    SlotCapacityExceeded,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}
