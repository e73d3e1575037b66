// libs/appointment-cell/src/services/capacity.rs
//
// Slot capacity guard: bounds a (doctor, date, time) slot to three
// appointments. The count-then-insert sequence runs under a per-slot store
// lock so concurrent bookings of the same slot serialize instead of both
// observing a free slot.

use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, AppointmentError};

pub const MAX_APPOINTMENTS_PER_SLOT: usize = 3;

pub struct SlotCapacityService {
    supabase: Arc<SupabaseClient>,
    lock_timeout_seconds: u64,
    max_retry_attempts: u32,
}

impl SlotCapacityService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self {
            supabase,
            lock_timeout_seconds: 30,
            max_retry_attempts: 3,
        }
    }

    /// Insert `appointment_data` into the slot, failing with
    /// `SlotCapacityExceeded` when the slot already holds the maximum.
    /// Lock contention is retried with linear backoff.
    pub async fn insert_guarded(
        &self,
        doctor_id: Uuid,
        date: &str,
        time: &str,
        appointment_data: Value,
    ) -> Result<Appointment, AppointmentError> {
        let lock_key = self.slot_lock_key(doctor_id, date, time);

        for attempt in 1..=self.max_retry_attempts {
            debug!("Guarded insert attempt {} for slot {}", attempt, lock_key);

            if !self.acquire_slot_lock(&lock_key, doctor_id).await? {
                if attempt < self.max_retry_attempts {
                    warn!("Slot lock contended, retrying attempt {}/{}",
                          attempt, self.max_retry_attempts);
                    tokio::time::sleep(
                        tokio::time::Duration::from_millis(100 * attempt as u64)
                    ).await;
                }
                continue;
            }

            let outcome = self.insert_under_lock(doctor_id, date, time, &appointment_data).await;
            self.release_slot_lock(&lock_key).await?;
            return outcome;
        }

        Err(AppointmentError::Database(
            format!("Could not acquire slot lock after {} attempts: {}",
                    self.max_retry_attempts, lock_key)
        ))
    }

    /// Count existing appointments in the slot.
    pub async fn count_slot_appointments(
        &self,
        doctor_id: Uuid,
        date: &str,
        time: &str,
    ) -> Result<usize, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&time=eq.{}&select=id",
            doctor_id,
            urlencoding::encode(date),
            urlencoding::encode(time),
        );

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
        ).await.map_err(|e| AppointmentError::Database(e.to_string()))?;

        Ok(result.len())
    }

    async fn insert_under_lock(
        &self,
        doctor_id: Uuid,
        date: &str,
        time: &str,
        appointment_data: &Value,
    ) -> Result<Appointment, AppointmentError> {
        let count = self.count_slot_appointments(doctor_id, date, time).await?;
        if count >= MAX_APPOINTMENTS_PER_SLOT {
            warn!("Slot full for doctor {} on {} at {} ({} appointments)",
                  doctor_id, date, time, count);
            return Err(AppointmentError::SlotCapacityExceeded);
        }

        let result: Vec<Value> = self.supabase.request_returning(
            Method::POST,
            "/rest/v1/appointments",
            Some(appointment_data.clone()),
        ).await.map_err(|e| AppointmentError::Database(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::Database("Failed to create appointment".to_string()));
        }

        let appointment: Appointment = serde_json::from_value(result[0].clone())
            .map_err(|e| AppointmentError::Database(
                format!("Failed to parse created appointment: {}", e)
            ))?;

        Ok(appointment)
    }

    /// Acquire the slot lock by inserting its row; an insert conflict means
    /// another booking holds the slot.
    async fn acquire_slot_lock(
        &self,
        lock_key: &str,
        doctor_id: Uuid,
    ) -> Result<bool, AppointmentError> {
        match self.try_insert_lock(lock_key, doctor_id).await {
            Ok(()) => {
                debug!("Slot lock acquired: {}", lock_key);
                Ok(true)
            }
            Err(_) => {
                // Lock row exists; a holder that crashed leaves an expired
                // row behind, which is cleaned up before one more attempt.
                if self.cleanup_expired_lock(lock_key).await? {
                    Ok(self.try_insert_lock(lock_key, doctor_id).await.is_ok())
                } else {
                    Ok(false)
                }
            }
        }
    }

    async fn try_insert_lock(
        &self,
        lock_key: &str,
        doctor_id: Uuid,
    ) -> Result<(), AppointmentError> {
        let lock_data = json!({
            "lock_key": lock_key,
            "doctor_id": doctor_id,
            "acquired_at": Utc::now().to_rfc3339(),
            "expires_at": (Utc::now() + Duration::seconds(self.lock_timeout_seconds as i64)).to_rfc3339(),
            "process_id": format!("scheduler_{}", Uuid::new_v4())
        });

        self.supabase
            .request_returning::<Vec<Value>>(
                Method::POST,
                "/rest/v1/slot_locks",
                Some(lock_data),
            )
            .await
            .map(|_| ())
            .map_err(|e| AppointmentError::Database(e.to_string()))
    }

    async fn release_slot_lock(&self, lock_key: &str) -> Result<(), AppointmentError> {
        let path = format!("/rest/v1/slot_locks?lock_key=eq.{}", urlencoding::encode(lock_key));
        let _removed: Vec<Value> = self.supabase.request_returning(
            Method::DELETE,
            &path,
            None,
        ).await.map_err(|e| AppointmentError::Database(format!("Lock release failed: {}", e)))?;

        debug!("Slot lock released: {}", lock_key);
        Ok(())
    }

    async fn cleanup_expired_lock(&self, lock_key: &str) -> Result<bool, AppointmentError> {
        let path = format!(
            "/rest/v1/slot_locks?lock_key=eq.{}&select=*",
            urlencoding::encode(lock_key)
        );
        let locks: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
        ).await.map_err(|e| AppointmentError::Database(format!("Lock check failed: {}", e)))?;

        if let Some(lock) = locks.first() {
            if let Some(expires_at) = lock.get("expires_at").and_then(|v| v.as_str()) {
                if let Ok(expires_at) = DateTime::parse_from_rfc3339(expires_at) {
                    if expires_at.with_timezone(&Utc) < Utc::now() {
                        self.release_slot_lock(lock_key).await?;
                        return Ok(true);
                    }
                }
            }
        }

        Ok(false)
    }

    fn slot_lock_key(&self, doctor_id: Uuid, date: &str, time: &str) -> String {
        format!("slot_{}_{}_{}", doctor_id, date, time)
    }
}
