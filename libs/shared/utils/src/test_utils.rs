use std::sync::Arc;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Canned PostgREST row payloads matching the store schema.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn doctor_response(id: &str, first_name: &str, last_name: &str) -> Value {
        json!({
            "id": id,
            "first_name": first_name,
            "last_name": last_name,
            "created_at": Utc::now().to_rfc3339()
        })
    }

    pub fn appointment_response(
        id: &str,
        doctor_id: &str,
        patient_first_name: &str,
        patient_last_name: &str,
        date: &str,
        time: &str,
        kind: &str,
    ) -> Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "patient_first_name": patient_first_name,
            "patient_last_name": patient_last_name,
            "date": date,
            "time": time,
            "kind": kind,
            "created_at": Utc::now().to_rfc3339()
        })
    }

    pub fn slot_lock_response(lock_key: &str, doctor_id: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "lock_key": lock_key,
            "doctor_id": doctor_id,
            "acquired_at": Utc::now().to_rfc3339(),
            "expires_at": (Utc::now() + chrono::Duration::seconds(30)).to_rfc3339(),
            "process_id": format!("scheduler_{}", Uuid::new_v4())
        })
    }
}
