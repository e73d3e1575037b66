// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, delete},
};

use shared_config::AppConfig;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::create_appointment))
        .route("/{doctor_id}/{date}", get(handlers::list_appointments))
        .route("/{appointment_id}", delete(handlers::delete_appointment))
        .with_state(state)
}
