use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::AppState;

/// Mounted next to the account routes.
pub fn company_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/company", get(controller::get_my_company))
        .route("/companies/{id}", get(controller::get_company))
        .route("/companies/{id}/update", put(controller::update_company))
        .route(
            "/companies/{id}/documents",
            put(controller::replace_documents).post(controller::upload_documents),
        )
}
