use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::AppState;

pub fn site_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/contact", get(controller::get_contact))
        .route("/partners", get(controller::list_partners))
        .route("/request", post(controller::create_inquiry))
}
