use axum::{routing::get, Router};
use std::sync::Arc;

use super::controller;
use crate::AppState;

pub fn analytics_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/supplier/analytics", get(controller::dashboard))
        .route("/supplier/analytics/sales", get(controller::sales))
}
