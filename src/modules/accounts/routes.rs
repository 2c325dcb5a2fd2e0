use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::AppState;

pub fn account_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(controller::register))
        .route("/register-supplier", post(controller::register_supplier))
        .route("/login", post(controller::login))
        .route("/token/refresh", post(controller::refresh_token))
        .route("/user", get(controller::get_user).put(controller::update_user))
        .route("/verify-email", get(controller::verify_email))
        .route("/verify-email/resend", post(controller::resend_verification))
        .route("/forgot-password", post(controller::forgot_password))
        .route("/reset-password", post(controller::reset_password))
        .route("/change-password", post(controller::change_password))
}
