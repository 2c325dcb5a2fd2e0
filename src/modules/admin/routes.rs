use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::AppState;

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/accounts", get(controller::list_accounts))
        .route("/accounts/{id}", patch(controller::update_account))
        .route("/categories", post(controller::create_category))
        .route(
            "/categories/{id}",
            put(controller::update_category).delete(controller::delete_category),
        )
        .route("/categories/{id}/image", post(controller::upload_category_image))
        .route("/products", post(controller::create_product))
        .route(
            "/products/{id}",
            put(controller::update_product).delete(controller::delete_product),
        )
        .route("/products/{id}/images", post(controller::add_product_image))
        .route("/products/{id}/images/{image_id}", delete(controller::delete_product_image))
        .route("/products/{id}/meterages", post(controller::add_meterage))
        .route("/products/{id}/meterages/{meterage_id}", delete(controller::delete_meterage))
        .route("/delivery-methods", post(controller::create_delivery_method))
        .route("/delivery-methods/{id}", delete(controller::delete_delivery_method))
        .route("/payment-methods", post(controller::create_payment_method))
        .route("/payment-methods/{id}", delete(controller::delete_payment_method))
        .route("/contact", put(controller::update_contact))
        .route("/partners", post(controller::create_partner))
        .route("/partners/{id}", delete(controller::delete_partner))
        .route("/requests", get(controller::list_requests))
}
