use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::AppState;

pub fn order_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/delivery-methods", get(controller::delivery_methods))
        .route("/payment-methods", get(controller::payment_methods))
        .route("/create", post(controller::create_order))
        .route("/my-orders", get(controller::my_orders))
        .route("/{id}", get(controller::get_order))
        .route("/supplier/orders", get(controller::supplier_orders))
        .route("/supplier/orders/{id}", get(controller::supplier_order))
        .route(
            "/supplier/orders/{order_id}/products/{line_item_id}/status",
            patch(controller::update_line_item_status),
        )
}
