use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::AppState;

pub fn catalog_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/main-categories", get(controller::main_categories))
        .route("/products", get(controller::list_products))
        .route("/products/filter-data", get(controller::filter_data))
        .route("/products/{id}", get(controller::get_product))
        .route("/products/{id}/similar", get(controller::similar_products))
        .route("/products/{id}/favourite", post(controller::add_favourite))
        .route("/products/{id}/favourite/remove", delete(controller::remove_favourite))
        .route("/favourites", get(controller::list_favourites))
}
