pub mod config;
pub mod modules;
pub mod services;

use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, services::ServeDir, trace::TraceLayer};

use config::{Config, DbPool};
use modules::{
    accounts::account_routes, admin::admin_routes, analytics::analytics_routes, catalog::catalog_routes,
    companies::company_routes, metrics::metrics_routes, orders::order_routes, sites::site_routes,
};
use services::jwt::JwtService;
use services::metrics::{metrics_middleware, BusinessMetrics, MetricsRegistry};
use services::notify::Notifier;
use services::rate_limit::{create_rate_limiter, RateLimitLayer};
use services::security::security_headers;
use services::storage::MediaStorage;

/// Several document slots can arrive in one multipart body.
const FILES_PER_REQUEST: usize = 5;

pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub jwt_service: JwtService,
    pub notifier: Arc<dyn Notifier>,
    pub storage: MediaStorage,
    pub metrics: BusinessMetrics,
}

impl AppState {
    pub fn new(db: DbPool, config: &Config, notifier: Arc<dyn Notifier>) -> Result<Self, prometheus::Error> {
        Ok(Self {
            db,
            config: config.clone(),
            jwt_service: JwtService::new(config.jwt_secret.clone()),
            notifier,
            storage: MediaStorage::new(config.media_root.clone(), config.media_url.clone(), config.max_upload_bytes),
            metrics: BusinessMetrics::new(MetricsRegistry::new()?),
        })
    }
}

pub fn create_app(state: Arc<AppState>) -> Router {
    let rate_limiter = create_rate_limiter(state.config.rate_limit_burst);
    let body_limit = state.config.max_upload_bytes.saturating_mul(FILES_PER_REQUEST);

    let api = Router::new()
        .nest("/accounts", account_routes().merge(company_routes()))
        .nest("/products", catalog_routes())
        .nest("/orders", order_routes().merge(analytics_routes()))
        .nest("/sites", site_routes())
        .nest("/admin", admin_routes());

    Router::new()
        .route("/", get(root))
        .merge(metrics_routes())
        .nest("/api/v1", api)
        .nest_service("/media", ServeDir::new(state.storage.root()))
        .layer(middleware::from_fn_with_state(
            state.metrics.registry().clone(),
            metrics_middleware,
        ))
        .layer(middleware::from_fn(security_headers))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(RateLimitLayer::new(rate_limiter))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "Cable Market API"
}
