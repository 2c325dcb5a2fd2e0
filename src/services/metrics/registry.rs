use prometheus::{CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Central metrics registry for the marketplace API
pub struct MetricsRegistry {
    registry: Registry,

    // HTTP Metrics
    pub http_requests_total: CounterVec,
    pub http_request_duration_seconds: HistogramVec,

    // Business Metrics
    pub orders_created_total: CounterVec,
    pub order_value: HistogramVec,
    pub line_item_status_changes_total: CounterVec,
    pub accounts_registered_total: CounterVec,
    pub uploads_total: CounterVec,
    pub notification_failures_total: CounterVec,

    // Database Metrics
    pub db_connections_active: Gauge,
    pub db_connections_idle: Gauge,
}

impl MetricsRegistry {
    pub fn new() -> Result<Arc<Self>, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = CounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests").namespace("market"),
            &["method", "endpoint", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "HTTP request duration")
                .namespace("market")
                .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["method", "endpoint"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        let orders_created_total = CounterVec::new(
            Opts::new("orders_created_total", "Total orders placed").namespace("market"),
            &["delivery"],
        )?;
        registry.register(Box::new(orders_created_total.clone()))?;

        let order_value = HistogramVec::new(
            HistogramOpts::new("order_value", "Order total including delivery")
                .namespace("market")
                .buckets(vec![100.0, 500.0, 1000.0, 5000.0, 10000.0, 50000.0, 100000.0, 500000.0]),
            &["delivery"],
        )?;
        registry.register(Box::new(order_value.clone()))?;

        let line_item_status_changes_total = CounterVec::new(
            Opts::new("line_item_status_changes_total", "Supplier status updates on order lines")
                .namespace("market"),
            &["status"],
        )?;
        registry.register(Box::new(line_item_status_changes_total.clone()))?;

        let accounts_registered_total = CounterVec::new(
            Opts::new("accounts_registered_total", "Accounts registered").namespace("market"),
            &["role"],
        )?;
        registry.register(Box::new(accounts_registered_total.clone()))?;

        let uploads_total = CounterVec::new(
            Opts::new("uploads_total", "Files written to media storage").namespace("market"),
            &["folder"],
        )?;
        registry.register(Box::new(uploads_total.clone()))?;

        let notification_failures_total = CounterVec::new(
            Opts::new("notification_failures_total", "Emails and SMS that failed to send")
                .namespace("market"),
            &["channel"],
        )?;
        registry.register(Box::new(notification_failures_total.clone()))?;

        let db_connections_active = Gauge::with_opts(
            Opts::new("db_connections_active", "Open pool connections").namespace("market"),
        )?;
        registry.register(Box::new(db_connections_active.clone()))?;

        let db_connections_idle = Gauge::with_opts(
            Opts::new("db_connections_idle", "Idle pool connections").namespace("market"),
        )?;
        registry.register(Box::new(db_connections_idle.clone()))?;

        Ok(Arc::new(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            orders_created_total,
            order_value,
            line_item_status_changes_total,
            accounts_registered_total,
            uploads_total,
            notification_failures_total,
            db_connections_active,
            db_connections_idle,
        }))
    }

    /// Export metrics in Prometheus text format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
