use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::MetricsRegistry;
use crate::config::DbPool;

/// Thin recording helpers used by handlers for domain events.
#[derive(Clone)]
pub struct BusinessMetrics {
    metrics: Arc<MetricsRegistry>,
}

impl BusinessMetrics {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self { metrics }
    }

    pub fn registry(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    pub fn record_order_created(&self, delivery: Option<&str>, total: Decimal) {
        let delivery = delivery.unwrap_or("none");
        self.metrics.orders_created_total.with_label_values(&[delivery]).inc();
        self.metrics
            .order_value
            .with_label_values(&[delivery])
            .observe(total.to_f64().unwrap_or_default());
    }

    pub fn record_status_change(&self, status: &str) {
        self.metrics
            .line_item_status_changes_total
            .with_label_values(&[status])
            .inc();
    }

    pub fn record_registration(&self, role: &str) {
        self.metrics.accounts_registered_total.with_label_values(&[role]).inc();
    }

    pub fn record_upload(&self, folder: &str) {
        self.metrics.uploads_total.with_label_values(&[folder]).inc();
    }

    pub fn record_notification_failure(&self, channel: &str) {
        self.metrics
            .notification_failures_total
            .with_label_values(&[channel])
            .inc();
    }

    pub fn observe_pool(&self, pool: &DbPool) {
        let size = pool.size() as f64;
        let idle = pool.num_idle() as f64;
        self.metrics.db_connections_active.set(size - idle);
        self.metrics.db_connections_idle.set(idle);
    }
}
