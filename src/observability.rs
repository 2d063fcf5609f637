use std::net::SocketAddr;

// ── Mutation counters ───────────────────────────────────────────

/// Counter: bookings created.
pub const BOOKINGS_CREATED_TOTAL: &str = "staybook_bookings_created_total";

/// Counter: creations whose advisory conflict set was non-empty.
pub const CONFLICTS_DETECTED_TOTAL: &str = "staybook_conflicts_detected_total";

/// Counter: payment toggles applied.
pub const PAYMENT_TOGGLES_TOTAL: &str = "staybook_payment_toggles_total";

/// Counter: soft deletes applied.
pub const SOFT_DELETES_TOTAL: &str = "staybook_soft_deletes_total";

// ── Gateway health ──────────────────────────────────────────────

/// Counter: gateway calls that failed.
pub const STORE_FAILURES_TOTAL: &str = "staybook_store_failures_total";

/// Histogram: active bookings per snapshot fetched for a conflict check.
pub const SNAPSHOT_SIZE: &str = "staybook_snapshot_size";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}

/// Plain fmt subscriber for embedders that have not set one up themselves.
pub fn init_tracing() {
    tracing_subscriber::fmt::init();
}
