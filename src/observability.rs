use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: HTTP requests served. Labels: method, route, status.
pub const HTTP_REQUESTS_TOTAL: &str = "venuebook_http_requests_total";

/// Histogram: HTTP request latency in seconds. Labels: method, route.
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "venuebook_http_request_duration_seconds";

// ── Booking outcomes ────────────────────────────────────────────

/// Counter: bookings created.
pub const BOOKINGS_CREATED_TOTAL: &str = "venuebook_bookings_created_total";

/// Counter: bookings cancelled.
pub const BOOKINGS_CANCELLED_TOTAL: &str = "venuebook_bookings_cancelled_total";

/// Counter: bookings moved to new dates.
pub const BOOKINGS_RESCHEDULED_TOTAL: &str = "venuebook_bookings_rescheduled_total";

/// Counter: requests refused by a booking rule. Labels: op.
pub const BOOKING_REJECTIONS_TOTAL: &str = "venuebook_booking_rejections_total";

/// Counter: calendar/booking-store disagreements found.
pub const CONSISTENCY_FAULTS_TOTAL: &str = "venuebook_consistency_faults_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: venues loaded.
pub const VENUES_ACTIVE: &str = "venuebook_venues_active";

/// Histogram: WAL group-commit flush duration in seconds.
pub const WAL_FLUSH_DURATION_SECONDS: &str = "venuebook_wal_flush_duration_seconds";

/// Histogram: WAL group-commit batch size (events per flush).
pub const WAL_FLUSH_BATCH_SIZE: &str = "venuebook_wal_flush_batch_size";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), metrics_exporter_prometheus::BuildError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Bucket a response status for the `status` label.
pub fn status_label(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}
