//! Process and handler metrics in the Prometheus text exposition format.
//!
//! Counters are monotonic and reset only on process start. Everything is
//! lock-free so `/metrics` stays responsive even while the store is down;
//! nothing here ever touches the database.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Instant;

use axum::http::StatusCode;
use roster_core::error::CoreError;
use roster_db::PoolStatus;

use crate::process::ProcessStats;

/// `Content-Type` of the rendered payload.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Record operations tracked per outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOp {
    List,
    Create,
    Update,
    Delete,
}

impl RecordOp {
    const ALL: [RecordOp; 4] = [
        RecordOp::List,
        RecordOp::Create,
        RecordOp::Update,
        RecordOp::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecordOp::List => "list",
            RecordOp::Create => "create",
            RecordOp::Update => "update",
            RecordOp::Delete => "delete",
        }
    }
}

/// Classified result of a record operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Validation,
    Conflict,
    NotFound,
    Internal,
}

impl Outcome {
    const ALL: [Outcome; 5] = [
        Outcome::Ok,
        Outcome::Validation,
        Outcome::Conflict,
        Outcome::NotFound,
        Outcome::Internal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Validation => "validation",
            Outcome::Conflict => "conflict",
            Outcome::NotFound => "not_found",
            Outcome::Internal => "internal",
        }
    }

    pub fn of<T>(result: &Result<T, CoreError>) -> Self {
        match result {
            Ok(_) => Outcome::Ok,
            Err(CoreError::Validation(_)) => Outcome::Validation,
            Err(CoreError::Conflict(_)) => Outcome::Conflict,
            Err(CoreError::NotFound { .. }) => Outcome::NotFound,
            Err(CoreError::Internal(_)) => Outcome::Internal,
        }
    }
}

const STATUS_CLASSES: [&str; 5] = ["1xx", "2xx", "3xx", "4xx", "5xx"];

/// Registry of process-wide counters and gauges.
#[derive(Debug)]
pub struct Metrics {
    started_at: Instant,
    start_time_seconds: i64,
    http_requests: [AtomicU64; 5],
    http_in_flight: AtomicI64,
    not_found_routes: AtomicU64,
    record_ops: [[AtomicU64; 5]; 4],
    bootstrap_attempts: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            started_at: Instant::now(),
            start_time_seconds: chrono::Utc::now().timestamp(),
            http_requests: Default::default(),
            http_in_flight: AtomicI64::new(0),
            not_found_routes: AtomicU64::new(0),
            record_ops: Default::default(),
            bootstrap_attempts: AtomicU64::new(0),
        }
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a finished HTTP request by status class.
    pub fn observe_response(&self, status: StatusCode) {
        let class = (status.as_u16() / 100).clamp(1, 5) as usize - 1;
        self.http_requests[class].fetch_add(1, Ordering::Relaxed);
    }

    pub fn request_started(&self) {
        self.http_in_flight.fetch_add(1, Ordering::Relaxed);
    }

    pub fn request_finished(&self) {
        self.http_in_flight.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn increment_not_found_routes(&self) {
        self.not_found_routes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_record_op(&self, op: RecordOp, outcome: Outcome) {
        self.record_ops[op as usize][outcome as usize].fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_bootstrap_attempts(&self, attempts: u32) {
        self.bootstrap_attempts
            .store(u64::from(attempts), Ordering::Relaxed);
    }

    pub fn record_op_count(&self, op: RecordOp, outcome: Outcome) -> u64 {
        self.record_ops[op as usize][outcome as usize].load(Ordering::Relaxed)
    }

    pub fn http_requests_total(&self) -> u64 {
        self.http_requests
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .sum()
    }

    /// Render all metrics. `pool` comes from the store adapter, if pooled.
    pub fn render(&self, pool: Option<PoolStatus>) -> String {
        self.render_with(pool, ProcessStats::collect())
    }

    fn render_with(&self, pool: Option<PoolStatus>, process: Option<ProcessStats>) -> String {
        let mut out = String::with_capacity(4096);

        gauge(
            &mut out,
            "process_start_time_seconds",
            "Start time of the process since unix epoch in seconds.",
            self.start_time_seconds as f64,
        );
        gauge(
            &mut out,
            "roster_process_uptime_seconds",
            "Seconds since the process started.",
            self.started_at.elapsed().as_secs_f64(),
        );
        if let Some(process) = process {
            render_process(&mut out, &process);
        }
        gauge(
            &mut out,
            "roster_bootstrap_attempts",
            "Attempts the bootstrap sequencer needed to reach the store.",
            self.bootstrap_attempts.load(Ordering::Relaxed) as f64,
        );

        header(
            &mut out,
            "roster_http_requests_total",
            "HTTP requests served, by status class.",
            "counter",
        );
        for (class, counter) in STATUS_CLASSES.iter().zip(&self.http_requests) {
            let _ = writeln!(
                out,
                "roster_http_requests_total{{class=\"{class}\"}} {}",
                counter.load(Ordering::Relaxed)
            );
        }

        gauge(
            &mut out,
            "roster_http_requests_in_flight",
            "HTTP requests currently being handled.",
            self.http_in_flight.load(Ordering::Relaxed) as f64,
        );

        header(
            &mut out,
            "roster_http_unmatched_routes_total",
            "Requests that matched no route.",
            "counter",
        );
        let _ = writeln!(
            out,
            "roster_http_unmatched_routes_total {}",
            self.not_found_routes.load(Ordering::Relaxed)
        );

        header(
            &mut out,
            "roster_record_operations_total",
            "Record service operations, by operation and outcome.",
            "counter",
        );
        for op in RecordOp::ALL {
            for outcome in Outcome::ALL {
                let _ = writeln!(
                    out,
                    "roster_record_operations_total{{operation=\"{}\",outcome=\"{}\"}} {}",
                    op.as_str(),
                    outcome.as_str(),
                    self.record_op_count(op, outcome)
                );
            }
        }

        if let Some(pool) = pool {
            gauge(
                &mut out,
                "roster_db_pool_connections",
                "Open pool connections, idle or in use.",
                f64::from(pool.size),
            );
            gauge(
                &mut out,
                "roster_db_pool_idle_connections",
                "Open pool connections not checked out.",
                f64::from(pool.idle),
            );
            gauge(
                &mut out,
                "roster_db_pool_max_connections",
                "Fixed pool capacity.",
                f64::from(pool.max),
            );
        }

        out
    }
}

fn render_process(out: &mut String, process: &ProcessStats) {
    counter(
        out,
        "process_cpu_user_seconds_total",
        "Total user CPU time spent in seconds.",
        process.cpu_user_seconds,
    );
    counter(
        out,
        "process_cpu_system_seconds_total",
        "Total system CPU time spent in seconds.",
        process.cpu_system_seconds,
    );
    counter(
        out,
        "process_cpu_seconds_total",
        "Total user and system CPU time spent in seconds.",
        process.cpu_seconds(),
    );
    gauge(
        out,
        "process_virtual_memory_bytes",
        "Virtual memory size in bytes.",
        process.virtual_memory_bytes as f64,
    );
    if let Some(rss) = process.resident_memory_bytes {
        gauge(
            out,
            "process_resident_memory_bytes",
            "Resident memory size in bytes.",
            rss as f64,
        );
    }
    if let Some(open) = process.open_fds {
        gauge(
            out,
            "process_open_fds",
            "Number of open file descriptors.",
            open as f64,
        );
    }
    if let Some(max) = process.max_fds {
        gauge(
            out,
            "process_max_fds",
            "Maximum number of open file descriptors.",
            max as f64,
        );
    }
}

fn header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {name} {help}");
    let _ = writeln!(out, "# TYPE {name} {kind}");
}

fn gauge(out: &mut String, name: &str, help: &str, value: f64) {
    header(out, name, help, "gauge");
    let _ = writeln!(out, "{name} {value}");
}

fn counter(out: &mut String, name: &str, help: &str, value: f64) {
    header(out, name, help, "counter");
    let _ = writeln!(out, "{name} {value}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classes_are_counted() {
        let metrics = Metrics::new();
        metrics.observe_response(StatusCode::OK);
        metrics.observe_response(StatusCode::CREATED);
        metrics.observe_response(StatusCode::NOT_FOUND);
        metrics.observe_response(StatusCode::INTERNAL_SERVER_ERROR);

        let text = metrics.render(None);
        assert!(text.contains("roster_http_requests_total{class=\"2xx\"} 2"));
        assert!(text.contains("roster_http_requests_total{class=\"4xx\"} 1"));
        assert!(text.contains("roster_http_requests_total{class=\"5xx\"} 1"));
        assert_eq!(metrics.http_requests_total(), 4);
    }

    #[test]
    fn record_outcomes_are_labelled() {
        let metrics = Metrics::new();
        let conflict: Result<(), CoreError> = Err(CoreError::Conflict("dup".into()));
        metrics.observe_record_op(RecordOp::Create, Outcome::of(&conflict));
        metrics.observe_record_op(RecordOp::Create, Outcome::Ok);

        let text = metrics.render(None);
        assert!(text.contains(
            "roster_record_operations_total{operation=\"create\",outcome=\"conflict\"} 1"
        ));
        assert!(
            text.contains("roster_record_operations_total{operation=\"create\",outcome=\"ok\"} 1")
        );
        assert!(text.contains(
            "roster_record_operations_total{operation=\"delete\",outcome=\"not_found\"} 0"
        ));
    }

    #[test]
    fn pool_gauges_only_when_reported() {
        let metrics = Metrics::new();
        assert!(!metrics.render(None).contains("roster_db_pool"));

        let text = metrics.render(Some(PoolStatus {
            size: 3,
            idle: 2,
            max: 10,
        }));
        assert!(text.contains("roster_db_pool_connections 3"));
        assert!(text.contains("roster_db_pool_idle_connections 2"));
        assert!(text.contains("roster_db_pool_max_connections 10"));
    }

    #[test]
    fn every_sample_has_a_type_line() {
        let metrics = Metrics::new();
        metrics.set_bootstrap_attempts(4);
        let text = metrics.render(None);

        assert!(text.contains("# TYPE roster_bootstrap_attempts gauge"));
        assert!(text.contains("roster_bootstrap_attempts 4"));
        assert!(text.contains("# TYPE roster_process_uptime_seconds gauge"));
    }

    #[test]
    fn process_stats_are_rendered() {
        let metrics = Metrics::new();
        let text = metrics.render_with(
            None,
            Some(ProcessStats {
                cpu_user_seconds: 1.5,
                cpu_system_seconds: 0.5,
                virtual_memory_bytes: 104_857_600,
                resident_memory_bytes: Some(8_388_608),
                open_fds: Some(12),
                max_fds: Some(1024),
            }),
        );

        assert!(text.contains("# TYPE process_cpu_seconds_total counter"));
        assert!(text.contains("process_cpu_user_seconds_total 1.5"));
        assert!(text.contains("process_cpu_system_seconds_total 0.5"));
        assert!(text.contains("process_cpu_seconds_total 2"));
        assert!(text.contains("process_virtual_memory_bytes 104857600"));
        assert!(text.contains("process_resident_memory_bytes 8388608"));
        assert!(text.contains("process_open_fds 12"));
        assert!(text.contains("process_max_fds 1024"));
    }

    #[test]
    fn missing_process_values_are_omitted() {
        let metrics = Metrics::new();
        let text = metrics.render_with(
            None,
            Some(ProcessStats {
                resident_memory_bytes: None,
                open_fds: None,
                max_fds: None,
                ..ProcessStats::default()
            }),
        );
        assert!(text.contains("process_cpu_seconds_total 0"));
        assert!(!text.contains("process_open_fds"));
        assert!(!text.contains("process_max_fds"));

        assert!(!metrics.render_with(None, None).contains("process_cpu"));
    }
}
