//! Prometheus metric families exported by the gateway.
//!
//! Families register into a caller-supplied [`Registry`] rather than a global
//! one, so each server (and each test) owns its own counters.
//!
//! - `conduit_job_output_read_total{status}` and `conduit_job_output_write_total{status}`
//!   count output store access, `status` being `success` or `error`.
//! - `conduit_http_requests_total{route,status}` and
//!   `conduit_http_request_duration_seconds{route}` cover the HTTP surface.

use std::{fmt, time::Duration};

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Label carried by the output store counters.
pub const STATUS_LABEL: &str = "status";

/// Outcome label value of a tracked operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Success,
    Error,
}

impl Outcome {
    pub fn as_label(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Error => "error",
        }
    }

    pub fn of<T, E>(res: &Result<T, E>) -> Self {
        match res {
            Ok(_) => Outcome::Success,
            Err(_) => Outcome::Error,
        }
    }
}

/// Read/write counters for the output store.
#[derive(Clone)]
pub struct OutputStoreMetrics {
    reads: IntCounterVec,
    writes: IntCounterVec,
}

impl OutputStoreMetrics {
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let reads = IntCounterVec::new(
            Opts::new(
                "conduit_job_output_read_total",
                "Job output document reads by outcome",
            ),
            &[STATUS_LABEL],
        )?;
        let writes = IntCounterVec::new(
            Opts::new(
                "conduit_job_output_write_total",
                "Job output document writes by outcome",
            ),
            &[STATUS_LABEL],
        )?;

        registry.register(Box::new(reads.clone()))?;
        registry.register(Box::new(writes.clone()))?;

        Ok(Self { reads, writes })
    }

    pub fn record_read(&self, outcome: Outcome) {
        self.reads.with_label_values(&[outcome.as_label()]).inc();
    }

    pub fn record_write(&self, outcome: Outcome) {
        self.writes.with_label_values(&[outcome.as_label()]).inc();
    }

    pub fn read_count(&self, outcome: Outcome) -> u64 {
        self.reads.with_label_values(&[outcome.as_label()]).get()
    }

    pub fn write_count(&self, outcome: Outcome) -> u64 {
        self.writes.with_label_values(&[outcome.as_label()]).get()
    }
}

impl fmt::Debug for OutputStoreMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputStoreMetrics")
            .field("reads_ok", &self.read_count(Outcome::Success))
            .field("reads_err", &self.read_count(Outcome::Error))
            .field("writes_ok", &self.write_count(Outcome::Success))
            .field("writes_err", &self.write_count(Outcome::Error))
            .finish()
    }
}

/// Per-route request counters and latency.
#[derive(Clone)]
pub struct HttpMetrics {
    requests: IntCounterVec,
    duration: HistogramVec,
}

impl HttpMetrics {
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let requests = IntCounterVec::new(
            Opts::new(
                "conduit_http_requests_total",
                "HTTP requests by route and response status",
            ),
            &["route", "status"],
        )?;
        let duration = HistogramVec::new(
            HistogramOpts::new(
                "conduit_http_request_duration_seconds",
                "HTTP request latency by route",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
            &["route"],
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(duration.clone()))?;

        Ok(Self { requests, duration })
    }

    pub fn observe(&self, route: &str, status: u16, elapsed: Duration) {
        self.requests
            .with_label_values(&[route, &status.to_string()])
            .inc();
        self.duration
            .with_label_values(&[route])
            .observe(elapsed.as_secs_f64());
    }

    pub fn request_count(&self, route: &str, status: u16) -> u64 {
        self.requests
            .with_label_values(&[route, &status.to_string()])
            .get()
    }
}

impl fmt::Debug for HttpMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMetrics").finish_non_exhaustive()
    }
}

/// Renders everything in `registry` in the Prometheus text format.
pub fn encode_text(registry: &Registry) -> Result<String, prometheus::Error> {
    let mut buf = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buf)?;
    String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
