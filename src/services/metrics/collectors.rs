use prometheus::{
    core::{Collector, Desc},
    proto::MetricFamily,
    CounterVec, Gauge, HistogramVec,
};
use std::time::Instant;

use super::types::{MetricsError, RequestSample, HTTP_DURATION_BUCKETS, HTTP_LABELS};
use super::MetricsRegistry;

/// Sink for completed requests.
///
/// The middleware only talks to this trait, so a backend that fails can be
/// swapped in without touching the request path.
pub trait RequestObserver: Send + Sync {
    fn observe(&self, sample: &RequestSample) -> Result<(), MetricsError>;
}

/// Collector for HTTP request metrics
pub struct HttpMetrics {
    requests_total: CounterVec,
    request_duration_seconds: HistogramVec,
}

impl HttpMetrics {
    pub const REQUESTS_TOTAL: &'static str = "http_requests_total";
    pub const REQUEST_DURATION_SECONDS: &'static str = "http_request_duration_seconds";

    pub fn register(metrics: &MetricsRegistry) -> Result<Self, MetricsError> {
        let requests_total =
            metrics.counter_vec(Self::REQUESTS_TOTAL, "Total HTTP requests", &HTTP_LABELS)?;

        let request_duration_seconds = metrics.histogram_vec(
            Self::REQUEST_DURATION_SECONDS,
            "HTTP request duration in seconds",
            &HTTP_LABELS,
            &HTTP_DURATION_BUCKETS,
        )?;

        Ok(Self {
            requests_total,
            request_duration_seconds,
        })
    }
}

impl RequestObserver for HttpMetrics {
    fn observe(&self, sample: &RequestSample) -> Result<(), MetricsError> {
        if !sample.elapsed_secs.is_finite() || sample.elapsed_secs < 0.0 {
            return Err(MetricsError::Rejected(format!(
                "duration {} is not a valid observation",
                sample.elapsed_secs
            )));
        }

        let labels = sample.labels();

        // Resolve both series before touching either, so a failure never leaves
        // the counter and histogram out of step.
        let counter = self.requests_total.get_metric_with_label_values(&labels)?;
        let histogram = self
            .request_duration_seconds
            .get_metric_with_label_values(&labels)?;

        counter.inc();
        histogram.observe(sample.elapsed_secs);

        Ok(())
    }
}

/// Reports seconds since the collector was created, sampled at scrape time
pub struct UptimeCollector {
    started: Instant,
    gauge: Gauge,
}

impl UptimeCollector {
    pub fn new() -> Result<Self, MetricsError> {
        let gauge = Gauge::new(
            "process_uptime_seconds",
            "Time since the service started in seconds",
        )?;

        Ok(Self {
            started: Instant::now(),
            gauge,
        })
    }
}

impl Collector for UptimeCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.gauge.desc()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.gauge.set(self.started.elapsed().as_secs_f64());
        self.gauge.collect()
    }
}
