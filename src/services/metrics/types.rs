/// Label names shared by every HTTP series, in exposition order.
pub const HTTP_LABELS: [&str; 3] = ["method", "route", "status"];

/// Latency buckets in seconds, from 5ms to 5s.
pub const HTTP_DURATION_BUCKETS: [f64; 10] =
    [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

/// Route label used when neither a pattern nor a path is available
pub const UNKNOWN_ROUTE: &str = "unknown";

/// One completed request, ready to be written into the registry
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSample {
    pub method: String,
    pub route: String,
    pub status: String,
    pub elapsed_secs: f64,
}

impl RequestSample {
    pub fn labels(&self) -> [&str; 3] {
        [&self.method, &self.route, &self.status]
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("Metric {name} is already registered with a different shape")]
    Conflict { name: String },

    #[error("Invalid buckets for {name}: {reason}")]
    InvalidBuckets { name: String, reason: String },

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Observation rejected: {0}")]
    Rejected(String),
}

impl From<std::string::FromUtf8Error> for MetricsError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        MetricsError::Encoding(err.to_string())
    }
}
