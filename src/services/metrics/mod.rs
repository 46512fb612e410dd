pub mod collectors;
pub mod middleware;
pub mod registry;
pub mod types;

pub use collectors::{HttpMetrics, RequestObserver};
pub use middleware::metrics_middleware;
pub use registry::MetricsRegistry;
pub use types::{MetricsError, RequestSample};
