use prometheus::{
    core::Collector, CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::collectors::UptimeCollector;
use super::types::MetricsError;

/// Shape of a registered family, kept so repeated registration can hand back the same handle
#[derive(Clone)]
enum Family {
    Counter {
        labels: Vec<String>,
        handle: CounterVec,
    },
    Histogram {
        labels: Vec<String>,
        buckets: Vec<f64>,
        handle: HistogramVec,
    },
}

/// Process-lifetime metrics registry.
///
/// Constructed once at startup and shared (via `Arc`) between the request
/// middleware, which writes, and the scrape handler, which reads. Series
/// updates go through prometheus' atomic counters, so no extra locking is
/// needed on the hot path; the internal mutex only guards registration.
pub struct MetricsRegistry {
    registry: Registry,
    families: Mutex<HashMap<String, Family>>,
}

impl MetricsRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            registry: Registry::new(),
            families: Mutex::new(HashMap::new()),
        })
    }

    /// Register (or fetch) a counter family keyed by `labels`.
    pub fn counter_vec(
        &self,
        name: &str,
        help: &str,
        labels: &[&str],
    ) -> Result<CounterVec, MetricsError> {
        let mut families = self.families.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = families.get(name) {
            return match existing {
                Family::Counter {
                    labels: registered,
                    handle,
                } if same_labels(registered, labels) => Ok(handle.clone()),
                _ => Err(MetricsError::Conflict {
                    name: name.to_string(),
                }),
            };
        }

        let handle = CounterVec::new(Opts::new(name, help), labels)?;
        self.registry.register(Box::new(handle.clone()))?;

        families.insert(
            name.to_string(),
            Family::Counter {
                labels: owned_labels(labels),
                handle: handle.clone(),
            },
        );
        tracing::debug!(metric = name, "Registered counter");

        Ok(handle)
    }

    /// Register (or fetch) a histogram family with fixed bucket boundaries.
    ///
    /// Buckets are frozen at registration; asking for the same name with
    /// different boundaries is a conflict rather than a resize.
    pub fn histogram_vec(
        &self,
        name: &str,
        help: &str,
        labels: &[&str],
        buckets: &[f64],
    ) -> Result<HistogramVec, MetricsError> {
        validate_buckets(name, buckets)?;

        let mut families = self.families.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = families.get(name) {
            return match existing {
                Family::Histogram {
                    labels: registered,
                    buckets: registered_buckets,
                    handle,
                } if same_labels(registered, labels) && registered_buckets.as_slice() == buckets => {
                    Ok(handle.clone())
                }
                _ => Err(MetricsError::Conflict {
                    name: name.to_string(),
                }),
            };
        }

        let handle = HistogramVec::new(
            HistogramOpts::new(name, help).buckets(buckets.to_vec()),
            labels,
        )?;
        self.registry.register(Box::new(handle.clone()))?;

        families.insert(
            name.to_string(),
            Family::Histogram {
                labels: owned_labels(labels),
                buckets: buckets.to_vec(),
                handle: handle.clone(),
            },
        );
        tracing::debug!(metric = name, buckets = buckets.len(), "Registered histogram");

        Ok(handle)
    }

    /// Register a collector that produces its own series at scrape time
    pub fn register_collector(&self, collector: Box<dyn Collector>) -> Result<(), MetricsError> {
        self.registry.register(collector)?;
        Ok(())
    }

    /// Process and runtime series, independent of request traffic
    pub fn register_default_collectors(&self) -> Result<(), MetricsError> {
        #[cfg(target_os = "linux")]
        self.register_collector(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        self.register_collector(Box::new(UptimeCollector::new()?))?;

        Ok(())
    }

    /// Export metrics in Prometheus text format
    pub fn export(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

fn same_labels(registered: &[String], requested: &[&str]) -> bool {
    registered.len() == requested.len()
        && registered.iter().zip(requested).all(|(a, b)| a == b)
}

fn owned_labels(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|l| l.to_string()).collect()
}

fn validate_buckets(name: &str, buckets: &[f64]) -> Result<(), MetricsError> {
    let invalid = |reason: &str| MetricsError::InvalidBuckets {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if buckets.is_empty() {
        return Err(invalid("no bucket boundaries"));
    }
    if buckets.iter().any(|b| !b.is_finite()) {
        return Err(invalid("boundaries must be finite"));
    }
    if buckets.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(invalid("boundaries must be strictly ascending"));
    }

    Ok(())
}
