use axum_test::TestServer;
use stack_sample::{
    build_router,
    config::Config,
    services::metrics::{MetricsError, MetricsRegistry, RequestObserver, RequestSample},
    AppState,
};
use std::sync::Arc;

// Allow dead_code for utilities used by other test files
#[allow(dead_code)]
pub struct TestContext {
    pub server: TestServer,
}

#[allow(dead_code)]
impl TestContext {
    /// Full application, as `main` builds it
    pub fn new() -> Self {
        let app = stack_sample::create_app(&Config::default()).expect("Failed to build app");
        let server = TestServer::new(app).expect("Failed to create test server");

        Self { server }
    }

    /// Application whose request metrics go to `observer` instead of the registry
    pub fn with_observer(observer: Arc<dyn RequestObserver>) -> Self {
        let state = Arc::new(AppState::new("test-service", MetricsRegistry::new()));
        let app = build_router(state, observer, Config::default().body_limit_bytes);
        let server = TestServer::new(app).expect("Failed to create test server");

        Self { server }
    }

    pub async fn scrape(&self) -> String {
        let response = self.server.get("/metrics").await;
        response.assert_status_ok();
        response.text()
    }
}

/// Value of the series whose exposition line starts with `series`
#[allow(dead_code)]
pub fn series_value(exposition: &str, series: &str) -> Option<f64> {
    exposition
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let (name, value) = line.rsplit_once(' ')?;
            (name == series).then(|| value.parse().ok()).flatten()
        })
}

#[allow(dead_code)]
pub struct FailingObserver;

impl RequestObserver for FailingObserver {
    fn observe(&self, _sample: &RequestSample) -> Result<(), MetricsError> {
        Err(MetricsError::Rejected("backend unavailable".to_string()))
    }
}

#[allow(dead_code)]
pub struct PanickingObserver;

impl RequestObserver for PanickingObserver {
    fn observe(&self, _sample: &RequestSample) -> Result<(), MetricsError> {
        panic!("metrics backend exploded");
    }
}

#[allow(dead_code)]
pub fn sample(route: &str, status: &str, elapsed_secs: f64) -> RequestSample {
    RequestSample {
        method: "GET".to_string(),
        route: route.to_string(),
        status: status.to_string(),
        elapsed_secs,
    }
}
