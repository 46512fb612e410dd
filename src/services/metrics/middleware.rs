use axum::{
    body::{Body, Bytes},
    extract::{MatchedPath, NestedPath, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use http_body::{Body as HttpBody, Frame, SizeHint};
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use super::collectors::RequestObserver;
use super::types::{RequestSample, UNKNOWN_ROUTE};

/// Middleware to collect HTTP request metrics.
///
/// Must be installed with `Router::layer` so it runs after routing and can see
/// the matched pattern. The observation is deferred until the response body
/// has been fully produced; a body abandoned mid-stream records nothing.
pub async fn metrics_middleware(
    State(observer): State<Arc<dyn RequestObserver>>,
    req: Request,
    next: Next,
) -> Response {
    let context = RequestContext::begin(&req);

    // Process request
    let response = next.run(req).await;

    let pending = PendingObservation {
        context,
        status: response.status().as_u16().to_string(),
        observer,
    };

    let (parts, body) = response.into_parts();
    Response::from_parts(parts, Body::new(CompletionBody::new(body, pending)))
}

/// Pick the label that identifies the route, keeping cardinality bounded.
///
/// Order: matched pattern, then the nest prefix, then the raw path, then
/// `"unknown"`. Empty strings count as absent.
pub fn resolve_route_label(matched: Option<&str>, base: Option<&str>, path: &str) -> String {
    [matched, base, Some(path)]
        .into_iter()
        .flatten()
        .find(|candidate| !candidate.is_empty())
        .unwrap_or(UNKNOWN_ROUTE)
        .to_string()
}

/// Per-request state captured before the handler runs
#[derive(Debug)]
pub struct RequestContext {
    start: Instant,
    method: String,
    route: String,
    // HEAD responses never carry a body, so release counts as completion
    bodyless: bool,
}

impl RequestContext {
    pub fn begin(req: &Request) -> Self {
        let extensions = req.extensions();
        let matched = extensions.get::<MatchedPath>().map(MatchedPath::as_str);
        let nested = extensions.get::<NestedPath>().map(NestedPath::as_str);

        Self {
            start: Instant::now(),
            method: req.method().as_str().to_owned(),
            bodyless: *req.method() == Method::HEAD,
            route: resolve_route_label(matched, nested, req.uri().path()),
        }
    }
}

struct PendingObservation {
    context: RequestContext,
    status: String,
    observer: Arc<dyn RequestObserver>,
}

impl PendingObservation {
    fn complete(self) {
        let sample = RequestSample {
            method: self.context.method,
            route: self.context.route,
            status: self.status,
            elapsed_secs: self.context.start.elapsed().as_secs_f64(),
        };
        let observer = self.observer;

        // Metrics are best-effort: neither an error nor a panic may reach the caller.
        match panic::catch_unwind(AssertUnwindSafe(|| observer.observe(&sample))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::warn!(error = %err, route = %sample.route, "Dropping request metrics");
            }
            Err(_) => {
                tracing::warn!(route = %sample.route, "Request metrics observer panicked");
            }
        }
    }
}

/// Response body that fires its pending observation once, at end of stream
struct CompletionBody {
    inner: Body,
    pending: Option<PendingObservation>,
}

impl CompletionBody {
    fn new(inner: Body, pending: PendingObservation) -> Self {
        Self {
            inner,
            pending: Some(pending),
        }
    }

    fn bodyless(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| pending.context.bodyless)
    }

    fn finish(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.complete();
        }
    }
}

impl HttpBody for CompletionBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_frame(cx);

        match &poll {
            Poll::Ready(None) => this.finish(),
            Poll::Ready(Some(Ok(_))) if this.inner.is_end_stream() => this.finish(),
            _ => {}
        }

        poll
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for CompletionBody {
    fn drop(&mut self) {
        // Empty and HEAD bodies are often released without a single poll.
        if (self.inner.is_end_stream() || self.bodyless()) && !std::thread::panicking() {
            self.finish();
        }
    }
}
