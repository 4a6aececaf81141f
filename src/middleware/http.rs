//! HTTP entry-point adapter.
//!
//! Every request runs inside its own async timeout scope, so anything the
//! handler calls through an intercepted client sees the request's budget.

use std::task::{Context, Poll};
use std::time::Duration;

use axum::http::{request::Parts, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::config::HttpConfig;
use crate::deadline::{clock, context, secs_f64, DurationSource, ScopeGuard};
use crate::error::TimeoutExceeded;

/// Opens a timeout scope for every request passing through.
#[derive(Debug, Clone, Default)]
pub struct RequestTimeoutLayer {
    source: DurationSource<Parts>,
}

impl RequestTimeoutLayer {
    pub fn new(duration: impl Into<DurationSource<Parts>>) -> Self {
        Self {
            source: duration.into(),
        }
    }

    /// Budget read on each request, e.g. from live configuration.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> Option<Duration> + Send + Sync + 'static,
    {
        Self::new(DurationSource::from_fn(f))
    }

    /// Budget chosen from the request head, e.g. per route.
    pub fn from_request_fn<F>(f: F) -> Self
    where
        F: Fn(&Parts) -> Option<Duration> + Send + Sync + 'static,
    {
        Self::new(DurationSource::from_context_fn(f))
    }
}

impl From<&HttpConfig> for RequestTimeoutLayer {
    fn from(config: &HttpConfig) -> Self {
        Self::new(config.timeout_secs.and_then(secs_f64))
    }
}

impl<S> Layer<S> for RequestTimeoutLayer {
    type Service = RequestTimeout<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestTimeout {
            inner,
            source: self.source.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestTimeout<S> {
    inner: S,
    source: DurationSource<Parts>,
}

impl<S, B> Service<Request<B>> for RequestTimeout<S>
where
    S: Service<Request<B>>,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<S::Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let (parts, body) = req.into_parts();
        let budget = self.source.resolve(&parts);
        tracing::debug!(method = %parts.method, uri = %parts.uri, budget = ?budget, "Request timeout scope");

        let state = context::current().child(budget, clock::now());
        let fut = {
            // Services may do work in `call` before handing back a future.
            let _scope = ScopeGuard::install(state);
            self.inner.call(Request::from_parts(parts, body))
        };
        Box::pin(context::bind(state, fut))
    }
}

impl IntoResponse for TimeoutExceeded {
    fn into_response(self) -> Response {
        (StatusCode::GATEWAY_TIMEOUT, self.to_string()).into_response()
    }
}
