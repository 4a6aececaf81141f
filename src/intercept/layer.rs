//! Tower layers for deadline interception.
//!
//! These are chosen at composition time with `ServiceBuilder`, for services
//! that are built in one place rather than registered process-wide.

use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::future::{self, Either, Ready};
use tower::{Layer, Service};

use crate::deadline::{check_deadline, clear_deadline};
use crate::error::TimeoutExceeded;
use crate::intercept::hooked::Intercepted;
use crate::intercept::registry::{Interceptable, InterceptionRegistry};

/// Checks the deadline before every call to the inner service.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckDeadlineLayer;

impl<S> Layer<S> for CheckDeadlineLayer {
    type Service = CheckDeadline<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CheckDeadline { inner }
    }
}

#[derive(Debug, Clone)]
pub struct CheckDeadline<S> {
    inner: S,
}

impl<S, Req> Service<Req> for CheckDeadline<S>
where
    S: Service<Req>,
    S::Error: From<TimeoutExceeded>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Either<Ready<Result<S::Response, S::Error>>, S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        match check_deadline() {
            Ok(()) => Either::Right(self.inner.call(req)),
            Err(err) => Either::Left(future::ready(Err(err.into()))),
        }
    }
}

/// Clears the deadline before every call to the inner service.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearDeadlineLayer;

impl<S> Layer<S> for ClearDeadlineLayer {
    type Service = ClearDeadline<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ClearDeadline { inner }
    }
}

#[derive(Debug, Clone)]
pub struct ClearDeadline<S> {
    inner: S,
}

impl<S, Req> Service<Req> for ClearDeadline<S>
where
    S: Service<Req>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        clear_deadline();
        self.inner.call(req)
    }
}

/// Wraps a service in [`Intercepted`], applying whatever the registry holds for it.
#[derive(Debug, Clone)]
pub struct InterceptLayer {
    registry: Arc<InterceptionRegistry>,
}

impl InterceptLayer {
    pub fn new(registry: Arc<InterceptionRegistry>) -> Self {
        Self { registry }
    }

    pub fn global() -> Self {
        Self::new(Arc::clone(InterceptionRegistry::global()))
    }
}

impl<S: Interceptable> Layer<S> for InterceptLayer {
    type Service = Intercepted<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Intercepted::with_registry(inner, Arc::clone(&self.registry))
    }
}
