//! Forwarding wrapper around an intercepted client.
//!
//! `Intercepted<T>` holds the wrapped value and runs the registry's layers for
//! `T` before forwarding each named operation. The operation itself is a
//! closure over the inner value, so any arity, return type or callback
//! argument passes through untouched.

use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::future::{self, Either, Ready};
use tower::Service;

use crate::error::TimeoutExceeded;
use crate::intercept::registry::{Interceptable, InterceptionRegistry};

/// Names the operation a request performs, for interception of tower services.
pub trait Operation {
    fn operation(&self) -> &str;
}

impl<B> Operation for axum::http::Request<B> {
    fn operation(&self) -> &str {
        "request"
    }
}

/// A client wrapped with the deadline layers installed for its type.
#[derive(Debug, Clone)]
pub struct Intercepted<T: Interceptable> {
    inner: T,
    registry: Arc<InterceptionRegistry>,
}

impl<T: Interceptable> Intercepted<T> {
    /// Wrap `inner` using the process-wide registry.
    pub fn new(inner: T) -> Self {
        Self::with_registry(inner, Arc::clone(InterceptionRegistry::global()))
    }

    pub fn with_registry(inner: T, registry: Arc<InterceptionRegistry>) -> Self {
        Self { inner, registry }
    }

    /// The wrapped value. Calls made through it skip interception.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Run the layers that apply to `operation`.
    pub fn before(&self, operation: &str) -> Result<(), TimeoutExceeded> {
        self.registry.before::<T>(operation)
    }

    /// Forward `operation` after running its layers.
    pub fn invoke<R>(
        &mut self,
        operation: &str,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, TimeoutExceeded> {
        self.before(operation)?;
        Ok(f(&mut self.inner))
    }

    /// Forward an operation that only needs shared access.
    pub fn invoke_ref<R>(&self, operation: &str, f: impl FnOnce(&T) -> R) -> Result<R, TimeoutExceeded> {
        self.before(operation)?;
        Ok(f(&self.inner))
    }

    /// Forward a fallible operation, folding `TimeoutExceeded` into its error type.
    pub fn try_invoke<R, E>(
        &mut self,
        operation: &str,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<TimeoutExceeded>,
    {
        self.before(operation)?;
        f(&mut self.inner)
    }

    /// Forward an async operation. Layers run when the returned future is first polled.
    pub async fn invoke_async<'a, Fut>(
        &'a mut self,
        operation: &str,
        f: impl FnOnce(&'a mut T) -> Fut,
    ) -> Result<Fut::Output, TimeoutExceeded>
    where
        Fut: Future + 'a,
    {
        self.registry.before::<T>(operation)?;
        Ok(f(&mut self.inner).await)
    }

    /// Async variant of [`try_invoke`](Self::try_invoke).
    pub async fn try_invoke_async<'a, R, E, Fut>(
        &'a mut self,
        operation: &str,
        f: impl FnOnce(&'a mut T) -> Fut,
    ) -> Result<R, E>
    where
        Fut: Future<Output = Result<R, E>> + 'a,
        E: From<TimeoutExceeded>,
    {
        self.registry.before::<T>(operation)?;
        f(&mut self.inner).await
    }
}

impl<T, Req> Service<Req> for Intercepted<T>
where
    T: Interceptable + Service<Req>,
    T::Error: From<TimeoutExceeded>,
    Req: Operation,
{
    type Response = T::Response;
    type Error = T::Error;
    type Future = Either<Ready<Result<T::Response, T::Error>>, T::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let checked = self.before(req.operation());
        match checked {
            Ok(()) => Either::Right(self.inner.call(req)),
            Err(err) => Either::Left(future::ready(Err(err.into()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deadline::{time_remaining, timeout, timeout_async};
    use crate::intercept::registry::Validation;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct Connection {
        queries: Vec<String>,
    }

    impl Connection {
        fn exec_query(&mut self, sql: &str) -> Result<usize, QueryError> {
            self.queries.push(sql.to_string());
            if sql.is_empty() {
                return Err(QueryError::Syntax);
            }
            Ok(self.queries.len())
        }

        fn each_row(&self, rows: usize, mut f: impl FnMut(usize)) {
            (0..rows).for_each(&mut f);
        }

        fn commit_db_transaction(&mut self) {}

        async fn fetch(&mut self, key: &str) -> String {
            tokio::task::yield_now().await;
            format!("value:{key}")
        }
    }

    impl Interceptable for Connection {
        const OPERATIONS: &'static [&'static str] =
            &["exec_query", "each_row", "commit_db_transaction", "fetch"];
    }

    #[derive(Debug, PartialEq)]
    enum QueryError {
        Syntax,
        Timeout,
    }

    impl From<TimeoutExceeded> for QueryError {
        fn from(_: TimeoutExceeded) -> Self {
            QueryError::Timeout
        }
    }

    fn registry() -> Arc<InterceptionRegistry> {
        let registry = InterceptionRegistry::new();
        registry
            .install::<Connection>(&["exec_query", "each_row", "fetch"], "db", Validation::Strict)
            .unwrap();
        registry
            .install_clear_on_call::<Connection>(&["commit_db_transaction"], "db-commit", Validation::Strict)
            .unwrap();
        Arc::new(registry)
    }

    fn expired<R>(f: impl FnOnce() -> R) -> R {
        timeout(Duration::from_millis(20), || {
            std::thread::sleep(Duration::from_millis(30));
            f()
        })
    }

    #[test]
    fn test_forwards_outside_scope() {
        let mut conn = Intercepted::with_registry(Connection::default(), registry());
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(conn.try_invoke("exec_query", |c| c.exec_query("select 1")), Ok(1));
    }

    #[test]
    fn test_client_errors_are_preserved() {
        let mut conn = Intercepted::with_registry(Connection::default(), registry());
        assert_eq!(conn.try_invoke("exec_query", |c| c.exec_query("")), Err(QueryError::Syntax));
    }

    #[test]
    fn test_expired_deadline_fails_before_forwarding() {
        let mut conn = Intercepted::with_registry(Connection::default(), registry());
        let result = expired(|| conn.try_invoke("exec_query", |c| c.exec_query("select 1")));

        assert_eq!(result, Err(QueryError::Timeout));
        assert!(conn.inner().queries.is_empty());
    }

    #[test]
    fn test_unwrapped_operation_is_not_checked() {
        let mut conn = Intercepted::with_registry(Connection::default(), registry());
        let result = expired(|| conn.invoke("unlisted", |c| c.queries.len()));
        assert_eq!(result, Ok(0));
    }

    #[test]
    fn test_callbacks_pass_through() {
        let conn = Intercepted::with_registry(Connection::default(), registry());
        let mut total = 0;
        timeout(Duration::from_secs(1), || {
            conn.invoke_ref("each_row", |c| c.each_row(4, |i| total += i)).unwrap();
        });
        assert_eq!(total, 6);
    }

    #[test]
    fn test_commit_clears_deadline() {
        let mut conn = Intercepted::with_registry(Connection::default(), registry());
        timeout(Duration::from_millis(20), || {
            conn.invoke("commit_db_transaction", |c| c.commit_db_transaction()).unwrap();
            assert_eq!(time_remaining(), None);
            std::thread::sleep(Duration::from_millis(30));
            assert_eq!(conn.try_invoke("exec_query", |c| c.exec_query("select 1")), Ok(1));
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_operation_is_checked() {
        let mut conn = Intercepted::with_registry(Connection::default(), registry());
        let result = timeout_async(Duration::from_millis(100), async {
            let first = conn.invoke_async("fetch", |c| c.fetch("a")).await;
            assert_eq!(first.as_deref(), Ok("value:a"));

            tokio::time::advance(Duration::from_millis(150)).await;
            conn.invoke_async("fetch", |c| c.fetch("b")).await
        })
        .await;

        assert!(result.is_err());
    }
}
