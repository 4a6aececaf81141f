//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use request_deadline::{Intercepted, Interceptable, InterceptionRegistry, TimeoutExceeded};

/// Key-value client with a Redis-shaped operation surface.
#[derive(Debug, Default)]
pub struct KvClient {
    calls: AtomicUsize,
}

impl KvClient {
    pub fn call(&self, command: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        format!("OK {command}")
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Interceptable for KvClient {
    const OPERATIONS: &'static [&'static str] = &["call"];
}

#[derive(Debug, PartialEq)]
pub enum DbError {
    Timeout(TimeoutExceeded),
    Closed,
}

impl From<TimeoutExceeded> for DbError {
    fn from(err: TimeoutExceeded) -> Self {
        DbError::Timeout(err)
    }
}

/// Database connection with a query and a commit operation.
#[derive(Debug, Default)]
pub struct DbConnection {
    rows: Mutex<Vec<String>>,
    closed: bool,
}

impl DbConnection {
    pub fn closed() -> Self {
        Self {
            closed: true,
            ..Self::default()
        }
    }

    pub fn exec_query(&self) -> Result<usize, DbError> {
        if self.closed {
            return Err(DbError::Closed);
        }
        Ok(self.rows.lock().unwrap_or_else(PoisonError::into_inner).len())
    }

    pub fn commit_db_transaction(&self, row: &str) {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(row.to_string());
    }
}

impl Interceptable for DbConnection {
    const OPERATIONS: &'static [&'static str] = &["exec_query", "commit_db_transaction"];
}

pub fn registry() -> Arc<InterceptionRegistry> {
    Arc::new(InterceptionRegistry::new())
}

pub fn wrap<T: Interceptable>(inner: T, registry: &Arc<InterceptionRegistry>) -> Intercepted<T> {
    Intercepted::with_registry(inner, Arc::clone(registry))
}

/// Sleep long enough for a budget of `budget` to run out on the real clock.
pub fn outlast(budget: Duration) {
    std::thread::sleep(budget + Duration::from_millis(10));
}
