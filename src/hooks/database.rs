//! Database connection adapter.
//!
//! Queries check the deadline before they are sent. Committing a transaction
//! clears it, so that work after a commit (reloading rows, firing follow-up
//! reads) is never aborted halfway through a unit of work that has already
//! landed.

use crate::error::InstallError;
use crate::hooks::Adapter;
use crate::intercept::registry::{Interceptable, InterceptionRegistry, Validation};

pub const QUERY: &str = "exec_query";
pub const COMMIT: &str = "commit_db_transaction";

pub const DATABASE: Adapter = Adapter::new("database", &[QUERY]).clearing(&[COMMIT]);

/// Install the database adapter for connection type `T`.
pub fn install<T: Interceptable>(registry: &InterceptionRegistry) -> Result<(), InstallError> {
    DATABASE.install::<T>(registry, Validation::Strict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deadline::timeout;
    use crate::error::TimeoutExceeded;
    use crate::intercept::Intercepted;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct Connection {
        rows: Vec<&'static str>,
        pending: Vec<&'static str>,
    }

    impl Connection {
        fn exec_query(&self) -> usize {
            self.rows.len()
        }

        fn insert(&mut self, row: &'static str) {
            self.pending.push(row);
        }

        fn commit_db_transaction(&mut self) {
            self.rows.append(&mut self.pending);
        }
    }

    impl Interceptable for Connection {
        const OPERATIONS: &'static [&'static str] = &[QUERY, COMMIT, "insert"];
    }

    fn connection(registry: &Arc<InterceptionRegistry>) -> Intercepted<Connection> {
        Intercepted::with_registry(Connection::default(), Arc::clone(registry))
    }

    #[test]
    fn test_query_fails_after_expiry() {
        let registry = Arc::new(InterceptionRegistry::new());
        install::<Connection>(&registry).unwrap();
        let conn = connection(&registry);

        let result = timeout(Duration::from_nanos(1), || {
            std::thread::sleep(Duration::from_millis(2));
            conn.invoke_ref(QUERY, Connection::exec_query)
        });

        assert!(matches!(result, Err(TimeoutExceeded { .. })));
    }

    #[test]
    fn test_commit_clears_deadline_for_later_queries() {
        let registry = Arc::new(InterceptionRegistry::new());
        install::<Connection>(&registry).unwrap();
        let mut conn = connection(&registry);

        let count = timeout(Duration::from_millis(1), || {
            conn.inner_mut().insert("row");
            std::thread::sleep(Duration::from_millis(5));
            conn.invoke(COMMIT, Connection::commit_db_transaction)?;
            conn.invoke_ref(QUERY, Connection::exec_query)
        });

        assert_eq!(count, Ok(1));
    }

    #[test]
    fn test_install_requires_both_operations() {
        struct ReadOnly;

        impl Interceptable for ReadOnly {
            const OPERATIONS: &'static [&'static str] = &[QUERY];
        }

        let registry = InterceptionRegistry::new();
        assert!(matches!(
            install::<ReadOnly>(&registry),
            Err(InstallError::UnknownOperation { ref operation, .. }) if operation == COMMIT
        ));
        assert!(!registry.is_installed("database"));
        assert!(!registry.is_installed("database-clear"));
        assert!(registry.layers::<ReadOnly>().is_none());
    }

    #[test]
    fn test_install_succeeds_after_failed_attempt() {
        struct ReadOnly;

        impl Interceptable for ReadOnly {
            const OPERATIONS: &'static [&'static str] = &[QUERY];
        }

        let registry = InterceptionRegistry::new();
        assert!(install::<ReadOnly>(&registry).is_err());
        install::<Connection>(&registry).unwrap();
        assert!(registry.is_installed("database"));
    }
}
