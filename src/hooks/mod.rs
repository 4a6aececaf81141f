//! Client library adapters.
//!
//! # Data Flow
//! ```text
//! startup:
//!     Adapter descriptor (name + operations to check + operations that clear)
//!         → validate against the client type's Interceptable surface
//!         → registry install (one layer per concern)
//! ```
//!
//! # Design Decisions
//! - Descriptors are plain data; the client type is supplied by integration code
//! - Adapters are conditional: `install_if_available` skips types that do not
//!   expose the named operations
//! - Check and clear concerns are installed as separate layers

pub mod catalog;
pub mod database;

use crate::error::InstallError;
use crate::intercept::registry::{validate, Interceptable, InterceptionRegistry, Validation};

/// How to hook one kind of client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adapter {
    /// Identity of the check layer. The clear layer uses `<name>-clear`.
    pub name: &'static str,
    /// Operations that check the deadline before running.
    pub check: &'static [&'static str],
    /// Operations that clear the deadline before running.
    pub clear: &'static [&'static str],
}

impl Adapter {
    pub const fn new(name: &'static str, check: &'static [&'static str]) -> Self {
        Self {
            name,
            check,
            clear: &[],
        }
    }

    pub const fn clearing(self, clear: &'static [&'static str]) -> Self {
        Self { clear, ..self }
    }

    /// True when `T` exposes every operation this adapter names.
    pub fn is_valid_for<T: Interceptable>(&self) -> bool {
        validate::<T>(self.check) && validate::<T>(self.clear)
    }

    /// Install this adapter's layers for `T`.
    ///
    /// Either every layer is installed or none is.
    pub fn install<T: Interceptable>(
        &self,
        registry: &InterceptionRegistry,
        validation: Validation,
    ) -> Result<(), InstallError> {
        if self.clear.is_empty() {
            return registry.install::<T>(self.check, self.name, validation);
        }

        let clear_identity = self.clear_identity();
        if registry.is_installed(&clear_identity) {
            return Err(InstallError::DuplicateIdentity {
                identity: clear_identity,
                target: T::type_name(),
            });
        }
        if validation == Validation::Strict {
            if let Some(operation) = self.missing_operation::<T>() {
                return Err(InstallError::UnknownOperation {
                    target: T::type_name(),
                    operation: operation.to_string(),
                });
            }
        }

        registry.install::<T>(self.check, self.name, validation)?;
        registry.install_clear_on_call::<T>(self.clear, &clear_identity, validation)
    }

    /// Install only if `T` exposes the named operations.
    ///
    /// Returns whether anything was installed.
    pub fn install_if_available<T: Interceptable>(
        &self,
        registry: &InterceptionRegistry,
    ) -> Result<bool, InstallError> {
        if !self.is_valid_for::<T>() {
            tracing::debug!(adapter = self.name, target_type = T::type_name(), "Skipping adapter");
            return Ok(false);
        }
        self.install::<T>(registry, Validation::Strict)?;
        Ok(true)
    }

    fn missing_operation<T: Interceptable>(&self) -> Option<&'static str> {
        self.check
            .iter()
            .chain(self.clear)
            .copied()
            .find(|op| !validate::<T>(&[op]))
    }

    fn clear_identity(&self) -> String {
        format!("{}-clear", self.name)
    }
}

/// Install `adapter` for `T`.
pub fn install_adapter<T: Interceptable>(
    registry: &InterceptionRegistry,
    adapter: &Adapter,
    validation: Validation,
) -> Result<(), InstallError> {
    adapter.install::<T>(registry, validation)
}

/// Install every adapter in `adapters` whose operations `T` exposes.
///
/// Returns the names of the adapters that were installed.
pub fn auto_setup<T: Interceptable>(
    registry: &InterceptionRegistry,
    adapters: &[Adapter],
) -> Result<Vec<&'static str>, InstallError> {
    let mut installed = Vec::new();
    for adapter in adapters {
        if adapter.install_if_available::<T>(registry)? {
            installed.push(adapter.name);
        }
    }
    tracing::info!(target_type = T::type_name(), adapters = ?installed, "Auto setup complete");
    Ok(installed)
}
