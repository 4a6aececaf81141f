//! Interception registry.
//!
//! # Responsibilities
//! - Record which operations of a target type get a deadline layer
//! - Refuse a second layer under an identity already installed
//! - Validate operation names against the target's declared surface
//!
//! # Design Decisions
//! - Layers are additive: each install adds a separate layer, nothing is edited
//! - Calls run layers last-installed first, then the wrapped operation
//! - Reads are lock-free (`ArcSwap`); installs are serialized by a mutex and
//!   expected to happen once at startup

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use arc_swap::ArcSwap;

use crate::deadline::{check_deadline, clear_deadline};
use crate::error::{InstallError, TimeoutExceeded};

/// A type whose operations can be intercepted.
///
/// Integration code implements this for third-party client types (or a
/// newtype around them), listing the operations the type actually has.
pub trait Interceptable: 'static {
    /// Names of the operations this type exposes.
    const OPERATIONS: &'static [&'static str];

    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// What a layer does before forwarding a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    /// Fail with `TimeoutExceeded` if the deadline has passed.
    Check,
    /// Clear the innermost scope's deadline.
    Clear,
}

impl fmt::Display for HookAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookAction::Check => f.write_str("check"),
            HookAction::Clear => f.write_str("clear"),
        }
    }
}

/// How unknown operation names are treated at install time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validation {
    /// Log a warning and install anyway.
    #[default]
    Lenient,
    /// Reject the install.
    Strict,
}

/// One installed interception layer.
#[derive(Debug)]
pub struct HookLayer {
    identity: String,
    target: &'static str,
    action: HookAction,
    operations: HashSet<String>,
}

impl HookLayer {
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn action(&self) -> HookAction {
        self.action
    }

    pub fn applies_to(&self, operation: &str) -> bool {
        self.operations.contains(operation)
    }

    /// Run this layer's action.
    pub fn apply(&self) -> Result<(), TimeoutExceeded> {
        match self.action {
            HookAction::Check => check_deadline(),
            HookAction::Clear => {
                clear_deadline();
                Ok(())
            }
        }
    }
}

/// Layers for one target type, in install order.
pub type Layers = Arc<[Arc<HookLayer>]>;

type LayerTable = HashMap<TypeId, Layers>;

/// True when every name in `operations` is an operation of `T`.
pub fn validate<T: Interceptable>(operations: &[&str]) -> bool {
    operations.iter().all(|op| declares::<T>(op))
}

fn declares<T: Interceptable>(operation: &str) -> bool {
    T::OPERATIONS.iter().any(|known| *known == operation)
}

/// Process-wide table of installed interception layers.
pub struct InterceptionRegistry {
    layers: ArcSwap<LayerTable>,
    installed: Mutex<HashSet<String>>,
}

impl InterceptionRegistry {
    pub fn new() -> Self {
        Self {
            layers: ArcSwap::from_pointee(HashMap::new()),
            installed: Mutex::new(HashSet::new()),
        }
    }

    /// The registry shared by the whole process.
    pub fn global() -> &'static Arc<InterceptionRegistry> {
        static GLOBAL: OnceLock<Arc<InterceptionRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(InterceptionRegistry::new()))
    }

    /// Install a layer that checks the deadline before each named operation.
    pub fn install<T: Interceptable>(
        &self,
        operations: &[&str],
        identity: &str,
        validation: Validation,
    ) -> Result<(), InstallError> {
        self.register::<T>(HookAction::Check, operations, identity, validation)
    }

    /// Install a layer that clears the deadline before each named operation.
    pub fn install_clear_on_call<T: Interceptable>(
        &self,
        operations: &[&str],
        identity: &str,
        validation: Validation,
    ) -> Result<(), InstallError> {
        self.register::<T>(HookAction::Clear, operations, identity, validation)
    }

    fn register<T: Interceptable>(
        &self,
        action: HookAction,
        operations: &[&str],
        identity: &str,
        validation: Validation,
    ) -> Result<(), InstallError> {
        let target = T::type_name();
        if operations.is_empty() {
            return Err(InstallError::NoOperations {
                identity: identity.to_string(),
                target,
            });
        }

        let mut installed = self.installed.lock().unwrap_or_else(PoisonError::into_inner);
        if installed.contains(identity) {
            return Err(InstallError::DuplicateIdentity {
                identity: identity.to_string(),
                target,
            });
        }

        if let Some(unknown) = operations.iter().find(|op| !declares::<T>(op)) {
            match validation {
                Validation::Strict => {
                    return Err(InstallError::UnknownOperation {
                        target,
                        operation: unknown.to_string(),
                    });
                }
                Validation::Lenient => {
                    tracing::warn!(
                        identity,
                        target_type = target,
                        operation = %unknown,
                        "Intercepting unknown operation"
                    );
                }
            }
        }

        let layer = Arc::new(HookLayer {
            identity: identity.to_string(),
            target,
            action,
            operations: operations.iter().map(|op| op.to_string()).collect(),
        });

        let mut table = LayerTable::clone(&self.layers.load());
        let mut stack = table
            .get(&TypeId::of::<T>())
            .map(|layers| layers.to_vec())
            .unwrap_or_default();
        stack.push(layer);
        table.insert(TypeId::of::<T>(), stack.into());
        self.layers.store(Arc::new(table));
        installed.insert(identity.to_string());

        tracing::info!(
            identity,
            target_type = target,
            action = %action,
            operations = ?operations,
            "Installed interception layer"
        );
        Ok(())
    }

    /// Layers installed for `T`, in install order.
    pub fn layers<T: Interceptable>(&self) -> Option<Layers> {
        self.layers.load().get(&TypeId::of::<T>()).cloned()
    }

    /// Run the layers for `T` that apply to `operation`, outermost first.
    pub fn before<T: Interceptable>(&self, operation: &str) -> Result<(), TimeoutExceeded> {
        let Some(layers) = self.layers::<T>() else {
            return Ok(());
        };
        if !declares::<T>(operation) {
            tracing::debug!(
                target_type = T::type_name(),
                operation,
                "Operation not declared by intercepted type"
            );
        }
        for layer in layers.iter().rev().filter(|layer| layer.applies_to(operation)) {
            layer.apply()?;
        }
        Ok(())
    }

    pub fn is_installed(&self, identity: &str) -> bool {
        self.installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(identity)
    }
}

impl Default for InterceptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InterceptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptionRegistry")
            .field("types", &self.layers.load().len())
            .finish()
    }
}
