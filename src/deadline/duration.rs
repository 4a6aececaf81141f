//! Resolvable duration values.
//!
//! A scope's budget can be fixed up front or computed when the scope is
//! entered. [`DurationSource`] covers both, and is resolved exactly once per
//! scope entry or `set_duration` call.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Where a scope gets its budget from.
///
/// `C` is the ambient data handed to [`DurationSource::Contextual`] providers,
/// e.g. an inbound request head for per-route budgets. Plain scopes use `()`.
pub enum DurationSource<C: ?Sized = ()> {
    /// No limit.
    Unlimited,
    /// A fixed budget.
    Fixed(Duration),
    /// Computed at resolve time.
    Provider(Arc<dyn Fn() -> Option<Duration> + Send + Sync>),
    /// Computed at resolve time from adapter-supplied context.
    Contextual(Arc<dyn Fn(&C) -> Option<Duration> + Send + Sync>),
}

impl<C: ?Sized> DurationSource<C> {
    /// Build a source from a zero-argument provider.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> Option<Duration> + Send + Sync + 'static,
    {
        DurationSource::Provider(Arc::new(f))
    }

    /// Build a source from a provider that inspects adapter context.
    pub fn from_context_fn<F>(f: F) -> Self
    where
        F: Fn(&C) -> Option<Duration> + Send + Sync + 'static,
    {
        DurationSource::Contextual(Arc::new(f))
    }

    /// Resolve to a usable budget. `None` means unlimited.
    ///
    /// Zero resolves to unlimited, as does any provider returning zero.
    pub fn resolve(&self, ctx: &C) -> Option<Duration> {
        let resolved = match self {
            DurationSource::Unlimited => None,
            DurationSource::Fixed(d) => Some(*d),
            DurationSource::Provider(f) => f(),
            DurationSource::Contextual(f) => f(ctx),
        };
        resolved.filter(|d| !d.is_zero())
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, DurationSource::Unlimited)
    }
}

impl DurationSource<()> {
    /// Resolve a source that needs no context.
    pub fn resolve_now(&self) -> Option<Duration> {
        self.resolve(&())
    }
}

/// Convert a number of seconds into a budget.
///
/// Non-positive, NaN, and infinite values mean unlimited.
pub fn secs_f64(secs: f64) -> Option<Duration> {
    if secs.is_finite() && secs > 0.0 {
        Duration::try_from_secs_f64(secs).ok()
    } else {
        None
    }
}

impl<C: ?Sized> Clone for DurationSource<C> {
    fn clone(&self) -> Self {
        match self {
            DurationSource::Unlimited => DurationSource::Unlimited,
            DurationSource::Fixed(d) => DurationSource::Fixed(*d),
            DurationSource::Provider(f) => DurationSource::Provider(Arc::clone(f)),
            DurationSource::Contextual(f) => DurationSource::Contextual(Arc::clone(f)),
        }
    }
}

impl<C: ?Sized> Default for DurationSource<C> {
    fn default() -> Self {
        DurationSource::Unlimited
    }
}

impl<C: ?Sized> fmt::Debug for DurationSource<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationSource::Unlimited => f.write_str("Unlimited"),
            DurationSource::Fixed(d) => f.debug_tuple("Fixed").field(d).finish(),
            DurationSource::Provider(_) => f.write_str("Provider(..)"),
            DurationSource::Contextual(_) => f.write_str("Contextual(..)"),
        }
    }
}

impl<C: ?Sized> From<Duration> for DurationSource<C> {
    fn from(d: Duration) -> Self {
        if d.is_zero() {
            DurationSource::Unlimited
        } else {
            DurationSource::Fixed(d)
        }
    }
}

impl<C: ?Sized> From<Option<Duration>> for DurationSource<C> {
    fn from(d: Option<Duration>) -> Self {
        d.map_or(DurationSource::Unlimited, DurationSource::from)
    }
}

impl<C: ?Sized> From<f64> for DurationSource<C> {
    fn from(secs: f64) -> Self {
        secs_f64(secs).into()
    }
}

impl<C: ?Sized> From<Option<f64>> for DurationSource<C> {
    fn from(secs: Option<f64>) -> Self {
        secs.and_then(secs_f64).into()
    }
}

impl<C: ?Sized> From<u64> for DurationSource<C> {
    fn from(secs: u64) -> Self {
        Duration::from_secs(secs).into()
    }
}
