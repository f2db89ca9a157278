//! Static-or-computed attribute values.

use std::fmt;
use std::sync::Arc;

use crate::state::State;

/// An attribute that is either fixed at declaration time or computed from
/// the live state each time it is read.
pub enum Resolvable<T> {
    Static(T),
    Computed(Arc<dyn Fn(&State) -> T + Send + Sync>),
}

impl<T: Clone> Resolvable<T> {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&State) -> T + Send + Sync + 'static,
    {
        Resolvable::Computed(Arc::new(f))
    }

    /// Resolve against `state`. Computed values are re-evaluated on every call.
    pub fn resolve(&self, state: &State) -> T {
        match self {
            Resolvable::Static(value) => value.clone(),
            Resolvable::Computed(f) => f(state),
        }
    }
}

impl<T: Clone> Clone for Resolvable<T> {
    fn clone(&self) -> Self {
        match self {
            Resolvable::Static(value) => Resolvable::Static(value.clone()),
            Resolvable::Computed(f) => Resolvable::Computed(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Resolvable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolvable::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Resolvable::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl<T> From<T> for Resolvable<T> {
    fn from(value: T) -> Self {
        Resolvable::Static(value)
    }
}
