//! Scope identities
//!
//! A [`ScopeId`] names one kind of dynamic scope (e.g. "connection scope",
//! "request scope"). Cache levels are tagged with it, and lookups walk the
//! chain until they hit the level whose identity matches. Two factories that
//! produce values in the same scope must carry equal identities.

use std::any::{Any, TypeId};
use std::fmt::{self, Display, Formatter};

/// Strips the module path off a `std::any::type_name` rendering.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    full.rsplit("::").next().unwrap_or(full)
}

/// Identity of one kind of dynamic scope.
///
/// Minted from a caller-supplied marker type, so identities compare by type
/// rather than by name and cannot collide accidentally. The `anonymous`
/// flavor is minted from a factory type for one-off factories that manage a
/// private scope nobody else can bind into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId {
    id: TypeId,
    name: &'static str,
    anonymous: bool,
}

impl ScopeId {
    /// Identity of the scope tagged by marker type `S`.
    #[inline]
    #[must_use]
    pub fn of<S: Any>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            name: std::any::type_name::<S>(),
            anonymous: false,
        }
    }

    /// Private per-factory identity, minted from the factory type `F`.
    ///
    /// Anonymous scopes are exempt from return-scope validation: the wiring
    /// that mints one also owns every binding placed in it.
    #[inline]
    #[must_use]
    pub fn anonymous<F: Any>() -> Self {
        Self {
            id: TypeId::of::<F>(),
            name: std::any::type_name::<F>(),
            anonymous: true,
        }
    }

    /// Whether this is a per-factory anonymous scope.
    #[inline]
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    /// Short name of the marker type, for diagnostics.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        short_type_name(self.name)
    }
}

impl Display for ScopeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.anonymous {
            write!(f, "anonymous({})", self.name())
        } else {
            f.write_str(self.name())
        }
    }
}

/// How a container reports the scoping of one binding.
///
/// Input to the factory validation pass: a factory's products must be bound
/// [`BindingScope::Dynamic`] with exactly the factory's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingScope {
    /// Bound into the dynamic scope with the given identity
    Dynamic(ScopeId),
    /// Eagerly constructed singleton
    EagerSingleton,
    /// No scope: constructed fresh on every lookup
    Unscoped,
    /// Some other container-specific scope, by name
    Other(String),
}

impl Display for BindingScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dynamic(id) => write!(f, "dynamic scope {id}"),
            Self::EagerSingleton => f.write_str("eager singleton"),
            Self::Unscoped => f.write_str("no scope"),
            Self::Other(name) => f.write_str(name),
        }
    }
}
