//! Dependency slot identities
//!
//! A [`Key`] names one slot in an object graph: a semantic type plus a
//! [`Qualifier`] that distinguishes otherwise same-typed slots. Factory call
//! arguments are seeded under parameter-tagged keys; consumers look them up
//! under the identical key.

use std::any::{Any, TypeId};
use std::fmt::{self, Display, Formatter};

use crate::scope::{short_type_name, ScopeId};

/// Qualifier half of a [`Key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Qualifier {
    /// Bare type, no discriminator
    None,
    /// Ordinary binding discriminator. Legal on results; a factory parameter
    /// carrying one is a configuration error.
    Named(String),
    /// Scoped factory parameter tag.
    Param {
        /// Distinguishes same-typed parameters ("a" vs "b"); empty for the
        /// default tag given to untagged parameters.
        name: String,
        /// Level the parameter is seeded at. `None` is an incomplete tag
        /// that descriptor derivation completes with the factory's scope.
        scope: Option<ScopeId>,
    },
}

impl Qualifier {
    /// Whether this is a scoped parameter tag.
    #[inline]
    #[must_use]
    pub fn is_param(&self) -> bool {
        matches!(self, Self::Param { .. })
    }
}

impl Display for Qualifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Named(name) => write!(f, "@{name}"),
            Self::Param { name, scope } => {
                f.write_str("@param")?;
                match (name.is_empty(), scope) {
                    (true, None) => Ok(()),
                    (true, Some(scope)) => write!(f, "(in {scope})"),
                    (false, None) => write!(f, "({name})"),
                    (false, Some(scope)) => write!(f, "({name} in {scope})"),
                }
            }
        }
    }
}

/// Identity of one dependency slot: semantic type plus qualifier.
///
/// Within one cache level a key maps to at most one value; seeding the same
/// key twice is rejected rather than silently shadowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    type_id: TypeId,
    type_name: &'static str,
    qualifier: Qualifier,
}

impl Key {
    /// Key for the bare type `T`.
    #[inline]
    #[must_use]
    pub fn of<T: Any>() -> Self {
        Self::qualified::<T>(Qualifier::None)
    }

    /// Key for type `T` under an ordinary binding discriminator.
    #[inline]
    #[must_use]
    pub fn named<T: Any>(name: impl Into<String>) -> Self {
        Self::qualified::<T>(Qualifier::Named(name.into()))
    }

    /// Parameter key for type `T` with an incomplete scope tag.
    ///
    /// An empty name normalizes to the default tag untagged parameters get.
    #[inline]
    #[must_use]
    pub fn param<T: Any>(name: impl Into<String>) -> Self {
        Self::qualified::<T>(Qualifier::Param {
            name: name.into(),
            scope: None,
        })
    }

    /// Parameter key for type `T` seeded at the level tagged `scope`.
    #[inline]
    #[must_use]
    pub fn param_in<T: Any>(name: impl Into<String>, scope: ScopeId) -> Self {
        Self::qualified::<T>(Qualifier::Param {
            name: name.into(),
            scope: Some(scope),
        })
    }

    /// Key for type `T` with an explicit qualifier.
    #[inline]
    #[must_use]
    pub fn qualified<T: Any>(qualifier: Qualifier) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            qualifier,
        }
    }

    /// The same slot under a different qualifier.
    #[must_use]
    pub fn with_qualifier(self, qualifier: Qualifier) -> Self {
        Self { qualifier, ..self }
    }

    /// Completes an incomplete parameter tag with `scope`. Other qualifiers
    /// are returned unchanged.
    #[must_use]
    pub fn in_scope(self, scope: ScopeId) -> Self {
        match self.qualifier {
            Qualifier::Param { name, scope: None } => Self {
                qualifier: Qualifier::Param {
                    name,
                    scope: Some(scope),
                },
                ..self
            },
            _ => self,
        }
    }

    /// The slot's qualifier.
    #[inline]
    #[must_use]
    pub fn qualifier(&self) -> &Qualifier {
        &self.qualifier
    }

    /// Erased identity of the semantic type.
    #[inline]
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Short name of the semantic type, for diagnostics.
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        short_type_name(self.type_name)
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Qualifier::None => write!(f, "Key[{}]", self.type_name()),
            qualifier => write!(f, "Key[{} {qualifier}]", self.type_name()),
        }
    }
}
