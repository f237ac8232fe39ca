//! Error types for dynamic scope construction
//!
//! Three families:
//! - [`ScopeError`]: runtime chain and episode misuse (reentrant activation,
//!   duplicate seeding, a lookup that matches no open level)
//! - [`ProvisionError`]: a construction episode that failed, optionally
//!   carrying the single root cause for declared-error unwrapping
//! - [`ConfigError`] / [`ConfigErrors`]: wiring-time diagnostics, always
//!   accumulated and reported together per factory

use std::any::{Any, TypeId};
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

use crate::key::Key;
use crate::scope::ScopeId;

fn fmt_chain(searched: &[ScopeId]) -> String {
    searched
        .iter()
        .map(ScopeId::name)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Runtime chain and episode errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    /// A construction episode is already open on this execution context
    #[error("a scope instance for {active} is already active on this context")]
    AlreadyActive {
        /// Identity of the episode that is already open
        active: ScopeId,
    },

    /// No construction episode is open on this execution context
    #[error("no dynamic scope instance is active on this context")]
    NotActive,

    /// A key was seeded twice at one cache level
    #[error("{key} already seeded in scope instance {scope}")]
    AlreadySeeded {
        /// The colliding key
        key: Key,
        /// Level the collision happened at
        scope: ScopeId,
    },

    /// No level in the open chain matches the requested scope
    #[error(
        "no cache level found for {key} scoped as {scope}; searched {}",
        fmt_chain(.searched)
    )]
    NoLevelFound {
        /// The key being resolved
        key: Key,
        /// Scope the binding declared
        scope: ScopeId,
        /// Every identity in the chain, innermost first
        searched: Vec<ScopeId>,
    },
}

/// Single root cause of a failed construction, type-erased.
///
/// Kept shared so an unwrapped cause reaches the factory caller as the same
/// instance the constructor raised.
#[derive(Clone)]
pub struct ErasedCause {
    value: Arc<dyn Any + Send + Sync>,
    rendered: String,
}

impl ErasedCause {
    fn new<E: Display + Send + Sync + 'static>(error: Arc<E>) -> Self {
        let rendered = error.to_string();
        Self {
            value: error,
            rendered,
        }
    }

    /// Concrete type of the cause.
    #[inline]
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.value.as_ref().type_id()
    }

    /// Shared handle to the cause as `E`, if that is its concrete type.
    #[must_use]
    pub fn downcast<E: Any + Send + Sync>(&self) -> Option<Arc<E>> {
        Arc::clone(&self.value).downcast::<E>().ok()
    }
}

impl Debug for ErasedCause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ErasedCause({})", self.rendered)
    }
}

impl Display for ErasedCause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

/// Failure raised by the recursive-construction collaborator.
///
/// Containers raise this for anything that goes wrong while building an
/// object graph. When the failure wraps exactly one user-raised root cause,
/// the cause rides along for the factory's declared-error unwrapping.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ProvisionError {
    message: String,
    cause: Option<ErasedCause>,
}

impl ProvisionError {
    /// Failure with a message and no root cause.
    #[inline]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Failure wrapping a user-raised root cause.
    pub fn caused_by<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::caused_by_shared(Arc::new(error))
    }

    /// Failure wrapping an already-shared root cause, preserving identity.
    pub fn caused_by_shared<E>(error: Arc<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let cause = ErasedCause::new(error);
        Self {
            message: format!("construction failed: {cause}"),
            cause: Some(cause),
        }
    }

    /// The single root cause, when there is one.
    #[inline]
    #[must_use]
    pub fn cause(&self) -> Option<&ErasedCause> {
        self.cause.as_ref()
    }

    /// The failure message.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ScopeError> for ProvisionError {
    fn from(err: ScopeError) -> Self {
        Self::new(err.to_string())
    }
}

/// One wiring-time diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A factory parameter carries a qualifier other than the parameter tag
    #[error(
        "only scope parameter tags are allowed on factory parameters, \
         but parameter {index} of method {method} carries @{found}"
    )]
    ForeignParamQualifier {
        /// Method the parameter belongs to
        method: String,
        /// Zero-based parameter position
        index: usize,
        /// The offending qualifier
        found: String,
    },

    /// A factory method's return binding is scoped differently than the factory
    #[error("for return value of method {method} expected scope {expected} but found {found}")]
    ScopeMismatch {
        /// Method whose return binding was checked
        method: String,
        /// The factory's scope
        expected: ScopeId,
        /// Rendering of the scope actually found
        found: String,
    },

    /// A factory method's return key has no resolvable binding
    #[error("no binding for return value {key} of method {method}: {message}")]
    UnresolvedResult {
        /// Method whose return binding was checked
        method: String,
        /// The unresolvable key
        key: Key,
        /// The container's own diagnostic
        message: String,
    },

    /// A factory schema declares no methods
    #[error("factory {factory} declares no methods")]
    EmptyFactory {
        /// Name of the factory type
        factory: String,
    },
}

fn fmt_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(n, e)| format!("\n  {}) {e}", n + 1))
        .collect()
}

/// Accumulated wiring-time diagnostics for one factory.
///
/// Derivation and validation never stop at the first failure; a factory's
/// whole diagnostic set surfaces in one error.
#[derive(Debug, Clone, Default, thiserror::Error)]
#[error("{} configuration error(s):{}", .errors.len(), fmt_errors(.errors))]
pub struct ConfigErrors {
    errors: Vec<ConfigError>,
}

impl ConfigErrors {
    /// Empty accumulator.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one diagnostic.
    #[inline]
    pub fn push(&mut self, error: ConfigError) {
        self.errors.push(error);
    }

    /// Folds another accumulator into this one.
    pub fn merge(&mut self, other: ConfigErrors) {
        self.errors.extend(other.errors);
    }

    /// Whether nothing was recorded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The recorded diagnostics, in discovery order.
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &[ConfigError] {
        &self.errors
    }

    /// `Ok(())` when empty, otherwise the accumulated failure.
    pub fn into_result(self) -> Result<(), ConfigErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("handshake refused")]
    struct HandshakeError;

    struct ConnScope;
    struct ReqScope;

    #[test]
    fn no_level_found_names_the_whole_chain() {
        let err = ScopeError::NoLevelFound {
            key: Key::of::<String>(),
            scope: ScopeId::of::<ConnScope>(),
            searched: vec![ScopeId::of::<ReqScope>(), ScopeId::of::<ConnScope>()],
        };
        let rendered = err.to_string();
        assert!(rendered.contains("Key[String]"));
        assert!(rendered.contains("scoped as ConnScope"));
        assert!(rendered.contains("searched ReqScope -> ConnScope"));
    }

    #[test]
    fn cause_survives_erasure_with_identity() {
        let original = Arc::new(HandshakeError);
        let err = ProvisionError::caused_by_shared(Arc::clone(&original));

        let cause = err.cause().unwrap();
        assert_eq!(cause.type_id(), TypeId::of::<HandshakeError>());
        assert!(Arc::ptr_eq(&cause.downcast::<HandshakeError>().unwrap(), &original));
        assert!(err.to_string().contains("handshake refused"));
    }

    #[test]
    fn plain_provision_error_has_no_cause() {
        let err = ProvisionError::new("no binding");
        assert!(err.cause().is_none());
    }

    #[test]
    fn config_errors_accumulate_and_render_in_order() {
        let mut errors = ConfigErrors::new();
        assert!(errors.clone().into_result().is_ok());

        errors.push(ConfigError::EmptyFactory {
            factory: "ConnectionFactory".into(),
        });
        errors.push(ConfigError::ScopeMismatch {
            method: "create".into(),
            expected: ScopeId::of::<ConnScope>(),
            found: "no scope".into(),
        });

        let err = errors.into_result().unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.starts_with("2 configuration error(s):"));
        assert!(rendered.contains("1) factory ConnectionFactory declares no methods"));
        assert!(rendered.contains("2) for return value of method create"));
    }
}
