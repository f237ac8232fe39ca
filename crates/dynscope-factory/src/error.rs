//! Factory invocation errors

use std::any::Any;
use std::sync::Arc;

use dynscope_core::{ErasedCause, ProvisionError, ScopeError};

/// What a factory method invocation can fail with.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    /// A constructor failure of a type the method declared, surfaced as the
    /// same instance the constructor raised rather than a container wrapper
    #[error("{0}")]
    Declared(ErasedCause),

    /// A container provisioning failure the method did not declare,
    /// propagated wrapped and unmodified
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    /// Episode misuse: reentrant activation or colliding parameter keys
    #[error(transparent)]
    Scope(#[from] ScopeError),
}

impl FactoryError {
    /// The declared cause as `E`, when this is a declared-error passthrough
    /// of that type.
    #[must_use]
    pub fn declared<E: Any + Send + Sync>(&self) -> Option<Arc<E>> {
        match self {
            Self::Declared(cause) => cause.downcast::<E>(),
            _ => None,
        }
    }
}
