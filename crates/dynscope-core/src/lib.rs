//! Dynscope Core - Dynamic scope chain and episode registry
//!
//! Object lifetimes tied to an explicitly entered construction episode
//! rather than to process startup or a request thread:
//! - A factory call opens a cache level tagged with its scope identity
//! - Call arguments are seeded into the fresh level under stable keys
//! - Recursive construction resolves scoped dependencies by walking the
//!   chain from innermost to outermost level
//! - The level is torn down exactly once when the episode completes
//!
//! This crate is the container-independent half: cache chain, per-context
//! episode registry, and the provider hooks a container calls into. The
//! factory machinery that drives episodes lives in `dynscope-factory`.

#![warn(unreachable_pub)]

// Core modules
pub mod container;
pub mod episode;
pub mod error;
pub mod instance;
pub mod key;
pub mod provider;
pub mod scope;
pub mod value;

// Re-exports for convenience
pub use container::ScopeAwareContainer;
pub use episode::Episode;
pub use error::{ConfigError, ConfigErrors, ErasedCause, ProvisionError, ScopeError};
pub use instance::ScopeInstance;
pub use key::{Key, Qualifier};
pub use provider::{resolve_or_construct, ParamProvider, ScopedProvider};
pub use scope::{BindingScope, ScopeId};
pub use value::ScopedValue;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with dynamic scopes
    pub use crate::{
        BindingScope, Key, ProvisionError, Qualifier, ScopeAwareContainer, ScopeId,
        ScopedValue,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
