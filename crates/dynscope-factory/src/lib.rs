//! Dynscope Factory - Scope factories over the dynamic scope chain
//!
//! The factory half of dynamic scoping:
//! - Describe a factory interface as an explicit schema of method signatures
//! - Derive each method's descriptor (result key, parameter keys) once,
//!   with batched wiring-time diagnostics
//! - Validate return bindings against the container before first use
//! - Mint factory instances that open, seed, and tear down one construction
//!   episode per invocation
//!
//! # Example
//!
//! ```rust,ignore
//! use dynscope_core::{Key, ScopeId};
//! use dynscope_factory::{FactoryProvider, FactorySchema, MethodSignature};
//!
//! struct ConnScope;
//! struct ConnectionFactory;
//!
//! let schema = FactorySchema::of::<ConnectionFactory>().with_method(
//!     MethodSignature::new("create", Key::of::<Connection>())
//!         .with_param(Key::param::<String>("host")),
//! );
//! let provider = FactoryProvider::new(schema, ScopeId::of::<ConnScope>())?;
//! provider.validate(container.as_ref())?;
//! let factory = provider.provide(container);
//! let conn = factory.invoke("create", vec![ScopedValue::of("example.org".to_string())])?;
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod descriptor;
pub mod error;
pub mod instance;
pub mod provider;
pub mod signature;

// Re-exports for convenience
pub use descriptor::FactoryMethodDescriptor;
pub use error::FactoryError;
pub use instance::FactoryInstance;
pub use provider::FactoryProvider;
pub use signature::{FactorySchema, MethodSignature};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for wiring scope factories
    pub use crate::{
        FactoryError, FactoryInstance, FactoryProvider, FactorySchema, MethodSignature,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
