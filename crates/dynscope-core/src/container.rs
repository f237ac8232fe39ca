//! Seam to the surrounding container
//!
//! The general-purpose container (binding resolution, constructor selection)
//! is an external collaborator. This module pins down the two things the
//! scope machinery needs from it: recursive graph construction, and scope
//! lookup for the factory validation pass.

use crate::error::ProvisionError;
use crate::key::Key;
use crate::scope::BindingScope;
use crate::value::ScopedValue;

/// The recursive-construction collaborator.
///
/// An implementation routes any dependency bound "in dynamic scope S"
/// through [`resolve_or_construct`](crate::provider::resolve_or_construct),
/// which is how nested lookups land back in the open cache chain.
pub trait ScopeAwareContainer: Send + Sync {
    /// Constructs and returns a fully wired object for `key`, recursively
    /// consulting the dynamic scope chain for scoped dependencies.
    ///
    /// # Errors
    /// The container's own provisioning failure; when it wraps exactly one
    /// user-raised root cause, factories may unwrap it (declared-error
    /// passthrough).
    fn construct(&self, key: &Key) -> Result<ScopedValue, ProvisionError>;

    /// Reports how the binding for `key` is scoped.
    ///
    /// # Errors
    /// A provisioning failure when `key` has no resolvable binding.
    fn binding_scope(&self, key: &Key) -> Result<BindingScope, ProvisionError>;
}
