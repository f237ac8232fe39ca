//! Factory instances
//!
//! A [`FactoryInstance`] is the live object produced when a factory-typed
//! dependency is resolved: the scope identity it creates, the cache chain
//! active at the moment it was captured, the construction collaborator, and
//! the shared method table. Each invocation runs one construction episode.

use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

use dynscope_core::episode;
use dynscope_core::instance::ScopeInstance;
use dynscope_core::{ProvisionError, ScopeAwareContainer, ScopeId, ScopedValue};

use crate::descriptor::{FactoryMethodDescriptor, MethodTable};
use crate::error::FactoryError;

/// One live factory.
///
/// `captured` is a snapshot of "where in the scope hierarchy was I born",
/// not a live link: factories obtained while no episode was open hold
/// nothing and build fully disjoint graphs.
pub struct FactoryInstance {
    factory: &'static str,
    scope: ScopeId,
    captured: Option<Arc<ScopeInstance>>,
    container: Arc<dyn ScopeAwareContainer>,
    methods: Arc<MethodTable>,
}

impl FactoryInstance {
    pub(crate) fn new(
        factory: &'static str,
        scope: ScopeId,
        captured: Option<Arc<ScopeInstance>>,
        container: Arc<dyn ScopeAwareContainer>,
        methods: Arc<MethodTable>,
    ) -> Self {
        Self {
            factory,
            scope,
            captured,
            container,
            methods,
        }
    }

    /// Scope this factory opens on every invocation.
    #[inline]
    #[must_use]
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// The chain captured when this factory was produced, if any.
    #[inline]
    #[must_use]
    pub fn captured(&self) -> Option<&Arc<ScopeInstance>> {
        self.captured.as_ref()
    }

    /// Descriptor of one method, if the factory declares it.
    #[must_use]
    pub fn describe(&self, method: &str) -> Option<&FactoryMethodDescriptor> {
        self.methods.get(method)
    }

    /// Runs one construction episode for `method`.
    ///
    /// Opens a fresh cache level chained to the captured parent, seeds the
    /// arguments under the descriptor's parameter keys, asks the container
    /// for the result key, and tears the level down on every exit path.
    /// Factories produced during the construction capture the open level,
    /// which is how nested scopes chain to this one.
    ///
    /// # Errors
    /// - [`FactoryError::Scope`] on reentrant activation or a parameter key
    ///   collision
    /// - [`FactoryError::Declared`] when construction failed with a root
    ///   cause of a type the method declared
    /// - [`FactoryError::Provision`] for every other construction failure
    ///
    /// # Panics
    /// On an unknown method name or an argument-count mismatch; both are
    /// caller contract violations, not runtime conditions.
    pub fn invoke(
        &self,
        method: &str,
        args: Vec<ScopedValue>,
    ) -> Result<ScopedValue, FactoryError> {
        let descriptor = self
            .methods
            .get(method)
            .unwrap_or_else(|| panic!("{self} has no method `{method}`"));
        assert_eq!(
            args.len(),
            descriptor.params().len(),
            "{self}: method `{method}` takes {} argument(s) but {} were supplied",
            descriptor.params().len(),
            args.len()
        );

        tracing::debug!("{self}: invoking `{method}` in scope {}", self.scope);
        let open = episode::activate(self.scope, self.captured.clone())?;
        for (key, value) in descriptor.params().iter().zip(args) {
            open.instance().seed(key.clone(), value)?;
        }

        self.container
            .construct(descriptor.result())
            .map_err(|err| unwrap_declared(descriptor, err))
    }
}

/// Re-raises the single declared root cause as-is; anything else stays
/// wrapped in the container's own failure.
fn unwrap_declared(descriptor: &FactoryMethodDescriptor, err: ProvisionError) -> FactoryError {
    if let Some(cause) = err.cause() {
        if descriptor.declares(cause.type_id()) {
            return FactoryError::Declared(cause.clone());
        }
    }
    FactoryError::Provision(err)
}

// Identity operations are direct impls, never routed through the method
// table: a factory compares by instance, not by what it builds.
impl PartialEq for FactoryInstance {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Debug for FactoryInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryInstance")
            .field("factory", &self.factory)
            .field("scope", &self.scope.name())
            .field("captured", &self.captured.is_some())
            .finish()
    }
}

impl Display for FactoryInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.factory.rsplit("::").next().unwrap_or(self.factory))
    }
}
