//! Factory providers
//!
//! A [`FactoryProvider`] is what a container binds a factory type to. It
//! derives the shared method table once at wiring time, validates the
//! factory's return bindings against the container's configuration, and
//! mints a fresh [`FactoryInstance`] — snapshotting the currently active
//! chain — every time the factory type is resolved.

use std::sync::Arc;

use dynscope_core::episode;
use dynscope_core::{BindingScope, ConfigError, ConfigErrors, ScopeAwareContainer, ScopeId};

use crate::descriptor::{derive_table, MethodTable};
use crate::instance::FactoryInstance;
use crate::signature::FactorySchema;

/// Wiring-time home of one factory: scope identity plus the method table
/// shared by every instance it mints.
#[derive(Debug, Clone)]
pub struct FactoryProvider {
    factory: &'static str,
    scope: ScopeId,
    methods: Arc<MethodTable>,
}

impl FactoryProvider {
    /// Provider for `schema`, producing values in the scope tagged `scope`.
    ///
    /// # Errors
    /// Every descriptor derivation failure for the schema, batched.
    pub fn new(schema: FactorySchema, scope: ScopeId) -> Result<Self, ConfigErrors> {
        let methods = derive_table(&schema, scope)?;
        Ok(Self {
            factory: schema.name(),
            scope,
            methods: Arc::new(methods),
        })
    }

    /// Provider managing a private anonymous scope minted from the factory
    /// type, for one-off factories nobody else binds into.
    ///
    /// # Errors
    /// Every descriptor derivation failure for the schema, batched.
    pub fn anonymous(schema: FactorySchema) -> Result<Self, ConfigErrors> {
        let scope = schema.anonymous_scope();
        Self::new(schema, scope)
    }

    /// Scope the minted factories create.
    #[inline]
    #[must_use]
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Full name of the factory type.
    #[inline]
    #[must_use]
    pub fn factory_name(&self) -> &'static str {
        self.factory
    }

    /// Validates the factory against the container's configuration, once,
    /// at the point the factory is wired in.
    ///
    /// Every method's result key must have a resolvable binding, and —
    /// unless this factory manages an anonymous scope — that binding must
    /// be scoped exactly as this factory's scope. A mismatch here is what
    /// turns a silent "nested object outlives its scope" bug into a hard
    /// wiring-time failure.
    ///
    /// # Errors
    /// Every mismatch across every method, batched.
    pub fn validate(&self, container: &dyn ScopeAwareContainer) -> Result<(), ConfigErrors> {
        let mut errors = ConfigErrors::new();

        for (name, descriptor) in self.methods.iter() {
            match container.binding_scope(descriptor.result()) {
                Err(err) => errors.push(ConfigError::UnresolvedResult {
                    method: name.clone(),
                    key: descriptor.result().clone(),
                    message: err.to_string(),
                }),
                Ok(BindingScope::Dynamic(found)) if found == self.scope => {}
                Ok(found) => {
                    if !self.scope.is_anonymous() {
                        errors.push(ConfigError::ScopeMismatch {
                            method: name.clone(),
                            expected: self.scope,
                            found: found.to_string(),
                        });
                    }
                }
            }
        }

        tracing::debug!(
            "validated factory {} for scope {}: {} error(s)",
            self.factory,
            self.scope,
            errors.errors().len()
        );
        errors.into_result()
    }

    /// Mints a factory instance, capturing the chain active right now so
    /// the instance continues creation from wherever it was born.
    #[must_use]
    pub fn provide(&self, container: Arc<dyn ScopeAwareContainer>) -> FactoryInstance {
        let captured = episode::current();
        FactoryInstance::new(
            self.factory,
            self.scope,
            captured,
            container,
            Arc::clone(&self.methods),
        )
    }
}
