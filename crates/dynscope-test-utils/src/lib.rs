//! Testing utilities for the dynscope workspace
//!
//! A minimal in-memory container implementing the [`ScopeAwareContainer`]
//! seam: just enough binding resolution to drive the scope machinery from
//! the test suites. Not a product surface.

#![allow(missing_docs)]

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use dynscope_core::provider::resolve_or_construct;
use dynscope_core::{
    BindingScope, ConfigErrors, Key, ParamProvider, ProvisionError, ScopeAwareContainer,
    ScopeId, ScopedValue,
};
use dynscope_factory::{FactoryInstance, FactoryProvider};

type ConstructFn = Arc<dyn Fn(&Ctx<'_>) -> Result<ScopedValue, ProvisionError> + Send + Sync>;

#[derive(Clone)]
enum BindingKind {
    Construct(ConstructFn),
    Factory(FactoryProvider),
}

#[derive(Clone)]
struct Binding {
    scope: BindingScope,
    kind: BindingKind,
}

/// Handle constructors receive: typed access to dependencies and to the
/// parameters seeded by the factory call that opened the episode.
pub struct Ctx<'a> {
    container: &'a TestContainer,
    scope: Option<ScopeId>,
}

impl Ctx<'_> {
    /// Resolve the dependency bound to the bare key of `T`.
    pub fn get<T: Any + Send + Sync>(&self) -> Result<Arc<T>, ProvisionError> {
        self.container.construct(&Key::of::<T>())?.typed()
    }

    /// Resolve the dependency bound to `key`, untyped.
    pub fn get_key(&self, key: &Key) -> Result<ScopedValue, ProvisionError> {
        self.container.construct(key)
    }

    /// Resolve a factory-typed dependency bound to `key`.
    pub fn factory(&self, key: &Key) -> Result<Arc<FactoryInstance>, ProvisionError> {
        self.container.construct(key)?.typed()
    }

    /// A non-nullable factory parameter; a null or unseeded slot is a
    /// provisioning error.
    pub fn arg<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, ProvisionError> {
        self.param_value::<T>(name)?.typed()
    }

    /// A nullable factory parameter.
    pub fn arg_opt<T: Any + Send + Sync>(
        &self,
        name: &str,
    ) -> Result<Option<Arc<T>>, ProvisionError> {
        let value = self.param_value::<T>(name)?;
        if value.is_null() {
            Ok(None)
        } else {
            value.typed().map(Some)
        }
    }

    fn param_value<T: Any + Send + Sync>(
        &self,
        name: &str,
    ) -> Result<ScopedValue, ProvisionError> {
        let scope = self.scope.ok_or_else(|| {
            ProvisionError::new("factory parameters are only visible to dynamically scoped bindings")
        })?;
        ParamProvider::new(Key::param_in::<T>(name, scope), scope).get()
    }
}

/// Key-to-constructor binding map with scope dispatch.
pub struct TestContainer {
    this: Weak<TestContainer>,
    bindings: RwLock<HashMap<Key, Binding>>,
}

impl TestContainer {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            bindings: RwLock::new(HashMap::new()),
        })
    }

    /// Bind the bare key of `T` with no scope: constructed fresh per lookup.
    pub fn bind<T, F>(&self, build: F)
    where
        T: Any,
        F: Fn(&Ctx<'_>) -> Result<ScopedValue, ProvisionError> + Send + Sync + 'static,
    {
        self.bind_key(Key::of::<T>(), BindingScope::Unscoped, build);
    }

    /// Bind the bare key of `T` into the dynamic scope tagged `scope`.
    pub fn bind_in<T, F>(&self, scope: ScopeId, build: F)
    where
        T: Any,
        F: Fn(&Ctx<'_>) -> Result<ScopedValue, ProvisionError> + Send + Sync + 'static,
    {
        self.bind_key(Key::of::<T>(), BindingScope::Dynamic(scope), build);
    }

    /// Bind `key` with an explicit scope.
    pub fn bind_key<F>(&self, key: Key, scope: BindingScope, build: F)
    where
        F: Fn(&Ctx<'_>) -> Result<ScopedValue, ProvisionError> + Send + Sync + 'static,
    {
        self.bindings.write().insert(
            key,
            Binding {
                scope,
                kind: BindingKind::Construct(Arc::new(build)),
            },
        );
    }

    /// Bind `key` to a shared constant.
    pub fn bind_instance_key<T: Any + Send + Sync>(&self, key: Key, value: T) {
        let shared = Arc::new(value);
        self.bind_key(key, BindingScope::Unscoped, move |_| {
            Ok(ScopedValue::shared(Arc::clone(&shared)))
        });
    }

    /// Bind the bare key of `T` to a shared constant.
    pub fn bind_instance<T: Any + Send + Sync>(&self, value: T) {
        self.bind_instance_key(Key::of::<T>(), value);
    }

    /// Wire a factory in, validating it against the current configuration.
    /// Bind the factory's products before calling this.
    pub fn bind_factory(&self, key: Key, provider: FactoryProvider) -> Result<(), ConfigErrors> {
        self.bind_factory_scoped(key, provider, BindingScope::Unscoped)
    }

    /// Wire a factory whose instances are themselves cached in a dynamic
    /// scope, so everything resolved in one episode sees one factory.
    pub fn bind_factory_in(
        &self,
        key: Key,
        provider: FactoryProvider,
        scope: ScopeId,
    ) -> Result<(), ConfigErrors> {
        self.bind_factory_scoped(key, provider, BindingScope::Dynamic(scope))
    }

    fn bind_factory_scoped(
        &self,
        key: Key,
        provider: FactoryProvider,
        scope: BindingScope,
    ) -> Result<(), ConfigErrors> {
        provider.validate(self)?;
        self.bindings.write().insert(
            key,
            Binding {
                scope,
                kind: BindingKind::Factory(provider),
            },
        );
        Ok(())
    }

    /// Resolve a factory-typed binding.
    pub fn factory(&self, key: &Key) -> Result<Arc<FactoryInstance>, ProvisionError> {
        self.construct(key)?.typed()
    }

    fn handle(&self) -> Result<Arc<dyn ScopeAwareContainer>, ProvisionError> {
        self.this
            .upgrade()
            .map(|this| this as Arc<dyn ScopeAwareContainer>)
            .ok_or_else(|| ProvisionError::new("container dropped during construction"))
    }

    fn lookup(&self, key: &Key) -> Result<Binding, ProvisionError> {
        self.bindings
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| ProvisionError::new(format!("no binding for {key}")))
    }
}

impl ScopeAwareContainer for TestContainer {
    fn construct(&self, key: &Key) -> Result<ScopedValue, ProvisionError> {
        let binding = self.lookup(key)?;
        match binding.kind {
            BindingKind::Construct(build) => match binding.scope {
                BindingScope::Dynamic(scope) => resolve_or_construct(key, scope, || {
                    build(&Ctx {
                        container: self,
                        scope: Some(scope),
                    })
                }),
                _ => build(&Ctx {
                    container: self,
                    scope: None,
                }),
            },
            BindingKind::Factory(provider) => {
                let handle = self.handle()?;
                match binding.scope {
                    BindingScope::Dynamic(scope) => resolve_or_construct(key, scope, || {
                        Ok(ScopedValue::of(provider.provide(handle)))
                    }),
                    _ => Ok(ScopedValue::of(provider.provide(handle))),
                }
            }
        }
    }

    fn binding_scope(&self, key: &Key) -> Result<BindingScope, ProvisionError> {
        self.lookup(key).map(|binding| binding.scope)
    }
}

/// Route `tracing` output through the test harness when `RUST_LOG` asks
/// for it.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
