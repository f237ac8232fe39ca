//! Scope-aware value providers
//!
//! The glue the container calls into whenever it hits a dependency bound
//! "in dynamic scope S": find-or-create the value at the matching level of
//! the chain open on this context. Factory call parameters get the stricter
//! [`ParamProvider`], which only ever finds.

use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

use crate::episode;
use crate::error::ProvisionError;
use crate::key::Key;
use crate::scope::ScopeId;
use crate::value::ScopedValue;

/// Resolves `key` against the chain open on this context, constructing and
/// caching it at the level tagged `scope` when absent.
///
/// # Errors
/// No open episode, no matching level, or a failure from `construct`.
pub fn resolve_or_construct<F>(
    key: &Key,
    scope: ScopeId,
    construct: F,
) -> Result<ScopedValue, ProvisionError>
where
    F: FnOnce() -> Result<ScopedValue, ProvisionError>,
{
    let active = episode::active()?;
    active.resolve(key, scope, construct)
}

type UnscopedFn = dyn Fn() -> Result<ScopedValue, ProvisionError> + Send + Sync;

/// A reusable (key, scope) lookup over the active chain, wrapping the
/// container's unscoped constructor for the key.
pub struct ScopedProvider {
    key: Key,
    scope: ScopeId,
    unscoped: Arc<UnscopedFn>,
}

impl ScopedProvider {
    /// Provider that caches what `unscoped` builds at the `scope` level.
    pub fn new<F>(key: Key, scope: ScopeId, unscoped: F) -> Self
    where
        F: Fn() -> Result<ScopedValue, ProvisionError> + Send + Sync + 'static,
    {
        Self {
            key,
            scope,
            unscoped: Arc::new(unscoped),
        }
    }

    /// Find-or-create against the chain open on this context.
    ///
    /// # Errors
    /// See [`resolve_or_construct`].
    pub fn get(&self) -> Result<ScopedValue, ProvisionError> {
        resolve_or_construct(&self.key, self.scope, || (self.unscoped)())
    }
}

impl Debug for ScopedProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ScopedProvider[ scope: {}, key: {} ]", self.scope, self.key)
    }
}

/// Provider for factory-seeded parameters.
///
/// Parameters are installed by the factory invocation that opened the
/// episode; they are never constructed on demand. Consuming one that was
/// not seeded is a provisioning error naming the key.
#[derive(Debug, Clone)]
pub struct ParamProvider {
    key: Key,
    scope: ScopeId,
}

impl ParamProvider {
    /// Provider for the parameter `key` seeded at the `scope` level.
    #[inline]
    #[must_use]
    pub fn new(key: Key, scope: ScopeId) -> Self {
        Self { key, scope }
    }

    /// Looks the parameter up in the chain open on this context.
    ///
    /// # Errors
    /// No open episode, no matching level, or an unseeded parameter.
    pub fn get(&self) -> Result<ScopedValue, ProvisionError> {
        let key = &self.key;
        let scope = self.scope;
        resolve_or_construct(key, scope, || {
            Err(ProvisionError::new(format!(
                "parameter {key} was never seeded in scope {scope}"
            )))
        })
    }
}

impl Display for ParamProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ParamProvider[ scope: {}, key: {} ]", self.scope, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConnScope;

    fn conn() -> ScopeId {
        ScopeId::of::<ConnScope>()
    }

    #[test]
    fn resolve_without_an_episode_fails() {
        let err = resolve_or_construct(&Key::of::<String>(), conn(), || {
            Ok(ScopedValue::of("x".to_string()))
        })
        .unwrap_err();
        assert!(err.to_string().contains("no dynamic scope instance is active"));
    }

    #[test]
    fn scoped_provider_caches_at_the_open_level() {
        let _episode = episode::activate(conn(), None).unwrap();
        let provider = ScopedProvider::new(Key::of::<u32>(), conn(), || {
            Ok(ScopedValue::of(5u32))
        });

        let first = provider.get().unwrap();
        let second = provider.get().unwrap();
        assert!(first.ptr_eq(&second));
    }

    #[test]
    fn param_provider_finds_seeded_values() {
        let episode = episode::activate(conn(), None).unwrap();
        let key = Key::param_in::<String>("a", conn());
        episode
            .instance()
            .seed(key.clone(), ScopedValue::of("seeded".to_string()))
            .unwrap();

        let provider = ParamProvider::new(key, conn());
        assert_eq!(*provider.get().unwrap().typed::<String>().unwrap(), "seeded");
    }

    #[test]
    fn unseeded_parameter_is_a_provision_error() {
        let _episode = episode::activate(conn(), None).unwrap();
        let provider = ParamProvider::new(Key::param_in::<String>("a", conn()), conn());

        let err = provider.get().unwrap_err();
        assert!(err.to_string().contains("was never seeded"));
        assert!(err.to_string().contains("Key[String @param(a in ConnScope)]"));
    }
}
