//! Scope cache levels
//!
//! A [`ScopeInstance`] is one node in the singly-linked chain of caches open
//! during a construction episode. It holds the scope identity it was opened
//! for, a reference to the enclosing level, and the values constructed (or
//! seeded) at this level. Lookups walk the chain from innermost to outermost
//! until they hit the level whose identity matches the requested scope.

use std::collections::HashMap;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{ProvisionError, ScopeError};
use crate::key::Key;
use crate::scope::ScopeId;
use crate::value::ScopedValue;

/// One cache level of an open construction episode.
///
/// Exclusively owned by the episode that opened it while the episode runs;
/// nested factories may capture it as their parent, which is what keeps a
/// level alive past its own episode.
pub struct ScopeInstance {
    scope: ScopeId,
    parent: Option<Arc<ScopeInstance>>,
    cache: Mutex<HashMap<Key, ScopedValue>>,
}

impl ScopeInstance {
    pub(crate) fn new(scope: ScopeId, parent: Option<Arc<ScopeInstance>>) -> Self {
        Self {
            scope,
            parent,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Identity this level was opened for.
    #[inline]
    #[must_use]
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// The enclosing level, if this episode was opened inside another.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<ScopeInstance>> {
        self.parent.as_ref()
    }

    /// Every identity in the chain, innermost first.
    #[must_use]
    pub fn chain(&self) -> Vec<ScopeId> {
        let mut searched = Vec::new();
        let mut level = Some(self);
        while let Some(current) = level {
            searched.push(current.scope);
            level = current.parent.as_deref();
        }
        searched
    }

    /// Installs a value directly at this level. Used to pre-load a fresh
    /// episode with the factory call arguments.
    ///
    /// # Errors
    /// [`ScopeError::AlreadySeeded`] if `key` is already present at this
    /// exact level; two parameters colliding under one key must not shadow
    /// each other silently.
    pub fn seed(&self, key: Key, value: ScopedValue) -> Result<(), ScopeError> {
        let mut cache = self.cache.lock();
        if cache.contains_key(&key) {
            return Err(ScopeError::AlreadySeeded {
                key,
                scope: self.scope,
            });
        }
        tracing::trace!("{self}: seeding {key}");
        cache.insert(key, value);
        Ok(())
    }

    /// Finds a cached value, constructing and caching it at the appropriate
    /// level when absent.
    ///
    /// The level is the chain node whose identity equals `scope`. The lock is
    /// not held while `construct` runs, so recursive construction may consult
    /// this chain freely. If the recursion cached a placeholder for this key
    /// in the meantime (a dependency cycle), the finished value silently
    /// overwrites it.
    ///
    /// # Errors
    /// [`ScopeError::NoLevelFound`] (as a provisioning failure) when no node
    /// of the chain matches `scope`, or whatever `construct` fails with.
    pub fn resolve<F>(
        &self,
        key: &Key,
        scope: ScopeId,
        construct: F,
    ) -> Result<ScopedValue, ProvisionError>
    where
        F: FnOnce() -> Result<ScopedValue, ProvisionError>,
    {
        let mut level = self;
        loop {
            if level.scope == scope {
                if let Some(cached) = level.cache.lock().get(key) {
                    tracing::trace!("{level}: found {key}");
                    return Ok(cached.clone());
                }

                let value = construct()?;
                tracing::trace!("{level}: created {key}");
                level.cache.lock().insert(key.clone(), value.clone());
                return Ok(value);
            }

            match &level.parent {
                Some(parent) => level = parent.as_ref(),
                None => {
                    return Err(ScopeError::NoLevelFound {
                        key: key.clone(),
                        scope,
                        searched: self.chain(),
                    }
                    .into())
                }
            }
        }
    }
}

impl Debug for ScopeInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeInstance")
            .field("scope", &self.scope.name())
            .field("chain", &self.chain().len())
            .finish()
    }
}

impl Display for ScopeInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeInstance[ {} ]", self.scope)
    }
}
