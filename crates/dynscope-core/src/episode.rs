//! Active-episode registry
//!
//! Tracks the construction episode currently open on this execution context.
//! At most one [`ScopeInstance`] is active per context at any instant:
//! nested factory invocations suspend the enclosing episode, install their
//! own level, and restore the enclosing one when they finish. Activation is
//! refused unless the new level chains (via its parent) through the episode
//! it would suspend, so stale or unrelated factories cannot hijack an open
//! episode.
//!
//! The registry is context-local state, not a global: concurrent episodes on
//! different threads never observe each other.

use std::cell::RefCell;
use std::sync::Arc;

use crate::error::ScopeError;
use crate::instance::ScopeInstance;
use crate::scope::ScopeId;

thread_local! {
    static ACTIVE: RefCell<Option<Arc<ScopeInstance>>> = const { RefCell::new(None) };
}

fn chain_contains(start: Option<&Arc<ScopeInstance>>, target: &Arc<ScopeInstance>) -> bool {
    let mut level = start;
    while let Some(current) = level {
        if Arc::ptr_eq(current, target) {
            return true;
        }
        level = current.parent();
    }
    false
}

/// Opens a new cache level and installs it as this context's active episode.
///
/// Returns a guard that restores the registry on every exit path, panics
/// included. Guards follow stack discipline: an inner episode is fully
/// closed before the enclosing one resumes.
///
/// # Errors
/// [`ScopeError::AlreadyActive`] when an episode is already open on this
/// context and `parent` does not chain through it — i.e. anything other
/// than a factory that captured the open episode (or a level under it).
pub fn activate(
    scope: ScopeId,
    parent: Option<Arc<ScopeInstance>>,
) -> Result<Episode, ScopeError> {
    ACTIVE.with(|slot| {
        let mut slot = slot.borrow_mut();

        if let Some(current) = slot.as_ref() {
            if !chain_contains(parent.as_ref(), current) {
                return Err(ScopeError::AlreadyActive {
                    active: current.scope(),
                });
            }
        }

        let instance = Arc::new(ScopeInstance::new(scope, parent));
        let suspended = slot.take();
        *slot = Some(Arc::clone(&instance));
        tracing::trace!("activated {instance}");

        Ok(Episode {
            instance,
            suspended,
        })
    })
}

/// The active episode's cache chain.
///
/// # Errors
/// [`ScopeError::NotActive`] when no episode is open on this context.
pub fn active() -> Result<Arc<ScopeInstance>, ScopeError> {
    current().ok_or(ScopeError::NotActive)
}

/// Snapshot of the active chain, if any.
///
/// This is what a factory captures at the moment it is produced: a frozen
/// "where in the scope hierarchy was I born", not a live link.
#[must_use]
pub fn current() -> Option<Arc<ScopeInstance>> {
    ACTIVE.with(|slot| slot.borrow().clone())
}

/// Whether an episode is open on this context.
#[must_use]
pub fn is_active() -> bool {
    ACTIVE.with(|slot| slot.borrow().is_some())
}

/// Clears this context's active episode unconditionally.
///
/// The [`Episode`] guard calls this on drop (restoring any suspended
/// enclosing episode); callers using guards never invoke it directly.
pub fn deactivate() {
    ACTIVE.with(|slot| {
        if let Some(instance) = slot.borrow_mut().take() {
            tracing::trace!("deactivated {instance}");
        }
    });
}

/// Guard over one open construction episode.
///
/// Holds the freshly opened level; dropping it deactivates the level and
/// restores whichever episode it suspended.
#[derive(Debug)]
pub struct Episode {
    instance: Arc<ScopeInstance>,
    suspended: Option<Arc<ScopeInstance>>,
}

impl Episode {
    /// The cache level this episode opened.
    #[inline]
    #[must_use]
    pub fn instance(&self) -> &Arc<ScopeInstance> {
        &self.instance
    }
}

impl Drop for Episode {
    fn drop(&mut self) {
        tracing::trace!("deactivated {}", self.instance);
        let suspended = self.suspended.take();
        ACTIVE.with(|slot| *slot.borrow_mut() = suspended);
    }
}
