//! Erased cache payloads
//!
//! Cache levels hold values of arbitrary types, so slots store a
//! [`ScopedValue`]: a shared, type-erased, nullable payload. Sharing is by
//! [`Arc`], which is what gives "same instance within one episode" its
//! meaning for diamond-shaped graphs.

use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use crate::error::ProvisionError;

/// One cache slot payload: a shared erased value, or null.
///
/// Null models a nullable factory argument that the caller passed as absent.
/// Typed extraction of a null slot is a provisioning error; optional
/// extraction yields `None`.
#[derive(Clone)]
pub struct ScopedValue(Option<Arc<dyn Any + Send + Sync>>);

impl ScopedValue {
    /// Wraps an owned value.
    #[inline]
    #[must_use]
    pub fn of<T: Any + Send + Sync>(value: T) -> Self {
        Self(Some(Arc::new(value)))
    }

    /// Wraps an already-shared value, preserving its identity.
    #[inline]
    #[must_use]
    pub fn shared<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self(Some(value))
    }

    /// The null payload.
    #[inline]
    #[must_use]
    pub fn null() -> Self {
        Self(None)
    }

    /// Whether the slot holds no value.
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// Shared handle to the value as `T`, or `None` on null or type mismatch.
    #[must_use]
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.0
            .as_ref()
            .and_then(|value| Arc::clone(value).downcast::<T>().ok())
    }

    /// Shared handle to the value as `T`.
    ///
    /// # Errors
    /// A null slot or a slot of a different type is a provisioning failure,
    /// never a silent default.
    pub fn typed<T: Any + Send + Sync>(&self) -> Result<Arc<T>, ProvisionError> {
        let name = crate::scope::short_type_name(std::any::type_name::<T>());
        match &self.0 {
            None => Err(ProvisionError::new(format!(
                "null value where {name} was required"
            ))),
            Some(value) => Arc::clone(value).downcast::<T>().map_err(|_| {
                ProvisionError::new(format!("cached value is not a {name}"))
            }),
        }
    }

    /// Whether two slots share one value. Null slots never compare shared.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Debug for ScopedValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => f.write_str("ScopedValue(null)"),
            Some(_) => f.write_str("ScopedValue(..)"),
        }
    }
}
