//! Factory method schemas
//!
//! The static description of a factory interface: method names, result
//! keys, parameter keys, declared error types. A reflection-based host
//! derives this from method signatures and annotations; here it is spelled
//! out explicitly when the factory is wired, and descriptor derivation
//! enforces the tagging rules.

use std::any::{Any, TypeId};

use dynscope_core::{Key, ScopeId};

/// One declared factory method.
///
/// Parameter keys use [`Key::param`]/[`Key::param_in`] for tagged
/// parameters and plain [`Key::of`] for untagged ones; derivation gives the
/// untagged form the default parameter tag. Any other qualifier on a
/// parameter is a configuration error.
#[derive(Debug, Clone)]
pub struct MethodSignature {
    name: String,
    result: Key,
    params: Vec<Key>,
    declared_errors: Vec<TypeId>,
}

impl MethodSignature {
    /// A method `name` producing the value bound to `result`.
    pub fn new(name: impl Into<String>, result: Key) -> Self {
        Self {
            name: name.into(),
            result,
            params: Vec::new(),
            declared_errors: Vec::new(),
        }
    }

    /// Appends one parameter, in declaration order.
    #[must_use]
    pub fn with_param(mut self, param: Key) -> Self {
        self.params.push(param);
        self
    }

    /// Declares that the method may surface the constructor error `E`
    /// unwrapped, the way a signature's throws clause would.
    #[must_use]
    pub fn throws<E: Any>(mut self) -> Self {
        self.declared_errors.push(TypeId::of::<E>());
        self
    }

    /// The method name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key of the produced value.
    #[inline]
    #[must_use]
    pub fn result(&self) -> &Key {
        &self.result
    }

    /// Parameter keys, in declaration order.
    #[inline]
    #[must_use]
    pub fn params(&self) -> &[Key] {
        &self.params
    }

    /// Error types the method declared.
    #[inline]
    #[must_use]
    pub fn declared_errors(&self) -> &[TypeId] {
        &self.declared_errors
    }
}

/// A whole factory interface: the factory type plus its method signatures.
#[derive(Debug, Clone)]
pub struct FactorySchema {
    name: &'static str,
    anonymous_scope: ScopeId,
    methods: Vec<MethodSignature>,
}

impl FactorySchema {
    /// Schema for the factory type `F`.
    #[must_use]
    pub fn of<F: Any>() -> Self {
        Self {
            name: std::any::type_name::<F>(),
            anonymous_scope: ScopeId::anonymous::<F>(),
            methods: Vec::new(),
        }
    }

    /// Appends one method signature.
    #[must_use]
    pub fn with_method(mut self, method: MethodSignature) -> Self {
        self.methods.push(method);
        self
    }

    /// Full name of the factory type.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The private scope identity minted from the factory type, for
    /// factories that manage a one-off scope of their own.
    #[inline]
    #[must_use]
    pub fn anonymous_scope(&self) -> ScopeId {
        self.anonymous_scope
    }

    /// The declared methods, in declaration order.
    #[inline]
    #[must_use]
    pub fn methods(&self) -> &[MethodSignature] {
        &self.methods
    }
}
