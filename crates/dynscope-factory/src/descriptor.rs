//! Factory method descriptors
//!
//! A [`FactoryMethodDescriptor`] is the once-computed form of one factory
//! method: the result key the episode constructs, the parameter keys the
//! call arguments are seeded under, and the error types the method declared.
//! Derivation applies the parameter-tagging rules and accumulates every
//! failure for one factory into a single batch of diagnostics.

use std::any::TypeId;

use indexmap::IndexMap;

use dynscope_core::{ConfigError, ConfigErrors, Key, Qualifier, ScopeId};

use crate::signature::{FactorySchema, MethodSignature};

/// Method table shared by every instance one provider mints, keyed by
/// method name in declaration order.
pub(crate) type MethodTable = IndexMap<String, FactoryMethodDescriptor>;

/// Immutable description of one factory method.
#[derive(Debug, Clone)]
pub struct FactoryMethodDescriptor {
    name: String,
    result: Key,
    params: Vec<Key>,
    declared_errors: Vec<TypeId>,
}

impl FactoryMethodDescriptor {
    /// The method name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key the episode resolves to produce the method's return value.
    #[inline]
    #[must_use]
    pub fn result(&self) -> &Key {
        &self.result
    }

    /// Seeding keys for the call arguments, in parameter order.
    #[inline]
    #[must_use]
    pub fn params(&self) -> &[Key] {
        &self.params
    }

    /// Whether the method declared the error type `cause`.
    #[inline]
    #[must_use]
    pub fn declares(&self, cause: TypeId) -> bool {
        self.declared_errors.contains(&cause)
    }
}

/// Derives one descriptor, applying the parameter rules:
/// - a scoped parameter tag is kept verbatim, completing a missing scope
///   with the factory's own;
/// - an untagged parameter gets the default anonymous parameter tag in the
///   factory's scope;
/// - any other qualifier is rejected into `errors`.
fn derive_method(
    method: &MethodSignature,
    scope: ScopeId,
    errors: &mut ConfigErrors,
) -> FactoryMethodDescriptor {
    let params = method
        .params()
        .iter()
        .enumerate()
        .map(|(index, param)| match param.qualifier() {
            Qualifier::Param { .. } => param.clone().in_scope(scope),
            Qualifier::None => param.clone().with_qualifier(Qualifier::Param {
                name: String::new(),
                scope: Some(scope),
            }),
            Qualifier::Named(found) => {
                errors.push(ConfigError::ForeignParamQualifier {
                    method: method.name().to_string(),
                    index,
                    found: found.clone(),
                });
                param.clone()
            }
        })
        .collect();

    FactoryMethodDescriptor {
        name: method.name().to_string(),
        result: method.result().clone(),
        params,
        declared_errors: method.declared_errors().to_vec(),
    }
}

/// Derives the whole method table for `schema`, batching diagnostics.
///
/// # Errors
/// Every derivation failure across every method, reported together.
pub(crate) fn derive_table(
    schema: &FactorySchema,
    scope: ScopeId,
) -> Result<MethodTable, ConfigErrors> {
    let mut errors = ConfigErrors::new();

    if schema.methods().is_empty() {
        errors.push(ConfigError::EmptyFactory {
            factory: schema.name().to_string(),
        });
    }

    let table = schema
        .methods()
        .iter()
        .map(|method| {
            let descriptor = derive_method(method, scope, &mut errors);
            (descriptor.name.clone(), descriptor)
        })
        .collect();

    errors.into_result()?;
    Ok(table)
}
