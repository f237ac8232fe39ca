//! Functional tests for wiring-time factory validation.
//!
//! Core guarantees exercised here:
//! - Every factory method's return binding must exist and be scoped exactly
//!   as the factory's scope; wrong scope, eager singletons, and unscoped
//!   bindings each fail wiring with a descriptive diagnostic.
//! - Diagnostics across all methods of one factory surface together, not
//!   one at a time.
//! - Foreign qualifiers on factory parameters fail descriptor derivation.
//! - Factories managing an anonymous per-factory scope are exempt from the
//!   return-scope check, and work end to end.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use dynscope_core::{BindingScope, Key, ScopeId, ScopedValue};
use dynscope_factory::{FactoryProvider, FactorySchema, MethodSignature};
use dynscope_test_utils::{init_logging, TestContainer};

struct PoolScope;

struct Lease;
struct Meter;

struct PoolFactory;

fn pool() -> ScopeId {
    ScopeId::of::<PoolScope>()
}

/// Tenet: a missing return binding fails at wiring, not first call.
#[test]
fn missing_return_binding_fails_wiring() {
    init_logging();
    let container = TestContainer::new();

    let schema = FactorySchema::of::<PoolFactory>()
        .with_method(MethodSignature::new("lease", Key::of::<Lease>()));
    let provider = FactoryProvider::new(schema, pool()).expect("schema derives");

    let errors = container
        .bind_factory(Key::of::<PoolFactory>(), provider)
        .unwrap_err();

    assert_eq!(errors.errors().len(), 1);
    assert!(errors
        .to_string()
        .contains("no binding for return value Key[Lease] of method lease"));
}

/// Tenet: every mis-scoped return across every method is reported in one
/// aggregate failure, naming what was expected and what was found.
#[test]
fn mis_scoped_returns_are_reported_together() {
    struct ElsewhereScope;

    init_logging();
    let container = TestContainer::new();
    container.bind::<Lease, _>(|_| Ok(ScopedValue::of(Lease)));
    container.bind_in::<Meter, _>(ScopeId::of::<ElsewhereScope>(), |_| {
        Ok(ScopedValue::of(Meter))
    });

    let schema = FactorySchema::of::<PoolFactory>()
        .with_method(MethodSignature::new("lease", Key::of::<Lease>()))
        .with_method(MethodSignature::new("meter", Key::of::<Meter>()));
    let provider = FactoryProvider::new(schema, pool()).expect("schema derives");

    let errors = container
        .bind_factory(Key::of::<PoolFactory>(), provider)
        .unwrap_err();

    assert_eq!(errors.errors().len(), 2);
    let rendered = errors.to_string();
    assert!(rendered
        .contains("for return value of method lease expected scope PoolScope but found no scope"));
    assert!(rendered.contains(
        "for return value of method meter expected scope PoolScope but found dynamic scope ElsewhereScope"
    ));
}

/// Tenet: factory parameters may only carry the parameter tag; anything
/// else fails derivation before a provider exists at all.
#[test]
fn foreign_parameter_qualifiers_fail_derivation() {
    let schema = FactorySchema::of::<PoolFactory>().with_method(
        MethodSignature::new("lease", Key::of::<Lease>())
            .with_param(Key::named::<String>("region")),
    );

    let errors = FactoryProvider::new(schema, pool()).unwrap_err();
    assert!(errors
        .to_string()
        .contains("only scope parameter tags are allowed on factory parameters"));
    assert!(errors.to_string().contains("@region"));
}

/// Tenet: an anonymous per-factory scope skips the return-scope check,
/// because the wiring that mints it owns every binding placed in it.
#[test]
fn anonymous_factories_are_exempt_from_the_scope_check() {
    init_logging();
    let container = TestContainer::new();
    // Unscoped return binding: a named-scope factory would be refused here.
    container.bind::<Lease, _>(|_| Ok(ScopedValue::of(Lease)));

    let schema = FactorySchema::of::<PoolFactory>()
        .with_method(MethodSignature::new("lease", Key::of::<Lease>()));
    let provider = FactoryProvider::anonymous(schema).expect("schema derives");

    assert!(container.bind_factory(Key::of::<PoolFactory>(), provider).is_ok());
}

/// Tenet: an assisted-injection style factory over its own anonymous scope
/// works end to end: call arguments mix with container-provided values.
#[test]
fn anonymous_class_scope_factory_works_end_to_end() {
    struct Car {
        color: Arc<String>,
        engine_size: Arc<f64>,
    }
    struct CarFactory;

    init_logging();
    let scope = ScopeId::anonymous::<CarFactory>();
    let container = TestContainer::new();

    container.bind_instance(5.0f64);
    container.bind_in::<Car, _>(scope, |ctx| {
        Ok(ScopedValue::of(Car {
            color: ctx.arg::<String>("color")?,
            engine_size: ctx.get::<f64>()?,
        }))
    });

    let schema = FactorySchema::of::<CarFactory>().with_method(
        MethodSignature::new("create", Key::of::<Car>())
            .with_param(Key::param::<String>("color")),
    );
    container
        .bind_factory(
            Key::of::<CarFactory>(),
            FactoryProvider::anonymous(schema).expect("schema derives"),
        )
        .expect("factory validates");

    let factory = container.factory(&Key::of::<CarFactory>()).unwrap();
    assert_eq!(factory.scope(), scope);

    let blue = factory
        .invoke("create", vec![ScopedValue::of("blue".to_string())])
        .unwrap()
        .typed::<Car>()
        .unwrap();
    let red = factory
        .invoke("create", vec![ScopedValue::of("red".to_string())])
        .unwrap()
        .typed::<Car>()
        .unwrap();

    assert_eq!(*blue.color, "blue");
    assert_eq!(*red.color, "red");
    // The engine size is a shared container constant, not per-episode.
    assert!(Arc::ptr_eq(&blue.engine_size, &red.engine_size));
}

/// Tenet: the scope a binding reports is the scope validation sees.
#[test]
fn binding_scope_reports_what_validation_checks() {
    init_logging();
    let container = TestContainer::new();
    container.bind_in::<Lease, _>(pool(), |_| Ok(ScopedValue::of(Lease)));

    use dynscope_core::ScopeAwareContainer;
    assert_eq!(
        container.binding_scope(&Key::of::<Lease>()).unwrap(),
        BindingScope::Dynamic(pool())
    );
}
