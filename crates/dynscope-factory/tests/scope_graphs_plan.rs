//! Functional tests for chained and disjoint scope graphs.
//!
//! Core guarantees exercised here:
//! - A factory resolved inside an open episode captures that level: values
//!   its products cannot resolve locally fall through to the captured level
//!   and its ancestors.
//! - Every invocation of such a factory opens a fresh inner level while
//!   still sharing everything cached at the captured level.
//! - Sibling graphs built from separate outer episodes stay fully disjoint.

use std::sync::Arc;

use dynscope_core::{Key, ScopeId, ScopedValue};
use dynscope_factory::{FactoryInstance, FactoryProvider, FactorySchema, MethodSignature};
use dynscope_test_utils::{init_logging, TestContainer};

struct HorizontalScope;
struct VerticalScope;

struct Left;
struct Right;

struct Top {
    left: Arc<Left>,
    right: Arc<Right>,
}

struct Center {
    tops: Arc<FactoryInstance>,
}

struct CenterFactory;
struct TopFactory;

fn horizontal() -> ScopeId {
    ScopeId::of::<HorizontalScope>()
}

fn vertical() -> ScopeId {
    ScopeId::of::<VerticalScope>()
}

fn wire() -> Arc<FactoryInstance> {
    init_logging();
    let container = TestContainer::new();

    container.bind_in::<Left, _>(horizontal(), |_| Ok(ScopedValue::of(Left)));
    container.bind_in::<Right, _>(horizontal(), |_| Ok(ScopedValue::of(Right)));
    container.bind_in::<Top, _>(vertical(), |ctx| {
        Ok(ScopedValue::of(Top {
            left: ctx.get::<Left>()?,
            right: ctx.get::<Right>()?,
        }))
    });
    container.bind_in::<Center, _>(horizontal(), |ctx| {
        Ok(ScopedValue::of(Center {
            tops: ctx.factory(&Key::of::<TopFactory>())?,
        }))
    });

    let tops = FactorySchema::of::<TopFactory>()
        .with_method(MethodSignature::new("create", Key::of::<Top>()));
    container
        .bind_factory_in(
            Key::of::<TopFactory>(),
            FactoryProvider::new(tops, vertical()).expect("schema derives"),
            horizontal(),
        )
        .expect("top factory validates");

    let centers = FactorySchema::of::<CenterFactory>()
        .with_method(MethodSignature::new("create", Key::of::<Center>()));
    container
        .bind_factory(
            Key::of::<CenterFactory>(),
            FactoryProvider::new(centers, horizontal()).expect("schema derives"),
        )
        .expect("center factory validates");

    container
        .factory(&Key::of::<CenterFactory>())
        .expect("factory resolves")
}

fn create_center(factory: &FactoryInstance) -> Arc<Center> {
    factory
        .invoke("create", vec![])
        .unwrap()
        .typed::<Center>()
        .unwrap()
}

fn create_top(center: &Center) -> Arc<Top> {
    center
        .tops
        .invoke("create", vec![])
        .unwrap()
        .typed::<Top>()
        .unwrap()
}

/// Tenet: the nested factory was born inside the outer episode, so its
/// products fall through to the outer level for horizontal values while
/// each call still gets a fresh vertical level.
#[test]
fn nested_factory_products_share_the_captured_level() {
    let centers = wire();
    let center = create_center(&centers);

    let top1 = create_top(&center);
    let top2 = create_top(&center);

    assert!(!Arc::ptr_eq(&top1, &top2));
    assert!(Arc::ptr_eq(&top1.left, &top2.left));
    assert!(Arc::ptr_eq(&top1.right, &top2.right));
}

/// Tenet: separate outer episodes yield fully disjoint graphs, down through
/// the values their nested factories fall back to.
#[test]
fn sibling_outer_episodes_stay_disjoint() {
    let centers = wire();
    let one = create_center(&centers);
    let two = create_center(&centers);

    assert!(!Arc::ptr_eq(&one, &two));
    assert!(!Arc::ptr_eq(&one.tops, &two.tops));

    let top_one = create_top(&one);
    let top_two = create_top(&two);
    assert!(!Arc::ptr_eq(&top_one.left, &top_two.left));
}

/// Tenet: the captured level is a snapshot taken at resolution time, so a
/// factory resolved with no episode open captures nothing at all.
#[test]
fn capture_reflects_where_the_factory_was_born() {
    let centers = wire();
    assert!(centers.captured().is_none());

    let center = create_center(&centers);
    assert!(center.tops.captured().is_some());
    assert_eq!(center.tops.captured().unwrap().scope(), horizontal());
}
