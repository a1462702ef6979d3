use pretty_assertions::assert_eq;

use super::*;

#[test]
fn intrinsics_are_registered_in_order() {
    let b = IrBuilder::new();
    for op in Intrinsic::ALL {
        let info = b.functions().get(b.intrinsic(op));
        assert_eq!(info.and_then(FunctionInfo::intrinsic), Some(op));
        assert!(info.is_some_and(FunctionInfo::is_intrinsic));
    }
}

#[test]
fn locals_are_unique_even_with_same_name() {
    let b = IrBuilder::new();
    let first = b.local("x");
    let second = b.local("x");
    assert_eq!(first.name, second.name);
    assert_ne!(first.id, second.id);
}

#[test]
fn every_node_gets_a_distinct_span() {
    let b = IrBuilder::new();
    let lhs = b.int(1);
    let rhs = b.int(2);
    let sum = b.plus(lhs.clone(), rhs.clone());
    assert_ne!(lhs.span, rhs.span);
    assert_ne!(sum.span, lhs.span);
    assert_ne!(sum.span, rhs.span);
}

#[test]
fn operator_result_types() {
    let b = IrBuilder::new();
    assert_eq!(b.plus(b.long(1), b.long(2)).ty, Type::Long);
    assert_eq!(b.less(b.int(1), b.int(2)).ty, Type::Boolean);
    assert_eq!(b.unary(Intrinsic::ToString, b.int(1)).ty, Type::String);
    let array = b.vararg(vec![b.int(1)], Type::Int);
    assert_eq!(b.binary(Intrinsic::ArrayGet, array, b.int(0)).ty, Type::Int);
}

#[test]
fn build_function_marks_body() {
    let mut b = IrBuilder::new();
    let f = b.function("f", FunctionFlags::COMPILE_TIME);
    let body = b.block_body(vec![b.ret(f, b.int(0))]);
    let function = b.build_function(f, Vec::new(), Type::Int, body);

    assert_eq!(function.name, b.name("f"));
    let flags = b.functions().get(f).map(|info| info.flags);
    assert_eq!(
        flags,
        Some(FunctionFlags::COMPILE_TIME | FunctionFlags::HAS_BODY)
    );
}

#[test]
fn construct_uses_constructor_class() {
    let mut b = IrBuilder::new();
    let ctor = b.constructor("Point", &["x", "y"], FunctionFlags::COMPILE_TIME);
    let expr = b.construct(ctor, vec![b.int(1), b.int(2)]);
    assert_eq!(expr.ty, Type::Class(b.name("Point")));
}
