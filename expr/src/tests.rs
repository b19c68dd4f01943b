use crate::{Arena, Array, ExpressionFactory, SharedArena};

#[test]
fn interning_is_idempotent() {
    let mut arena = Arena::new();
    let a = arena.mk_constant(7, 32);
    let b = arena.mk_constant(7, 32);
    assert_eq!(a, b);

    let array = Array::new("x", 8);
    let idx = arena.mk_constant(0, 32);
    let r1 = arena.mk_read(array.clone(), idx);
    let r2 = arena.mk_read(array, idx);
    assert_eq!(r1, r2);
}

#[test]
fn distinct_constants_are_distinct() {
    let mut arena = Arena::new();
    let a = arena.mk_constant(1, 32);
    let b = arena.mk_constant(2, 32);
    assert_ne!(a, b);
}

#[test]
fn structural_equality_holds_for_composite_terms() {
    let mut arena = Arena::new();
    let x = arena.mk_constant(3, 32);
    let y = arena.mk_constant(4, 32);
    let sum1 = arena.mk_add(x, y);
    let sum2 = arena.mk_add(x, y);
    assert_eq!(sum1, sum2);

    let sum_swapped = arena.mk_add(y, x);
    assert_ne!(sum1, sum_swapped, "add is not commutative at the term level");
}

#[test]
fn error_array_registry_idempotence_property() {
    // Property 2 from SPEC_FULL.md §8: for every Array A, errorArrayFor(A) == errorArrayFor(A).
    // This crate only proves the building block (naming + read idempotence); the
    // registry itself lives in precision-error-state.
    let factory = SharedArena::new();
    let source = Array::new("input0", 8);
    let error_name = Array::error_array_name(source.name());
    assert_eq!(error_name, "_fractional_error_input0");

    let error_array = Array::new(error_name, Array::ERROR_ARRAY_ELEMENT_WIDTH);
    let zero = factory.mk_constant(0, 8);
    let r1 = factory.mk_read(error_array.clone(), zero);
    let r2 = factory.mk_read(error_array, zero);
    assert_eq!(r1, r2);
}

#[test]
fn source_array_of_recognizes_reads_and_same_array_concats() {
    let factory = SharedArena::new();
    let array = Array::new("buf", 8);
    let i0 = factory.mk_constant(0, 32);
    let i1 = factory.mk_constant(1, 32);
    let r0 = factory.mk_read(array.clone(), i0);
    let r1 = factory.mk_read(array.clone(), i1);

    assert_eq!(factory.source_array_of(r0).map(|a| a.name().to_owned()), Some("buf".into()));

    // concat of reads from the same array is recognized by the arena itself via mk_concat;
    // the factory trait only exposes source_array_of for Read/Concat nodes it builds, so
    // build the concat through the underlying Arena directly here.
    let mut arena = Arena::new();
    let idx0 = arena.mk_constant(0, 32);
    let idx1 = arena.mk_constant(1, 32);
    let a0 = arena.mk_read(array.clone(), idx0);
    let a1 = arena.mk_read(array.clone(), idx1);
    let concat = arena.mk_concat(vec![a0, a1]);
    assert_eq!(arena.width_of(concat), 16);

    let other_array = Array::new("other", 8);
    let r_other = factory.mk_read(other_array, i1);
    assert_ne!(r1, r_other);
}
