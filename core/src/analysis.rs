use rustc_hash::FxHashSet;

use precision_expr::{Array, ExprId, ExprKind, ExpressionFactory};

/// Walks `root` collecting every distinct error-array variable it reads from, in
/// first-visited order. This is how [`crate::PrecisionCore::bound_error`] decides which
/// input-error variables are "relevant to a reported bound" (§4.5/§4.6): only arrays the
/// error term actually mentions are handed to the Optimizer Bridge as maximize objectives.
///
/// Memoizes on [`ExprId`] so a term DAG with heavy sharing is visited once per node rather
/// than once per path, matching the hash-consed arena's whole reason for existing.
pub fn referenced_error_arrays<F: ExpressionFactory>(factory: &F, root: ExprId) -> Vec<Array> {
    let mut visited = FxHashSet::default();
    let mut found = Vec::new();
    let mut seen_names = FxHashSet::default();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        match factory.kind_of(id) {
            ExprKind::Constant(_) => {},
            ExprKind::Read { array, .. } => {
                record_if_error_array(&array, &mut found, &mut seen_names);
            },
            ExprKind::Concat(parts) => stack.extend(parts),
            ExprKind::Add(l, r)
            | ExprKind::Sub(l, r)
            | ExprKind::Mul(l, r)
            | ExprKind::UDiv(l, r)
            | ExprKind::SDiv(l, r)
            | ExprKind::FAdd(l, r)
            | ExprKind::FSub(l, r)
            | ExprKind::FMul(l, r)
            | ExprKind::FDiv(l, r)
            | ExprKind::Eq(l, r)
            | ExprKind::Ule(l, r) => {
                stack.push(l);
                stack.push(r);
            },
            ExprKind::ZExt(child) | ExprKind::SExt(child) | ExprKind::Trunc(child) | ExprKind::BitCast(child) => {
                stack.push(child);
            },
            ExprKind::Select { cond, if_true, if_false } => {
                stack.push(cond);
                stack.push(if_true);
                stack.push(if_false);
            },
            ExprKind::Ulp(of) => stack.push(of),
            ExprKind::LShr(value, _) => stack.push(value),
            ExprKind::ScalingVar(_) => {},
        }
    }
    found
}

const ERROR_ARRAY_PREFIX: &str = "_fractional_error_";

fn record_if_error_array(array: &Array, found: &mut Vec<Array>, seen_names: &mut FxHashSet<String>) {
    if array.name().starts_with(ERROR_ARRAY_PREFIX) && seen_names.insert(array.name().to_owned()) {
        found.push(array.clone());
    }
}

/// The source array name a minted error array was paired with, stripping the
/// `_fractional_error_` convention (§4.1). Used by the reporter wiring to look up a
/// math-call record that might share this name (§4.7 "if the input traces back to a
/// math-call record").
pub fn source_name_of(error_array: &Array) -> Option<&str> {
    error_array.name().strip_prefix(ERROR_ARRAY_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use precision_expr::SharedArena;

    #[test]
    fn collects_distinct_error_arrays_reached_through_arithmetic() {
        let factory = SharedArena::new();
        let error_a = Array::new("_fractional_error_a", 8);
        let error_b = Array::new("_fractional_error_b", 8);
        let zero = factory.mk_constant(0, 8);
        let ra = factory.mk_read(error_a.clone(), zero);
        let rb = factory.mk_read(error_b.clone(), zero);
        let sum = factory.mk_add(ra, rb);

        let arrays = referenced_error_arrays(&factory, sum);
        assert_eq!(arrays.len(), 2);
        assert!(arrays.contains(&error_a));
        assert!(arrays.contains(&error_b));
    }

    #[test]
    fn ignores_non_error_arrays_and_dedups_shared_reads() {
        let factory = SharedArena::new();
        let source = Array::new("a", 8);
        let error_a = Array::new("_fractional_error_a", 8);
        let zero = factory.mk_constant(0, 8);
        let value_read = factory.mk_read(source, zero);
        let error_read = factory.mk_read(error_a.clone(), zero);
        let combined = factory.mk_add(value_read, error_read);
        let doubled = factory.mk_add(combined, error_read);

        let arrays = referenced_error_arrays(&factory, doubled);
        assert_eq!(arrays, vec![error_a]);
    }

    #[test]
    fn source_name_of_strips_the_convention_prefix() {
        let array = Array::new("_fractional_error_input0", 8);
        assert_eq!(source_name_of(&array), Some("input0"));
        let other = Array::new("input0", 8);
        assert_eq!(source_name_of(&other), None);
    }
}
