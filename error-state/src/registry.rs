use rustc_hash::FxHashMap;

use precision_expr::Array;

/// The Error-Array Registry (C2): for every symbolic input array, lazily mints a paired
/// error array used as the symbolic representation of that input's per-element relative
/// error (`spec.md` §4.1).
///
/// Idempotent and infallible by construction, matching the data model invariant "for any
/// source Array A, at most one error array exists in the registry".
#[derive(Debug, Default)]
pub struct ErrorArrayRegistry {
    by_source_name: FxHashMap<String, Array>,
}

impl ErrorArrayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the error array paired with `source`, creating it on first call and
    /// returning the same descriptor on every subsequent call for the same source array
    /// name (Testable Property 2, `spec.md` §8).
    pub fn error_array_for(&mut self, source: &Array) -> Array {
        if let Some(existing) = self.by_source_name.get(source.name()) {
            return existing.clone();
        }
        let error_array =
            Array::new(Array::error_array_name(source.name()), Array::ERROR_ARRAY_ELEMENT_WIDTH);
        self.by_source_name.insert(source.name().to_owned(), error_array.clone());
        error_array
    }

    /// Number of distinct error arrays minted so far. Exposed for tests/diagnostics only.
    pub fn len(&self) -> usize {
        self.by_source_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_source_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idempotent_for_the_same_source_array() {
        let mut registry = ErrorArrayRegistry::new();
        let source = Array::new("a", 8);
        let first = registry.error_array_for(&source);
        let second = registry.error_array_for(&source);
        assert_eq!(first.name(), second.name());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn distinct_sources_get_distinct_error_arrays() {
        let mut registry = ErrorArrayRegistry::new();
        let a = Array::new("a", 8);
        let b = Array::new("b", 8);
        let ea = registry.error_array_for(&a);
        let eb = registry.error_array_for(&b);
        assert_ne!(ea.name(), eb.name());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn error_array_element_width_is_always_eight_bits() {
        let mut registry = ErrorArrayRegistry::new();
        let wide_source = Array::new("wide", 64);
        let error_array = registry.error_array_for(&wide_source);
        assert_eq!(error_array.element_width(), 8);
    }

    #[test]
    fn error_array_name_follows_the_fractional_error_convention() {
        let mut registry = ErrorArrayRegistry::new();
        let source = Array::new("input0", 8);
        let error_array = registry.error_array_for(&source);
        assert_eq!(error_array.name(), "_fractional_error_input0");
    }
}
