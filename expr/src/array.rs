use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A symbolic input array: the `Array descriptor` of the data model.
///
/// Two [`Array`] handles are equal iff they name the same underlying array — arrays are
/// identified by name, never by structural content, matching the "name (unique)" wording
/// of the data model.
#[derive(Clone, Debug)]
pub struct Array(Arc<ArrayData>);

#[derive(Debug, PartialEq, Eq)]
struct ArrayData {
    name: String,
    element_width: u32,
    /// Present when the array models a concrete (non-symbolic) input.
    concrete_contents: Option<Vec<u8>>,
}

impl Array {
    /// The fixed element width used by every error array (§4.1): 8 bits regardless of the
    /// source array's own element width.
    pub const ERROR_ARRAY_ELEMENT_WIDTH: u32 = 8;

    /// Creates a new symbolic array descriptor with a unique name.
    pub fn new(name: impl Into<String>, element_width: u32) -> Self {
        Self(Arc::new(ArrayData {
            name: name.into(),
            element_width,
            concrete_contents: None,
        }))
    }

    /// Creates a descriptor for an array with known concrete contents.
    pub fn with_concrete_contents(
        name: impl Into<String>,
        element_width: u32,
        contents: Vec<u8>,
    ) -> Self {
        Self(Arc::new(ArrayData {
            name: name.into(),
            element_width,
            concrete_contents: Some(contents),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn element_width(&self) -> u32 {
        self.0.element_width
    }

    pub fn concrete_contents(&self) -> Option<&[u8]> {
        self.0.concrete_contents.as_deref()
    }

    /// Synthesizes the name of the error array paired with a source array of this name,
    /// per the data model's `_fractional_error_<A.name>` convention.
    pub fn error_array_name(source_name: &str) -> String {
        format!("_fractional_error_{source_name}")
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.name == other.0.name
    }
}

impl Eq for Array {}

impl Hash for Array {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}
