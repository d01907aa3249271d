//! Transition type tags.

use std::cell::RefCell;

use indexmap::IndexSet;

/// Insertion-ordered set of string tags attached to a transition.
///
/// The set is shared: a handle obtained from
/// [`Transition::types`](super::Transition::types) observes and applies
/// changes to the transition's own set. Nothing locks it once the
/// transition is running.
#[derive(Debug, Default)]
pub struct TypeSet {
    tags: RefCell<IndexSet<String>>,
}

impl TypeSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag. Returns `false` if it was already present, in which case
    /// its original position is kept.
    pub fn add(&self, tag: impl Into<String>) -> bool {
        self.tags.borrow_mut().insert(tag.into())
    }

    /// Removes a tag. Returns `false` if it was not present.
    pub fn delete(&self, tag: &str) -> bool {
        self.tags.borrow_mut().shift_remove(tag)
    }

    /// Returns whether the tag is present.
    #[must_use]
    pub fn has(&self, tag: &str) -> bool {
        self.tags.borrow().contains(tag)
    }

    /// Removes every tag.
    pub fn clear(&self) {
        self.tags.borrow_mut().clear();
    }

    /// Returns the number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.borrow().len()
    }

    /// Returns whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.borrow().is_empty()
    }

    /// Returns the tags in insertion order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.tags.borrow().iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for TypeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tags: RefCell::new(iter.into_iter().map(Into::into).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_and_dedup() {
        let types: TypeSet = ["slide-in", "fade-out", "slide-in"].into_iter().collect();
        assert_eq!(types.len(), 2);
        assert_eq!(types.to_vec(), vec!["slide-in", "fade-out"]);
    }

    #[test]
    fn test_add_delete_has() {
        let types = TypeSet::new();
        assert!(types.is_empty());
        assert!(types.add("a"));
        assert!(types.add("b"));
        assert!(!types.add("a"));
        assert!(types.has("a"));

        assert!(types.delete("a"));
        assert!(!types.delete("a"));
        assert_eq!(types.to_vec(), vec!["b"]);

        types.add("a");
        assert_eq!(types.to_vec(), vec!["b", "a"]);

        types.clear();
        assert!(types.is_empty());
    }
}
