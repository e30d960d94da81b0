use std::collections::BTreeSet;

use crate::error::{OctExtractError, Result};

/// Set of frame indices marked for export, over the index domain
/// `[0, frame_count)` of the currently loaded document.
///
/// The set carries no back-reference to the store; callers pass the current
/// `frame_count` explicitly so the set stays independently testable. All
/// operations are idempotent, and failed operations leave the set unchanged.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    indices: BTreeSet<usize>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_index(index: usize, frame_count: usize) -> Result<()> {
        if index >= frame_count {
            return Err(OctExtractError::index_out_of_range(format!(
                "frame {index} out of range (document has {frame_count} frames)"
            )));
        }
        Ok(())
    }

    pub fn select(&mut self, index: usize, frame_count: usize) -> Result<()> {
        Self::check_index(index, frame_count)?;
        self.indices.insert(index);
        Ok(())
    }

    pub fn deselect(&mut self, index: usize, frame_count: usize) -> Result<()> {
        Self::check_index(index, frame_count)?;
        self.indices.remove(&index);
        Ok(())
    }

    pub fn select_all(&mut self, frame_count: usize) {
        self.indices = (0..frame_count).collect();
    }

    pub fn deselect_all(&mut self) {
        self.indices.clear();
    }

    /// Swap selected and unselected indices over `[0, frame_count)`.
    /// Selected indices at or beyond `frame_count` are dropped.
    pub fn invert(&mut self, frame_count: usize) {
        let inverted: BTreeSet<usize> = (0..frame_count)
            .filter(|i| !self.indices.contains(i))
            .collect();
        self.indices = inverted;
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    /// Selected indices in ascending order.
    pub fn indices(&self) -> Vec<usize> {
        self.indices.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Reset for a newly loaded document.
    pub fn clear(&mut self) {
        self.indices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_is_idempotent() {
        let mut set = SelectionSet::new();
        set.select(2, 5).unwrap();
        set.select(2, 5).unwrap();
        assert_eq!(set.indices(), vec![2]);
    }

    #[test]
    fn test_out_of_range_does_not_mutate() {
        let mut set = SelectionSet::new();
        set.select(1, 5).unwrap();
        assert!(set.select(5, 5).is_err());
        assert!(set.deselect(9, 5).is_err());
        assert_eq!(set.indices(), vec![1]);
    }

    #[test]
    fn test_invert_twice_is_identity() {
        let mut set = SelectionSet::new();
        set.select(0, 4).unwrap();
        set.select(3, 4).unwrap();
        let before = set.indices();
        set.invert(4);
        assert_eq!(set.indices(), vec![1, 2]);
        set.invert(4);
        assert_eq!(set.indices(), before);
    }

    #[test]
    fn test_select_all_then_deselect_all() {
        let mut set = SelectionSet::new();
        set.select_all(3);
        assert_eq!(set.indices(), vec![0, 1, 2]);
        set.deselect_all();
        assert!(set.is_empty());
    }
}
