use bitvec::prelude::*;
use std::fmt;

/// Fixed-capacity bitset over pattern indices
///
/// Used both for a cell's surviving candidates and for a pattern's adjacency set.
/// Indices are 0-based pattern ids; iteration is always in ascending order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternSet {
    bits: BitVec,
    capacity: usize,
}

impl PatternSet {
    /// Create a set with no patterns present
    pub fn new(capacity: usize) -> Self {
        Self {
            bits: bitvec![0; capacity],
            capacity,
        }
    }

    /// Create a set containing every pattern below `capacity`
    pub fn all(capacity: usize) -> Self {
        Self {
            bits: bitvec![1; capacity],
            capacity,
        }
    }

    /// Create a set holding exactly one pattern
    pub fn singleton(capacity: usize, pattern: usize) -> Self {
        let mut set = Self::new(capacity);
        set.insert(pattern);
        set
    }

    /// Number of patterns the set can hold
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert a pattern; indices at or beyond capacity are ignored
    pub fn insert(&mut self, pattern: usize) {
        if pattern < self.capacity {
            self.bits.set(pattern, true);
        }
    }

    /// Test pattern membership
    pub fn contains(&self, pattern: usize) -> bool {
        self.bits.get(pattern).as_deref() == Some(&true)
    }

    /// Keep only patterns also present in `other`
    ///
    /// Returns whether any pattern was removed.
    pub fn intersect_with(&mut self, other: &Self) -> bool {
        let before = self.count();
        self.bits &= &other.bits;
        self.count() < before
    }

    /// Add every pattern present in `other`
    pub fn union_with(&mut self, other: &Self) {
        self.bits |= &other.bits;
    }

    /// Test if no patterns are present
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Count patterns in the set
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Iterate patterns in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    /// Extract all patterns as a vector
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }

    /// Test whether every pattern of `self` is also in `other`
    pub fn is_subset(&self, other: &Self) -> bool {
        self.iter().all(|pattern| other.contains(pattern))
    }
}

impl fmt::Display for PatternSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PatternSet({} patterns: {:?})", self.count(), self.to_vec())
    }
}
