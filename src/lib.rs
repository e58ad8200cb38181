//! # veb-rs
//!
//! A van Emde Boas tree: an ordered set of unsigned integers drawn from a
//! fixed `[0, 2^bits - 1]` universe, answering minimum, maximum, successor
//! and predecessor queries and performing inserts and removals in
//! `O(log bits)` time (`O(log log U)` in the universe size).
//!
//! Every node caches its minimum and maximum out of band and splits the
//! remaining elements by their high-order bits into half-width clusters.
//! Clusters are created lazily, so a sparse 64-bit universe only pays for
//! the clusters it actually touches.
//!
//! ## Example
//!
//! ```rust
//! use veb_rs::VebTree;
//!
//! let mut tree = VebTree::new(9);
//! tree.insert(3);
//! tree.insert(200);
//! tree.insert(45);
//!
//! assert_eq!(tree.min(), Some(3));
//! assert_eq!(tree.next(3), Some(45));
//! assert_eq!(tree.prev(45), Some(3));
//! assert_eq!(tree.next(200), None);
//! assert_eq!(tree.iter().collect::<Vec<_>>(), vec![3, 45, 200]);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

mod error;
mod node;
mod tracing_helpers;

use std::fmt;
use std::iter::FusedIterator;
use std::ops::{Bound, RangeBounds};

pub use error::{Error, MAX_UNIVERSE_BITS};

use node::Node;
use tracing_helpers::trace_log;

// =============================================================================
// VebTree
// =============================================================================

/// An ordered set of integers from a `bits`-wide universe.
///
/// The structure is single-owner: mutation takes `&mut self`, so callers
/// that share a tree across threads wrap the whole tree in their own lock.
#[derive(Clone)]
pub struct VebTree {
    bits: u32,
    root: Node,
    len: usize,
}

impl VebTree {
    /// Creates an empty tree over `[0, 2^bits - 1]`.
    ///
    /// # Panics
    ///
    /// Panics if `bits` exceeds [`MAX_UNIVERSE_BITS`].
    pub fn new(bits: u32) -> Self {
        match Self::try_new(bits) {
            Ok(tree) => tree,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates an empty tree, rejecting unsupported widths.
    pub fn try_new(bits: u32) -> Result<Self, Error> {
        if bits > MAX_UNIVERSE_BITS {
            return Err(Error::WidthTooLarge { bits });
        }
        Ok(Self {
            bits,
            root: Node::new(bits),
            len: 0,
        })
    }

    /// Width of the universe in bits.
    #[inline]
    pub fn universe_bits(&self) -> u32 {
        self.bits
    }

    /// Largest value this tree can hold.
    #[inline]
    pub fn universe_max(&self) -> u64 {
        if self.bits == 0 {
            0
        } else {
            u64::MAX >> (u64::BITS - self.bits)
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn min(&self) -> Option<u64> {
        self.root.min()
    }

    #[inline]
    pub fn max(&self) -> Option<u64> {
        self.root.max()
    }

    pub fn contains(&self, value: u64) -> bool {
        value <= self.universe_max() && self.root.contains(value)
    }

    /// Adds `value` to the set. Returns `true` if it was not already present.
    ///
    /// # Panics
    ///
    /// Panics if `value` is above [`universe_max`](Self::universe_max).
    pub fn insert(&mut self, value: u64) -> bool {
        match self.try_insert(value) {
            Ok(added) => added,
            Err(err) => panic!("{err}"),
        }
    }

    /// Adds `value` to the set, rejecting values outside the universe.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self)))]
    pub fn try_insert(&mut self, value: u64) -> Result<bool, Error> {
        if value > self.universe_max() {
            return Err(Error::OutOfRange {
                value,
                bits: self.bits,
            });
        }
        let added = self.root.insert(value);
        if added {
            self.len += 1;
        }
        trace_log!(value, added, len = self.len, "insert");
        Ok(added)
    }

    /// Removes `value` from the set. Returns `true` if it was present.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self)))]
    pub fn remove(&mut self, value: u64) -> bool {
        if value > self.universe_max() {
            return false;
        }
        let removed = self.root.remove(value);
        if removed {
            self.len -= 1;
        }
        trace_log!(value, removed, len = self.len, "remove");
        removed
    }

    /// Smallest element strictly greater than `value`.
    pub fn next(&self, value: u64) -> Option<u64> {
        if value >= self.universe_max() {
            return None;
        }
        self.root.next(value)
    }

    /// Largest element strictly smaller than `value`.
    pub fn prev(&self, value: u64) -> Option<u64> {
        if value > self.universe_max() {
            return self.max();
        }
        self.root.prev(value)
    }

    pub fn pop_min(&mut self) -> Option<u64> {
        let min = self.min()?;
        self.remove(min);
        Some(min)
    }

    pub fn pop_max(&mut self) -> Option<u64> {
        let max = self.max()?;
        self.remove(max);
        Some(max)
    }

    /// Removes every element, keeping the universe width.
    pub fn clear(&mut self) {
        self.root = Node::new(self.bits);
        self.len = 0;
    }

    /// Ascending iterator over the elements.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            tree: self,
            front: self.min(),
            back: self.max(),
            remaining: self.len,
        }
    }

    /// Ascending iterator over the elements within `range`.
    pub fn range<R: RangeBounds<u64>>(&self, range: R) -> Range<'_> {
        let front = match range.start_bound() {
            Bound::Included(&start) if self.contains(start) => Some(start),
            Bound::Included(&start) => self.next(start),
            Bound::Excluded(&start) => self.next(start),
            Bound::Unbounded => self.min(),
        };
        let back = match range.end_bound() {
            Bound::Included(&end) if self.contains(end) => Some(end),
            Bound::Included(&end) => self.prev(end),
            Bound::Excluded(&end) => self.prev(end),
            Bound::Unbounded => self.max(),
        };
        let (front, back) = match (front, back) {
            (Some(front), Some(back)) if front <= back => (Some(front), Some(back)),
            _ => (None, None),
        };
        Range {
            tree: self,
            front,
            back,
        }
    }
}

impl Default for VebTree {
    /// An empty tree over the full 64-bit universe.
    fn default() -> Self {
        Self::new(MAX_UNIVERSE_BITS)
    }
}

impl fmt::Debug for VebTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl PartialEq for VebTree {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits && self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for VebTree {}

impl Extend<u64> for VebTree {
    fn extend<I: IntoIterator<Item = u64>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a> Extend<&'a u64> for VebTree {
    fn extend<I: IntoIterator<Item = &'a u64>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<'a> IntoIterator for &'a VebTree {
    type Item = u64;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Ascending iterator over a [`VebTree`], driven by `next`/`prev` queries.
pub struct Iter<'a> {
    tree: &'a VebTree,
    front: Option<u64>,
    back: Option<u64>,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.front?;
        self.remaining -= 1;
        self.front = self.tree.next(current);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<u64> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.back?;
        self.remaining -= 1;
        self.back = self.tree.prev(current);
        Some(current)
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

/// Ascending iterator over the elements of a [`VebTree`] within a range.
pub struct Range<'a> {
    tree: &'a VebTree,
    front: Option<u64>,
    back: Option<u64>,
}

impl Range<'_> {
    fn finish(&mut self) {
        self.front = None;
        self.back = None;
    }
}

impl Iterator for Range<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let current = self.front?;
        if Some(current) == self.back {
            self.finish();
        } else {
            self.front = self.tree.next(current);
        }
        Some(current)
    }
}

impl DoubleEndedIterator for Range<'_> {
    fn next_back(&mut self) -> Option<u64> {
        let current = self.back?;
        if Some(current) == self.front {
            self.finish();
        } else {
            self.back = self.tree.prev(current);
        }
        Some(current)
    }
}

impl FusedIterator for Range<'_> {}


#[cfg(test)]
mod proptests;
