//! Recursive van Emde Boas node.
//!
//! A node over a `width`-bit universe is either a flat bitmap (`Leaf`, for
//! widths up to [`LEAF_BITS`]) or a `Branch` that caches its extrema out of
//! band and pushes every other element down into half-width clusters. A
//! summary node of the complementary half width records which clusters are
//! non-empty.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::mem;

use crate::tracing_helpers::debug_log;

// =============================================================================
// Configuration
// =============================================================================

/// Widths at or below this are stored as a single `u64` bitmap.
pub(crate) const LEAF_BITS: u32 = 6;

// =============================================================================
// Bit splitting
// =============================================================================

/// Width of the clusters below a branch of `width` bits.
#[inline]
pub(crate) fn cluster_bits(width: u32) -> u32 {
    width / 2
}

/// Width of the summary of a branch of `width` bits.
#[inline]
pub(crate) fn summary_bits(width: u32) -> u32 {
    width - cluster_bits(width)
}

/// Splits `x` into `(cluster index, offset in cluster)` for clusters of
/// `low_bits` bits.
#[inline]
fn split(x: u64, low_bits: u32) -> (u64, u64) {
    debug_assert!(low_bits > 0 && low_bits < u64::BITS);
    (x >> low_bits, x & ((1u64 << low_bits) - 1))
}

#[inline]
fn join(high: u64, low: u64, low_bits: u32) -> u64 {
    debug_assert!(low < (1u64 << low_bits));
    (high << low_bits) | low
}

// =============================================================================
// Node
// =============================================================================

#[derive(Clone, Debug)]
pub(crate) enum Node {
    Leaf(Leaf),
    Branch(Box<Branch>),
}

impl Node {
    pub(crate) fn new(width: u32) -> Self {
        if width <= LEAF_BITS {
            Node::Leaf(Leaf::default())
        } else {
            Node::Branch(Box::new(Branch::new(width)))
        }
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Node::Leaf(leaf) => leaf.is_empty(),
            Node::Branch(branch) => branch.bounds.is_none(),
        }
    }

    #[inline]
    pub(crate) fn min(&self) -> Option<u64> {
        match self {
            Node::Leaf(leaf) => leaf.min(),
            Node::Branch(branch) => branch.bounds.map(|(min, _)| min),
        }
    }

    #[inline]
    pub(crate) fn max(&self) -> Option<u64> {
        match self {
            Node::Leaf(leaf) => leaf.max(),
            Node::Branch(branch) => branch.bounds.map(|(_, max)| max),
        }
    }

    pub(crate) fn contains(&self, x: u64) -> bool {
        match self {
            Node::Leaf(leaf) => leaf.contains(x),
            Node::Branch(branch) => branch.contains(x),
        }
    }

    /// Returns `true` if `x` was not already present.
    pub(crate) fn insert(&mut self, x: u64) -> bool {
        match self {
            Node::Leaf(leaf) => leaf.insert(x),
            Node::Branch(branch) => branch.insert(x),
        }
    }

    /// Returns `true` if `x` was present.
    pub(crate) fn remove(&mut self, x: u64) -> bool {
        match self {
            Node::Leaf(leaf) => leaf.remove(x),
            Node::Branch(branch) => branch.remove(x),
        }
    }

    /// Smallest element strictly greater than `x`.
    pub(crate) fn next(&self, x: u64) -> Option<u64> {
        match self {
            Node::Leaf(leaf) => leaf.next(x),
            Node::Branch(branch) => branch.next(x),
        }
    }

    /// Largest element strictly smaller than `x`.
    pub(crate) fn prev(&self, x: u64) -> Option<u64> {
        match self {
            Node::Leaf(leaf) => leaf.prev(x),
            Node::Branch(branch) => branch.prev(x),
        }
    }
}

// =============================================================================
// Leaf (bitmap base case)
// =============================================================================

/// Universe of at most 64 values; bit `i` set means `i` is present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Leaf {
    pub(crate) bits: u64,
}

impl Leaf {
    #[inline]
    fn is_empty(self) -> bool {
        self.bits == 0
    }

    #[inline]
    fn min(self) -> Option<u64> {
        (self.bits != 0).then(|| u64::from(self.bits.trailing_zeros()))
    }

    #[inline]
    fn max(self) -> Option<u64> {
        (self.bits != 0).then(|| u64::from(63 - self.bits.leading_zeros()))
    }

    #[inline]
    fn contains(self, x: u64) -> bool {
        x < 64 && self.bits & (1u64 << x) != 0
    }

    #[inline]
    fn insert(&mut self, x: u64) -> bool {
        debug_assert!(x < 64);
        let bit = 1u64 << x;
        let added = self.bits & bit == 0;
        self.bits |= bit;
        added
    }

    #[inline]
    fn remove(&mut self, x: u64) -> bool {
        if x >= 64 {
            return false;
        }
        let bit = 1u64 << x;
        let present = self.bits & bit != 0;
        self.bits &= !bit;
        present
    }

    #[inline]
    fn next(self, x: u64) -> Option<u64> {
        if x >= 63 {
            return None;
        }
        let above = self.bits & (u64::MAX << (x + 1));
        (above != 0).then(|| u64::from(above.trailing_zeros()))
    }

    #[inline]
    fn prev(self, x: u64) -> Option<u64> {
        let below = if x >= 64 {
            self.bits
        } else {
            self.bits & ((1u64 << x) - 1)
        };
        (below != 0).then(|| u64::from(63 - below.leading_zeros()))
    }
}

// =============================================================================
// Branch (recursive case)
// =============================================================================

/// Recursive node over `width > LEAF_BITS` bits.
///
/// `bounds` holds `(min, max)` and is `None` iff the branch is empty. Neither
/// extremum is ever stored in `clusters`. `summary` exists iff `clusters` is
/// non-empty, and its element set equals the key set of `clusters`.
#[derive(Clone, Debug)]
pub(crate) struct Branch {
    pub(crate) width: u32,
    pub(crate) bounds: Option<(u64, u64)>,
    pub(crate) summary: Option<Box<Node>>,
    pub(crate) clusters: HashMap<u64, Node>,
}

impl Branch {
    fn new(width: u32) -> Self {
        debug_assert!(width > LEAF_BITS && width <= u64::BITS);
        Self {
            width,
            bounds: None,
            summary: None,
            clusters: HashMap::new(),
        }
    }

    #[inline]
    fn low_bits(&self) -> u32 {
        cluster_bits(self.width)
    }

    fn contains(&self, x: u64) -> bool {
        let Some((min, max)) = self.bounds else {
            return false;
        };
        if x == min || x == max {
            return true;
        }
        if x < min || x > max {
            return false;
        }
        let (high, low) = split(x, self.low_bits());
        self.clusters
            .get(&high)
            .is_some_and(|cluster| cluster.contains(low))
    }

    fn insert(&mut self, x: u64) -> bool {
        let Some((mut min, mut max)) = self.bounds else {
            self.bounds = Some((x, x));
            return true;
        };
        if x == min || x == max {
            return false;
        }
        if min == max {
            self.bounds = Some((min.min(x), max.max(x)));
            return true;
        }

        // A new extremum displaces the old one, which then goes down.
        let mut pushed = x;
        if pushed < min {
            mem::swap(&mut pushed, &mut min);
        } else if pushed > max {
            mem::swap(&mut pushed, &mut max);
        }
        self.bounds = Some((min, max));

        let width = self.width;
        let low_bits = self.low_bits();
        let (high, low) = split(pushed, low_bits);
        match self.clusters.entry(high) {
            Entry::Occupied(mut cluster) => cluster.get_mut().insert(low),
            Entry::Vacant(slot) => {
                // Clusters are dropped as soon as they empty, so a vacant slot
                // means this cluster is new to the summary as well.
                let summary = self.summary.get_or_insert_with(|| {
                    debug_log!(width, "allocating summary");
                    Box::new(Node::new(summary_bits(width)))
                });
                summary.insert(high);
                debug_log!(width, cluster = high, "allocating cluster");
                slot.insert(Node::new(low_bits)).insert(low)
            }
        }
    }

    fn remove(&mut self, x: u64) -> bool {
        let Some((min, max)) = self.bounds else {
            return false;
        };
        if x < min || x > max {
            return false;
        }
        if min == max {
            self.bounds = None;
            return true;
        }

        // An extremum is replaced by the nearest clustered element, which
        // then has to be removed from its cluster instead of `x`.
        let target = if x == min {
            match self.first_clustered() {
                Some(next_min) => {
                    self.bounds = Some((next_min, max));
                    next_min
                }
                None => {
                    self.bounds = Some((max, max));
                    return true;
                }
            }
        } else if x == max {
            match self.last_clustered() {
                Some(next_max) => {
                    self.bounds = Some((min, next_max));
                    next_max
                }
                None => {
                    self.bounds = Some((min, min));
                    return true;
                }
            }
        } else {
            x
        };

        let (high, low) = split(target, self.low_bits());
        let Some(cluster) = self.clusters.get_mut(&high) else {
            return false;
        };
        let removed = cluster.remove(low);
        if cluster.is_empty() {
            self.release_cluster(high);
        }
        removed
    }

    /// Drops the empty cluster `high` and its summary entry, and the summary
    /// itself once no cluster is left.
    fn release_cluster(&mut self, high: u64) {
        debug_log!(width = self.width, cluster = high, "releasing cluster");
        self.clusters.remove(&high);
        if let Some(summary) = self.summary.as_mut() {
            summary.remove(high);
            if summary.is_empty() {
                debug_log!(width = self.width, "releasing summary");
                self.summary = None;
            }
        }
        debug_assert_eq!(self.summary.is_none(), self.clusters.is_empty());
    }

    /// Smallest element held below this branch, excluding the cached extrema.
    fn first_clustered(&self) -> Option<u64> {
        let high = self.summary.as_ref()?.min()?;
        let low = self.clusters.get(&high)?.min()?;
        Some(join(high, low, self.low_bits()))
    }

    /// Largest element held below this branch, excluding the cached extrema.
    fn last_clustered(&self) -> Option<u64> {
        let high = self.summary.as_ref()?.max()?;
        let low = self.clusters.get(&high)?.max()?;
        Some(join(high, low, self.low_bits()))
    }

    fn next(&self, x: u64) -> Option<u64> {
        let (min, max) = self.bounds?;
        if x < min {
            return Some(min);
        }
        if x >= max {
            return None;
        }
        let Some(summary) = self.summary.as_ref() else {
            return Some(max);
        };

        let low_bits = self.low_bits();
        let (high, low) = split(x, low_bits);
        if let Some(cluster) = self.clusters.get(&high) {
            if cluster.max().is_some_and(|cluster_max| cluster_max > low) {
                if let Some(found) = cluster.next(low) {
                    return Some(join(high, found, low_bits));
                }
            }
        }

        summary
            .next(high)
            .and_then(|next_high| {
                let found = self.clusters.get(&next_high)?.min()?;
                Some(join(next_high, found, low_bits))
            })
            .or(Some(max))
    }

    fn prev(&self, x: u64) -> Option<u64> {
        let (min, max) = self.bounds?;
        if x > max {
            return Some(max);
        }
        if x <= min {
            return None;
        }
        let Some(summary) = self.summary.as_ref() else {
            return Some(min);
        };

        let low_bits = self.low_bits();
        let (high, low) = split(x, low_bits);
        if let Some(cluster) = self.clusters.get(&high) {
            if cluster.min().is_some_and(|cluster_min| cluster_min < low) {
                if let Some(found) = cluster.prev(low) {
                    return Some(join(high, found, low_bits));
                }
            }
        }

        summary
            .prev(high)
            .and_then(|prev_high| {
                let found = self.clusters.get(&prev_high)?.max()?;
                Some(join(prev_high, found, low_bits))
            })
            .or(Some(min))
    }
}
