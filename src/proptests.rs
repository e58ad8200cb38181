use super::*;

use crate::node::{cluster_bits, summary_bits, Branch, Leaf, Node, LEAF_BITS};
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeSet;

/// Walks a node and checks the structural invariants, returning the element
/// set it represents.
fn collect_node(node: &Node, width: u32) -> BTreeSet<u64> {
    match node {
        Node::Leaf(Leaf { bits }) => {
            assert!(width <= LEAF_BITS, "leaf at width {width}");
            let span = 1u32 << width;
            if span < 64 {
                assert_eq!(bits >> span, 0, "leaf bit outside universe");
            }
            (0..64).filter(|i| bits & (1u64 << i) != 0).collect()
        }
        Node::Branch(branch) => collect_branch(branch, width),
    }
}

fn collect_branch(branch: &Branch, width: u32) -> BTreeSet<u64> {
    assert_eq!(branch.width, width, "branch width mismatch");
    assert!(width > LEAF_BITS, "branch below leaf threshold");

    let Some((min, max)) = branch.bounds else {
        assert!(branch.clusters.is_empty(), "empty branch with clusters");
        assert!(branch.summary.is_none(), "empty branch with summary");
        return BTreeSet::new();
    };
    assert!(min <= max, "min above max");
    if width < 64 {
        assert!(max >> width == 0, "max outside universe");
    }

    let low_bits = cluster_bits(width);
    let mut set = BTreeSet::from([min, max]);
    let mut cluster_keys = BTreeSet::new();
    for (&high, cluster) in &branch.clusters {
        assert!(!cluster.is_empty(), "empty cluster {high} kept alive");
        cluster_keys.insert(high);
        for low in collect_node(cluster, low_bits) {
            let value = (high << low_bits) | low;
            assert!(min < value && value < max, "extremum pushed into a cluster");
            assert!(set.insert(value), "duplicate element {value}");
        }
    }

    match &branch.summary {
        None => assert!(cluster_keys.is_empty(), "clusters without summary"),
        Some(summary) => {
            let summarised = collect_node(summary, summary_bits(width));
            assert!(!summarised.is_empty(), "empty summary kept alive");
            assert_eq!(summarised, cluster_keys, "summary out of sync");
            assert_eq!(summary.min(), summarised.first().copied());
            assert_eq!(summary.max(), summarised.last().copied());
        }
    }

    if min == max {
        assert!(branch.clusters.is_empty(), "single element with clusters");
    }
    set
}

fn validate_tree(t: &VebTree) {
    let set = collect_node(&t.root, t.bits);
    assert_eq!(set.len(), t.len(), "tracked length must match element count");
    assert_eq!(t.min(), set.first().copied());
    assert_eq!(t.max(), set.last().copied());
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    Insert(u64),
    Remove(u64),
    Next(u64),
    Prev(u64),
    Contains(u64),
    PopMin,
    PopMax,
}

impl Op {
    /// Folds the operand into a universe of `bits` bits while keeping the
    /// values clustered enough to share high bits.
    fn fit(self, bits: u32) -> Op {
        let fold = |x: u64| {
            if bits == 64 {
                x.rotate_left((x % 64) as u32) & 0xFFFF_0000_0000_FFFF
            } else if bits == 0 {
                0
            } else {
                x & (u64::MAX >> (64 - bits))
            }
        };
        match self {
            Op::Insert(x) => Op::Insert(fold(x)),
            Op::Remove(x) => Op::Remove(fold(x)),
            Op::Next(x) => Op::Next(fold(x)),
            Op::Prev(x) => Op::Prev(fold(x)),
            Op::Contains(x) => Op::Contains(fold(x)),
            op => op,
        }
    }
}

fn width_strategy() -> impl Strategy<Value = u32> {
    prop_oneof![
        Just(0u32),
        Just(1),
        Just(6),
        Just(7),
        Just(9),
        Just(13),
        Just(16),
        Just(21),
        Just(64),
    ]
}

fn check_equivalence(bits: u32, ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut t = VebTree::new(bits);
    let mut m: BTreeSet<u64> = BTreeSet::new();

    for op in ops {
        match op.fit(bits) {
            Op::Insert(x) => {
                prop_assert_eq!(t.insert(x), m.insert(x));
            }
            Op::Remove(x) => {
                prop_assert_eq!(t.remove(x), m.remove(&x));
            }
            Op::Next(x) => {
                let expected = m.range(x..).find(|&&v| v > x).copied();
                prop_assert_eq!(t.next(x), expected);
            }
            Op::Prev(x) => {
                prop_assert_eq!(t.prev(x), m.range(..x).next_back().copied());
            }
            Op::Contains(x) => {
                prop_assert_eq!(t.contains(x), m.contains(&x));
            }
            Op::PopMin => {
                prop_assert_eq!(t.pop_min(), m.pop_first());
            }
            Op::PopMax => {
                prop_assert_eq!(t.pop_max(), m.pop_last());
            }
        }
        prop_assert_eq!(t.len(), m.len());
    }

    validate_tree(&t);
    let got: Vec<u64> = t.iter().collect();
    let expected: Vec<u64> = m.iter().copied().collect();
    prop_assert_eq!(got, expected);
    let got_rev: Vec<u64> = t.iter().rev().collect();
    let expected_rev: Vec<u64> = m.iter().rev().copied().collect();
    prop_assert_eq!(got_rev, expected_rev);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(bits in width_strategy(), ops in prop::collection::vec(any::<Op>(), 0..=2000)) {
        check_equivalence(bits, ops)?;
    }

    #[test]
    fn prop_dense_small_universe(ops in prop::collection::vec(any::<Op>(), 0..=600)) {
        check_equivalence(8, ops)?;
    }

    #[test]
    fn prop_range_matches_btreeset(
        values in prop::collection::btree_set(0u64..4096, 0..200),
        lo in 0u64..4200,
        span in 0u64..2000,
    ) {
        let mut t = VebTree::new(12);
        t.extend(values.iter().copied());
        let hi = lo + span;

        let got: Vec<u64> = t.range(lo..hi).collect();
        let expected: Vec<u64> = values.range(lo..hi).copied().collect();
        prop_assert_eq!(got, expected);

        let got: Vec<u64> = t.range(lo..=hi).rev().collect();
        let expected: Vec<u64> = values.range(lo..=hi).rev().copied().collect();
        prop_assert_eq!(got, expected);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

// Values chosen to share and straddle cluster boundaries of a 9-bit tree
// (16-value clusters).
const SMALL_SET: [u64; 7] = [0, 15, 16, 17, 200, 255, 511];

#[test]
fn exhaustive_insert_order_small_set() {
    for_each_permutation(&SMALL_SET, |perm| {
        let mut t = VebTree::new(9);
        for x in perm {
            assert!(t.insert(x));
            validate_tree(&t);
        }
        let got: Vec<u64> = t.iter().collect();
        assert_eq!(got, SMALL_SET.to_vec());
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let mut base = VebTree::new(9);
    base.extend(SMALL_SET);

    for_each_permutation(&SMALL_SET, |perm| {
        let mut t = base.clone();
        let mut m: BTreeSet<u64> = SMALL_SET.into_iter().collect();

        for x in perm {
            assert_eq!(t.remove(x), m.remove(&x));
            validate_tree(&t);
            assert_eq!(t.iter().collect::<Vec<_>>(), m.iter().copied().collect::<Vec<_>>());
        }
        assert!(t.is_empty());
        assert!(t.root.is_empty());
    });
}

#[test]
fn remove_keeps_every_level_consistent() {
    let mut t = VebTree::new(21);
    let values: Vec<u64> = (0..3000u64).map(|i| (i * 2_654_435_761) % (1 << 21)).collect();
    t.extend(values.iter().copied());
    validate_tree(&t);

    for (i, x) in values.iter().enumerate() {
        t.remove(*x);
        if i % 97 == 0 {
            validate_tree(&t);
        }
    }
    validate_tree(&t);
    assert!(t.is_empty());
}
