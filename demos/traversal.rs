//! Builds a few trees and prints their forward and backward traversals.
//!
//! ```bash
//! cargo run --example traversal
//! ```

use veb_rs::VebTree;

fn print_next(tree: &VebTree) {
    let values: Vec<String> = std::iter::successors(tree.min(), |&x| tree.next(x))
        .map(|x| x.to_string())
        .collect();
    println!("next: {}", values.join(" "));
}

fn print_prev(tree: &VebTree) {
    let values: Vec<String> = std::iter::successors(tree.max(), |&x| tree.prev(x))
        .map(|x| x.to_string())
        .collect();
    println!("prev: {}", values.join(" "));
}

fn main() {
    println!("=== 9-bit universe ===\n");

    let mut tree = VebTree::new(9);
    for i in (1..=100u64).rev() {
        tree.insert(i * 2 - 1);
    }
    print_next(&tree);

    for i in 0..=100u64 {
        tree.insert(i * 2);
    }
    print_prev(&tree);

    for i in 45..=55u64 {
        tree.insert(i);
    }
    for i in 50..150u64 {
        tree.remove(i);
    }
    print_next(&tree);

    for x in [0, 100, 150, 200] {
        tree.remove(x);
    }
    print_prev(&tree);
    println!("(tree) min: {:?} max: {:?}\n", tree.min(), tree.max());

    println!("=== 64-bit universe ===\n");

    let mut big_tree = VebTree::new(64);
    let step = 1_000_000_000_000_000u64;
    let mut element = 0u64;
    for _ in 0..=10_000 {
        big_tree.insert(element);
        element += step;
    }
    println!(
        "(big_tree) min: {:?} max: {:?} len: {}",
        big_tree.min(),
        big_tree.max(),
        big_tree.len()
    );
}
