use std::ops::Range;

use cordyceps::Linked;
use proptest::prelude::*;

use crate::model::{self, TestNode};

use super::*;

fn insert_find_all(keys: &[u32]) {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for &key in keys {
        assert!(tree.insert(TestNode::new(key)).is_none());
        tree.assert_invariants();
    }

    for key in keys {
        let node = tree.get_raw(key).expect("item not found");
        assert_eq!(unsafe { node.as_ref().key() }, key);
    }
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn two_elems_find() {
    insert_find_all(&[0, 1]);
    insert_find_all(&[1, 0]);
}

#[test]
fn three_elems_find() {
    insert_find_all(&[0, 1, 2]);
    insert_find_all(&[0, 2, 1]);
    insert_find_all(&[1, 0, 2]);
    insert_find_all(&[1, 2, 0]);
    insert_find_all(&[2, 0, 1]);
    insert_find_all(&[2, 1, 0]);
}

#[test]
fn four_elems_find() {
    insert_find_all(&[0, 1, 2, 3]);
    insert_find_all(&[0, 1, 3, 2]);
    insert_find_all(&[0, 2, 1, 3]);
    insert_find_all(&[0, 2, 3, 1]);
    insert_find_all(&[0, 3, 1, 2]);
    insert_find_all(&[0, 3, 2, 1]);

    insert_find_all(&[1, 0, 2, 3]);
    insert_find_all(&[1, 0, 3, 2]);
    insert_find_all(&[1, 2, 0, 3]);
    insert_find_all(&[1, 2, 3, 0]);
    insert_find_all(&[1, 3, 0, 2]);
    insert_find_all(&[1, 3, 2, 0]);

    insert_find_all(&[2, 0, 1, 3]);
    insert_find_all(&[2, 0, 3, 1]);
    insert_find_all(&[2, 1, 0, 3]);
    insert_find_all(&[2, 1, 3, 0]);
    insert_find_all(&[2, 3, 0, 1]);
    insert_find_all(&[2, 3, 1, 0]);

    insert_find_all(&[3, 0, 1, 2]);
    insert_find_all(&[3, 0, 2, 1]);
    insert_find_all(&[3, 1, 0, 2]);
    insert_find_all(&[3, 1, 2, 0]);
    insert_find_all(&[3, 2, 0, 1]);
    insert_find_all(&[3, 2, 1, 0]);
}

fn insert_remove_all(keys: &[u32]) {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for &key in keys {
        assert!(tree.insert(TestNode::new(key)).is_none());
        tree.assert_invariants();
    }

    for key in keys {
        let node = tree.get_raw(key).expect("item not found");
        unsafe { tree.remove_at(node) };
        tree.assert_invariants();
    }

    for &key in keys {
        assert!(tree.insert(TestNode::new(key)).is_none());
        tree.assert_invariants();
    }

    for key in keys.iter().rev() {
        let node = tree.get_raw(key).expect("item not found");
        unsafe { tree.remove_at(node) };
        tree.assert_invariants();
    }
}

#[test]
fn remove_one() {
    insert_remove_all(&[0]);
}

#[test]
fn remove_two() {
    insert_remove_all(&[0, 1]);
    insert_remove_all(&[1, 0]);
}

#[test]
fn remove_three() {
    insert_remove_all(&[0, 1, 2]);
    insert_remove_all(&[0, 2, 1]);
    insert_remove_all(&[1, 0, 2]);
    insert_remove_all(&[1, 2, 0]);
    insert_remove_all(&[2, 0, 1]);
    insert_remove_all(&[2, 1, 0]);
}

#[test]
fn remove_four() {
    insert_remove_all(&[0, 1, 2, 3]);
    insert_remove_all(&[0, 1, 3, 2]);
    insert_remove_all(&[0, 2, 1, 3]);
    insert_remove_all(&[0, 2, 3, 1]);
    insert_remove_all(&[0, 3, 1, 2]);
    insert_remove_all(&[0, 3, 2, 1]);

    insert_remove_all(&[1, 0, 2, 3]);
    insert_remove_all(&[1, 0, 3, 2]);
    insert_remove_all(&[1, 2, 0, 3]);
    insert_remove_all(&[1, 2, 3, 0]);
    insert_remove_all(&[1, 3, 0, 2]);
    insert_remove_all(&[1, 3, 2, 0]);

    insert_remove_all(&[2, 0, 1, 3]);
    insert_remove_all(&[2, 0, 3, 1]);
    insert_remove_all(&[2, 1, 0, 3]);
    insert_remove_all(&[2, 1, 3, 0]);
    insert_remove_all(&[2, 3, 0, 1]);
    insert_remove_all(&[2, 3, 1, 0]);

    insert_remove_all(&[3, 0, 1, 2]);
    insert_remove_all(&[3, 0, 2, 1]);
    insert_remove_all(&[3, 1, 0, 2]);
    insert_remove_all(&[3, 1, 2, 0]);
    insert_remove_all(&[3, 2, 0, 1]);
    insert_remove_all(&[3, 2, 1, 0]);
}

fn build(keys: &[u32]) -> AvlTree<TestNode> {
    let mut tree = AvlTree::new();

    for &key in keys {
        assert!(tree.insert(TestNode::new(key)).is_none());
        tree.assert_invariants();
    }

    tree
}

// Pre-order walk recording key and balance factor per node, with explicit
// markers for missing children, so that two snapshots compare equal exactly
// when the trees have identical shape and bookkeeping.
fn snapshot(tree: &AvlTree<TestNode>) -> Vec<Option<(u32, i8)>> {
    fn visit(node: Link<TestNode>, out: &mut Vec<Option<(u32, i8)>>) {
        match node {
            None => out.push(None),
            Some(node) => unsafe {
                out.push(Some((
                    node.as_ref().key,
                    TestNode::links(node).as_ref().balance(),
                )));
                visit(TestNode::links(node).as_ref().left(), out);
                visit(TestNode::links(node).as_ref().right(), out);
            },
        }
    }

    let mut out = Vec::new();
    visit(tree.root, &mut out);
    out
}

fn keys(tree: &AvlTree<TestNode>) -> Vec<u32> {
    tree.iter().map(|node| node.key).collect()
}

#[test]
fn duplicate_insert_rejected() {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    assert!(tree.insert(TestNode::new(7)).is_none());
    let rejected = tree.insert(TestNode::new(7)).expect("duplicate must be handed back");
    assert_eq!(rejected.key, 7);

    assert_eq!(tree.len(), 1);
    tree.assert_invariants();
}

#[test]
fn missing_key_is_a_no_op() {
    let mut tree = build(&[1, 2, 3]);

    assert!(tree.get(&99).is_none());
    assert!(tree.remove(&99).is_none());

    assert_eq!(tree.len(), 3);
    tree.assert_invariants();
}

#[test]
fn ascending_insert_stays_balanced() {
    let tree = build(&[1, 2, 3, 4, 5, 6, 7]);

    assert_eq!(tree.root().map(|node| node.key), Some(4));
    assert!(tree.height() <= 3);
}

#[test]
fn ascending_insert_rotates_left() {
    let tree = build(&[10, 20, 30]);

    // The third insertion overbalances the root and triggers a single left
    // rotation; afterward every node is exactly even.
    assert_eq!(
        snapshot(&tree),
        vec![Some((20, 0)), Some((10, 0)), None, None, Some((30, 0)), None, None],
    );
}

#[test]
fn remove_unary_node() {
    let mut tree = build(&[10, 20, 30, 40, 50, 25]);

    assert!(tree.remove(&40).is_some());

    tree.assert_invariants();
    assert_eq!(keys(&tree), vec![10, 20, 25, 30, 50]);
}

#[test]
fn remove_root_with_two_children() {
    let mut tree = build(&[20, 10, 30]);

    assert!(tree.remove(&20).is_some());

    tree.assert_invariants();
    assert_eq!(keys(&tree), vec![10, 30]);
    assert_eq!(tree.root().map(|node| node.key), Some(30));
}

#[test]
fn remove_with_deep_successor() {
    // The successor of 20 is 25, two levels down in the right subtree; its
    // unlinking must rebalance from its former parent upward.
    let mut tree = build(&[20, 10, 40, 5, 15, 30, 50, 25]);

    assert!(tree.remove(&20).is_some());

    tree.assert_invariants();
    assert_eq!(keys(&tree), vec![5, 10, 15, 25, 30, 40, 50]);
}

#[test]
fn insert_remove_restores_shape() {
    // Inserting into a perfectly balanced tree never rotates, so removing the
    // value again must undo the insertion exactly, balance factors included.
    let mut tree = build(&[4, 2, 6, 1, 3, 5, 7]);
    let before = snapshot(&tree);

    for probe in [0, 8, 100] {
        assert!(tree.insert(TestNode::new(probe)).is_none());
        tree.assert_invariants();

        assert!(tree.remove(&probe).is_some());
        tree.assert_invariants();

        assert_eq!(snapshot(&tree), before);
    }
}

#[test]
fn thousand_elems_insert_remove() {
    // Pseudo-random but deterministic orders: strides coprime with 1000 visit
    // every key in 1..=1000 exactly once, in two different sequences.
    let insert_order: Vec<u32> = (0..1000u32).map(|i| (i * 389) % 1000 + 1).collect();
    let remove_order: Vec<u32> = (0..1000u32).map(|i| (i * 617) % 1000 + 1).collect();

    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for &key in &insert_order {
        assert!(tree.insert(TestNode::new(key)).is_none());
    }

    tree.assert_invariants();
    assert_eq!(tree.len(), 1000);

    for &key in &remove_order {
        assert!(tree.remove(&key).is_some());
    }

    assert_eq!(tree.len(), 0);
    assert!(tree.root.is_none());
}

#[test]
fn dotgraph_renders() {
    let tree = build(&[2, 1, 3]);

    let mut rendered = String::new();
    tree.dotgraph::<_, &u32>("t", &mut rendered).unwrap();

    assert!(rendered.contains("\"grapht-2\" [label=\"2:0\"]"));
    assert!(rendered.contains("\"grapht-2\" -> \"grapht-1\";"));

    let empty: AvlTree<TestNode> = AvlTree::new();
    let mut rendered = String::new();
    empty.dotgraph::<_, &u32>("e", &mut rendered).unwrap();
    assert_eq!(rendered, "digraph \"graph-e\" {}");
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }
}
