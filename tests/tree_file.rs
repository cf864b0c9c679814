//! End-to-end tests over committed index file states.
//!
//! Every test builds an index through the public engine API, then checks
//! the resulting file through the walker and raw file metadata: key
//! ordering inside nodes, capacity bounds, parent/child link symmetry,
//! root uniqueness, child slot discipline, membership, and file-length
//! quantization.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use bpidx::storage::{NodeBlock, BLOCK_SIZE, HEADER_SIZE};
use bpidx::{BPlusTree, BlockOff, Key, Walker, NO_BLOCK, TREE_ORDER};
use tempfile::tempdir;

// ============================================================================
// HELPERS
// ============================================================================

fn file_len(path: &Path) -> u64 {
    fs::metadata(path).unwrap().len()
}

fn collect_nodes(path: &Path) -> (BlockOff, BTreeMap<BlockOff, NodeBlock>) {
    let mut walker = Walker::open(path).unwrap();
    let root_offset = walker.header().root_offset();
    let mut nodes = BTreeMap::new();
    while let Some((off, node)) = walker.next_node().unwrap() {
        nodes.insert(off, node);
    }
    (root_offset, nodes)
}

/// Checks every committed-state invariant of the file and returns the
/// sorted multiset of stored keys.
fn check_file_state(path: &Path) -> Vec<Key> {
    // File length is header plus a whole number of blocks.
    let len = file_len(path);
    assert!(len >= HEADER_SIZE as u64);
    assert_eq!(
        (len - HEADER_SIZE as u64) % BLOCK_SIZE as u64,
        0,
        "file length {len} is not header + k * block"
    );

    let (root_offset, nodes) = collect_nodes(path);

    if nodes.is_empty() {
        assert_eq!(root_offset, NO_BLOCK);
        return Vec::new();
    }

    // Exactly one root, and the header points at it.
    let roots: Vec<BlockOff> = nodes
        .iter()
        .filter(|(_, node)| node.parent() == NO_BLOCK)
        .map(|(&off, _)| off)
        .collect();
    assert_eq!(roots, vec![root_offset], "root uniqueness violated");

    let mut stored = Vec::new();
    for (&off, node) in &nodes {
        let used = node.keys_used();
        assert!(used > 0, "block {off} committed with no keys");
        assert!(used < TREE_ORDER, "block {off} committed while full");

        for slot in 1..used {
            assert!(
                node.key(slot - 1) <= node.key(slot),
                "block {off} keys out of order"
            );
        }
        for slot in used + 1..=TREE_ORDER {
            assert_eq!(
                node.child(slot),
                NO_BLOCK,
                "block {off} has a child past its last key"
            );
        }

        // Child links resolve, and each child points back exactly here.
        for slot in 0..=used {
            let child = node.child(slot);
            if child == NO_BLOCK {
                continue;
            }
            let child_node = nodes
                .get(&child)
                .unwrap_or_else(|| panic!("block {off} links to missing block {child}"));
            assert_eq!(child_node.parent(), off, "child {child} disowns {off}");
        }

        if node.parent() != NO_BLOCK {
            let parent = nodes
                .get(&node.parent())
                .unwrap_or_else(|| panic!("block {off} has a missing parent"));
            let links = (0..=parent.keys_used())
                .filter(|&slot| parent.child(slot) == off)
                .count();
            assert_eq!(links, 1, "parent of {off} links to it {links} times");
        }

        for slot in 0..used {
            stored.push(node.key(slot));
        }
    }
    stored.sort_unstable();
    stored
}

fn build_index(path: &Path, keys: &[Key]) {
    let mut tree = BPlusTree::create(path).unwrap();
    for &key in keys {
        tree.insert(key).unwrap();
    }
    tree.close().unwrap();
}

// ============================================================================
// SINGLE-NODE SCENARIOS
// ============================================================================

#[test]
fn single_insert_writes_header_plus_one_block() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.idx");
    build_index(&path, &[10]);

    assert_eq!(file_len(&path), (HEADER_SIZE + BLOCK_SIZE) as u64);

    let (root_offset, nodes) = collect_nodes(&path);
    assert_eq!(root_offset, HEADER_SIZE as BlockOff);
    let root = &nodes[&root_offset];
    assert_eq!(root.keys_used(), 1);
    assert_eq!(root.key(0), 10);
    assert_eq!(root.parent(), NO_BLOCK);
    for slot in 0..=TREE_ORDER {
        assert_eq!(root.child(slot), NO_BLOCK);
    }
}

#[test]
fn three_keys_stay_in_the_root() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.idx");
    build_index(&path, &[10, 20, 30]);

    assert_eq!(check_file_state(&path), vec![10, 20, 30]);
    assert_eq!(file_len(&path), (HEADER_SIZE + BLOCK_SIZE) as u64);
}

#[test]
fn duplicates_are_suppressed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.idx");
    build_index(&path, &[7, 7, 7]);

    assert_eq!(check_file_state(&path), vec![7]);
    assert_eq!(file_len(&path), (HEADER_SIZE + BLOCK_SIZE) as u64);
}

#[test]
fn duplicate_insert_leaves_the_file_byte_identical() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.idx");

    let mut tree = BPlusTree::create(&path).unwrap();
    for key in [10, 20, 30, 40, 50, 25, 35] {
        tree.insert(key).unwrap();
    }
    tree.close().unwrap();
    let before = fs::read(&path).unwrap();

    let mut tree = BPlusTree::open(&path).unwrap();
    for key in [10, 25, 50] {
        tree.insert(key).unwrap();
    }
    tree.close().unwrap();
    let after = fs::read(&path).unwrap();

    assert_eq!(before, after);
}

// ============================================================================
// ROOT SPLIT SCENARIOS
// ============================================================================

#[test]
fn four_keys_break_the_root_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.idx");
    build_index(&path, &[10, 20, 30, 40]);

    // One split: three node blocks after the header.
    assert_eq!(file_len(&path), (HEADER_SIZE + 3 * BLOCK_SIZE) as u64);
    assert_eq!(check_file_state(&path), vec![10, 20, 30, 40]);
}

#[test]
fn root_split_layout_follows_append_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.idx");
    build_index(&path, &[10, 20, 30, 40]);

    // File-position order: the in-place rewritten root occupies the slot
    // right after the header, then the left sibling, then the right
    // sibling, in the order they were appended.
    let mut walker = Walker::open(&path).unwrap();
    let (root_off, root) = walker.next_node().unwrap().unwrap();
    let (left_off, left) = walker.next_node().unwrap().unwrap();
    let (right_off, right) = walker.next_node().unwrap().unwrap();
    assert!(walker.next_node().unwrap().is_none());

    assert_eq!(root_off, HEADER_SIZE as BlockOff);
    assert_eq!(left_off, (HEADER_SIZE + BLOCK_SIZE) as BlockOff);
    assert_eq!(right_off, (HEADER_SIZE + 2 * BLOCK_SIZE) as BlockOff);

    assert_eq!(root.keys_used(), 1);
    let separator = root.key(0);
    assert!(
        separator == 20 || separator == 30,
        "separator {separator} is not a coin-toss median"
    );
    assert_eq!(root.child(0), left_off);
    assert_eq!(root.child(1), right_off);

    for slot in 0..left.keys_used() {
        assert!(left.key(slot) < separator);
    }
    for slot in 0..right.keys_used() {
        assert!(right.key(slot) > separator);
    }
}

#[test]
fn fifth_key_descends_into_a_sibling() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.idx");
    build_index(&path, &[10, 20, 30, 40, 50]);

    // Siblings still hold fewer than TREE_ORDER keys: no secondary split.
    assert_eq!(file_len(&path), (HEADER_SIZE + 3 * BLOCK_SIZE) as u64);

    let (root_offset, nodes) = collect_nodes(&path);
    let root = &nodes[&root_offset];
    assert_eq!(root.keys_used(), 1);

    let right = &nodes[&root.child(1)];
    let right_keys: Vec<Key> = (0..right.keys_used()).map(|s| right.key(s)).collect();
    assert!(right_keys.contains(&50), "50 not in {right_keys:?}");

    assert_eq!(check_file_state(&path), vec![10, 20, 30, 40, 50]);
}

// ============================================================================
// BULK INSERTS AND CASCADES
// ============================================================================

#[test]
fn ascending_bulk_insert_keeps_every_invariant() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.idx");
    let keys: Vec<Key> = (0..120).map(|i| i * 3).collect();
    build_index(&path, &keys);

    assert_eq!(check_file_state(&path), keys);
}

#[test]
fn descending_bulk_insert_keeps_every_invariant() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.idx");
    let keys: Vec<Key> = (0..120).rev().map(|i| i * 3).collect();
    build_index(&path, &keys);

    let mut expected = keys.clone();
    expected.sort_unstable();
    assert_eq!(check_file_state(&path), expected);
}

#[test]
fn shuffled_bulk_insert_keeps_every_invariant() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.idx");

    // 53 is coprime to 127, so this visits every residue exactly once.
    let keys: Vec<Key> = (0..127u32).map(|i| ((i * 53) % 127) as Key).collect();
    build_index(&path, &keys);

    let expected: Vec<Key> = (0..127).collect();
    assert_eq!(check_file_state(&path), expected);
}

#[test]
fn shuffled_bulk_insert_with_duplicates_stores_each_key_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.idx");

    let mut keys: Vec<Key> = (0..80u32).map(|i| ((i * 13) % 40) as Key).collect();
    keys.extend((0..40).map(|i| i as Key));
    build_index(&path, &keys);

    let expected: Vec<Key> = (0..40).collect();
    assert_eq!(check_file_state(&path), expected);
}

#[test]
fn bulk_inserted_keys_are_all_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.idx");

    let keys: Vec<Key> = (0..101u32).map(|i| ((i * 37) % 101) as Key * 5).collect();
    build_index(&path, &keys);

    let mut tree = BPlusTree::open(&path).unwrap();
    for &key in &keys {
        assert!(tree.lookup(key).unwrap(), "key {key} missing");
    }
    for absent in [1, 2, 3, 499, 501] {
        assert!(!tree.lookup(absent).unwrap(), "key {absent} is a ghost");
    }
    tree.close().unwrap();
}

// ============================================================================
// REOPEN
// ============================================================================

#[test]
fn reopened_index_accepts_more_keys() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.idx");
    build_index(&path, &[2, 4, 6, 8, 10, 12]);

    let mut tree = BPlusTree::open(&path).unwrap();
    for key in [1, 3, 5, 7, 9, 11] {
        tree.insert(key).unwrap();
    }
    tree.close().unwrap();

    let expected: Vec<Key> = (1..=12).collect();
    assert_eq!(check_file_state(&path), expected);
}

#[test]
fn reopen_across_many_sessions() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.idx");

    BPlusTree::create(&path).unwrap().close().unwrap();
    for round in 0..10u16 {
        let mut tree = BPlusTree::open(&path).unwrap();
        for i in 0..10u16 {
            tree.insert(round * 10 + i).unwrap();
        }
        tree.close().unwrap();
        check_file_state(&path);
    }

    let expected: Vec<Key> = (0..100).collect();
    assert_eq!(check_file_state(&path), expected);
}

// ============================================================================
// COMPATIBILITY
// ============================================================================

#[test]
fn walker_and_engine_reject_foreign_layouts() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.idx");

    // A header claiming a different block size.
    let mut bytes = Vec::new();
    bytes.extend((HEADER_SIZE as u64).to_le_bytes());
    bytes.extend((BLOCK_SIZE as u64 + 4).to_le_bytes());
    bytes.extend((TREE_ORDER as u16).to_le_bytes());
    bytes.extend((-1i64).to_le_bytes());
    fs::write(&path, &bytes).unwrap();

    assert!(BPlusTree::open(&path).is_err());
    assert!(Walker::open(&path).is_err());
}

#[test]
fn engine_rejects_a_larger_tree_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.idx");

    let mut bytes = Vec::new();
    bytes.extend((HEADER_SIZE as u64).to_le_bytes());
    bytes.extend((BLOCK_SIZE as u64).to_le_bytes());
    bytes.extend((TREE_ORDER as u16 + 1).to_le_bytes());
    bytes.extend((-1i64).to_le_bytes());
    fs::write(&path, &bytes).unwrap();

    let err = BPlusTree::open(&path).unwrap_err();
    assert!(err.to_string().contains("incompatible"));
}

#[test]
fn empty_index_walks_to_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.idx");
    BPlusTree::create(&path).unwrap().close().unwrap();

    assert_eq!(check_file_state(&path), Vec::<Key>::new());
}
