//! Segment Merkle trees for storage proofs.
//!
//! A contracted file is split into `SEGMENT_SIZE`-byte segments that form
//! the leaves of a binary Merkle tree. Leaf hashes are domain-separated from
//! interior hashes, and the leaf layer is padded to the next power of two
//! with the zero hash so that every proof for a file of `n` segments has
//! exactly `tree_height(n)` sibling hashes.

use cairn_types::params::SEGMENT_SIZE;
use cairn_types::{Hash, Segment};

const LEAF_PREFIX: &[u8] = &[0x00];
const NODE_PREFIX: &[u8] = &[0x01];

/// Number of segments in a file of the given size. A zero-length file still
/// occupies one (zero) segment so that challenge indices are well defined.
pub fn segments_for_file_size(file_size: u64) -> u64 {
    let seg = SEGMENT_SIZE as u64;
    let count = file_size.div_ceil(seg);
    count.max(1)
}

/// Height of the padded tree over `num_segments` leaves: the smallest `h`
/// with `2^h >= num_segments`.
pub fn tree_height(num_segments: u64) -> usize {
    let mut height = 0usize;
    while (1u64 << height) < num_segments {
        height += 1;
    }
    height
}

fn leaf_hash(segment: &Segment) -> Hash {
    Hash::of_all(&[LEAF_PREFIX, segment.as_bytes()])
}

fn node_hash(left: &Hash, right: &Hash) -> Hash {
    Hash::of_all(&[NODE_PREFIX, left.as_bytes(), right.as_bytes()])
}

fn leaf_layer(segments: &[Segment]) -> Vec<Hash> {
    if segments.is_empty() {
        return vec![leaf_hash(&Segment::ZERO)];
    }
    let height = tree_height(segments.len() as u64);
    let padded = 1usize << height;
    let mut layer: Vec<Hash> = segments.iter().map(leaf_hash).collect();
    layer.resize(padded, Hash::ZERO);
    layer
}

/// The Merkle root of a file's segments.
pub fn segment_root(segments: &[Segment]) -> Hash {
    let mut layer = leaf_layer(segments);
    while layer.len() > 1 {
        layer = layer
            .chunks(2)
            .map(|pair| node_hash(&pair[0], &pair[1]))
            .collect();
    }
    layer[0]
}

/// Build the sibling-hash path proving the segment at `index`.
///
/// Returns `None` when the index is out of range.
pub fn build_segment_proof(segments: &[Segment], index: u64) -> Option<Vec<Hash>> {
    let num_segments = segments.len().max(1) as u64;
    if index >= num_segments {
        return None;
    }

    let mut layer = leaf_layer(segments);
    let mut idx = index as usize;
    let mut proof = Vec::with_capacity(tree_height(num_segments));
    while layer.len() > 1 {
        proof.push(layer[idx ^ 1]);
        layer = layer
            .chunks(2)
            .map(|pair| node_hash(&pair[0], &pair[1]))
            .collect();
        idx >>= 1;
    }
    Some(proof)
}

/// Verify that `segment` sits at `index` in a file of `num_segments`
/// segments whose tree root is `root`.
///
/// The proof must contain exactly `tree_height(num_segments)` hashes,
/// ordered leaf to root.
pub fn verify_segment(
    segment: &Segment,
    hash_set: &[Hash],
    num_segments: u64,
    index: u64,
    root: &Hash,
) -> bool {
    if num_segments == 0 || index >= num_segments {
        return false;
    }
    if hash_set.len() != tree_height(num_segments) {
        return false;
    }

    let mut current = leaf_hash(segment);
    let mut idx = index;
    for sibling in hash_set {
        current = if idx & 1 == 1 {
            node_hash(sibling, &current)
        } else {
            node_hash(&current, sibling)
        };
        idx >>= 1;
    }
    current == *root
}
