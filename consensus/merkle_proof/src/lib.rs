//! A fixed-depth, append-only Merkle tree with O(depth) leaf insertion and inclusion proofs,
//! matching the eth2 deposit contract's own tree so the core can mirror it without re-deriving
//! its conventions.
use alloy_primitives::B256 as Hash256;
use ethereum_hashing::hash32_concat;
use safe_arith::ArithError;
use std::sync::LazyLock;

pub const MAX_TREE_DEPTH: usize = 32;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum MerkleTreeError {
    /// Depth is too small to accommodate the leaf count.
    DepthTooSmall,
    /// Overflowed the tree's capacity for its depth.
    MerkleTreeFull,
    /// Can't generate a proof for a non-existent leaf.
    LeafOutOfBounds,
    /// A leaf was pushed at an index that is not the current leaf count.
    NonAppendPush,
    ArithError,
}

impl From<ArithError> for MerkleTreeError {
    fn from(_: ArithError) -> Self {
        MerkleTreeError::ArithError
    }
}

/// Precomputed zero subtree roots, `zero_hashes[i]` being the root of a depth-`i` tree of all
/// zero leaves, so any absent sibling can be produced in O(1) instead of rehashing zero subtrees
/// on every proof.
pub static ZERO_HASHES: LazyLock<[Hash256; MAX_TREE_DEPTH + 1]> = LazyLock::new(|| {
    let mut hashes = [Hash256::ZERO; MAX_TREE_DEPTH + 1];
    for i in 0..MAX_TREE_DEPTH {
        hashes[i + 1] = Hash256::from(hash32_concat(hashes[i].as_slice(), hashes[i].as_slice()));
    }
    hashes
});

/// A binary Merkle tree, represented explicitly rather than as a flat array so that sparse
/// (mostly-zero) regions can be represented in O(1) via `Zero`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum MerkleTree {
    Leaf(Hash256),
    Node(Hash256, Box<MerkleTree>, Box<MerkleTree>),
    Zero(usize),
}

impl MerkleTree {
    /// Creates a new tree from a list of leaves, right-padded to `2^depth` with zero subtrees.
    pub fn create(leaves: &[Hash256], depth: usize) -> Self {
        use MerkleTree::*;

        if leaves.is_empty() {
            return Zero(depth);
        }

        match depth {
            0 => {
                debug_assert_eq!(leaves.len(), 1);
                Leaf(leaves[0])
            }
            _ => {
                let split = std::cmp::min(leaves.len(), 1 << (depth - 1));
                let (left_leaves, right_leaves) = leaves.split_at(split);
                let left_subtree = MerkleTree::create(left_leaves, depth - 1);
                let right_subtree = MerkleTree::create(right_leaves, depth - 1);
                let root = Hash256::from(hash32_concat(
                    left_subtree.hash().as_slice(),
                    right_subtree.hash().as_slice(),
                ));
                Node(root, Box::new(left_subtree), Box::new(right_subtree))
            }
        }
    }

    pub fn hash(&self) -> Hash256 {
        match *self {
            MerkleTree::Leaf(h) => h,
            MerkleTree::Node(h, _, _) => h,
            MerkleTree::Zero(depth) => ZERO_HASHES[depth],
        }
    }

    /// Appends a new leaf at the next free index, growing this tree's interior nodes in place.
    /// `index` must equal the tree's current leaf count (append-only).
    pub fn push_leaf(&mut self, leaf: Hash256, depth: usize) -> Result<(), MerkleTreeError> {
        if depth == 0 {
            return Err(MerkleTreeError::DepthTooSmall);
        }
        use MerkleTree::*;

        match self {
            Leaf(_) => return Err(MerkleTreeError::MerkleTreeFull),
            Zero(_) => {
                *self = MerkleTree::create(&[leaf], depth);
            }
            Node(_, left, right) => {
                let left_capacity = 1usize << (depth - 1);
                if left.leaf_count() < left_capacity {
                    left.push_leaf(leaf, depth - 1)?;
                } else if right.leaf_count() < left_capacity {
                    right.push_leaf(leaf, depth - 1)?;
                } else {
                    return Err(MerkleTreeError::MerkleTreeFull);
                }
                let left_hash = left.hash();
                let right_hash = right.hash();
                *self = Node(
                    Hash256::from(hash32_concat(left_hash.as_slice(), right_hash.as_slice())),
                    left.clone(),
                    right.clone(),
                );
            }
        }
        Ok(())
    }

    /// Number of non-zero leaves currently stored beneath this node.
    fn leaf_count(&self) -> usize {
        match self {
            MerkleTree::Leaf(_) => 1,
            MerkleTree::Zero(_) => 0,
            MerkleTree::Node(_, left, right) => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Returns the leaf at `index` and the depth-`depth` inclusion witness (siblings from leaf
    /// to root), using the depth's zero-hash for any absent sibling.
    pub fn generate_proof(
        &self,
        index: usize,
        depth: usize,
    ) -> Result<(Hash256, Vec<Hash256>), MerkleTreeError> {
        let mut proof = vec![];
        let mut current = self;
        for d in (0..depth).rev() {
            match current {
                MerkleTree::Leaf(_) => return Err(MerkleTreeError::LeafOutOfBounds),
                MerkleTree::Zero(zero_depth) => {
                    // Every level below a zero subtree is zero too; fill the rest of the proof
                    // with zero-hashes and stop descending.
                    debug_assert_eq!(*zero_depth, d + 1);
                    for d2 in (0..=d).rev() {
                        proof.push(ZERO_HASHES[d2]);
                    }
                    return Ok((ZERO_HASHES[0], {
                        proof.reverse();
                        proof
                    }));
                }
                MerkleTree::Node(_, left, right) => {
                    let ith_bit = (index >> d) & 0x01;
                    if ith_bit == 1 {
                        proof.push(left.hash());
                        current = right;
                    } else {
                        proof.push(right.hash());
                        current = left;
                    }
                }
            }
        }
        proof.reverse();
        let leaf = current.hash();
        Ok((leaf, proof))
    }

}

/// Verifies a depth-`depth` inclusion proof of `leaf` at `index` against `root`, ordering each
/// step by `(index >> i) & 1` as `generate_proof` does.
pub fn verify_merkle_proof(
    leaf: Hash256,
    proof: &[Hash256],
    depth: usize,
    index: usize,
    root: Hash256,
) -> bool {
    if proof.len() != depth {
        return false;
    }
    merkle_root_from_branch(leaf, proof, depth, index) == root
}

pub fn merkle_root_from_branch(leaf: Hash256, branch: &[Hash256], depth: usize, index: usize) -> Hash256 {
    let mut current = leaf;
    for (i, sibling) in branch.iter().enumerate().take(depth) {
        current = if (index >> i) & 1 == 1 {
            Hash256::from(hash32_concat(sibling.as_slice(), current.as_slice()))
        } else {
            Hash256::from(hash32_concat(current.as_slice(), sibling.as_slice()))
        };
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(byte: u8) -> Hash256 {
        Hash256::repeat_byte(byte)
    }

    #[test]
    fn single_leaf_round_trips() {
        let tree = MerkleTree::create(&[leaf(1)], 2);
        let (l, proof) = tree.generate_proof(0, 2).unwrap();
        assert_eq!(l, leaf(1));
        assert!(verify_merkle_proof(l, &proof, 2, 0, tree.hash()));
    }

    #[test]
    fn incremental_push_matches_bulk_create() {
        let leaves: Vec<Hash256> = (0..8).map(leaf).collect();
        let bulk = MerkleTree::create(&leaves, 4);

        let mut incremental = MerkleTree::create(&[], 4);
        for l in &leaves {
            incremental.push_leaf(*l, 4).unwrap();
        }

        assert_eq!(bulk.hash(), incremental.hash());
    }

    #[test]
    fn every_incrementally_inserted_leaf_proves() {
        let mut tree = MerkleTree::create(&[], 5);
        let leaves: Vec<Hash256> = (0..12).map(leaf).collect();
        for (i, l) in leaves.iter().enumerate() {
            tree.push_leaf(*l, 5).unwrap();
            let root = tree.hash();
            for (j, lj) in leaves[..=i].iter().enumerate() {
                let (proven_leaf, proof) = tree.generate_proof(j, 5).unwrap();
                assert_eq!(proven_leaf, *lj);
                assert!(verify_merkle_proof(proven_leaf, &proof, 5, j, root));
            }
        }
    }

    #[test]
    fn empty_tree_is_zero_hash() {
        let tree = MerkleTree::create(&[], 10);
        assert_eq!(tree.hash(), ZERO_HASHES[10]);
    }
}
