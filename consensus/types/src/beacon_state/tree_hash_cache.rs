use tree_hash::{Hash256, TreeHash};

/// A dirty-tracked cache over a container's top-level field roots.
///
/// `BeaconState::update_tree_hash_cache` calls `mark_dirty` whenever a setter touches a field,
/// then `recalculate_tree_hash_root` recomputes only the roots of fields that changed since the
/// last call instead of rehashing the whole state. The final root is the Merkle root of the
/// per-field root list, exactly as `tree_hash_derive`'s container impl would compute it, just
/// with memoized leaves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeHashCache {
    field_roots: Vec<Hash256>,
    dirty: Vec<bool>,
    root: Option<Hash256>,
}

impl TreeHashCache {
    pub fn new(num_fields: usize) -> Self {
        Self {
            field_roots: vec![Hash256::ZERO; num_fields],
            dirty: vec![true; num_fields],
            root: None,
        }
    }

    pub fn mark_field_dirty(&mut self, field_index: usize) {
        if let Some(flag) = self.dirty.get_mut(field_index) {
            *flag = true;
        }
        self.root = None;
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty.iter_mut().for_each(|flag| *flag = true);
        self.root = None;
    }

    /// Recomputes any dirty field roots via `hash_tree_root_fn`, then returns the Merkle root of
    /// the full field-root list, from cache if nothing was dirty.
    pub fn recalculate_root<F>(&mut self, num_fields: usize, mut hash_tree_root_fn: F) -> Hash256
    where
        F: FnMut(usize) -> Hash256,
    {
        if self.field_roots.len() != num_fields {
            self.field_roots = vec![Hash256::ZERO; num_fields];
            self.dirty = vec![true; num_fields];
            self.root = None;
        }

        if let Some(root) = self.root {
            if !self.dirty.iter().any(|&d| d) {
                return root;
            }
        }

        for i in 0..num_fields {
            if self.dirty[i] {
                self.field_roots[i] = hash_tree_root_fn(i);
                self.dirty[i] = false;
            }
        }

        let root = tree_hash::merkle_root(
            &self
                .field_roots
                .iter()
                .flat_map(|root| root.0.to_vec())
                .collect::<Vec<u8>>(),
            0,
        );
        self.root = Some(root);
        root
    }
}

/// Helper for a container value's field root, used as the per-field `hash_tree_root_fn` supplied
/// to `TreeHashCache::recalculate_root`.
pub fn field_root<T: TreeHash>(value: &T) -> Hash256 {
    value.tree_hash_root()
}
