use crate::{BeaconBlockBody, BeaconBlockBodyAltair, BeaconBlockBodyBase, EthSpec, Hash256, Slot};
use serde::{Deserialize, Serialize};
use tree_hash::TreeHash;
use tree_hash_derive::TreeHash;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TreeHash)]
#[serde(bound = "E: EthSpec")]
pub struct BeaconBlockBase<E: EthSpec> {
    pub slot: Slot,
    pub proposer_index: u64,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body: BeaconBlockBodyBase<E>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TreeHash)]
#[serde(bound = "E: EthSpec")]
pub struct BeaconBlockAltair<E: EthSpec> {
    pub slot: Slot,
    pub proposer_index: u64,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body: BeaconBlockBodyAltair<E>,
}

/// A beacon block's unsigned content. Two variants only: everything prior to Bellatrix's
/// execution-payload fields is out of scope for this state-transition core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "E: EthSpec", untagged)]
pub enum BeaconBlock<E: EthSpec> {
    Base(BeaconBlockBase<E>),
    Altair(BeaconBlockAltair<E>),
}

macro_rules! impl_common_field {
    ($name: ident, $ty: ty) => {
        pub fn $name(&self) -> $ty {
            match self {
                BeaconBlock::Base(block) => block.$name,
                BeaconBlock::Altair(block) => block.$name,
            }
        }
    };
}

impl<E: EthSpec> BeaconBlock<E> {
    impl_common_field!(slot, Slot);
    impl_common_field!(proposer_index, u64);
    impl_common_field!(parent_root, Hash256);
    impl_common_field!(state_root, Hash256);

    pub fn set_state_root(&mut self, state_root: Hash256) {
        match self {
            BeaconBlock::Base(block) => block.state_root = state_root,
            BeaconBlock::Altair(block) => block.state_root = state_root,
        }
    }

    pub fn body(&self) -> BeaconBlockBody<E> {
        match self {
            BeaconBlock::Base(block) => BeaconBlockBody::Base(block.body.clone()),
            BeaconBlock::Altair(block) => BeaconBlockBody::Altair(block.body.clone()),
        }
    }

    pub fn is_altair(&self) -> bool {
        matches!(self, BeaconBlock::Altair(_))
    }

    pub fn canonical_root(&self) -> Hash256 {
        self.tree_hash_root()
    }

    /// The header summarizing this block, with `state_root` filled in separately by the caller
    /// since the header's own hash must not include the state it is itself embedded in.
    pub fn block_header(&self) -> crate::BeaconBlockHeader {
        crate::BeaconBlockHeader {
            slot: self.slot(),
            proposer_index: self.proposer_index(),
            parent_root: self.parent_root(),
            state_root: self.state_root(),
            body_root: self.body().tree_hash_root(),
        }
    }
}

impl<E: EthSpec> TreeHash for BeaconBlock<E> {
    fn tree_hash_type() -> tree_hash::TreeHashType {
        tree_hash::TreeHashType::Container
    }

    fn tree_hash_packed_encoding(&self) -> tree_hash::PackedEncoding {
        unreachable!("Containers do not pack")
    }

    fn tree_hash_packing_factor() -> usize {
        unreachable!("Containers do not pack")
    }

    fn tree_hash_root(&self) -> Hash256 {
        match self {
            BeaconBlock::Base(block) => block.tree_hash_root(),
            BeaconBlock::Altair(block) => block.tree_hash_root(),
        }
    }
}
