use crate::Hash256;
use ssz_derive::{Decode, Encode};
use tree_hash::TreeHash;
use tree_hash_derive::TreeHash;

/// Mixes a message's hash-tree-root with the signature domain it was signed under, so that
/// `object_root` collisions across domains can't be exploited as signature forgeries.
#[derive(Debug, Clone, Encode, Decode, TreeHash)]
pub struct SigningData {
    pub object_root: Hash256,
    pub domain: Hash256,
}

pub trait SignedRoot: TreeHash {
    fn signing_root(&self, domain: Hash256) -> Hash256 {
        SigningData {
            object_root: self.tree_hash_root(),
            domain,
        }
        .tree_hash_root()
    }
}

impl SignedRoot for crate::BeaconBlockHeader {}
impl SignedRoot for crate::AttestationData {}
impl SignedRoot for crate::VoluntaryExit {}
impl SignedRoot for crate::DepositMessage {}
impl SignedRoot for crate::Epoch {}
impl<E: crate::EthSpec> SignedRoot for crate::BeaconBlock<E> {}
