use crate::{AttestationData, EthSpec, SignatureBytes};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use ssz_types::VariableList;
use tree_hash_derive::TreeHash;

/// An attestation with the committee already resolved to a sorted list of validator indices,
/// the form used once a block has been processed and the unresolved `Attestation` bitlist is no
/// longer useful on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(bound = "E: EthSpec")]
pub struct IndexedAttestation<E: EthSpec> {
    pub attesting_indices: VariableList<u64, E::MaxValidatorsPerCommittee>,
    pub data: AttestationData,
    pub signature: SignatureBytes,
}

impl<E: EthSpec> IndexedAttestation<E> {
    pub fn new(
        attesting_indices: VariableList<u64, E::MaxValidatorsPerCommittee>,
        data: AttestationData,
        signature: SignatureBytes,
    ) -> Self {
        Self {
            attesting_indices,
            data,
            signature,
        }
    }

    /// True if `self` and `other` attest to differing targets for the same attester, i.e. a
    /// double vote as defined by `is_slashable_attestation_data`.
    pub fn is_double_vote(&self, other: &Self) -> bool {
        self.data.target.epoch == other.data.target.epoch && self.data != other.data
    }

    /// True if `self` surrounds `other`, a vote that retroactively re-votes a wider span, as
    /// defined by `is_slashable_attestation_data`.
    pub fn is_surround_vote(&self, other: &Self) -> bool {
        self.data.source.epoch < other.data.source.epoch
            && other.data.target.epoch < self.data.target.epoch
    }
}
