use crate::{EthSpec, IndexedAttestation};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// Proof that a proposer signed two distinct blocks for the same slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct ProposerSlashing {
    pub signed_header_1: crate::SignedBeaconBlockHeader,
    pub signed_header_2: crate::SignedBeaconBlockHeader,
}

impl ProposerSlashing {
    pub fn proposer_index(&self) -> u64 {
        self.signed_header_1.message.proposer_index
    }
}

/// Proof that an attester made two attestations meeting the Casper FFG slashing conditions
/// (a double vote or a surround vote).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(bound = "E: EthSpec")]
pub struct AttesterSlashing<E: EthSpec> {
    pub attestation_1: IndexedAttestation<E>,
    pub attestation_2: IndexedAttestation<E>,
}

impl<E: EthSpec> AttesterSlashing<E> {
    pub fn is_slashable_attestation_data(&self) -> bool {
        self.attestation_1.is_double_vote(&self.attestation_2)
            || self.attestation_1.is_surround_vote(&self.attestation_2)
    }

    /// Validator indices present in both attestations, sorted ascending, as required by
    /// `get_slashable_attester_slashing_indices`.
    pub fn slashable_attesting_indices(&self) -> Vec<u64> {
        let set_2: std::collections::HashSet<u64> =
            self.attestation_2.attesting_indices.iter().copied().collect();
        let mut indices: Vec<u64> = self
            .attestation_1
            .attesting_indices
            .iter()
            .copied()
            .filter(|index| set_2.contains(index))
            .collect();
        indices.sort_unstable();
        indices
    }
}
