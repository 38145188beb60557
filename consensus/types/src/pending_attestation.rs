use crate::{AttestationData, EthSpec};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use ssz_types::BitList;
use tree_hash_derive::TreeHash;

/// How `BeaconState::Base` records an attestation once it has been included in a block: the
/// aggregation bits and data as submitted, plus how many slots late it arrived and who proposed
/// the including block (both needed to pay out the proposer's inclusion reward at epoch end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(bound = "E: EthSpec")]
pub struct PendingAttestation<E: EthSpec> {
    pub aggregation_bits: BitList<E::MaxValidatorsPerCommittee>,
    pub data: AttestationData,
    pub inclusion_delay: u64,
    pub proposer_index: u64,
}
