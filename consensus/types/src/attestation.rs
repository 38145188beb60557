use crate::{AttestationData, EthSpec, SignatureBytes};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use ssz_types::BitList;
use tree_hash_derive::TreeHash;

/// An unresolved attestation: `aggregation_bits[i]` is set if the `i`-th member (by committee
/// position) of the committee identified by `data.index` at `data.slot` contributed its
/// signature to `signature`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(bound = "E: EthSpec")]
pub struct Attestation<E: EthSpec> {
    pub aggregation_bits: BitList<E::MaxValidatorsPerCommittee>,
    pub data: AttestationData,
    pub signature: SignatureBytes,
}

impl<E: EthSpec> Attestation<E> {
    pub fn is_aggregation_bits_zero(&self) -> bool {
        self.aggregation_bits.is_zero()
    }

    pub fn num_set_aggregation_bits(&self) -> usize {
        self.aggregation_bits.num_set_bits()
    }
}
