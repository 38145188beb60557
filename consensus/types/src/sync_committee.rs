use crate::{EthSpec, PublicKeyBytes, SignatureBytes};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use ssz_types::{BitVector, FixedVector};
use tree_hash_derive::TreeHash;

/// The `SyncCommitteeSize` validators selected to participate in light-client sync for an
/// `epochs_per_sync_committee_period`-epoch window, plus their summed pubkey for fast
/// verification of "did the committee as a whole sign this".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(bound = "E: EthSpec")]
pub struct SyncCommittee<E: EthSpec> {
    pub pubkeys: FixedVector<PublicKeyBytes, E::SyncCommitteeSize>,
    pub aggregate_pubkey: PublicKeyBytes,
}

impl<E: EthSpec> SyncCommittee<E> {
    /// Indices of `pubkeys` belonging to `validator_pubkey`, one per occurrence (a validator
    /// can be selected into a sync committee more than once).
    pub fn get_committee_indices(&self, validator_pubkey: &PublicKeyBytes) -> Vec<usize> {
        self.pubkeys
            .iter()
            .enumerate()
            .filter(|(_, pubkey)| *pubkey == validator_pubkey)
            .map(|(i, _)| i)
            .collect()
    }

    /// Splits the full committee into `SYNC_COMMITTEE_SUBNET_COUNT` equal subcommittees, the
    /// grouping gossip subnets are keyed on.
    pub fn subcommittee_pubkeys(&self, subcommittee_index: usize) -> Vec<PublicKeyBytes> {
        let size = E::sync_subcommittee_size();
        self.pubkeys
            .iter()
            .skip(subcommittee_index * size)
            .take(size)
            .copied()
            .collect()
    }
}

/// A sync committee member's vote: `sync_committee_bits[i]` set if the `i`-th committee member
/// contributed to `sync_committee_signature`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(bound = "E: EthSpec")]
pub struct SyncAggregate<E: EthSpec> {
    pub sync_committee_bits: BitVector<E::SyncCommitteeSize>,
    pub sync_committee_signature: SignatureBytes,
}

impl<E: EthSpec> SyncAggregate<E> {
    pub fn empty() -> Self {
        Self {
            sync_committee_bits: BitVector::default(),
            sync_committee_signature: SignatureBytes::empty(),
        }
    }
}
