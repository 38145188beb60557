use crate::{
    AttesterSlashing, Attestation, Deposit, Eth1Data, EthSpec, ProposerSlashing, SignedVoluntaryExit,
    SyncAggregate,
};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use ssz_types::VariableList;
use tree_hash::Hash256;
use tree_hash_derive::TreeHash;

/// Body shared by every fork this crate implements: the RANDAO reveal, eth1 vote and the five
/// block-operation lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(bound = "E: EthSpec")]
pub struct BeaconBlockBodyBase<E: EthSpec> {
    pub randao_reveal: crate::SignatureBytes,
    pub eth1_data: Eth1Data,
    pub graffiti: Hash256,
    pub proposer_slashings: VariableList<ProposerSlashing, E::MaxProposerSlashings>,
    pub attester_slashings: VariableList<AttesterSlashing<E>, E::MaxAttesterSlashings>,
    pub attestations: VariableList<Attestation<E>, E::MaxAttestations>,
    pub deposits: VariableList<Deposit, E::MaxDeposits>,
    pub voluntary_exits: VariableList<SignedVoluntaryExit, E::MaxVoluntaryExits>,
}

/// The Altair body: identical to `Base` plus the block's `sync_aggregate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(bound = "E: EthSpec")]
pub struct BeaconBlockBodyAltair<E: EthSpec> {
    pub randao_reveal: crate::SignatureBytes,
    pub eth1_data: Eth1Data,
    pub graffiti: Hash256,
    pub proposer_slashings: VariableList<ProposerSlashing, E::MaxProposerSlashings>,
    pub attester_slashings: VariableList<AttesterSlashing<E>, E::MaxAttesterSlashings>,
    pub attestations: VariableList<Attestation<E>, E::MaxAttestations>,
    pub deposits: VariableList<Deposit, E::MaxDeposits>,
    pub voluntary_exits: VariableList<SignedVoluntaryExit, E::MaxVoluntaryExits>,
    pub sync_aggregate: SyncAggregate<E>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "E: EthSpec", untagged)]
pub enum BeaconBlockBody<E: EthSpec> {
    Base(BeaconBlockBodyBase<E>),
    Altair(BeaconBlockBodyAltair<E>),
}

macro_rules! impl_common_field {
    ($name: ident, $ty: ty) => {
        pub fn $name(&self) -> &$ty {
            match self {
                BeaconBlockBody::Base(body) => &body.$name,
                BeaconBlockBody::Altair(body) => &body.$name,
            }
        }
    };
}

impl<E: EthSpec> BeaconBlockBody<E> {
    impl_common_field!(randao_reveal, crate::SignatureBytes);
    impl_common_field!(eth1_data, Eth1Data);
    impl_common_field!(graffiti, Hash256);
    impl_common_field!(
        proposer_slashings,
        VariableList<ProposerSlashing, E::MaxProposerSlashings>
    );
    impl_common_field!(
        attester_slashings,
        VariableList<AttesterSlashing<E>, E::MaxAttesterSlashings>
    );
    impl_common_field!(attestations, VariableList<Attestation<E>, E::MaxAttestations>);
    impl_common_field!(deposits, VariableList<Deposit, E::MaxDeposits>);
    impl_common_field!(
        voluntary_exits,
        VariableList<SignedVoluntaryExit, E::MaxVoluntaryExits>
    );

    pub fn sync_aggregate(&self) -> Option<&SyncAggregate<E>> {
        match self {
            BeaconBlockBody::Base(_) => None,
            BeaconBlockBody::Altair(body) => Some(&body.sync_aggregate),
        }
    }

    pub fn is_altair(&self) -> bool {
        matches!(self, BeaconBlockBody::Altair(_))
    }
}

impl<E: EthSpec> tree_hash::TreeHash for BeaconBlockBody<E> {
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
            BeaconBlockBody::Base(body) => body.tree_hash_root(),
            BeaconBlockBody::Altair(body) => body.tree_hash_root(),
        }
    }
}
