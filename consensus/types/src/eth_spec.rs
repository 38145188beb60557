//! The `EthSpec` trait carries every compile-time list-length parameter of a beacon chain
//! network as an associated `typenum` constant, so that SSZ list/vector bounds are baked into
//! the type system rather than checked at runtime. `MainnetEthSpec` and `MinimalEthSpec` are the
//! two concrete networks tests and genesis-building run against.
use crate::ChainSpec;
use serde::{Deserialize, Serialize};
use ssz_types::typenum::{
    Unsigned, U1024, U1099511627776, U128, U131072, U16777216, U16, U2, U2048, U32, U4, U4096,
    U512, U64, U65536, U8, U8192,
};
use std::fmt::Debug;

pub trait EthSpec: 'static + Default + Sync + Send + Clone + Debug + PartialEq + Eq {
    /*
     * Misc
     */
    type JustificationBitsLength: Unsigned + Clone + Sync + Send + Debug + PartialEq;
    type MaxValidatorsPerCommittee: Unsigned + Clone + Sync + Send + Debug + PartialEq;
    type SlotsPerEpoch: Unsigned + Clone + Sync + Send + Debug + PartialEq;

    /*
     * Time parameters
     */
    type SlotsPerHistoricalRoot: Unsigned + Clone + Sync + Send + Debug + PartialEq;
    type EpochsPerHistoricalVector: Unsigned + Clone + Sync + Send + Debug + PartialEq;
    type EpochsPerSlashingsVector: Unsigned + Clone + Sync + Send + Debug + PartialEq;

    /*
     * Validator registry limits
     */
    type ValidatorRegistryLimit: Unsigned + Clone + Sync + Send + Debug + PartialEq;

    /*
     * Max block operations (list bounds)
     */
    type MaxProposerSlashings: Unsigned + Clone + Sync + Send + Debug + PartialEq;
    type MaxAttesterSlashings: Unsigned + Clone + Sync + Send + Debug + PartialEq;
    type MaxAttestations: Unsigned + Clone + Sync + Send + Debug + PartialEq;
    type MaxDeposits: Unsigned + Clone + Sync + Send + Debug + PartialEq;
    type MaxVoluntaryExits: Unsigned + Clone + Sync + Send + Debug + PartialEq;
    type SlotsPerEth1VotingPeriod: Unsigned + Clone + Sync + Send + Debug + PartialEq;
    type HistoricalRootsLimit: Unsigned + Clone + Sync + Send + Debug + PartialEq;
    type MaxPendingAttestations: Unsigned + Clone + Sync + Send + Debug + PartialEq;

    /*
     * Altair
     */
    type SyncCommitteeSize: Unsigned + Clone + Sync + Send + Debug + PartialEq;
    type SyncSubcommitteeSize: Unsigned + Clone + Sync + Send + Debug + PartialEq;

    fn default_spec() -> ChainSpec;

    fn slots_per_epoch() -> u64 {
        Self::SlotsPerEpoch::to_u64()
    }

    fn slots_per_historical_root() -> usize {
        Self::SlotsPerHistoricalRoot::to_usize()
    }

    fn epochs_per_historical_vector() -> usize {
        Self::EpochsPerHistoricalVector::to_usize()
    }

    fn epochs_per_slashings_vector() -> usize {
        Self::EpochsPerSlashingsVector::to_usize()
    }

    fn sync_committee_size() -> usize {
        Self::SyncCommitteeSize::to_usize()
    }

    fn sync_subcommittee_size() -> usize {
        Self::SyncSubcommitteeSize::to_usize()
    }

    fn genesis_epoch() -> crate::Epoch {
        crate::Epoch::new(0)
    }
}

macro_rules! declare_spec {
    ($name: ident, $slots_per_epoch: ty, $slots_per_historical_root: ty,
     $epochs_per_historical_vector: ty, $epochs_per_slashings_vector: ty,
     $max_validators_per_committee: ty, $validator_registry_limit: ty,
     $sync_committee_size: ty, $sync_subcommittee_size: ty, $max_pending_attestations: ty,
     $default_spec: expr) => {
        #[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
        pub struct $name;

        impl EthSpec for $name {
            type JustificationBitsLength = U4;
            type MaxValidatorsPerCommittee = $max_validators_per_committee;
            type SlotsPerEpoch = $slots_per_epoch;
            type SlotsPerHistoricalRoot = $slots_per_historical_root;
            type EpochsPerHistoricalVector = $epochs_per_historical_vector;
            type EpochsPerSlashingsVector = $epochs_per_slashings_vector;
            type ValidatorRegistryLimit = $validator_registry_limit;
            type MaxProposerSlashings = U16;
            type MaxAttesterSlashings = U2;
            type MaxAttestations = U128;
            type MaxDeposits = U16;
            type MaxVoluntaryExits = U16;
            type SlotsPerEth1VotingPeriod = U32;
            type HistoricalRootsLimit = U16777216;
            type MaxPendingAttestations = $max_pending_attestations;
            type SyncCommitteeSize = $sync_committee_size;
            type SyncSubcommitteeSize = $sync_subcommittee_size;

            fn default_spec() -> ChainSpec {
                $default_spec
            }
        }
    };
}

declare_spec!(
    MainnetEthSpec,
    U32,
    U8192,
    U65536,
    U8192,
    U2048,
    U1099511627776,
    U512,
    U128,
    U4096,
    ChainSpec::mainnet()
);

declare_spec!(
    MinimalEthSpec,
    U8,
    U64,
    U64,
    U64,
    U2048,
    U131072,
    U32,
    U8,
    U1024,
    ChainSpec::minimal()
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_slots_per_epoch() {
        assert_eq!(MainnetEthSpec::slots_per_epoch(), 32);
        assert_eq!(MinimalEthSpec::slots_per_epoch(), 8);
    }

    #[test]
    fn sync_committee_sizes() {
        assert_eq!(MainnetEthSpec::sync_committee_size(), 512);
        assert_eq!(MainnetEthSpec::sync_subcommittee_size(), 128);
    }
}
