//! The state machine's root type. `BeaconState` is a two-variant enum (`Base`, `Altair`) rather
//! than the teacher's full multi-fork superstruct; later forks (Bellatrix execution payloads
//! onward) are out of scope here, so the fork split only needs to cover the one breaking change
//! Altair makes to state shape: participation flags and a sync committee pair replace
//! `PendingAttestation` lists.
mod committee_cache;
mod exit_cache;
mod pubkey_cache;
mod tree_hash_cache;

pub use committee_cache::{Committee, CommitteeCache};
pub use exit_cache::ExitCache;
pub use pubkey_cache::PubkeyCache;
pub use tree_hash_cache::TreeHashCache;
use tree_hash_cache::field_root;

use crate::*;
use safe_arith::SafeArith;
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use ssz_types::{BitVector, FixedVector, VariableList};
use tree_hash::TreeHash as _;
use tree_hash_derive::TreeHash;

pub const CACHED_EPOCHS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(bound = "E: EthSpec")]
pub struct BeaconStateBase<E: EthSpec> {
    pub genesis_time: u64,
    pub genesis_validators_root: Hash256,
    pub slot: Slot,
    pub fork: Fork,
    pub latest_block_header: BeaconBlockHeader,
    pub block_roots: FixedVector<Hash256, E::SlotsPerHistoricalRoot>,
    pub state_roots: FixedVector<Hash256, E::SlotsPerHistoricalRoot>,
    pub historical_roots: VariableList<Hash256, E::HistoricalRootsLimit>,
    pub eth1_data: Eth1Data,
    pub eth1_data_votes: VariableList<Eth1Data, E::SlotsPerEth1VotingPeriod>,
    pub eth1_deposit_index: u64,
    pub validators: VariableList<Validator, E::ValidatorRegistryLimit>,
    pub balances: VariableList<u64, E::ValidatorRegistryLimit>,
    pub randao_mixes: FixedVector<Hash256, E::EpochsPerHistoricalVector>,
    pub slashings: FixedVector<u64, E::EpochsPerSlashingsVector>,
    pub previous_epoch_attestations: VariableList<PendingAttestation<E>, E::MaxPendingAttestations>,
    pub current_epoch_attestations: VariableList<PendingAttestation<E>, E::MaxPendingAttestations>,
    pub justification_bits: BitVector<ssz_types::typenum::U4>,
    pub previous_justified_checkpoint: Checkpoint,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,

    #[serde(skip, default)]
    #[ssz(skip_serializing, skip_deserializing)]
    #[tree_hash(skip_hashing)]
    pub caches: BeaconStateCaches,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(bound = "E: EthSpec")]
pub struct BeaconStateAltair<E: EthSpec> {
    pub genesis_time: u64,
    pub genesis_validators_root: Hash256,
    pub slot: Slot,
    pub fork: Fork,
    pub latest_block_header: BeaconBlockHeader,
    pub block_roots: FixedVector<Hash256, E::SlotsPerHistoricalRoot>,
    pub state_roots: FixedVector<Hash256, E::SlotsPerHistoricalRoot>,
    pub historical_roots: VariableList<Hash256, E::HistoricalRootsLimit>,
    pub eth1_data: Eth1Data,
    pub eth1_data_votes: VariableList<Eth1Data, E::SlotsPerEth1VotingPeriod>,
    pub eth1_deposit_index: u64,
    pub validators: VariableList<Validator, E::ValidatorRegistryLimit>,
    pub balances: VariableList<u64, E::ValidatorRegistryLimit>,
    pub randao_mixes: FixedVector<Hash256, E::EpochsPerHistoricalVector>,
    pub slashings: FixedVector<u64, E::EpochsPerSlashingsVector>,
    pub previous_epoch_participation: VariableList<u8, E::ValidatorRegistryLimit>,
    pub current_epoch_participation: VariableList<u8, E::ValidatorRegistryLimit>,
    pub justification_bits: BitVector<ssz_types::typenum::U4>,
    pub previous_justified_checkpoint: Checkpoint,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,
    pub inactivity_scores: VariableList<u64, E::ValidatorRegistryLimit>,
    pub current_sync_committee: SyncCommittee<E>,
    pub next_sync_committee: SyncCommittee<E>,

    #[serde(skip, default)]
    #[ssz(skip_serializing, skip_deserializing)]
    #[tree_hash(skip_hashing)]
    pub caches: BeaconStateCaches,
}

/// Everything derived from state content rather than stored in it: committee shufflings for the
/// three epochs a state can answer questions about, the pubkey→index map, and the exit-queue
/// churn tracker. None of this is part of consensus and none of it is SSZ-encoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeaconStateCaches {
    pub committee_caches: [CommitteeCache; CACHED_EPOCHS],
    pub pubkey_cache: PubkeyCache,
    pub exit_cache: ExitCache,
    pub tree_hash_cache: TreeHashCache,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "E: EthSpec", untagged)]
pub enum BeaconState<E: EthSpec> {
    Base(BeaconStateBase<E>),
    Altair(BeaconStateAltair<E>),
}

/// Field indices into the dirty-tracked `TreeHashCache`, in the same order `tree_hash_derive`
/// hashes them for each variant's container `TreeHash` impl. Every field the two variants carry
/// at the same position (everything except the pair that changes meaning at the Altair boundary,
/// and the three fields only `Altair` carries) shares one constant, so a single
/// `impl_common_mut!` invocation marks the right field dirty no matter which variant `self` is.
mod field {
    pub const GENESIS_TIME: usize = 0;
    pub const GENESIS_VALIDATORS_ROOT: usize = 1;
    pub const SLOT: usize = 2;
    pub const FORK: usize = 3;
    pub const LATEST_BLOCK_HEADER: usize = 4;
    pub const BLOCK_ROOTS: usize = 5;
    pub const STATE_ROOTS: usize = 6;
    pub const HISTORICAL_ROOTS: usize = 7;
    pub const ETH1_DATA: usize = 8;
    pub const ETH1_DATA_VOTES: usize = 9;
    pub const ETH1_DEPOSIT_INDEX: usize = 10;
    pub const VALIDATORS: usize = 11;
    pub const BALANCES: usize = 12;
    pub const RANDAO_MIXES: usize = 13;
    pub const SLASHINGS: usize = 14;
    pub const PREVIOUS_EPOCH_ATTESTATIONS: usize = 15;
    pub const CURRENT_EPOCH_ATTESTATIONS: usize = 16;
    pub const PREVIOUS_EPOCH_PARTICIPATION: usize = 15;
    pub const CURRENT_EPOCH_PARTICIPATION: usize = 16;
    pub const JUSTIFICATION_BITS: usize = 17;
    pub const PREVIOUS_JUSTIFIED_CHECKPOINT: usize = 18;
    pub const CURRENT_JUSTIFIED_CHECKPOINT: usize = 19;
    pub const FINALIZED_CHECKPOINT: usize = 20;
    pub const INACTIVITY_SCORES: usize = 21;
    pub const CURRENT_SYNC_COMMITTEE: usize = 22;
    pub const NEXT_SYNC_COMMITTEE: usize = 23;

    pub const NUM_FIELDS_BASE: usize = 21;
    pub const NUM_FIELDS_ALTAIR: usize = 24;
}

macro_rules! impl_common_getter {
    ($name: ident, $ty: ty) => {
        pub fn $name(&self) -> &$ty {
            match self {
                BeaconState::Base(state) => &state.$name,
                BeaconState::Altair(state) => &state.$name,
            }
        }
    };
}

macro_rules! impl_common_getter_copy {
    ($name: ident, $ty: ty) => {
        pub fn $name(&self) -> $ty {
            match self {
                BeaconState::Base(state) => state.$name,
                BeaconState::Altair(state) => state.$name,
            }
        }
    };
}

macro_rules! impl_common_mut {
    ($name: ident, $mut_name: ident, $ty: ty, $field: expr) => {
        pub fn $mut_name(&mut self) -> &mut $ty {
            self.caches_mut().tree_hash_cache.mark_field_dirty($field);
            match self {
                BeaconState::Base(state) => &mut state.$name,
                BeaconState::Altair(state) => &mut state.$name,
            }
        }
    };
}

impl<E: EthSpec> BeaconState<E> {
    impl_common_getter_copy!(genesis_time, u64);
    impl_common_getter_copy!(genesis_validators_root, Hash256);
    impl_common_getter_copy!(slot, Slot);
    impl_common_getter!(fork, Fork);
    impl_common_getter!(latest_block_header, BeaconBlockHeader);
    impl_common_getter!(block_roots, FixedVector<Hash256, E::SlotsPerHistoricalRoot>);
    impl_common_getter!(state_roots, FixedVector<Hash256, E::SlotsPerHistoricalRoot>);
    impl_common_getter!(eth1_data, Eth1Data);
    impl_common_getter!(
        eth1_data_votes,
        VariableList<Eth1Data, E::SlotsPerEth1VotingPeriod>
    );
    impl_common_getter_copy!(eth1_deposit_index, u64);
    impl_common_getter!(validators, VariableList<Validator, E::ValidatorRegistryLimit>);
    impl_common_getter!(balances, VariableList<u64, E::ValidatorRegistryLimit>);
    impl_common_getter!(
        randao_mixes,
        FixedVector<Hash256, E::EpochsPerHistoricalVector>
    );
    impl_common_getter!(slashings, FixedVector<u64, E::EpochsPerSlashingsVector>);
    impl_common_getter!(previous_justified_checkpoint, Checkpoint);
    impl_common_getter!(current_justified_checkpoint, Checkpoint);
    impl_common_getter!(finalized_checkpoint, Checkpoint);
    impl_common_getter!(historical_roots, VariableList<Hash256, E::HistoricalRootsLimit>);
    impl_common_getter!(justification_bits, BitVector<ssz_types::typenum::U4>);

    impl_common_mut!(slot, slot_mut, Slot, field::SLOT);
    impl_common_mut!(
        eth1_deposit_index,
        eth1_deposit_index_mut,
        u64,
        field::ETH1_DEPOSIT_INDEX
    );
    impl_common_mut!(
        validators,
        validators_mut,
        VariableList<Validator, E::ValidatorRegistryLimit>,
        field::VALIDATORS
    );
    impl_common_mut!(
        balances,
        balances_mut,
        VariableList<u64, E::ValidatorRegistryLimit>,
        field::BALANCES
    );
    impl_common_mut!(
        eth1_data_votes,
        eth1_data_votes_mut,
        VariableList<Eth1Data, E::SlotsPerEth1VotingPeriod>,
        field::ETH1_DATA_VOTES
    );
    impl_common_mut!(
        latest_block_header,
        latest_block_header_mut,
        BeaconBlockHeader,
        field::LATEST_BLOCK_HEADER
    );
    impl_common_mut!(
        current_justified_checkpoint,
        current_justified_checkpoint_mut,
        Checkpoint,
        field::CURRENT_JUSTIFIED_CHECKPOINT
    );
    impl_common_mut!(
        previous_justified_checkpoint,
        previous_justified_checkpoint_mut,
        Checkpoint,
        field::PREVIOUS_JUSTIFIED_CHECKPOINT
    );
    impl_common_mut!(
        finalized_checkpoint,
        finalized_checkpoint_mut,
        Checkpoint,
        field::FINALIZED_CHECKPOINT
    );
    impl_common_mut!(eth1_data, eth1_data_mut, Eth1Data, field::ETH1_DATA);
    impl_common_mut!(fork, fork_mut, Fork, field::FORK);
    impl_common_mut!(
        slashings,
        slashings_mut,
        FixedVector<u64, E::EpochsPerSlashingsVector>,
        field::SLASHINGS
    );
    impl_common_mut!(
        historical_roots,
        historical_roots_mut,
        VariableList<Hash256, E::HistoricalRootsLimit>,
        field::HISTORICAL_ROOTS
    );
    impl_common_mut!(
        justification_bits,
        justification_bits_mut,
        BitVector<ssz_types::typenum::U4>,
        field::JUSTIFICATION_BITS
    );

    /// Constructs a fresh genesis `BeaconState` in the `Base` variant. Callers that need an
    /// Altair-from-genesis chain upgrade it afterwards via `upgrade_to_altair`.
    pub fn new(genesis_time: u64, eth1_data: Eth1Data, spec: &ChainSpec) -> Self {
        let mut base = test_helpers::empty_base::<E>(spec);
        base.genesis_time = genesis_time;
        base.eth1_data = eth1_data;
        BeaconState::Base(base)
    }

    pub fn as_base(&self) -> Result<&BeaconStateBase<E>, BeaconStateError> {
        match self {
            BeaconState::Base(state) => Ok(state),
            BeaconState::Altair(_) => Err(BeaconStateError::InconsistentFork),
        }
    }

    pub fn as_base_mut(&mut self) -> Result<&mut BeaconStateBase<E>, BeaconStateError> {
        match self {
            BeaconState::Base(state) => Ok(state),
            BeaconState::Altair(_) => Err(BeaconStateError::InconsistentFork),
        }
    }

    pub fn as_altair(&self) -> Result<&BeaconStateAltair<E>, BeaconStateError> {
        match self {
            BeaconState::Altair(state) => Ok(state),
            BeaconState::Base(_) => Err(BeaconStateError::NotAltairState),
        }
    }

    pub fn as_altair_mut(&mut self) -> Result<&mut BeaconStateAltair<E>, BeaconStateError> {
        match self {
            BeaconState::Altair(state) => Ok(state),
            BeaconState::Base(_) => Err(BeaconStateError::NotAltairState),
        }
    }

    pub fn genesis_validators_root_mut(&mut self) -> &mut Hash256 {
        self.caches_mut()
            .tree_hash_cache
            .mark_field_dirty(field::GENESIS_VALIDATORS_ROOT);
        match self {
            BeaconState::Base(state) => &mut state.genesis_validators_root,
            BeaconState::Altair(state) => &mut state.genesis_validators_root,
        }
    }

    pub fn previous_epoch_attestations_mut(
        &mut self,
    ) -> Result<&mut VariableList<PendingAttestation<E>, E::MaxPendingAttestations>, BeaconStateError>
    {
        self.caches_mut()
            .tree_hash_cache
            .mark_field_dirty(field::PREVIOUS_EPOCH_ATTESTATIONS);
        Ok(&mut self.as_base_mut()?.previous_epoch_attestations)
    }

    pub fn current_epoch_attestations_mut(
        &mut self,
    ) -> Result<&mut VariableList<PendingAttestation<E>, E::MaxPendingAttestations>, BeaconStateError>
    {
        self.caches_mut()
            .tree_hash_cache
            .mark_field_dirty(field::CURRENT_EPOCH_ATTESTATIONS);
        Ok(&mut self.as_base_mut()?.current_epoch_attestations)
    }

    pub fn previous_epoch_participation(
        &self,
    ) -> Result<&VariableList<u8, E::ValidatorRegistryLimit>, BeaconStateError> {
        Ok(&self.as_altair()?.previous_epoch_participation)
    }

    pub fn previous_epoch_participation_mut(
        &mut self,
    ) -> Result<&mut VariableList<u8, E::ValidatorRegistryLimit>, BeaconStateError> {
        self.caches_mut()
            .tree_hash_cache
            .mark_field_dirty(field::PREVIOUS_EPOCH_PARTICIPATION);
        Ok(&mut self.as_altair_mut()?.previous_epoch_participation)
    }

    pub fn current_epoch_participation(
        &self,
    ) -> Result<&VariableList<u8, E::ValidatorRegistryLimit>, BeaconStateError> {
        Ok(&self.as_altair()?.current_epoch_participation)
    }

    pub fn current_epoch_participation_mut(
        &mut self,
    ) -> Result<&mut VariableList<u8, E::ValidatorRegistryLimit>, BeaconStateError> {
        self.caches_mut()
            .tree_hash_cache
            .mark_field_dirty(field::CURRENT_EPOCH_PARTICIPATION);
        Ok(&mut self.as_altair_mut()?.current_epoch_participation)
    }

    pub fn inactivity_scores(
        &self,
    ) -> Result<&VariableList<u64, E::ValidatorRegistryLimit>, BeaconStateError> {
        Ok(&self.as_altair()?.inactivity_scores)
    }

    pub fn inactivity_scores_mut(
        &mut self,
    ) -> Result<&mut VariableList<u64, E::ValidatorRegistryLimit>, BeaconStateError> {
        self.caches_mut()
            .tree_hash_cache
            .mark_field_dirty(field::INACTIVITY_SCORES);
        Ok(&mut self.as_altair_mut()?.inactivity_scores)
    }

    pub fn current_sync_committee(&self) -> Result<&SyncCommittee<E>, BeaconStateError> {
        Ok(&self.as_altair()?.current_sync_committee)
    }

    pub fn current_sync_committee_mut(
        &mut self,
    ) -> Result<&mut SyncCommittee<E>, BeaconStateError> {
        self.caches_mut()
            .tree_hash_cache
            .mark_field_dirty(field::CURRENT_SYNC_COMMITTEE);
        Ok(&mut self.as_altair_mut()?.current_sync_committee)
    }

    pub fn next_sync_committee(&self) -> Result<&SyncCommittee<E>, BeaconStateError> {
        Ok(&self.as_altair()?.next_sync_committee)
    }

    pub fn next_sync_committee_mut(&mut self) -> Result<&mut SyncCommittee<E>, BeaconStateError> {
        self.caches_mut()
            .tree_hash_cache
            .mark_field_dirty(field::NEXT_SYNC_COMMITTEE);
        Ok(&mut self.as_altair_mut()?.next_sync_committee)
    }

    /// Fills every slot in the `block_roots` ring buffer with `root`, used once at genesis so
    /// empty-slot lookups before any block has been processed don't read garbage.
    pub fn fill_block_roots_with(&mut self, root: Hash256) {
        self.caches_mut()
            .tree_hash_cache
            .mark_field_dirty(field::BLOCK_ROOTS);
        match self {
            BeaconState::Base(state) => state.block_roots.iter_mut().for_each(|r| *r = root),
            BeaconState::Altair(state) => state.block_roots.iter_mut().for_each(|r| *r = root),
        }
    }

    pub fn fill_randao_mixes_with(&mut self, mix: Hash256) {
        self.caches_mut()
            .tree_hash_cache
            .mark_field_dirty(field::RANDAO_MIXES);
        match self {
            BeaconState::Base(state) => state.randao_mixes.iter_mut().for_each(|m| *m = mix),
            BeaconState::Altair(state) => state.randao_mixes.iter_mut().for_each(|m| *m = mix),
        }
    }

    fn block_root_index(&self, slot: Slot) -> Result<usize, BeaconStateError> {
        let len = E::slots_per_historical_root() as u64;
        if slot >= self.slot() || self.slot() > slot.safe_add(Slot::new(len))? {
            return Err(BeaconStateError::SlotOutOfBounds);
        }
        Ok(slot.as_u64().checked_rem(len).ok_or(BeaconStateError::SlotOutOfBounds)? as usize)
    }

    pub fn get_block_root(&self, slot: Slot) -> Result<Hash256, BeaconStateError> {
        let index = self.block_root_index(slot)?;
        self.block_roots()
            .get(index)
            .copied()
            .ok_or(BeaconStateError::InsufficientBlockRoots)
    }

    pub fn get_block_root_at_epoch(&self, epoch: Epoch) -> Result<Hash256, BeaconStateError> {
        self.get_block_root(epoch.start_slot(E::slots_per_epoch()))
    }

    pub fn set_block_root(&mut self, slot: Slot, root: Hash256) -> Result<(), BeaconStateError> {
        let len = E::slots_per_historical_root() as u64;
        let index = (slot.as_u64().checked_rem(len).ok_or(BeaconStateError::SlotOutOfBounds)?)
            as usize;
        self.caches_mut()
            .tree_hash_cache
            .mark_field_dirty(field::BLOCK_ROOTS);
        match self {
            BeaconState::Base(state) => state.block_roots.get_mut(index).map(|r| *r = root),
            BeaconState::Altair(state) => state.block_roots.get_mut(index).map(|r| *r = root),
        }
        .ok_or(BeaconStateError::InsufficientBlockRoots)
    }

    pub fn set_state_root(&mut self, slot: Slot, root: Hash256) -> Result<(), BeaconStateError> {
        let len = E::slots_per_historical_root() as u64;
        let index = (slot.as_u64().checked_rem(len).ok_or(BeaconStateError::SlotOutOfBounds)?)
            as usize;
        self.caches_mut()
            .tree_hash_cache
            .mark_field_dirty(field::STATE_ROOTS);
        match self {
            BeaconState::Base(state) => state.state_roots.get_mut(index).map(|r| *r = root),
            BeaconState::Altair(state) => state.state_roots.get_mut(index).map(|r| *r = root),
        }
        .ok_or(BeaconStateError::InsufficientStateRoots)
    }

    /// Builds every derived cache (committees for all three relative epochs, the pubkey index,
    /// and the exit-queue churn tracker) in one call, the sequence genesis and deserialization
    /// both need before the state can answer any committee or proposer query.
    pub fn build_caches(&mut self, spec: &ChainSpec) -> Result<(), BeaconStateError> {
        self.build_all_committee_caches(spec)?;
        self.update_pubkey_cache()?;
        self.build_exit_cache(spec);
        Ok(())
    }

    /// Number of top-level hashed fields the active variant carries, i.e. the length of the
    /// field-root list `tree_hash_derive`'s container impl would Merkleize.
    fn num_tree_hash_fields(&self) -> usize {
        match self {
            BeaconState::Base(_) => field::NUM_FIELDS_BASE,
            BeaconState::Altair(_) => field::NUM_FIELDS_ALTAIR,
        }
    }

    /// The hash-tree-root of the field at `index`, in the same order `num_tree_hash_fields`
    /// counts them. Used as the per-field callback `TreeHashCache::recalculate_root` calls for
    /// whichever fields are currently marked dirty.
    fn tree_hash_field_root(&self, index: usize) -> Hash256 {
        match self {
            BeaconState::Base(state) => match index {
                field::GENESIS_TIME => field_root(&state.genesis_time),
                field::GENESIS_VALIDATORS_ROOT => field_root(&state.genesis_validators_root),
                field::SLOT => field_root(&state.slot),
                field::FORK => field_root(&state.fork),
                field::LATEST_BLOCK_HEADER => field_root(&state.latest_block_header),
                field::BLOCK_ROOTS => field_root(&state.block_roots),
                field::STATE_ROOTS => field_root(&state.state_roots),
                field::HISTORICAL_ROOTS => field_root(&state.historical_roots),
                field::ETH1_DATA => field_root(&state.eth1_data),
                field::ETH1_DATA_VOTES => field_root(&state.eth1_data_votes),
                field::ETH1_DEPOSIT_INDEX => field_root(&state.eth1_deposit_index),
                field::VALIDATORS => field_root(&state.validators),
                field::BALANCES => field_root(&state.balances),
                field::RANDAO_MIXES => field_root(&state.randao_mixes),
                field::SLASHINGS => field_root(&state.slashings),
                field::PREVIOUS_EPOCH_ATTESTATIONS => {
                    field_root(&state.previous_epoch_attestations)
                }
                field::CURRENT_EPOCH_ATTESTATIONS => field_root(&state.current_epoch_attestations),
                field::JUSTIFICATION_BITS => field_root(&state.justification_bits),
                field::PREVIOUS_JUSTIFIED_CHECKPOINT => {
                    field_root(&state.previous_justified_checkpoint)
                }
                field::CURRENT_JUSTIFIED_CHECKPOINT => {
                    field_root(&state.current_justified_checkpoint)
                }
                field::FINALIZED_CHECKPOINT => field_root(&state.finalized_checkpoint),
                _ => unreachable!("BeaconStateBase has {} hashed fields", field::NUM_FIELDS_BASE),
            },
            BeaconState::Altair(state) => match index {
                field::GENESIS_TIME => field_root(&state.genesis_time),
                field::GENESIS_VALIDATORS_ROOT => field_root(&state.genesis_validators_root),
                field::SLOT => field_root(&state.slot),
                field::FORK => field_root(&state.fork),
                field::LATEST_BLOCK_HEADER => field_root(&state.latest_block_header),
                field::BLOCK_ROOTS => field_root(&state.block_roots),
                field::STATE_ROOTS => field_root(&state.state_roots),
                field::HISTORICAL_ROOTS => field_root(&state.historical_roots),
                field::ETH1_DATA => field_root(&state.eth1_data),
                field::ETH1_DATA_VOTES => field_root(&state.eth1_data_votes),
                field::ETH1_DEPOSIT_INDEX => field_root(&state.eth1_deposit_index),
                field::VALIDATORS => field_root(&state.validators),
                field::BALANCES => field_root(&state.balances),
                field::RANDAO_MIXES => field_root(&state.randao_mixes),
                field::SLASHINGS => field_root(&state.slashings),
                field::PREVIOUS_EPOCH_PARTICIPATION => {
                    field_root(&state.previous_epoch_participation)
                }
                field::CURRENT_EPOCH_PARTICIPATION => {
                    field_root(&state.current_epoch_participation)
                }
                field::JUSTIFICATION_BITS => field_root(&state.justification_bits),
                field::PREVIOUS_JUSTIFIED_CHECKPOINT => {
                    field_root(&state.previous_justified_checkpoint)
                }
                field::CURRENT_JUSTIFIED_CHECKPOINT => {
                    field_root(&state.current_justified_checkpoint)
                }
                field::FINALIZED_CHECKPOINT => field_root(&state.finalized_checkpoint),
                field::INACTIVITY_SCORES => field_root(&state.inactivity_scores),
                field::CURRENT_SYNC_COMMITTEE => field_root(&state.current_sync_committee),
                field::NEXT_SYNC_COMMITTEE => field_root(&state.next_sync_committee),
                _ => unreachable!(
                    "BeaconStateAltair has {} hashed fields",
                    field::NUM_FIELDS_ALTAIR
                ),
            },
        }
    }

    /// Recomputes only the field roots touched since the last call (via the `*_mut`/`set_*`
    /// setters marking their field dirty) and re-Merkleizes the field-root list, instead of
    /// rehashing the whole state from scratch.
    pub fn update_tree_hash_cache(&mut self) -> Result<Hash256, BeaconStateError> {
        let num_fields = self.num_tree_hash_fields();
        let mut cache = std::mem::take(&mut self.caches_mut().tree_hash_cache);
        let root = cache.recalculate_root(num_fields, |i| self.tree_hash_field_root(i));
        self.caches_mut().tree_hash_cache = cache;
        Ok(root)
    }

    pub fn canonical_root(&self) -> Hash256 {
        match self {
            BeaconState::Base(state) => state.tree_hash_root(),
            BeaconState::Altair(state) => state.tree_hash_root(),
        }
    }

    /// Selects the next sync committee's members the same way `get_beacon_proposer_index` selects
    /// a proposer: repeated-candidate shuffling over the active set, weighted by effective
    /// balance, run once per member slot.
    pub fn get_next_sync_committee(
        &self,
        spec: &ChainSpec,
    ) -> Result<SyncCommittee<E>, BeaconStateError> {
        let epoch = self
            .current_epoch()
            .safe_add(Epoch::new(1))?;
        let active_validator_indices = self.get_active_validator_indices(epoch, spec)?;
        if active_validator_indices.is_empty() {
            return Err(BeaconStateError::InsufficientValidators);
        }
        let seed = self.get_seed(epoch, Domain::SyncCommittee, spec)?;

        let mut pubkeys = Vec::with_capacity(E::sync_committee_size());
        let mut i = 0u64;
        while pubkeys.len() < E::sync_committee_size() {
            let shuffled_index = swap_or_not_shuffle::compute_shuffled_index(
                (i.checked_rem(active_validator_indices.len() as u64)
                    .ok_or(BeaconStateError::InsufficientValidators)?) as usize,
                active_validator_indices.len(),
                seed.as_slice(),
                spec.shuffle_round_count,
            )
            .ok_or(BeaconStateError::InsufficientValidators)?;
            let candidate_index = active_validator_indices[shuffled_index];

            let mut preimage = seed.as_slice().to_vec();
            preimage.extend_from_slice(&(i / 32).to_le_bytes());
            let random_byte = ethereum_hashing::hash(&preimage)[(i % 32) as usize] as u64;

            let validator = self
                .validators()
                .get(candidate_index)
                .ok_or(BeaconStateError::UnknownValidator(candidate_index))?;
            if validator
                .effective_balance
                .checked_mul(255)
                .ok_or(BeaconStateError::InsufficientValidators)?
                >= spec.max_effective_balance.checked_mul(random_byte).ok_or(
                    BeaconStateError::InsufficientValidators,
                )?
            {
                pubkeys.push(validator.pubkey.clone());
            }
            i = i
                .checked_add(1)
                .ok_or(BeaconStateError::InsufficientValidators)?;
        }

        let decompressed = pubkeys
            .iter()
            .map(|p| p.decompress())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| BeaconStateError::UnknownValidatorPubkey)?;
        let aggregate_pubkey = PublicKey::aggregate(&decompressed.iter().collect::<Vec<_>>())
            .map_err(|_| BeaconStateError::UnknownValidatorPubkey)?;

        Ok(SyncCommittee {
            pubkeys: FixedVector::new(pubkeys).map_err(BeaconStateError::SszTypesError)?,
            aggregate_pubkey: aggregate_pubkey.compress(),
        })
    }

    pub fn set_slot(&mut self, slot: Slot) {
        self.caches_mut().tree_hash_cache.mark_field_dirty(field::SLOT);
        match self {
            BeaconState::Base(state) => state.slot = slot,
            BeaconState::Altair(state) => state.slot = slot,
        }
    }

    pub fn is_altair(&self) -> bool {
        matches!(self, BeaconState::Altair(_))
    }

    pub fn current_epoch(&self) -> Epoch {
        self.slot().epoch(E::slots_per_epoch())
    }

    pub fn previous_epoch(&self) -> Epoch {
        let current_epoch = self.current_epoch();
        if current_epoch == E::genesis_epoch() {
            current_epoch
        } else {
            current_epoch.saturating_prev()
        }
    }

    pub fn next_epoch(&self) -> Result<Epoch, BeaconStateError> {
        Ok(self.current_epoch().safe_add(Epoch::new(1))?)
    }

    /// Validator indices active at `epoch`, in registry order. Committee shuffling always
    /// starts from this list.
    pub fn get_active_validator_indices(
        &self,
        epoch: Epoch,
        _spec: &ChainSpec,
    ) -> Result<Vec<usize>, BeaconStateError> {
        Ok(self
            .validators()
            .iter()
            .enumerate()
            .filter(|(_, validator)| validator.is_active_at(epoch))
            .map(|(index, _)| index)
            .collect())
    }

    fn randao_mix_index(&self, epoch: Epoch) -> Result<usize, BeaconStateError> {
        let len = E::epochs_per_historical_vector() as u64;
        epoch
            .as_u64()
            .checked_rem(len)
            .map(|i| i as usize)
            .ok_or(BeaconStateError::InsufficientRandaoMixes)
    }

    pub fn get_randao_mix(&self, epoch: Epoch) -> Result<Hash256, BeaconStateError> {
        let index = self.randao_mix_index(epoch)?;
        self.randao_mixes()
            .get(index)
            .copied()
            .ok_or(BeaconStateError::InsufficientRandaoMixes)
    }

    pub fn set_randao_mix(&mut self, epoch: Epoch, mix: Hash256) -> Result<(), BeaconStateError> {
        let index = self.randao_mix_index(epoch)?;
        self.caches_mut()
            .tree_hash_cache
            .mark_field_dirty(field::RANDAO_MIXES);
        match self {
            BeaconState::Base(state) => state
                .randao_mixes
                .get_mut(index)
                .map(|slot| *slot = mix),
            BeaconState::Altair(state) => state
                .randao_mixes
                .get_mut(index)
                .map(|slot| *slot = mix),
        }
        .ok_or(BeaconStateError::InsufficientRandaoMixes)
    }

    /// Mixes `domain`, `epoch`, and the RANDAO mix from `min_seed_lookahead` epochs back into a
    /// seed, the entropy source every shuffling (committees, proposer, sync committee) derives
    /// from.
    pub fn get_seed(
        &self,
        epoch: Epoch,
        domain_type: Domain,
        spec: &ChainSpec,
    ) -> Result<Hash256, BeaconStateError> {
        let mix_epoch = epoch
            .safe_add(Epoch::new(E::epochs_per_historical_vector() as u64))?
            .safe_sub(spec.min_seed_lookahead)?
            .safe_sub(Epoch::new(1))?;
        let mix = self.get_randao_mix(mix_epoch)?;

        let mut preimage = Vec::with_capacity(4 + 8 + 32);
        preimage.extend_from_slice(&domain_constant(domain_type, spec).to_le_bytes());
        preimage.extend_from_slice(&epoch.as_u64().to_le_bytes());
        preimage.extend_from_slice(mix.as_slice());

        Ok(Hash256::from_slice(&ethereum_hashing::hash(&preimage)))
    }

    pub fn get_committee_count_per_slot(
        &self,
        epoch: Epoch,
        spec: &ChainSpec,
    ) -> Result<u64, BeaconStateError> {
        Ok(self
            .committee_cache_at_epoch(epoch)?
            .committees_per_slot())
    }

    pub fn get_beacon_committee(
        &self,
        slot: Slot,
        index: u64,
        spec: &ChainSpec,
    ) -> Result<Committee, BeaconStateError> {
        let epoch = slot.epoch(E::slots_per_epoch());
        self.committee_cache_at_epoch(epoch)?
            .get_beacon_committee(slot, index)
            .ok_or(BeaconStateError::NoCommitteeFound { slot, index })
    }

    fn committee_cache_at_epoch(&self, epoch: Epoch) -> Result<&CommitteeCache, BeaconStateError> {
        let relative_epoch = RelativeEpoch::from_epoch(self.current_epoch(), epoch)?;
        self.caches()
            .committee_caches
            .get(relative_epoch_index(relative_epoch))
            .filter(|cache| cache.is_initialized_at(epoch))
            .ok_or(BeaconStateError::CommitteeCacheUninitialized(Some(
                relative_epoch,
            )))
    }

    /// Selects `slot`'s block proposer by repeated-candidate shuffling over the active validator
    /// set weighted by effective balance, the same procedure `compute_proposer_index` runs for
    /// sync-committee and aggregator selection.
    pub fn get_beacon_proposer_index(
        &self,
        slot: Slot,
        spec: &ChainSpec,
    ) -> Result<usize, BeaconStateError> {
        let epoch = slot.epoch(E::slots_per_epoch());
        let seed = {
            let mut preimage = self.get_seed(epoch, Domain::BeaconProposer, spec)?.0.to_vec();
            preimage.extend_from_slice(&slot.as_u64().to_le_bytes());
            Hash256::from_slice(&ethereum_hashing::hash(&preimage))
        };

        let indices = self.get_active_validator_indices(epoch, spec)?;
        if indices.is_empty() {
            return Err(BeaconStateError::InsufficientValidators);
        }

        compute_proposer_index(self.validators(), &indices, seed.as_slice(), spec)
            .ok_or(BeaconStateError::InsufficientValidators)
    }

    pub fn caches(&self) -> &BeaconStateCaches {
        match self {
            BeaconState::Base(state) => &state.caches,
            BeaconState::Altair(state) => &state.caches,
        }
    }

    pub fn caches_mut(&mut self) -> &mut BeaconStateCaches {
        match self {
            BeaconState::Base(state) => &mut state.caches,
            BeaconState::Altair(state) => &mut state.caches,
        }
    }

    /// Builds (or rebuilds, if stale) the committee shuffling cache for `relative_epoch`.
    pub fn build_committee_cache(
        &mut self,
        relative_epoch: RelativeEpoch,
        spec: &ChainSpec,
    ) -> Result<(), BeaconStateError> {
        let epoch = relative_epoch.into_epoch(self.current_epoch());
        if self.caches().committee_caches[relative_epoch_index(relative_epoch)]
            .is_initialized_at(epoch)
        {
            return Ok(());
        }
        let cache = CommitteeCache::initialized(self, epoch, spec)?;
        self.caches_mut().committee_caches[relative_epoch_index(relative_epoch)] = cache;
        Ok(())
    }

    pub fn build_all_committee_caches(&mut self, spec: &ChainSpec) -> Result<(), BeaconStateError> {
        for relative_epoch in [
            RelativeEpoch::Previous,
            RelativeEpoch::Current,
            RelativeEpoch::Next,
        ] {
            self.build_committee_cache(relative_epoch, spec)?;
        }
        Ok(())
    }

    pub fn update_pubkey_cache(&mut self) -> Result<(), BeaconStateError> {
        let validators = self.validators().to_vec();
        self.caches_mut().pubkey_cache.import(&validators)
    }

    pub fn get_validator_index(&self, pubkey: &PublicKeyBytes) -> Option<usize> {
        self.caches().pubkey_cache.get(pubkey)
    }

    pub fn build_exit_cache(&mut self, spec: &ChainSpec) {
        let cache = ExitCache::new(self.validators().iter(), spec);
        self.caches_mut().exit_cache = cache;
    }
}

fn relative_epoch_index(relative_epoch: RelativeEpoch) -> usize {
    match relative_epoch {
        RelativeEpoch::Previous => 0,
        RelativeEpoch::Current => 1,
        RelativeEpoch::Next => 2,
    }
}

fn domain_constant(domain: Domain, spec: &ChainSpec) -> u32 {
    match domain {
        Domain::BeaconProposer => spec.domain_beacon_proposer,
        Domain::BeaconAttester => spec.domain_beacon_attester,
        Domain::Randao => spec.domain_randao,
        Domain::Deposit => spec.domain_deposit,
        Domain::VoluntaryExit => spec.domain_voluntary_exit,
        Domain::SelectionProof => spec.domain_selection_proof,
        Domain::AggregateAndProof => spec.domain_aggregate_and_proof,
        Domain::SyncCommittee => spec.domain_sync_committee,
        Domain::SyncCommitteeSelectionProof => spec.domain_sync_committee_selection_proof,
        Domain::ContributionAndProof => spec.domain_contribution_and_proof,
    }
}

/// `compute_proposer_index`: repeatedly draws a candidate from `indices` via swap-or-not
/// shuffling of a running counter and accepts it with probability proportional to its effective
/// balance, capped at `max_effective_balance` so no validator needs more than 2 expected draws.
pub fn compute_proposer_index(
    validators: &[Validator],
    indices: &[usize],
    seed: &[u8],
    spec: &ChainSpec,
) -> Option<usize> {
    const MAX_RANDOM_BYTE: u64 = 255;
    let mut i = 0u64;
    loop {
        let candidate_index = indices[swap_or_not_shuffle::compute_shuffled_index(
            (i.checked_rem(indices.len() as u64)?) as usize,
            indices.len(),
            seed,
            spec.shuffle_round_count,
        )?];

        let mut preimage = seed.to_vec();
        preimage.extend_from_slice(&(i / 32).to_le_bytes());
        let random_byte = ethereum_hashing::hash(&preimage)[(i % 32) as usize] as u64;

        let effective_balance = validators.get(candidate_index)?.effective_balance;
        if effective_balance.checked_mul(MAX_RANDOM_BYTE)?
            >= spec.max_effective_balance.checked_mul(random_byte)?
        {
            return Some(candidate_index);
        }
        i = i.checked_add(1)?;
    }
}

pub mod test_helpers {
    //! Fork-aware constructors used by genesis/test fixtures, kept out of the main `impl` block
    //! so the accessor list above stays focused on read/write paths.
    use super::*;

    pub fn empty_base<E: EthSpec>(spec: &ChainSpec) -> BeaconStateBase<E> {
        BeaconStateBase {
            genesis_time: 0,
            genesis_validators_root: Hash256::zero(),
            slot: spec.genesis_slot,
            fork: Fork {
                previous_version: spec.genesis_fork_version,
                current_version: spec.genesis_fork_version,
                epoch: Epoch::new(0),
            },
            latest_block_header: BeaconBlockHeader::default(),
            block_roots: FixedVector::default(),
            state_roots: FixedVector::default(),
            historical_roots: VariableList::empty(),
            eth1_data: Eth1Data::default(),
            eth1_data_votes: VariableList::empty(),
            eth1_deposit_index: 0,
            validators: VariableList::empty(),
            balances: VariableList::empty(),
            randao_mixes: FixedVector::default(),
            slashings: FixedVector::default(),
            previous_epoch_attestations: VariableList::empty(),
            current_epoch_attestations: VariableList::empty(),
            justification_bits: BitVector::default(),
            previous_justified_checkpoint: Checkpoint::default(),
            current_justified_checkpoint: Checkpoint::default(),
            finalized_checkpoint: Checkpoint::default(),
            caches: BeaconStateCaches::default(),
        }
    }
}
