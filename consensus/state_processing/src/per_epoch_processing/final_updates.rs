//! The housekeeping every epoch performs regardless of fork: rotate the eth1 vote window, clear
//! next epoch's slashings slot, carry the RANDAO mix forward, archive a historical batch root
//! when the window closes, and hand off to the fork-specific attestation/participation rotation.
use super::EpochProcessingError as Error;
use safe_arith::SafeArith;
use tree_hash::TreeHash;
use types::typenum::Unsigned;
use types::{BeaconState, ChainSpec, EthSpec, HistoricalBatch, VariableList};

pub fn process_final_updates<E: EthSpec>(
    state: &mut BeaconState<E>,
    spec: &ChainSpec,
) -> Result<(), Error> {
    let current_epoch = state.current_epoch();
    let next_epoch = state.next_epoch()?;

    if state
        .slot()
        .safe_add(1)?
        .safe_rem(E::SlotsPerEth1VotingPeriod::to_u64())?
        == 0
    {
        *state.eth1_data_votes_mut() = VariableList::empty();
    }

    crate::per_epoch_processing::effective_balance_updates::process_effective_balance_updates(
        state, spec,
    )?;

    let slashings_index = next_epoch
        .as_u64()
        .safe_rem(E::EpochsPerSlashingsVector::to_u64())? as usize;
    state.slashings_mut()
        .get_mut(slashings_index)
        .map(|s| *s = 0)
        .ok_or(types::BeaconStateError::UnknownValidator(slashings_index))?;

    let randao_mix = state.get_randao_mix(current_epoch)?;
    state.set_randao_mix(next_epoch, randao_mix)?;

    let epochs_per_historical_root = E::SlotsPerHistoricalRoot::to_u64().safe_div(E::slots_per_epoch())?;
    if next_epoch.as_u64().safe_rem(epochs_per_historical_root)? == 0 {
        let historical_batch = HistoricalBatch::<E> {
            block_roots: state.block_roots().clone(),
            state_roots: state.state_roots().clone(),
        };
        let root = historical_batch.tree_hash_root();
        state
            .historical_roots_mut()
            .push(root)
            .map_err(types::BeaconStateError::from)?;
    }

    if state.is_altair() {
        crate::per_epoch_processing::altair::process_participation_flag_updates(state)?;
        crate::per_epoch_processing::altair::process_sync_committee_updates(state, spec)?;
    } else {
        let current = state.as_base()?.current_epoch_attestations.to_vec();
        *state.previous_epoch_attestations_mut()? = current.into();
        *state.current_epoch_attestations_mut()? = VariableList::empty();
    }

    Ok(())
}
