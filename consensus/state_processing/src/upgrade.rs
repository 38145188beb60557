//! Fork transitions: rebuilding a `BeaconState` in the next fork's shape at the boundary epoch.
//! Base -> Altair is the only such transition in scope; later forks each added their own payload
//! shape and are out of scope.
use types::{BeaconState, BeaconStateAltair, ChainSpec, EthSpec, Fork};

/// Rewrites `state` from the `Base` variant into `Altair` in place. Every validator's
/// `PendingAttestation` history carries no forward meaning once participation flags exist, so it
/// is simply dropped; each validator starts Altair with a zeroed participation byte and
/// inactivity score. Both sync committees are then filled in by calling `get_next_sync_committee`
/// twice against the upgraded state, which deterministically returns the same committee both
/// times since there is no prior sync period to distinguish "current" from "next" at the
/// boundary.
pub fn upgrade_to_altair<E: EthSpec>(
    state: &mut BeaconState<E>,
    spec: &ChainSpec,
) -> Result<(), crate::per_slot_processing::Error> {
    let base = state.as_base()?.clone();
    let num_validators = base.validators.len();
    let current_epoch = state.current_epoch();

    let placeholder_committee = state.get_next_sync_committee(spec)?;

    *state = BeaconState::Altair(BeaconStateAltair {
        genesis_time: base.genesis_time,
        genesis_validators_root: base.genesis_validators_root,
        slot: base.slot,
        fork: Fork {
            previous_version: base.fork.current_version,
            current_version: spec.altair_fork_version,
            epoch: current_epoch,
        },
        latest_block_header: base.latest_block_header,
        block_roots: base.block_roots,
        state_roots: base.state_roots,
        historical_roots: base.historical_roots,
        eth1_data: base.eth1_data,
        eth1_data_votes: base.eth1_data_votes,
        eth1_deposit_index: base.eth1_deposit_index,
        validators: base.validators,
        balances: base.balances,
        randao_mixes: base.randao_mixes,
        slashings: base.slashings,
        previous_epoch_participation: vec![0u8; num_validators].into(),
        current_epoch_participation: vec![0u8; num_validators].into(),
        justification_bits: base.justification_bits,
        previous_justified_checkpoint: base.previous_justified_checkpoint,
        current_justified_checkpoint: base.current_justified_checkpoint,
        finalized_checkpoint: base.finalized_checkpoint,
        inactivity_scores: vec![0u64; num_validators].into(),
        current_sync_committee: placeholder_committee.clone(),
        next_sync_committee: placeholder_committee,
        caches: base.caches,
    });

    let current_sync_committee = state.get_next_sync_committee(spec)?;
    let next_sync_committee = state.get_next_sync_committee(spec)?;
    *state.current_sync_committee_mut()? = current_sync_committee;
    *state.next_sync_committee_mut()? = next_sync_committee;

    Ok(())
}
