//! The Casper FFG bookkeeping shared by Base and Altair: each fork tallies "who attested to the
//! target checkpoint" its own way (`base` from `PendingAttestation`s, `altair` from participation
//! flags) but both feed the same four balances into the same bit-shifting finalization rule.
use super::EpochProcessingError as Error;
use safe_arith::SafeArith;
use types::{BeaconState, Checkpoint, EthSpec};

pub fn process_justification_and_finalization<E: EthSpec>(
    state: &mut BeaconState<E>,
    spec: &types::ChainSpec,
) -> Result<(), Error> {
    if state.is_altair() {
        super::altair::process_justification_and_finalization(state, spec)
    } else {
        super::base::process_justification_and_finalization(state, spec)
    }
}

/// Shifts `justification_bits` in, marks the current/previous epoch justified if two-thirds of
/// active stake attested to its target, and finalizes whichever checkpoint the resulting bit
/// pattern satisfies one of the four Casper FFG finality rules for.
pub fn weigh_justification_and_finalization<E: EthSpec>(
    state: &mut BeaconState<E>,
    previous_active_balance: u64,
    previous_target_balance: u64,
    current_active_balance: u64,
    current_target_balance: u64,
) -> Result<(), Error> {
    let previous_epoch = state.previous_epoch();
    let current_epoch = state.current_epoch();

    let old_previous_justified_checkpoint = *state.previous_justified_checkpoint();
    let old_current_justified_checkpoint = *state.current_justified_checkpoint();

    // Rotate the bit field and clear the newest bit.
    let mut bits = state.justification_bits().clone();
    for i in (1..4).rev() {
        let prior = bits.get(i - 1).map_err(types::BeaconStateError::from)?;
        bits.set(i, prior).map_err(types::BeaconStateError::from)?;
    }
    bits.set(0, false).map_err(types::BeaconStateError::from)?;

    *state.previous_justified_checkpoint_mut() = old_current_justified_checkpoint;

    if previous_target_balance.safe_mul(3)? >= previous_active_balance.safe_mul(2)? {
        *state.current_justified_checkpoint_mut() = Checkpoint {
            epoch: previous_epoch,
            root: state.get_block_root_at_epoch(previous_epoch)?,
        };
        bits.set(1, true).map_err(types::BeaconStateError::from)?;
    }

    if current_target_balance.safe_mul(3)? >= current_active_balance.safe_mul(2)? {
        *state.current_justified_checkpoint_mut() = Checkpoint {
            epoch: current_epoch,
            root: state.get_block_root_at_epoch(current_epoch)?,
        };
        bits.set(0, true).map_err(types::BeaconStateError::from)?;
    }

    *state.justification_bits_mut() = bits.clone();

    // The four finalization rules, checked against the pre-rotation checkpoints.
    if bits.get(1).unwrap_or(false)
        && bits.get(2).unwrap_or(false)
        && bits.get(3).unwrap_or(false)
        && old_previous_justified_checkpoint.epoch.safe_add(3)? == current_epoch
    {
        *state.finalized_checkpoint_mut() = old_previous_justified_checkpoint;
    }
    if bits.get(1).unwrap_or(false)
        && bits.get(2).unwrap_or(false)
        && old_previous_justified_checkpoint.epoch.safe_add(2)? == current_epoch
    {
        *state.finalized_checkpoint_mut() = old_previous_justified_checkpoint;
    }
    if bits.get(0).unwrap_or(false)
        && bits.get(1).unwrap_or(false)
        && bits.get(2).unwrap_or(false)
        && old_current_justified_checkpoint.epoch.safe_add(2)? == current_epoch
    {
        *state.finalized_checkpoint_mut() = old_current_justified_checkpoint;
    }
    if bits.get(0).unwrap_or(false)
        && bits.get(1).unwrap_or(false)
        && old_current_justified_checkpoint.epoch.safe_add(1)? == current_epoch
    {
        *state.finalized_checkpoint_mut() = old_current_justified_checkpoint;
    }

    Ok(())
}
