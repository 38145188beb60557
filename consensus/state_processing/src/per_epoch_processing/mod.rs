//! Runs once a slot boundary crosses into a new epoch: tallies the previous epoch's attestations,
//! updates justification/finalization, pays rewards and penalties, rotates the validator registry,
//! applies slashing penalties, and resets the per-epoch bookkeeping for the epoch about to start.
//!
//! `process_epoch` follows the Base/Altair ordering: attestation matching is folded into
//! justification/finalization and rewards/penalties (each fork computes "who matched what"
//! differently), then registry updates, then slashings, then the final per-epoch resets.
pub mod altair;
pub mod base;
pub mod effective_balance_updates;
pub mod final_updates;
pub mod justification_and_finalization;
pub mod registry_updates;
pub mod slashings;

use safe_arith::ArithError;
use tracing::instrument;
use types::{BeaconStateError, EthSpec};

#[derive(Debug, PartialEq, Clone)]
pub enum EpochProcessingError {
    BeaconStateError(BeaconStateError),
    SszTypesError(ssz_types::Error),
    ArithError(ArithError),
    InvalidFlagIndex(usize),
    ValidatorStatusesInconsistent,
}

impl From<BeaconStateError> for EpochProcessingError {
    fn from(e: BeaconStateError) -> Self {
        EpochProcessingError::BeaconStateError(e)
    }
}

impl From<ssz_types::Error> for EpochProcessingError {
    fn from(e: ssz_types::Error) -> Self {
        EpochProcessingError::SszTypesError(e)
    }
}

impl From<ArithError> for EpochProcessingError {
    fn from(e: ArithError) -> Self {
        EpochProcessingError::ArithError(e)
    }
}

impl From<types::InvalidFlagIndex> for EpochProcessingError {
    fn from(e: types::InvalidFlagIndex) -> Self {
        EpochProcessingError::InvalidFlagIndex(e.0)
    }
}

/// The quantities a caller (block replay, metrics, tests) might want out of an epoch transition
/// without recomputing them: the matching balances used for justification, and each validator's
/// accumulated participation flags.
#[derive(Debug, PartialEq, Clone)]
pub struct EpochProcessingSummary<E: EthSpec> {
    pub previous_epoch_total_active_balance: u64,
    pub current_epoch_total_active_balance: u64,
    pub previous_epoch_target_attesting_balance: u64,
    pub current_epoch_target_attesting_balance: u64,
    _phantom: std::marker::PhantomData<E>,
}

/// Advances `state` through one full epoch transition. `state.slot()` must be the last slot of
/// the epoch being closed out; the caller (`per_slot_processing`) increments the slot afterward.
#[instrument(level = "debug", skip_all)]
pub fn per_epoch_processing<E: EthSpec>(
    state: &mut types::BeaconState<E>,
    spec: &types::ChainSpec,
) -> Result<EpochProcessingSummary<E>, EpochProcessingError> {
    state.build_committee_cache(types::RelativeEpoch::Previous, spec)?;
    state.build_committee_cache(types::RelativeEpoch::Current, spec)?;
    state.build_exit_cache(spec)?;

    let is_altair = state.is_altair();

    justification_and_finalization::process_justification_and_finalization(state, spec)?;

    if is_altair {
        altair::process_inactivity_updates(state, spec)?;
        altair::process_rewards_and_penalties(state, spec)?;
    } else {
        base::process_rewards_and_penalties(state, spec)?;
    }

    registry_updates::process_registry_updates(state, spec)?;
    slashings::process_slashings(state, spec)?;
    final_updates::process_final_updates(state, spec)?;

    let previous_epoch = state.previous_epoch();
    let current_epoch = state.current_epoch();
    let previous_epoch_total_active_balance =
        crate::common::get_total_active_balance(state, previous_epoch, spec)?;
    let current_epoch_total_active_balance =
        crate::common::get_total_active_balance(state, current_epoch, spec)?;
    let (previous_epoch_target_attesting_balance, current_epoch_target_attesting_balance) =
        if is_altair {
            (
                altair::get_flag_attesting_balance(
                    state,
                    types::consts::altair::TIMELY_TARGET_FLAG_INDEX,
                    previous_epoch,
                    spec,
                )?,
                altair::get_flag_attesting_balance(
                    state,
                    types::consts::altair::TIMELY_TARGET_FLAG_INDEX,
                    current_epoch,
                    spec,
                )?,
            )
        } else {
            (
                base::get_attesting_balance(
                    state,
                    &base::get_matching_target_attestations(state, previous_epoch)?,
                    spec,
                )?,
                0,
            )
        };

    Ok(EpochProcessingSummary {
        previous_epoch_total_active_balance,
        current_epoch_total_active_balance,
        previous_epoch_target_attesting_balance,
        current_epoch_target_attesting_balance,
        _phantom: std::marker::PhantomData,
    })
}
