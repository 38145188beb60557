//! Altair epoch accounting: attestation participation is read straight off the
//! `{previous,current}_epoch_participation` flag bytes recorded during block processing, instead
//! of being recomputed from `PendingAttestation`s.
use super::EpochProcessingError as Error;
use crate::common::{decrease_balance, get_total_active_balance, increase_balance};
use safe_arith::SafeArith;
use std::cmp::min;
use types::consts::altair::{
    NUM_FLAG_INDICES, PARTICIPATION_FLAG_WEIGHTS, TIMELY_HEAD_FLAG_INDEX, TIMELY_TARGET_FLAG_INDEX,
    WEIGHT_DENOMINATOR,
};
use types::{BeaconState, ChainSpec, Epoch, EthSpec, ParticipationFlags};

/// `true` for every validator index that is a reward/penalty candidate this epoch: active in the
/// previous epoch, or slashed but not yet past its withdrawable epoch.
fn is_eligible_validator<E: EthSpec>(state: &BeaconState<E>, index: usize) -> Result<bool, Error> {
    let previous_epoch = state.previous_epoch();
    let validator = state
        .validators()
        .get(index)
        .ok_or(types::BeaconStateError::UnknownValidator(index))?;
    Ok(validator.is_active_at(previous_epoch)
        || (validator.slashed && previous_epoch.safe_add(1)? < validator.withdrawable_epoch))
}

fn participation_at<E: EthSpec>(
    state: &BeaconState<E>,
    epoch: Epoch,
    index: usize,
) -> Result<ParticipationFlags, Error> {
    let list = if epoch == state.current_epoch() {
        state.current_epoch_participation()?
    } else {
        state.previous_epoch_participation()?
    };
    let byte = list
        .get(index)
        .copied()
        .ok_or(types::BeaconStateError::UnknownValidator(index))?;
    Ok(ParticipationFlags::from_u8(byte))
}

/// The total effective balance of every unslashed validator whose `epoch` participation has
/// `flag_index` set.
pub fn get_flag_attesting_balance<E: EthSpec>(
    state: &BeaconState<E>,
    flag_index: usize,
    epoch: Epoch,
    spec: &ChainSpec,
) -> Result<u64, Error> {
    let mut indices = Vec::new();
    for index in 0..state.validators().len() {
        let validator = &state.validators()[index];
        if validator.slashed {
            continue;
        }
        if participation_at(state, epoch, index)?.has_flag(flag_index)? {
            indices.push(index);
        }
    }
    Ok(crate::common::get_total_balance(state, indices, spec)?)
}

pub fn process_justification_and_finalization<E: EthSpec>(
    state: &mut BeaconState<E>,
    spec: &ChainSpec,
) -> Result<(), Error> {
    if state.current_epoch() <= E::genesis_epoch().safe_add(1)? {
        return Ok(());
    }

    let previous_epoch = state.previous_epoch();
    let current_epoch = state.current_epoch();

    let previous_target_balance =
        get_flag_attesting_balance(state, TIMELY_TARGET_FLAG_INDEX, previous_epoch, spec)?;
    let current_target_balance =
        get_flag_attesting_balance(state, TIMELY_TARGET_FLAG_INDEX, current_epoch, spec)?;
    let previous_active_balance = get_total_active_balance(state, previous_epoch, spec)?;
    let current_active_balance = get_total_active_balance(state, current_epoch, spec)?;

    super::justification_and_finalization::weigh_justification_and_finalization(
        state,
        previous_active_balance,
        previous_target_balance,
        current_active_balance,
        current_target_balance,
    )
}

pub fn process_inactivity_updates<E: EthSpec>(
    state: &mut BeaconState<E>,
    spec: &ChainSpec,
) -> Result<(), Error> {
    let previous_epoch = state.previous_epoch();
    let finalized_epoch = state.finalized_checkpoint().epoch;
    let is_in_inactivity_leak =
        previous_epoch.safe_sub(finalized_epoch)? > spec.min_epochs_to_inactivity_penalty;

    for index in 0..state.validators().len() {
        if !is_eligible_validator(state, index)? {
            continue;
        }
        let is_timely_target = participation_at(state, previous_epoch, index)?
            .has_flag(TIMELY_TARGET_FLAG_INDEX)?;

        let scores = state.inactivity_scores_mut()?;
        let score = scores
            .get_mut(index)
            .ok_or(types::BeaconStateError::UnknownValidator(index))?;

        if is_timely_target {
            score.safe_sub_assign(min(1, *score))?;
        } else {
            score.safe_add_assign(spec.inactivity_score_bias)?;
        }
        if !is_in_inactivity_leak {
            let deduction = min(spec.inactivity_score_recovery_rate, *score);
            score.safe_sub_assign(deduction)?;
        }
    }
    Ok(())
}

pub fn process_rewards_and_penalties<E: EthSpec>(
    state: &mut BeaconState<E>,
    spec: &ChainSpec,
) -> Result<(), Error> {
    if state.current_epoch() == E::genesis_epoch() {
        return Ok(());
    }

    let previous_epoch = state.previous_epoch();
    let finalized_epoch = state.finalized_checkpoint().epoch;
    let is_in_inactivity_leak =
        previous_epoch.safe_sub(finalized_epoch)? > spec.min_epochs_to_inactivity_penalty;
    let total_active_balance = get_total_active_balance(state, previous_epoch, spec)?;
    let active_increments = total_active_balance.safe_div(spec.effective_balance_increment)?;

    let mut flag_increments = [0u64; NUM_FLAG_INDICES];
    for (flag_index, increments) in flag_increments.iter_mut().enumerate() {
        let balance = get_flag_attesting_balance(state, flag_index, previous_epoch, spec)?;
        *increments = balance.safe_div(spec.effective_balance_increment)?;
    }

    for index in 0..state.validators().len() {
        if !is_eligible_validator(state, index)? {
            continue;
        }

        let effective_balance = state.validators()[index].effective_balance;
        let base_reward = effective_balance
            .safe_div(spec.effective_balance_increment)?
            .safe_mul(spec.base_reward_factor)?
            .safe_div(
                (total_active_balance.integer_sqrt_or_one())
                    .safe_mul(spec.base_rewards_per_epoch)?,
            )?;

        let slashed = state.validators()[index].slashed;
        let mut reward = 0u64;
        let mut penalty = 0u64;

        for flag_index in 0..NUM_FLAG_INDICES {
            let weight = PARTICIPATION_FLAG_WEIGHTS[flag_index];
            let is_unslashed_participating =
                !slashed && participation_at(state, previous_epoch, index)?.has_flag(flag_index)?;

            if is_unslashed_participating {
                if !is_in_inactivity_leak {
                    let numerator = base_reward.safe_mul(weight)?.safe_mul(flag_increments[flag_index])?;
                    reward.safe_add_assign(
                        numerator.safe_div(active_increments.safe_mul(WEIGHT_DENOMINATOR)?)?,
                    )?;
                }
            } else if flag_index != TIMELY_HEAD_FLAG_INDEX {
                penalty.safe_add_assign(base_reward.safe_mul(weight)?.safe_div(WEIGHT_DENOMINATOR)?)?;
            }
        }

        if !is_eligible_for_inactivity_penalty(state, previous_epoch, index)? {
            // Still accrues the flag-based reward/penalty above; inactivity penalty added below.
        } else {
            let inactivity_score = state.inactivity_scores()?[index];
            let penalty_numerator = effective_balance.safe_mul(inactivity_score)?;
            let penalty_denominator = spec
                .inactivity_score_bias
                .safe_mul(spec.inactivity_penalty_quotient_altair)?;
            penalty.safe_add_assign(penalty_numerator.safe_div(penalty_denominator)?)?;
        }

        if reward != 0 {
            increase_balance(state, index, reward)?;
        }
        if penalty != 0 {
            decrease_balance(state, index, penalty)?;
        }
    }
    Ok(())
}

fn is_eligible_for_inactivity_penalty<E: EthSpec>(
    state: &BeaconState<E>,
    previous_epoch: Epoch,
    index: usize,
) -> Result<bool, Error> {
    Ok(!participation_at(state, previous_epoch, index)?.has_flag(TIMELY_TARGET_FLAG_INDEX)?)
}

/// Rotates `current_epoch_participation` into `previous_epoch_participation` and zeroes the new
/// current-epoch bytes, ready for the epoch about to begin.
pub fn process_participation_flag_updates<E: EthSpec>(state: &mut BeaconState<E>) -> Result<(), Error> {
    let current = state.current_epoch_participation()?.to_vec();
    *state.previous_epoch_participation_mut()? = current.into();
    let len = state.current_epoch_participation()?.len();
    *state.current_epoch_participation_mut()? = vec![0u8; len].into();
    Ok(())
}

/// Rotates `next_sync_committee` into `current_sync_committee` at each sync committee period
/// boundary, computing the new `next_sync_committee` from the post-transition validator set.
pub fn process_sync_committee_updates<E: EthSpec>(
    state: &mut BeaconState<E>,
    spec: &ChainSpec,
) -> Result<(), Error> {
    let next_epoch = state.next_epoch()?;
    if next_epoch.safe_rem(spec.epochs_per_sync_committee_period.as_u64())? != 0 {
        return Ok(());
    }
    let next_sync_committee = state.get_next_sync_committee(spec)?;
    *state.current_sync_committee_mut()? = state.next_sync_committee()?.clone();
    *state.next_sync_committee_mut()? = next_sync_committee;
    Ok(())
}

trait IntegerSqrtOrOne {
    fn integer_sqrt_or_one(self) -> u64;
}

impl IntegerSqrtOrOne for u64 {
    fn integer_sqrt_or_one(self) -> u64 {
        use integer_sqrt::IntegerSquareRoot;
        std::cmp::max(self.integer_sqrt(), 1)
    }
}

