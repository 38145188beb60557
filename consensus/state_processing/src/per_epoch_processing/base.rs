//! Pre-Altair epoch accounting: everything is derived from the `PendingAttestation`s a block
//! proposer recorded in `{previous,current}_epoch_attestations`, rather than from participation
//! flag bits.
use super::EpochProcessingError as Error;
use crate::common::{decrease_balance, get_attesting_indices, increase_balance};
use safe_arith::SafeArith;
use std::collections::{BTreeSet, HashSet};
use types::{BeaconState, ChainSpec, Epoch, EthSpec, PendingAttestation};

/// Attestations from `epoch` whose source checkpoint matches the state's justified checkpoint
/// for that epoch — the set everything else (target-matching, head-matching) is drawn from.
pub fn get_matching_source_attestations<E: EthSpec>(
    state: &BeaconState<E>,
    epoch: Epoch,
) -> Result<Vec<PendingAttestation<E>>, Error> {
    let base = state.as_base()?;
    let attestations = if epoch == state.current_epoch() {
        &base.current_epoch_attestations
    } else if epoch == state.previous_epoch() {
        &base.previous_epoch_attestations
    } else {
        return Err(Error::ValidatorStatusesInconsistent);
    };
    Ok(attestations.to_vec())
}

pub fn get_matching_target_attestations<E: EthSpec>(
    state: &BeaconState<E>,
    epoch: Epoch,
) -> Result<Vec<PendingAttestation<E>>, Error> {
    let target_root = state.get_block_root_at_epoch(epoch)?;
    Ok(get_matching_source_attestations(state, epoch)?
        .into_iter()
        .filter(|a| a.data.target.root == target_root)
        .collect())
}

pub fn get_matching_head_attestations<E: EthSpec>(
    state: &BeaconState<E>,
    epoch: Epoch,
) -> Result<Vec<PendingAttestation<E>>, Error> {
    Ok(get_matching_target_attestations(state, epoch)?
        .into_iter()
        .filter_map(|a| {
            let matches = state.get_block_root(a.data.slot).ok() == Some(a.data.beacon_block_root);
            matches.then_some(a)
        })
        .collect())
}

/// The total effective balance of every distinct validator behind any attestation in the set.
pub fn get_attesting_balance<E: EthSpec>(
    state: &BeaconState<E>,
    attestations: &[PendingAttestation<E>],
    spec: &ChainSpec,
) -> Result<u64, Error> {
    let mut indices = BTreeSet::new();
    for attestation in attestations {
        for index in get_attesting_indices(state, &attestation.data, &attestation.aggregation_bits, spec)? {
            indices.insert(index as usize);
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

    let previous_target_balance = get_attesting_balance(
        state,
        &get_matching_target_attestations(state, previous_epoch)?,
        spec,
    )?;
    let current_target_balance = get_attesting_balance(
        state,
        &get_matching_target_attestations(state, current_epoch)?,
        spec,
    )?;
    let previous_active_balance =
        crate::common::get_total_active_balance(state, previous_epoch, spec)?;
    let current_active_balance =
        crate::common::get_total_active_balance(state, current_epoch, spec)?;

    super::justification_and_finalization::weigh_justification_and_finalization(
        state,
        previous_active_balance,
        previous_target_balance,
        current_active_balance,
        current_target_balance,
    )
    .map_err(Error::from)
}

fn unslashed_attesting_indices<E: EthSpec>(
    state: &BeaconState<E>,
    attestations: &[PendingAttestation<E>],
    spec: &ChainSpec,
) -> Result<BTreeSet<usize>, Error> {
    let mut indices = BTreeSet::new();
    for attestation in attestations {
        for index in get_attesting_indices(state, &attestation.data, &attestation.aggregation_bits, spec)? {
            let index = index as usize;
            if !state.validators()[index].slashed {
                indices.insert(index);
            }
        }
    }
    Ok(indices)
}

fn base_reward<E: EthSpec>(
    state: &BeaconState<E>,
    index: usize,
    total_active_balance: u64,
    spec: &ChainSpec,
) -> Result<u64, Error> {
    use integer_sqrt::IntegerSquareRoot;
    let effective_balance = state.validators()[index].effective_balance;
    let total_balance_sqrt = std::cmp::max(total_active_balance.integer_sqrt(), 1);
    Ok(effective_balance
        .safe_div(spec.effective_balance_increment)?
        .safe_mul(spec.base_reward_factor)?
        .safe_div(total_balance_sqrt.safe_mul(spec.base_rewards_per_epoch)?)?)
}

/// The classic phase0 `get_attestation_deltas`: rewards/penalties for source-, target- and
/// head-matching plus an inclusion-delay bonus for the proposer and attester, and a standalone
/// inactivity-leak penalty for anyone who missed the target.
pub fn process_rewards_and_penalties<E: EthSpec>(
    state: &mut BeaconState<E>,
    spec: &ChainSpec,
) -> Result<(), Error> {
    let previous_epoch = state.previous_epoch();
    if state.current_epoch() == E::genesis_epoch() {
        return Ok(());
    }

    let total_active_balance = crate::common::get_total_active_balance(state, previous_epoch, spec)?;
    let finalized_epoch = state.finalized_checkpoint().epoch;
    let finality_delay = previous_epoch.as_u64().saturating_sub(finalized_epoch.as_u64());
    let is_in_inactivity_leak = finality_delay > spec.min_epochs_to_inactivity_penalty;

    let eligible: Vec<usize> = (0..state.validators().len())
        .filter(|&index| {
            let v = &state.validators()[index];
            v.is_active_at(previous_epoch)
                || (v.slashed
                    && previous_epoch
                        .safe_add(1)
                        .map(|e| e < v.withdrawable_epoch)
                        .unwrap_or(false))
        })
        .collect();

    let matching_source = get_matching_source_attestations(state, previous_epoch)?;
    let matching_target = get_matching_target_attestations(state, previous_epoch)?;
    let matching_head = get_matching_head_attestations(state, previous_epoch)?;

    let mut rewards = vec![0u64; state.validators().len()];
    let mut penalties = vec![0u64; state.validators().len()];

    for attestations in [&matching_source, &matching_target, &matching_head] {
        let attesters = unslashed_attesting_indices(state, attestations, spec)?;
        let attesting_balance = crate::common::get_total_balance(state, attesters.iter().copied(), spec)?;
        for &index in &eligible {
            let reward = base_reward(state, index, total_active_balance, spec)?;
            if attesters.contains(&index) {
                if !is_in_inactivity_leak {
                    let numerator = reward.safe_mul(attesting_balance.safe_div(spec.effective_balance_increment)?)?;
                    rewards[index].safe_add_assign(
                        numerator.safe_div(total_active_balance.safe_div(spec.effective_balance_increment)?)?,
                    )?;
                } else {
                    rewards[index].safe_add_assign(reward)?;
                }
            } else {
                penalties[index].safe_add_assign(reward)?;
            }
        }
    }

    let source_attesters = unslashed_attesting_indices(state, &matching_source, spec)?;
    for &index in &source_attesters {
        let attestation = matching_source
            .iter()
            .filter(|a| {
                get_attesting_indices(state, &a.data, &a.aggregation_bits, spec)
                    .map(|idxs| idxs.contains(&(index as u64)))
                    .unwrap_or(false)
            })
            .min_by_key(|a| a.inclusion_delay)
            .ok_or(Error::ValidatorStatusesInconsistent)?;

        let reward = base_reward(state, index, total_active_balance, spec)?;
        let proposer_reward = reward.safe_div(spec.proposer_reward_quotient)?;
        rewards[attestation.proposer_index as usize].safe_add_assign(proposer_reward)?;
        let max_attester_reward = reward.safe_sub(proposer_reward)?;
        rewards[index].safe_add_assign(max_attester_reward.safe_div(attestation.inclusion_delay)?)?;
    }

    let target_attesters: HashSet<usize> = unslashed_attesting_indices(state, &matching_target, spec)?
        .into_iter()
        .collect();
    for &index in &eligible {
        if !target_attesters.contains(&index) {
            let effective_balance = state.validators()[index].effective_balance;
            penalties[index].safe_add_assign(
                effective_balance
                    .safe_mul(finality_delay)?
                    .safe_div(spec.inactivity_penalty_quotient)?,
            )?;
        }
    }

    for index in 0..state.validators().len() {
        if rewards[index] != 0 {
            increase_balance(state, index, rewards[index])?;
        }
        if penalties[index] != 0 {
            decrease_balance(state, index, penalties[index])?;
        }
    }

    Ok(())
}
