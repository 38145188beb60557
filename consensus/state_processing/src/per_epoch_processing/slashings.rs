//! Applies the epoch-end portion of a slashing penalty: a validator slashed this
//! `EPOCHS_PER_SLASHINGS_VECTOR / 2` window pays a share of the total slashed balance
//! proportional to its own effective balance.
use super::EpochProcessingError as Error;
use crate::common::decrease_balance;
use safe_arith::{SafeArith, SafeArithIter};
use types::typenum::Unsigned;
use types::{BeaconState, ChainSpec, Epoch, EthSpec};

pub fn process_slashings<E: EthSpec>(
    state: &mut BeaconState<E>,
    spec: &ChainSpec,
) -> Result<(), Error> {
    let current_epoch = state.current_epoch();
    let is_altair = state.is_altair();
    let total_active_balance = crate::common::get_total_active_balance(state, current_epoch, spec)?;

    let multiplier = spec.proportional_slashing_multiplier_for_altair(is_altair);
    let sum_slashings = state.slashings().iter().copied().safe_sum()?;
    let adjusted_total_slashing_balance = std::cmp::min(
        sum_slashings.safe_mul(multiplier)?,
        total_active_balance,
    );

    let target_withdrawable_epoch =
        current_epoch.safe_add(Epoch::new(E::EpochsPerSlashingsVector::to_u64().safe_div(2)?))?;
    let increment = spec.effective_balance_increment;

    let slashed_indices: Vec<usize> = state
        .validators()
        .iter()
        .enumerate()
        .filter(|(_, v)| v.slashed && v.withdrawable_epoch == target_withdrawable_epoch)
        .map(|(i, _)| i)
        .collect();

    for index in slashed_indices {
        let effective_balance = state.validators()[index].effective_balance;
        let penalty_numerator = effective_balance
            .safe_div(increment)?
            .safe_mul(adjusted_total_slashing_balance)?;
        let penalty = penalty_numerator
            .safe_div(total_active_balance)?
            .safe_mul(increment)?;
        decrease_balance(state, index, penalty)?;
    }

    Ok(())
}
