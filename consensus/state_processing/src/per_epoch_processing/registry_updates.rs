//! Moves validators through the activation queue and ejects anyone who fell below
//! `EJECTION_BALANCE`, in strict activation-eligibility order so the churn limit is honored
//! fairly.
use super::EpochProcessingError as Error;
use crate::common::initiate_validator_exit;
use safe_arith::SafeArith;
use types::{BeaconState, ChainSpec, EthSpec};

pub fn process_registry_updates<E: EthSpec>(
    state: &mut BeaconState<E>,
    spec: &ChainSpec,
) -> Result<(), Error> {
    let current_epoch = state.current_epoch();

    let mut activation_eligible = Vec::new();
    let mut ejections = Vec::new();

    for (index, validator) in state.validators().iter().enumerate() {
        if validator.is_eligible_for_activation_queue(spec) {
            activation_eligible.push(index);
        }
        if validator.is_active_at(current_epoch) && validator.effective_balance <= spec.ejection_balance {
            ejections.push(index);
        }
    }

    for index in activation_eligible {
        state.validators_mut()[index].activation_eligibility_epoch = current_epoch.safe_add(1)?;
    }

    for index in ejections {
        initiate_validator_exit(state, index, spec)?;
    }

    // Activate every eligible, not-yet-activated validator up to the churn limit, earliest
    // `activation_eligibility_epoch` (then index) first.
    let activation_exit_epoch = spec.compute_activation_exit_epoch(current_epoch)?;
    let active_validator_count = state.get_active_validator_indices(current_epoch, spec)?.len() as u64;
    let churn_limit = spec.churn_limit(active_validator_count) as usize;

    let finalized_epoch = state.finalized_checkpoint().epoch;
    let mut activation_queue: Vec<usize> = state
        .validators()
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_eligible_for_activation(finalized_epoch, spec))
        .map(|(i, _)| i)
        .collect();
    activation_queue.sort_by_key(|&i| {
        let v = &state.validators()[i];
        (v.activation_eligibility_epoch, i)
    });

    for &index in activation_queue.iter().take(churn_limit) {
        state.validators_mut()[index].activation_epoch = activation_exit_epoch;
    }

    Ok(())
}
