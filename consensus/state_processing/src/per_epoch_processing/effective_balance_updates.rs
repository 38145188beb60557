//! Recomputes each validator's effective balance from its real balance, with hysteresis so a
//! balance oscillating near a rounding boundary doesn't flip the effective balance every epoch.
use super::EpochProcessingError as Error;
use types::{BeaconState, ChainSpec, EthSpec};

pub fn process_effective_balance_updates<E: EthSpec>(
    state: &mut BeaconState<E>,
    spec: &ChainSpec,
) -> Result<(), Error> {
    for index in 0..state.validators().len() {
        let balance = state.balances()[index];
        state.validators_mut()[index].update_effective_balance(balance, spec)?;
    }
    Ok(())
}
