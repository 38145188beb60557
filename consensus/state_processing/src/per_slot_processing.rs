use crate::upgrade::upgrade_to_altair;
use crate::{per_epoch_processing::EpochProcessingSummary, per_epoch_processing::per_epoch_processing};
use safe_arith::{ArithError, SafeArith};
use tracing::instrument;
use types::*;

#[derive(Debug, PartialEq)]
pub enum Error {
    BeaconStateError(BeaconStateError),
    EpochProcessingError(crate::per_epoch_processing::EpochProcessingError),
    ArithError(ArithError),
}

impl From<ArithError> for Error {
    fn from(e: ArithError) -> Self {
        Self::ArithError(e)
    }
}

impl From<BeaconStateError> for Error {
    fn from(e: BeaconStateError) -> Error {
        Error::BeaconStateError(e)
    }
}

impl From<crate::per_epoch_processing::EpochProcessingError> for Error {
    fn from(e: crate::per_epoch_processing::EpochProcessingError) -> Error {
        Error::EpochProcessingError(e)
    }
}

/// Advances a state forward by one slot, performing per-epoch processing if required.
///
/// If the root of the supplied `state` is known, it can be passed as `state_root`. If
/// `state_root` is `None`, the root of `state` is computed using a cached tree hash. Providing
/// the `state_root` makes this function several orders of magnitude faster.
#[instrument(level = "debug", skip_all)]
pub fn per_slot_processing<E: EthSpec>(
    state: &mut BeaconState<E>,
    state_root: Option<Hash256>,
    spec: &ChainSpec,
) -> Result<Option<EpochProcessingSummary<E>>, Error> {
    cache_state(state, state_root)?;

    let summary = if state.slot() > spec.genesis_slot
        && state.slot().safe_add(1)?.safe_rem(E::slots_per_epoch())? == 0
    {
        Some(per_epoch_processing(state, spec)?)
    } else {
        None
    };

    state.slot_mut().safe_add_assign(1)?;

    if state.slot().safe_rem(E::slots_per_epoch())? == 0 {
        if spec.altair_fork_epoch == Some(state.current_epoch()) {
            upgrade_to_altair(state, spec)?;
        }

        // Every valid state that's been advanced a full epoch leaves here with committee caches
        // already built, so higher layers never need to special-case a cold cache.
        state.build_caches(spec)?;
    }

    Ok(summary)
}

#[instrument(skip_all)]
fn cache_state<E: EthSpec>(
    state: &mut BeaconState<E>,
    state_root: Option<Hash256>,
) -> Result<(), Error> {
    let previous_state_root = if let Some(root) = state_root {
        root
    } else {
        state.update_tree_hash_cache()?
    };

    // Temporarily advance the slot so the `state_root`/`block_root` setters below, which index
    // relative to the *current* slot, land the previous slot's values in the right history slots.
    let previous_slot = state.slot();
    state.slot_mut().safe_add_assign(1)?;

    state.set_state_root(previous_slot, previous_state_root)?;

    if state.latest_block_header().state_root == Hash256::zero() {
        state.latest_block_header_mut().state_root = previous_state_root;
    }

    let latest_block_root = state.latest_block_header().canonical_root();
    state.set_block_root(previous_slot, latest_block_root)?;

    state.slot_mut().safe_sub_assign(1)?;

    Ok(())
}
