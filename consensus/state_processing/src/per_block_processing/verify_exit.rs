//! Voluntary exit validity: is the validator actually allowed to leave yet, and did it really ask
//! to?
use super::errors::{BlockOperationError, ExitInvalid};
use super::signature_sets::{exit_signature_set, get_pubkey_from_state};
use super::VerifySignatures;
use safe_arith::SafeArith;
use types::{BeaconState, ChainSpec, Epoch, EthSpec, SignedVoluntaryExit};

type Result<T> = std::result::Result<T, BlockOperationError<ExitInvalid>>;

fn error(reason: ExitInvalid) -> BlockOperationError<ExitInvalid> {
    BlockOperationError::invalid(reason)
}

macro_rules! verify {
    ($condition: expr, $result: expr) => {
        if !$condition {
            return Err(error($result));
        }
    };
}

/// Checks that `signed_exit` is valid for inclusion in a block built atop `state`. `current_epoch`
/// defaults to `state.current_epoch()`; block processing passes it explicitly since it is computed
/// once for the whole block.
pub fn verify_exit<E: EthSpec>(
    state: &BeaconState<E>,
    current_epoch: Option<Epoch>,
    signed_exit: &SignedVoluntaryExit,
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<()> {
    let current_epoch = current_epoch.unwrap_or_else(|| state.current_epoch());
    let exit = &signed_exit.message;

    let validator = state
        .validators()
        .get(exit.validator_index as usize)
        .ok_or_else(|| error(ExitInvalid::ValidatorUnknown(exit.validator_index)))?;

    verify!(
        validator.is_active_at(current_epoch),
        ExitInvalid::NotActive(exit.validator_index)
    );
    verify!(
        validator.exit_epoch == spec.far_future_epoch,
        ExitInvalid::AlreadyExited(exit.validator_index)
    );
    verify!(
        current_epoch >= exit.epoch,
        ExitInvalid::FutureEpoch {
            state: current_epoch,
            exit: exit.epoch,
        }
    );

    let earliest_exit_epoch = validator.activation_epoch.safe_add(spec.shard_committee_period)?;
    verify!(
        current_epoch >= earliest_exit_epoch,
        ExitInvalid::TooYoungToExit {
            current_epoch,
            earliest_exit_epoch,
        }
    );

    if verify_signatures.is_true() {
        verify!(
            exit_signature_set(state, |i| get_pubkey_from_state(state, i), signed_exit, spec)?
                .verify(),
            ExitInvalid::BadSignature
        );
    }

    Ok(())
}
