//! Attestation inclusion validity: is this attestation allowed into a block building on `state`,
//! and if so, who does it actually represent (the `IndexedAttestation` form block operations and
//! signature checks need)?
use super::errors::{AttestationInvalid as Invalid, BlockOperationError};
use super::signature_sets::indexed_attestation_signature_set;
use super::VerifySignatures;
use crate::common::get_attesting_indices;
use safe_arith::SafeArith;
use types::{Attestation, BeaconState, ChainSpec, EthSpec, IndexedAttestation};

type Result<T> = std::result::Result<T, BlockOperationError<Invalid>>;

fn error(reason: Invalid) -> BlockOperationError<Invalid> {
    BlockOperationError::invalid(reason)
}

macro_rules! verify {
    ($condition: expr, $result: expr) => {
        if !$condition {
            return Err(error($result));
        }
    };
}

/// Checks the inclusion-window bounds that only make sense for an attestation arriving inside a
/// block (as opposed to one already resolved into state, e.g. during epoch processing), then
/// delegates the rest to `verify_attestation_for_state`.
pub fn verify_attestation_for_block_inclusion<E: EthSpec>(
    state: &BeaconState<E>,
    attestation: &Attestation<E>,
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<IndexedAttestation<E>> {
    let data = &attestation.data;

    verify!(
        data.slot.safe_add(spec.min_attestation_inclusion_delay)? <= state.slot(),
        Invalid::IncludedTooEarly {
            state: state.slot(),
            delay: spec.min_attestation_inclusion_delay,
            attestation: data.slot,
        }
    );
    verify!(
        state.slot() <= data.slot.safe_add(E::slots_per_epoch())?,
        Invalid::IncludedTooLate {
            state: state.slot(),
            attestation: data.slot,
        }
    );

    verify_attestation_for_state(state, attestation, verify_signatures, spec)
}

/// Checks that `attestation` truthfully describes the chain that precedes `state`: its committee
/// index is in range, its target matches the slot it claims, and its source checkpoint matches
/// whichever of `{previous,current}_justified_checkpoint` its target epoch falls under.
pub fn verify_attestation_for_state<E: EthSpec>(
    state: &BeaconState<E>,
    attestation: &Attestation<E>,
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<IndexedAttestation<E>> {
    let data = &attestation.data;

    verify!(
        data.index < state.get_committee_count_per_slot(data.slot.epoch(E::slots_per_epoch()), spec)?,
        Invalid::BadCommitteeIndex
    );

    let slot_epoch = data.slot.epoch(E::slots_per_epoch());
    verify!(
        data.target.epoch == slot_epoch,
        Invalid::TargetEpochSlotMismatch {
            target_epoch: data.target.epoch,
            slot_epoch,
        }
    );

    let is_current = data.target.epoch == state.current_epoch();
    let justified_checkpoint = if is_current {
        *state.current_justified_checkpoint()
    } else {
        *state.previous_justified_checkpoint()
    };
    verify!(
        data.source == justified_checkpoint,
        Invalid::WrongJustifiedCheckpoint {
            state: Box::new(justified_checkpoint),
            attestation: Box::new(data.source),
            is_current,
        }
    );

    let committee = state.get_beacon_committee(data.slot, data.index, spec)?;
    verify!(
        attestation.aggregation_bits.len() == committee.committee.len(),
        Invalid::BadAggregationBitlen
    );

    let attesting_indices = get_attesting_indices(state, data, &attestation.aggregation_bits, spec)?;
    verify!(!attesting_indices.is_empty(), Invalid::BadIndices);

    let indexed_attestation = IndexedAttestation::new(
        attesting_indices.into(),
        data.clone(),
        attestation.signature.clone(),
    );

    if verify_signatures.is_true() {
        let signature_set = indexed_attestation_signature_set(
            state,
            |i| super::signature_sets::get_pubkey_from_state(state, i),
            &indexed_attestation,
            spec,
        )?;
        verify!(signature_set.verify(), Invalid::BadSignature);
    }

    Ok(indexed_attestation)
}

/// Checks that an already-resolved `IndexedAttestation` (from an `AttesterSlashing`, or one just
/// built above) has sorted, deduplicated, non-empty attesting indices and an aggregate signature
/// that verifies against them. Unlike `verify_attestation_for_state`, this never touches the
/// committee shuffling: the indices are taken as given and checked only for internal consistency.
pub fn is_valid_indexed_attestation<E: EthSpec>(
    state: &BeaconState<E>,
    indexed_attestation: &IndexedAttestation<E>,
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<()> {
    let indices = &indexed_attestation.attesting_indices;

    verify!(!indices.is_empty(), Invalid::BadIndices);

    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    verify!(sorted.len() == indices.len(), Invalid::NotSorted);
    verify!(
        indices.iter().copied().eq(sorted.iter().copied()),
        Invalid::NotSorted
    );

    if verify_signatures.is_true() {
        let signature_set = indexed_attestation_signature_set(
            state,
            |i| super::signature_sets::get_pubkey_from_state(state, i),
            indexed_attestation,
            spec,
        )?;
        verify!(signature_set.verify(), Invalid::BadSignature);
    }

    Ok(())
}
