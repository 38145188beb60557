//! Applies the five block-operation lists to `state`, in the spec's fixed order: proposer
//! slashings, attester slashings, attestations, deposits, voluntary exits.
use super::errors::{
    AttesterSlashingInvalid, BlockOperationError, BlockProcessingError, DepositInvalid, IntoWithIndex,
    ProposerSlashingInvalid,
};
use super::signature_sets::{
    deposit_pubkey_signature_message, get_pubkey_from_state, proposer_slashing_signature_set,
};
use super::verify_attestation::{is_valid_indexed_attestation, verify_attestation_for_block_inclusion};
use super::verify_exit::verify_exit;
use super::VerifySignatures;
use crate::common::{
    get_attesting_indices, get_attestation_participation_flag_indices, get_base_reward_per_increment,
    get_total_active_balance, increase_balance, initiate_validator_exit, slash_validator,
};
use safe_arith::SafeArith;
use ssz_types::typenum::Unsigned;
use types::consts::altair::{PARTICIPATION_FLAG_WEIGHTS, PROPOSER_WEIGHT, WEIGHT_DENOMINATOR};
use types::{
    Attestation, AttesterSlashing, BeaconBlockBody, BeaconState, ChainSpec, Deposit, EthSpec,
    ParticipationFlags, ProposerSlashing, SignedVoluntaryExit, Validator,
};

pub fn process_operations<E: EthSpec>(
    state: &mut BeaconState<E>,
    body: &BeaconBlockBody<E>,
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    process_proposer_slashings(state, body.proposer_slashings(), verify_signatures, spec)?;
    process_attester_slashings(state, body.attester_slashings(), verify_signatures, spec)?;
    process_attestations(state, body.attestations(), verify_signatures, spec)?;
    process_deposits(state, body.deposits(), spec)?;
    process_exits(state, body.voluntary_exits(), verify_signatures, spec)?;
    Ok(())
}

fn process_proposer_slashings<E: EthSpec>(
    state: &mut BeaconState<E>,
    proposer_slashings: &[ProposerSlashing],
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    for (i, proposer_slashing) in proposer_slashings.iter().enumerate() {
        verify_proposer_slashing(state, proposer_slashing, verify_signatures, spec)
            .map_err(|e| e.into_with_index(i))?;
        slash_validator(state, proposer_slashing.proposer_index() as usize, None, spec)?;
    }
    Ok(())
}

fn verify_proposer_slashing<E: EthSpec>(
    state: &BeaconState<E>,
    proposer_slashing: &ProposerSlashing,
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> std::result::Result<(), BlockOperationError<ProposerSlashingInvalid>> {
    let header_1 = &proposer_slashing.signed_header_1.message;
    let header_2 = &proposer_slashing.signed_header_2.message;

    if header_1.slot != header_2.slot {
        return Err(BlockOperationError::invalid(ProposerSlashingInvalid::SlotMismatch {
            slot_1: header_1.slot,
            slot_2: header_2.slot,
        }));
    }
    if header_1.proposer_index != header_2.proposer_index {
        return Err(BlockOperationError::invalid(ProposerSlashingInvalid::ProposersDiffer {
            proposer_1: header_1.proposer_index,
            proposer_2: header_2.proposer_index,
        }));
    }
    if header_1 == header_2 {
        return Err(BlockOperationError::invalid(ProposerSlashingInvalid::HeadersIdentical));
    }

    let proposer = state
        .validators()
        .get(header_1.proposer_index as usize)
        .ok_or_else(|| {
            BlockOperationError::invalid(ProposerSlashingInvalid::ProposerUnknown(header_1.proposer_index))
        })?;
    if !proposer.is_slashable_at(state.current_epoch()) {
        return Err(BlockOperationError::invalid(ProposerSlashingInvalid::ProposerNotSlashable(
            header_1.proposer_index,
        )));
    }

    if verify_signatures.is_true() {
        let (set_1, set_2) = proposer_slashing_signature_set(
            state,
            |i| get_pubkey_from_state(state, i),
            proposer_slashing,
            spec,
        )?;
        if !set_1.verify() || !set_2.verify() {
            return Err(BlockOperationError::invalid(ProposerSlashingInvalid::BadProposerSignature));
        }
    }

    Ok(())
}

fn process_attester_slashings<E: EthSpec>(
    state: &mut BeaconState<E>,
    attester_slashings: &[AttesterSlashing<E>],
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    for (i, attester_slashing) in attester_slashings.iter().enumerate() {
        let slashable_indices =
            verify_attester_slashing(state, attester_slashing, verify_signatures, spec)
                .map_err(|e| e.into_with_index(i))?;
        for index in slashable_indices {
            slash_validator(state, index as usize, None, spec)?;
        }
    }
    Ok(())
}

fn verify_attester_slashing<E: EthSpec>(
    state: &BeaconState<E>,
    attester_slashing: &AttesterSlashing<E>,
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> std::result::Result<Vec<u64>, BlockOperationError<AttesterSlashingInvalid>> {
    if !attester_slashing.is_slashable_attestation_data() {
        return Err(BlockOperationError::invalid(AttesterSlashingInvalid::NotSlashable));
    }

    for attestation in [&attester_slashing.attestation_1, &attester_slashing.attestation_2] {
        is_valid_indexed_attestation(state, attestation, verify_signatures, spec).map_err(|e| match e {
            BlockOperationError::Invalid(reason) => {
                BlockOperationError::invalid(AttesterSlashingInvalid::IndexedAttestationInvalid(Box::new(
                    reason,
                )))
            }
            BlockOperationError::BeaconStateError(e) => BlockOperationError::BeaconStateError(e),
            BlockOperationError::SignatureSetError(e) => BlockOperationError::SignatureSetError(e),
            BlockOperationError::ArithError(e) => BlockOperationError::ArithError(e),
        })?;
    }

    let slashable_indices: Vec<u64> = attester_slashing
        .slashable_attesting_indices()
        .into_iter()
        .filter(|&index| {
            state
                .validators()
                .get(index as usize)
                .is_some_and(|v| v.is_slashable_at(state.current_epoch()))
        })
        .collect();

    if slashable_indices.is_empty() {
        return Err(BlockOperationError::invalid(AttesterSlashingInvalid::NoSlashableIndices));
    }

    Ok(slashable_indices)
}

fn process_attestations<E: EthSpec>(
    state: &mut BeaconState<E>,
    attestations: &[Attestation<E>],
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    let proposer_index = state.get_beacon_proposer_index(state.slot(), spec)? as u64;

    for (i, attestation) in attestations.iter().enumerate() {
        verify_attestation_for_block_inclusion(state, attestation, verify_signatures, spec)
            .map_err(|e| e.into_with_index(i))?;

        if state.is_altair() {
            apply_altair_attestation_rewards(state, attestation, proposer_index, spec)?;
        } else {
            let inclusion_delay = state
                .slot()
                .as_u64()
                .safe_sub(attestation.data.slot.as_u64())?;
            let pending_attestation = types::PendingAttestation {
                aggregation_bits: attestation.aggregation_bits.clone(),
                data: attestation.data.clone(),
                inclusion_delay,
                proposer_index,
            };
            if attestation.data.target.epoch == state.current_epoch() {
                state
                    .current_epoch_attestations_mut()?
                    .push(pending_attestation)
                    .map_err(types::BeaconStateError::from)?;
            } else {
                state
                    .previous_epoch_attestations_mut()?
                    .push(pending_attestation)
                    .map_err(types::BeaconStateError::from)?;
            }
        }
    }
    Ok(())
}

/// Altair attestations pay their reward immediately (there is no `PendingAttestation` history to
/// fold into epoch processing): every participation flag the attestation newly sets for an
/// attester earns the proposer a slice of that attester's base reward.
fn apply_altair_attestation_rewards<E: EthSpec>(
    state: &mut BeaconState<E>,
    attestation: &Attestation<E>,
    proposer_index: u64,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    let data = &attestation.data;
    let inclusion_delay = state.slot().as_u64().safe_sub(data.slot.as_u64())?;
    let participation_flag_indices =
        get_attestation_participation_flag_indices(state, data, inclusion_delay, spec)?;

    let total_active_balance = get_total_active_balance(state, state.current_epoch(), spec)?;
    let base_reward_per_increment = get_base_reward_per_increment(total_active_balance, spec)?;
    let attesting_indices = get_attesting_indices(state, data, &attestation.aggregation_bits, spec)?;
    let is_current = data.target.epoch == state.current_epoch();

    let mut proposer_reward_numerator = 0u64;
    for index in attesting_indices {
        let index = index as usize;
        let effective_balance = state.validators()[index].effective_balance;
        let base_reward = effective_balance
            .safe_div(spec.effective_balance_increment)?
            .safe_mul(base_reward_per_increment)?;

        let epoch_participation = if is_current {
            state.current_epoch_participation_mut()?
        } else {
            state.previous_epoch_participation_mut()?
        };
        let byte = epoch_participation
            .get_mut(index)
            .ok_or(types::BeaconStateError::UnknownValidator(index))?;
        let mut flags = ParticipationFlags::from_u8(*byte);
        for &flag_index in participation_flag_indices.iter() {
            if !flags.has_flag(flag_index)? {
                flags.add_flag(flag_index)?;
                proposer_reward_numerator
                    .safe_add_assign(base_reward.safe_mul(PARTICIPATION_FLAG_WEIGHTS[flag_index])?)?;
            }
        }
        *byte = flags.as_u8();
    }

    let proposer_reward_denominator = WEIGHT_DENOMINATOR
        .safe_sub(PROPOSER_WEIGHT)?
        .safe_mul(WEIGHT_DENOMINATOR)?
        .safe_div(PROPOSER_WEIGHT)?;
    let proposer_reward = proposer_reward_numerator.safe_div(proposer_reward_denominator)?;
    increase_balance(state, proposer_index as usize, proposer_reward)?;

    Ok(())
}

fn process_deposits<E: EthSpec>(
    state: &mut BeaconState<E>,
    deposits: &[Deposit],
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    let expected_deposit_len = std::cmp::min(
        E::MaxDeposits::to_u64(),
        state
            .eth1_data()
            .deposit_count
            .safe_sub(state.eth1_deposit_index())?,
    );
    if deposits.len() as u64 != expected_deposit_len {
        return Err(BlockProcessingError::DepositCountInvalid {
            expected: expected_deposit_len as usize,
            found: deposits.len(),
        });
    }

    for (i, deposit) in deposits.iter().enumerate() {
        process_deposit(state, deposit, spec).map_err(|e| e.into_with_index(i))?;
    }
    Ok(())
}

/// Verifies `deposit`'s Merkle proof against `state.eth1_data().deposit_root` at the current
/// `eth1_deposit_index`, advances that index, and applies it. Used both for block processing and
/// (directly) for genesis, since genesis deposits are proven against the tree built alongside
/// them rather than against a vote-adopted `eth1_data`.
pub(crate) fn process_deposit<E: EthSpec>(
    state: &mut BeaconState<E>,
    deposit: &Deposit,
    spec: &ChainSpec,
) -> std::result::Result<(), BlockOperationError<DepositInvalid>> {
    use tree_hash::TreeHash;

    let leaf = deposit.data.tree_hash_root();
    let valid = merkle_proof::verify_merkle_proof(
        leaf,
        &deposit.proof,
        spec.deposit_contract_tree_depth as usize + 1,
        state.eth1_deposit_index() as usize,
        state.eth1_data().deposit_root,
    );
    if !valid {
        return Err(BlockOperationError::invalid(DepositInvalid::BadMerkleProof));
    }

    *state.eth1_deposit_index_mut() = state.eth1_deposit_index().safe_add(1)?;
    apply_deposit(state, deposit, spec)?;
    Ok(())
}

fn apply_deposit<E: EthSpec>(
    state: &mut BeaconState<E>,
    deposit: &Deposit,
    spec: &ChainSpec,
) -> Result<(), types::BeaconStateError> {
    let data = &deposit.data;

    if let Some(index) = state.get_validator_index(&data.pubkey) {
        increase_balance(state, index, data.amount)?;
        return Ok(());
    }

    let verified = deposit_pubkey_signature_message(data, spec)
        .map(|(pubkey, signature, message)| {
            use bls::SignatureSet;
            use std::borrow::Cow;
            SignatureSet::single(Cow::Owned(signature), Cow::Owned(pubkey), message).verify()
        })
        .unwrap_or(false);
    if !verified {
        return Ok(());
    }

    let effective_balance = std::cmp::min(
        data.amount.safe_sub(data.amount.safe_rem(spec.effective_balance_increment)?)?,
        spec.max_effective_balance,
    );
    let validator = Validator {
        pubkey: data.pubkey,
        withdrawal_credentials: data.withdrawal_credentials,
        effective_balance,
        slashed: false,
        activation_eligibility_epoch: spec.far_future_epoch,
        activation_epoch: spec.far_future_epoch,
        exit_epoch: spec.far_future_epoch,
        withdrawable_epoch: spec.far_future_epoch,
    };
    state.validators_mut().push(validator)?;
    state.balances_mut().push(data.amount)?;

    if state.is_altair() {
        state.previous_epoch_participation_mut()?.push(0)?;
        state.current_epoch_participation_mut()?.push(0)?;
        state.inactivity_scores_mut()?.push(0)?;
    }

    Ok(())
}

fn process_exits<E: EthSpec>(
    state: &mut BeaconState<E>,
    voluntary_exits: &[SignedVoluntaryExit],
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    for (i, signed_exit) in voluntary_exits.iter().enumerate() {
        verify_exit(state, None, signed_exit, verify_signatures, spec)
            .map_err(|e| e.into_with_index(i))?;
        initiate_validator_exit(state, signed_exit.message.validator_index as usize, spec)?;
    }
    Ok(())
}
