//! Applies a block's effect to a state already advanced to the block's slot: the header, the
//! RANDAO mix, the eth1 vote, the five operation lists, and (Altair only) the sync aggregate.
pub mod errors;
pub mod process_operations;
pub mod signature_sets;
pub mod verify_attestation;
pub mod verify_exit;

pub use errors::BlockProcessingError;
pub use process_operations::process_operations;

use self::errors::{BlockOperationError, HeaderInvalid, RandaoInvalid};
use self::signature_sets::{
    block_proposal_signature_set, get_pubkey_from_state, randao_signature_set,
    sync_aggregate_signature_set,
};
use crate::common::{
    decrease_balance, get_base_reward_per_increment, get_total_active_balance, increase_balance,
};
use safe_arith::SafeArith;
use ssz_types::typenum::Unsigned;
use tracing::instrument;
use types::consts::altair::{PROPOSER_WEIGHT, SYNC_REWARD_WEIGHT, WEIGHT_DENOMINATOR};
use types::{
    BeaconBlock, BeaconBlockHeader, BeaconState, ChainSpec, Eth1Data, EthSpec, Hash256,
    SignedBeaconBlock, SyncAggregate,
};

/// How thoroughly `per_block_processing` checks the block's BLS signatures. Blocks replayed from
/// a trusted source (e.g. already-finalized history) can skip verification entirely; a block
/// fresh off the wire checks every signature as it's processed.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum BlockSignatureStrategy {
    NoVerification,
    VerifyIndividual,
    VerifyRandao,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum VerifySignatures {
    True,
    False,
}

impl VerifySignatures {
    pub fn is_true(self) -> bool {
        self == VerifySignatures::True
    }
}

/// Whether `process_block_header` should check the block's `parent_root` against the state's
/// `latest_block_header`. State transitions run against a block already known to extend the
/// state's head can skip this; anything arriving over the network cannot.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum VerifyBlockRoot {
    True,
    False,
}

/// Applies `signed_block` to `state`, which must already be at `signed_block.slot()` (callers
/// advance slots with `per_slot_processing` first). Mutates `state` in place; on error `state` is
/// left partway through the block and must be discarded.
#[instrument(level = "debug", skip_all)]
pub fn per_block_processing<E: EthSpec>(
    state: &mut BeaconState<E>,
    signed_block: &SignedBeaconBlock<E>,
    block_signature_strategy: BlockSignatureStrategy,
    verify_block_root: VerifyBlockRoot,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    let block = &signed_block.message;
    let body = block.body();

    let verify_signatures = match block_signature_strategy {
        BlockSignatureStrategy::VerifyIndividual => VerifySignatures::True,
        BlockSignatureStrategy::NoVerification | BlockSignatureStrategy::VerifyRandao => {
            VerifySignatures::False
        }
    };

    let proposer_index =
        process_block_header(state, block.block_header(), verify_block_root, spec)?;

    if verify_signatures.is_true() {
        verify_block_signature(state, signed_block, spec)?;
    }

    let verify_randao = if block_signature_strategy == BlockSignatureStrategy::VerifyRandao {
        VerifySignatures::True
    } else {
        verify_signatures
    };
    process_randao(state, block, proposer_index, verify_randao, spec)?;
    process_eth1_data(state, body.eth1_data(), spec)?;
    process_operations(state, &body, verify_signatures, spec)?;

    if let Some(sync_aggregate) = body.sync_aggregate() {
        process_sync_aggregate(state, sync_aggregate, proposer_index, verify_signatures, spec)?;
    }

    Ok(())
}

/// Checks the header against the state it's meant to extend and installs it as
/// `state.latest_block_header`, returning the proposer index so callers don't recompute it.
pub fn process_block_header<E: EthSpec>(
    state: &mut BeaconState<E>,
    block_header: BeaconBlockHeader,
    verify_block_root: VerifyBlockRoot,
    spec: &ChainSpec,
) -> Result<u64, BlockProcessingError> {
    let error = |reason: HeaderInvalid| -> BlockOperationError<HeaderInvalid> {
        BlockOperationError::invalid(reason)
    };

    if block_header.slot != state.slot() {
        return Err(error(HeaderInvalid::StateSlotMismatch {
            state: state.slot(),
            block: block_header.slot,
        })
        .into());
    }

    let state_proposer_index = state.get_beacon_proposer_index(state.slot(), spec)? as u64;
    if block_header.proposer_index != state_proposer_index {
        return Err(error(HeaderInvalid::ProposerIndexMismatch {
            block: block_header.proposer_index,
            local_shuffling: state_proposer_index,
        })
        .into());
    }

    if verify_block_root == VerifyBlockRoot::True {
        let expected_parent_root = state.latest_block_header().canonical_root();
        if block_header.parent_root != expected_parent_root {
            return Err(error(HeaderInvalid::ParentNotLatestBlock {
                expected: expected_parent_root,
                found: block_header.parent_root,
            })
            .into());
        }
    }

    let proposer_index = block_header.proposer_index;
    if state
        .validators()
        .get(proposer_index as usize)
        .ok_or(types::BeaconStateError::UnknownValidator(proposer_index as usize))?
        .slashed
    {
        return Err(error(HeaderInvalid::ProposerSlashed(proposer_index)).into());
    }

    *state.latest_block_header_mut() = block_header;

    Ok(proposer_index)
}

fn verify_block_signature<E: EthSpec>(
    state: &BeaconState<E>,
    signed_block: &SignedBeaconBlock<E>,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    let valid = block_proposal_signature_set(
        state,
        |i| get_pubkey_from_state(state, i),
        signed_block,
        None,
        None,
        spec,
    )?
    .verify();
    if !valid {
        return Err(BlockOperationError::<HeaderInvalid>::invalid(
            HeaderInvalid::ProposerSignatureInvalid,
        )
        .into());
    }
    Ok(())
}

/// Checks the RANDAO reveal (if requested) and mixes it into the current epoch's RANDAO
/// accumulator, the only piece of beacon-chain randomness this crate implements.
fn process_randao<E: EthSpec>(
    state: &mut BeaconState<E>,
    block: &BeaconBlock<E>,
    proposer_index: u64,
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    if verify_signatures.is_true() {
        let valid = randao_signature_set(
            state,
            |i| get_pubkey_from_state(state, i),
            block,
            Some(proposer_index),
            spec,
        )?
        .verify();
        if !valid {
            return Err(
                BlockOperationError::<RandaoInvalid>::invalid(RandaoInvalid::BadSignature).into(),
            );
        }
    }

    let epoch = block.slot().epoch(E::slots_per_epoch());
    let randao_mix = state.get_randao_mix(epoch)?;
    let reveal_hash =
        Hash256::from_slice(&ethereum_hashing::hash(&block.body().randao_reveal().serialize()));
    state.set_randao_mix(epoch, randao_mix ^ reveal_hash)?;

    Ok(())
}

/// Records the block's eth1 vote, and once any single `Eth1Data` value has a strict majority of
/// the votes cast over the current voting period, adopts it as `state.eth1_data`.
fn process_eth1_data<E: EthSpec>(
    state: &mut BeaconState<E>,
    eth1_data: &Eth1Data,
    _spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    state.eth1_data_votes_mut().push(eth1_data.clone())?;

    let votes_for_data = state
        .eth1_data_votes()
        .iter()
        .filter(|vote| *vote == eth1_data)
        .count();
    let voting_period_slots = E::SlotsPerEth1VotingPeriod::to_u64();
    if (votes_for_data as u64).safe_mul(2)? > voting_period_slots {
        *state.eth1_data_mut() = eth1_data.clone();
    }

    Ok(())
}

/// Pays the Altair sync-committee reward: every participating committee member earns
/// `participant_reward`, every absent member is docked the same amount, and the proposer earns a
/// cut of `proposer_reward` per participant. Signature verification (if requested) covers the
/// previous slot's block root, since a block's sync aggregate attests to its parent.
fn process_sync_aggregate<E: EthSpec>(
    state: &mut BeaconState<E>,
    sync_aggregate: &SyncAggregate<E>,
    proposer_index: u64,
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    if verify_signatures.is_true() {
        if let Some(signature_set) =
            sync_aggregate_signature_set(state, sync_aggregate, state.slot(), spec)?
        {
            if !signature_set.verify() {
                return Err(BlockProcessingError::SyncAggregateSignatureInvalid);
            }
        }
    }

    let total_active_balance = get_total_active_balance(state, state.current_epoch(), spec)?;
    let total_active_increments = total_active_balance.safe_div(spec.effective_balance_increment)?;
    let base_reward_per_increment = get_base_reward_per_increment(total_active_balance, spec)?;
    let total_base_rewards = base_reward_per_increment.safe_mul(total_active_increments)?;
    let max_participant_rewards = total_base_rewards
        .safe_mul(SYNC_REWARD_WEIGHT)?
        .safe_div(WEIGHT_DENOMINATOR)?
        .safe_div(E::slots_per_epoch())?;
    let participant_reward = max_participant_rewards.safe_div(E::sync_committee_size() as u64)?;
    let proposer_reward = participant_reward
        .safe_mul(PROPOSER_WEIGHT)?
        .safe_div(WEIGHT_DENOMINATOR.safe_sub(PROPOSER_WEIGHT)?)?;

    let committee_pubkeys = state.current_sync_committee()?.pubkeys.clone();
    for (pubkey, participated) in committee_pubkeys
        .iter()
        .zip(sync_aggregate.sync_committee_bits.iter())
    {
        let validator_index = state
            .get_validator_index(pubkey)
            .ok_or(types::BeaconStateError::UnknownValidatorPubkey)?;
        if participated {
            increase_balance(state, validator_index, participant_reward)?;
            increase_balance(state, proposer_index as usize, proposer_reward)?;
        } else {
            decrease_balance(state, validator_index, participant_reward)?;
        }
    }

    Ok(())
}
