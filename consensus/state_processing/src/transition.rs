//! The top-level entry point a caller (block import, fork-choice replay, a test harness) actually
//! calls: advance a state to a block's slot, apply the block, and optionally hand back the
//! resulting state root. Everything underneath here is wired through `per_slot_processing` and
//! `per_block_processing`; this module's only job is composing the two and unifying their errors.
use crate::per_block_processing::{
    per_block_processing, BlockProcessingError, BlockSignatureStrategy, VerifyBlockRoot,
};
use crate::per_slot_processing::{self, per_slot_processing};
use tracing::instrument;
use types::{BeaconState, ChainSpec, EthSpec, Hash256, SignedBeaconBlock, Slot};

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    SlotProcessingError(per_slot_processing::Error),
    BlockProcessingError(BlockProcessingError),
    BeaconStateError(types::BeaconStateError),
    StateSlotAfterBlockSlot { state_slot: Slot, block_slot: Slot },
    StateRootMismatch { block: Hash256, computed: Hash256 },
}

impl From<per_slot_processing::Error> for Error {
    fn from(e: per_slot_processing::Error) -> Self {
        Error::SlotProcessingError(e)
    }
}

impl From<BlockProcessingError> for Error {
    fn from(e: BlockProcessingError) -> Self {
        Error::BlockProcessingError(e)
    }
}

impl From<types::BeaconStateError> for Error {
    fn from(e: types::BeaconStateError) -> Self {
        Error::BeaconStateError(e)
    }
}

/// Advances `state` to `signed_block`'s slot and applies it, the one call most callers need.
/// `state` must not already be ahead of the block; a state behind it is advanced with
/// `process_slots` first. Always re-derives the resulting root and checks it against
/// `signed_block.message.state_root()`, regardless of `block_signature_strategy` — a block that
/// produces the wrong state is never something a caller should accept, signed or not.
#[instrument(level = "debug", skip_all)]
pub fn transition<E: EthSpec>(
    state: &mut BeaconState<E>,
    signed_block: &SignedBeaconBlock<E>,
    block_signature_strategy: BlockSignatureStrategy,
    verify_block_root: VerifyBlockRoot,
    spec: &ChainSpec,
) -> Result<(), Error> {
    process_slots(state, signed_block.slot(), spec)?;
    per_block_processing(
        state,
        signed_block,
        block_signature_strategy,
        verify_block_root,
        spec,
    )?;

    let computed = state.update_tree_hash_cache()?;
    let claimed = signed_block.message.state_root();
    if computed != claimed {
        return Err(Error::StateRootMismatch {
            block: claimed,
            computed,
        });
    }

    Ok(())
}

/// Repeatedly applies `per_slot_processing` until `state.slot() == target_slot`. A no-op if
/// `state` is already there; an error if `state` has somehow run ahead of `target_slot`.
#[instrument(level = "debug", skip_all)]
pub fn process_slots<E: EthSpec>(
    state: &mut BeaconState<E>,
    target_slot: Slot,
    spec: &ChainSpec,
) -> Result<(), Error> {
    if state.slot() > target_slot {
        return Err(Error::StateSlotAfterBlockSlot {
            state_slot: state.slot(),
            block_slot: target_slot,
        });
    }

    while state.slot() < target_slot {
        per_slot_processing(state, None, spec)?;
    }

    Ok(())
}

/// Computes the hash-tree-root `state` would have once caught up to `slot`, without mutating the
/// caller's copy: clones the state, advances the clone, and reads its root. Used by callers that
/// need a future state root (e.g. a block proposer filling in `state_root`) without committing to
/// the advance themselves.
pub fn calculate_state_root<E: EthSpec>(
    state: &BeaconState<E>,
    slot: Slot,
    spec: &ChainSpec,
) -> Result<Hash256, Error> {
    let mut state = state.clone();
    process_slots(&mut state, slot, spec)?;
    Ok(state.update_tree_hash_cache()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genesis::initialize_beacon_state_from_eth1;
    use types::{
        test_utils::{bls_withdrawal_credentials, generate_deterministic_keypairs},
        BeaconBlock, BeaconBlockBase, BeaconBlockBody, BeaconBlockBodyBase, Deposit, DepositData,
        MinimalEthSpec, SignedBeaconBlock, SignedRoot,
    };

    type E = MinimalEthSpec;

    fn genesis_state(spec: &ChainSpec) -> BeaconState<E> {
        let keypairs = generate_deterministic_keypairs(spec.min_genesis_active_validator_count as usize);
        let mut tree = crate::common::DepositDataTree::create(&[], 0, spec.deposit_contract_tree_depth as usize);
        let deposits = keypairs
            .iter()
            .map(|keypair| {
                let pubkey = keypair.pk.compress();
                let withdrawal_credentials = bls_withdrawal_credentials(&pubkey, spec);
                let mut data = DepositData {
                    pubkey,
                    withdrawal_credentials,
                    amount: spec.max_effective_balance,
                    signature: Default::default(),
                };
                let domain = spec.get_deposit_domain();
                let message = types::DepositMessage::from(&data).signing_root(domain);
                let signature = keypair.sk.sign(message.as_slice());
                data.signature = bls::SignatureBytes::from_bytes(&signature.serialize()).unwrap();
                data
            })
            .collect::<Vec<_>>();
        deposits
            .iter()
            .for_each(|data| tree.push_leaf(data.tree_hash_root()).unwrap());
        let deposits = deposits
            .into_iter()
            .enumerate()
            .map(|(i, data)| {
                let (_, proof) = tree.generate_proof(i).unwrap();
                Deposit {
                    proof: ssz_types::FixedVector::new(proof).unwrap(),
                    data,
                }
            })
            .collect();

        initialize_beacon_state_from_eth1(
            Hash256::repeat_byte(0x42),
            spec.min_genesis_time - spec.genesis_delay,
            deposits,
            spec,
        )
        .unwrap()
    }

    /// Builds an empty block that correctly extends `state` at `slot`, the way a proposer would:
    /// advance a trial copy of `state` to `slot`, apply the (as yet rootless) block to that trial
    /// copy with `NoVerification`, and adopt the resulting root as the block's `state_root`. Doing
    /// this against an *advanced* trial copy matters because `latest_block_header.state_root` is
    /// only filled in (from its genesis placeholder of zero) once a slot's processing actually
    /// runs, which changes its `canonical_root()` and therefore the `parent_root` a block at
    /// `slot` must declare.
    fn empty_block_at<E: EthSpec>(
        state: &BeaconState<E>,
        slot: Slot,
        spec: &ChainSpec,
    ) -> SignedBeaconBlock<E> {
        let mut trial = state.clone();
        process_slots(&mut trial, slot, spec).unwrap();

        let proposer_index = trial.get_beacon_proposer_index(slot, spec).unwrap() as u64;
        let mut message = BeaconBlock::Base(BeaconBlockBase {
            slot,
            proposer_index,
            parent_root: trial.latest_block_header().canonical_root(),
            state_root: Hash256::zero(),
            body: BeaconBlockBody::Base(BeaconBlockBodyBase {
                randao_reveal: bls::SignatureBytes::empty(),
                eth1_data: trial.eth1_data().clone(),
                graffiti: Hash256::zero(),
                proposer_slashings: ssz_types::VariableList::empty(),
                attester_slashings: ssz_types::VariableList::empty(),
                attestations: ssz_types::VariableList::empty(),
                deposits: ssz_types::VariableList::empty(),
                voluntary_exits: ssz_types::VariableList::empty(),
            }),
        });

        let rootless_signed = SignedBeaconBlock {
            message: message.clone(),
            signature: bls::SignatureBytes::empty(),
        };
        per_block_processing(
            &mut trial,
            &rootless_signed,
            BlockSignatureStrategy::NoVerification,
            VerifyBlockRoot::True,
            spec,
        )
        .unwrap();
        message.set_state_root(trial.update_tree_hash_cache().unwrap());

        SignedBeaconBlock {
            message,
            signature: bls::SignatureBytes::empty(),
        }
    }

    #[test]
    fn empty_block_at_epoch_boundary_advances_slot_only() {
        let mut spec = E::default_spec();
        spec.altair_fork_epoch = None;
        let mut state = genesis_state(&spec);
        let starting_balances = state.balances().clone();
        let starting_bits = state.justification_bits().clone();

        let target_slot = Slot::new(E::slots_per_epoch());
        let block = empty_block_at(&state, target_slot, &spec);
        transition(
            &mut state,
            &block,
            BlockSignatureStrategy::NoVerification,
            VerifyBlockRoot::True,
            &spec,
        )
        .unwrap();

        assert_eq!(state.slot(), target_slot);
        assert_eq!(state.balances(), &starting_balances);
        assert_eq!(state.justification_bits(), &starting_bits);
    }

    #[test]
    fn block_with_wrong_state_root_is_rejected() {
        let mut spec = E::default_spec();
        spec.altair_fork_epoch = None;
        let mut state = genesis_state(&spec);
        let target_slot = Slot::new(1);
        let mut block = empty_block_at(&state, target_slot, &spec);
        block.message.set_state_root(Hash256::zero());

        let err = transition(
            &mut state,
            &block,
            BlockSignatureStrategy::NoVerification,
            VerifyBlockRoot::True,
            &spec,
        )
        .unwrap_err();

        assert!(matches!(err, Error::StateRootMismatch { .. }));
    }
}
