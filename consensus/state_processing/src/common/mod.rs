//! Helpers shared between block and epoch processing: balance mutation, the exit queue, the
//! slashing penalty, committee-to-indices resolution, and the deposit trie mirror.
mod get_attestation_participation;

pub use get_attestation_participation::get_attestation_participation_flag_indices;

use safe_arith::SafeArith;
use ssz_types::typenum::Unsigned;
use types::{AttestationData, BeaconState, BeaconStateError, ChainSpec, Epoch, EthSpec, Hash256};

/// Mirrors the eth1 deposit contract's append-only Merkle tree so deposits can be proven against
/// `state.eth1_data.deposit_root` without a live eth1 connection, mixing in `deposit_count` as
/// the contract itself does.
pub struct DepositDataTree {
    tree: merkle_proof::MerkleTree,
    depth: usize,
    mix_in_length: usize,
}

impl DepositDataTree {
    pub fn create(leaves: &[Hash256], deposit_count: usize, depth: usize) -> Self {
        Self {
            tree: merkle_proof::MerkleTree::create(leaves, depth),
            depth,
            mix_in_length: deposit_count,
        }
    }

    pub fn root(&self) -> Hash256 {
        tree_hash::mix_in_length(&self.tree.hash(), self.mix_in_length)
    }

    pub fn push_leaf(&mut self, leaf: Hash256) -> Result<(), merkle_proof::MerkleTreeError> {
        self.tree.push_leaf(leaf, self.depth)?;
        self.mix_in_length = self
            .mix_in_length
            .safe_add(1)
            .map_err(|_| merkle_proof::MerkleTreeError::MerkleTreeFull)?;
        Ok(())
    }

    pub fn generate_proof(
        &self,
        index: usize,
    ) -> Result<(Hash256, Vec<Hash256>), merkle_proof::MerkleTreeError> {
        let (leaf, mut proof) = self.tree.generate_proof(index, self.depth)?;
        proof.push(Hash256::from_slice(&{
            let mut bytes = [0u8; 32];
            bytes[0..8].copy_from_slice(&(self.mix_in_length as u64).to_le_bytes());
            bytes
        }));
        Ok((leaf, proof))
    }
}

/// Credits `index`'s balance by `delta`, never allowed to overflow `u64`.
pub fn increase_balance<E: EthSpec>(
    state: &mut BeaconState<E>,
    index: usize,
    delta: u64,
) -> Result<(), BeaconStateError> {
    let balance = state
        .balances_mut()
        .get_mut(index)
        .ok_or(BeaconStateError::UnknownValidator(index))?;
    *balance = balance.safe_add(delta)?;
    Ok(())
}

/// Debits `index`'s balance by `delta`, saturating at zero rather than underflowing (an
/// accumulated penalty may exceed what is left once other penalties already landed this epoch).
pub fn decrease_balance<E: EthSpec>(
    state: &mut BeaconState<E>,
    index: usize,
    delta: u64,
) -> Result<(), BeaconStateError> {
    let balance = state
        .balances_mut()
        .get_mut(index)
        .ok_or(BeaconStateError::UnknownValidator(index))?;
    *balance = balance.saturating_sub(delta);
    Ok(())
}

/// Queues `index` for exit at the next available exit-queue epoch, a no-op if it is already
/// exiting or has already exited.
pub fn initiate_validator_exit<E: EthSpec>(
    state: &mut BeaconState<E>,
    index: usize,
    spec: &ChainSpec,
) -> Result<(), BeaconStateError> {
    if state
        .validators()
        .get(index)
        .ok_or(BeaconStateError::UnknownValidator(index))?
        .exit_epoch
        != spec.far_future_epoch
    {
        return Ok(());
    }

    let current_epoch = state.current_epoch();
    let active_validator_count = state.get_active_validator_indices(current_epoch, spec)?.len() as u64;
    let exit_queue_epoch = state
        .caches_mut()
        .exit_cache
        .compute_exit_queue_epoch(current_epoch, active_validator_count, spec)?;

    let validator = state
        .validators_mut()
        .get_mut(index)
        .ok_or(BeaconStateError::UnknownValidator(index))?;
    validator.exit_epoch = exit_queue_epoch;
    validator.withdrawable_epoch =
        exit_queue_epoch.safe_add(spec.min_validator_withdrawability_delay)?;
    Ok(())
}

/// Applies the immediate portion of a slashing: marks the validator slashed, schedules its
/// withdrawable epoch, folds its effective balance into the current slashings-window entry,
/// docks the immediate penalty, and rewards `whistleblower_index` (the block proposer, unless a
/// future fork names a separate reporter).
pub fn slash_validator<E: EthSpec>(
    state: &mut BeaconState<E>,
    slashed_index: usize,
    whistleblower_index: Option<usize>,
    spec: &ChainSpec,
) -> Result<(), BeaconStateError> {
    let current_epoch = state.current_epoch();
    initiate_validator_exit(state, slashed_index, spec)?;

    let validator = state
        .validators_mut()
        .get_mut(slashed_index)
        .ok_or(BeaconStateError::UnknownValidator(slashed_index))?;
    validator.slashed = true;
    validator.withdrawable_epoch = std::cmp::max(
        validator.withdrawable_epoch,
        current_epoch.safe_add(Epoch::new(E::EpochsPerSlashingsVector::to_u64()))?,
    );
    let effective_balance = validator.effective_balance;

    let slashings_index =
        (current_epoch.as_u64().safe_rem(E::EpochsPerSlashingsVector::to_u64())?) as usize;
    let slashings = state.slashings_mut();
    let current = slashings
        .get(slashings_index)
        .copied()
        .ok_or(BeaconStateError::SlotOutOfBounds)?;
    *slashings
        .get_mut(slashings_index)
        .ok_or(BeaconStateError::SlotOutOfBounds)? = current.safe_add(effective_balance)?;

    let min_slashing_penalty_quotient = if state.is_altair() {
        spec.min_slashing_penalty_quotient_altair
    } else {
        spec.min_slashing_penalty_quotient
    };
    decrease_balance(
        state,
        slashed_index,
        effective_balance.safe_div(min_slashing_penalty_quotient)?,
    )?;

    let proposer_index = state.get_beacon_proposer_index(state.slot(), spec)?;
    let whistleblower_index = whistleblower_index.unwrap_or(proposer_index);
    let whistleblower_reward = effective_balance.safe_div(spec.whistleblower_reward_quotient)?;
    let proposer_reward = whistleblower_reward.safe_div(spec.proposer_reward_quotient)?;
    increase_balance(state, proposer_index, proposer_reward)?;
    increase_balance(
        state,
        whistleblower_index,
        whistleblower_reward.safe_sub(proposer_reward)?,
    )?;

    Ok(())
}

/// Resolves an attestation's committee-relative `aggregation_bits` into the sorted validator
/// indices of everyone who actually signed, the form `IndexedAttestation` and reward accounting
/// both need.
pub fn get_attesting_indices<E: EthSpec>(
    state: &BeaconState<E>,
    data: &AttestationData,
    aggregation_bits: &ssz_types::BitList<E::MaxValidatorsPerCommittee>,
    spec: &ChainSpec,
) -> Result<Vec<u64>, BeaconStateError> {
    let committee = state.get_beacon_committee(data.slot, data.index, spec)?;
    let mut indices = Vec::with_capacity(committee.committee.len());
    for (i, &validator_index) in committee.committee.iter().enumerate() {
        if aggregation_bits
            .get(i)
            .map_err(BeaconStateError::SszTypesError)?
        {
            indices.push(validator_index as u64);
        }
    }
    indices.sort_unstable();
    Ok(indices)
}

pub fn is_valid_genesis_state(active_validator_count: usize, genesis_time: u64, spec: &ChainSpec) -> bool {
    genesis_time >= spec.min_genesis_time
        && active_validator_count as u64 >= spec.min_genesis_active_validator_count
}

/// Sums the effective balances of a set of validator indices, floored at
/// `EFFECTIVE_BALANCE_INCREMENT` so a quorum can never appear to require zero stake.
pub fn get_total_balance<E: EthSpec>(
    state: &BeaconState<E>,
    indices: impl IntoIterator<Item = usize>,
    spec: &ChainSpec,
) -> Result<u64, BeaconStateError> {
    let mut total = 0u64;
    for index in indices {
        let validator = state
            .validators()
            .get(index)
            .ok_or(BeaconStateError::UnknownValidator(index))?;
        total = total.safe_add(validator.effective_balance)?;
    }
    Ok(std::cmp::max(total, spec.effective_balance_increment))
}

/// The total effective balance of every validator active at `epoch`.
pub fn get_total_active_balance<E: EthSpec>(
    state: &BeaconState<E>,
    epoch: Epoch,
    spec: &ChainSpec,
) -> Result<u64, BeaconStateError> {
    get_total_balance(state, state.get_active_validator_indices(epoch, spec)?, spec)
}

/// The base reward owed per `EFFECTIVE_BALANCE_INCREMENT` of active stake, the unit the Altair
/// sync committee reward and the per-validator base reward are both built from.
pub fn get_base_reward_per_increment(
    total_active_balance: u64,
    spec: &ChainSpec,
) -> Result<u64, BeaconStateError> {
    use integer_sqrt::IntegerSquareRoot;
    Ok(spec
        .effective_balance_increment
        .safe_mul(spec.base_reward_factor)?
        .safe_div(total_active_balance.integer_sqrt())?)
}
