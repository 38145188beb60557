//! Builds the genesis `BeaconState` from the eth1 deposit contract's log: every deposit becomes a
//! validator (subject to the usual signature and Merkle-proof checks), validators with a full
//! effective balance are activated immediately, and if `spec.altair_fork_epoch` names the genesis
//! epoch the state is born already in its Altair shape.
use crate::common::{is_valid_genesis_state, DepositDataTree};
use crate::per_block_processing::errors::BlockOperationError;
use crate::per_block_processing::process_operations::process_deposit;
use crate::upgrade::upgrade_to_altair;
use safe_arith::{ArithError, SafeArith};
use tree_hash::TreeHash;
use types::{BeaconState, ChainSpec, Deposit, Eth1Data, EthSpec, Hash256};

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    ArithError(ArithError),
    BeaconStateError(types::BeaconStateError),
    MerkleTreeError(merkle_proof::MerkleTreeError),
    InvalidDeposit { index: usize, reason: crate::per_block_processing::errors::DepositInvalid },
    SlotProcessingError(crate::per_slot_processing::Error),
}

impl From<ArithError> for Error {
    fn from(e: ArithError) -> Self {
        Error::ArithError(e)
    }
}

impl From<types::BeaconStateError> for Error {
    fn from(e: types::BeaconStateError) -> Self {
        Error::BeaconStateError(e)
    }
}

impl From<merkle_proof::MerkleTreeError> for Error {
    fn from(e: merkle_proof::MerkleTreeError) -> Self {
        Error::MerkleTreeError(e)
    }
}

impl From<crate::per_slot_processing::Error> for Error {
    fn from(e: crate::per_slot_processing::Error) -> Self {
        Error::SlotProcessingError(e)
    }
}

/// Builds the genesis state from an eth1 block's hash and timestamp plus the deposits made by
/// that block. `genesis_time` is derived from `eth1_timestamp` via `spec.genesis_delay`; callers
/// wanting a different clock (e.g. test fixtures) should construct `Eth1Data`/`BeaconState`
/// directly instead.
pub fn initialize_beacon_state_from_eth1<E: EthSpec>(
    eth1_block_hash: Hash256,
    eth1_timestamp: u64,
    deposits: Vec<Deposit>,
    spec: &ChainSpec,
) -> Result<BeaconState<E>, Error> {
    let genesis_time = eth2_genesis_time(eth1_timestamp, spec)?;
    let eth1_data = Eth1Data {
        deposit_root: Hash256::zero(),
        deposit_count: deposits.len() as u64,
        block_hash: eth1_block_hash,
    };
    let mut state = BeaconState::new(genesis_time, eth1_data, spec);
    state.fill_randao_mixes_with(eth1_block_hash);

    let mut deposit_tree =
        DepositDataTree::create(&[], 0, spec.deposit_contract_tree_depth as usize);
    for (index, deposit) in deposits.iter().enumerate() {
        deposit_tree.push_leaf(deposit.data.tree_hash_root())?;
        state.eth1_data_mut().deposit_root = deposit_tree.root();
        process_deposit(&mut state, deposit, spec).map_err(|e| match e {
            BlockOperationError::Invalid(reason) => Error::InvalidDeposit { index, reason },
            BlockOperationError::BeaconStateError(e) => Error::BeaconStateError(e),
            BlockOperationError::ArithError(e) => Error::ArithError(e),
            BlockOperationError::SignatureSetError(_) => unreachable!(
                "process_deposit never builds a SignatureSet, it checks a single BLS pair directly"
            ),
        })?;
    }

    process_activations(&mut state, spec)?;

    if spec
        .altair_fork_epoch
        .is_some_and(|fork_epoch| fork_epoch == E::genesis_epoch())
    {
        upgrade_to_altair(&mut state, spec)?;
        state.fork_mut().previous_version = spec.altair_fork_version;
    }

    state.build_caches(spec)?;
    *state.genesis_validators_root_mut() = state.validators().tree_hash_root();

    Ok(state)
}

/// Every validator whose deposited balance alone reaches `MAX_EFFECTIVE_BALANCE` activates
/// immediately at genesis rather than waiting out the normal activation queue, since there is no
/// prior epoch's queue to wait behind.
fn process_activations<E: EthSpec>(state: &mut BeaconState<E>, spec: &ChainSpec) -> Result<(), Error> {
    let genesis_epoch = E::genesis_epoch();
    for validator in state.validators_mut().iter_mut() {
        if validator.effective_balance == spec.max_effective_balance {
            validator.activation_eligibility_epoch = genesis_epoch;
            validator.activation_epoch = genesis_epoch;
        }
    }
    Ok(())
}

/// Returns the `state.genesis_time` for the corresponding `eth1_timestamp`. Does not ensure the
/// result is past `spec.min_genesis_time`; pair with `is_valid_genesis_candidate` for that.
pub fn eth2_genesis_time(eth1_timestamp: u64, spec: &ChainSpec) -> Result<u64, ArithError> {
    eth1_timestamp.safe_add(spec.genesis_delay)
}

/// Whether a just-built genesis `state` has enough active stake and a late enough clock to
/// actually start the chain running.
pub fn is_valid_genesis_candidate<E: EthSpec>(state: &BeaconState<E>, spec: &ChainSpec) -> bool {
    let active_validator_count = state
        .get_active_validator_indices(E::genesis_epoch(), spec)
        .map(|indices| indices.len())
        .unwrap_or(0);
    is_valid_genesis_state(active_validator_count, state.genesis_time(), spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::test_utils::{bls_withdrawal_credentials, generate_deterministic_keypairs};
    use types::{DepositData, MinimalEthSpec, SignedRoot};

    type E = MinimalEthSpec;

    fn make_deposits(count: usize, spec: &ChainSpec) -> Vec<Deposit> {
        let keypairs = generate_deterministic_keypairs(count);
        let mut tree = DepositDataTree::create(&[], 0, spec.deposit_contract_tree_depth as usize);
        let mut datas = Vec::with_capacity(count);
        for keypair in &keypairs {
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
            datas.push(data);
        }
        // Each proof must be taken right after its own leaf is pushed, matching the depth at
        // which the eth1 deposit contract's tree stood when that deposit was made: genesis
        // processes deposits in this same order, one at a time, so a proof generated against the
        // *final* tree (with every later deposit's leaf already present) would not match the
        // deposit_root in effect when that deposit is actually verified.
        datas
            .into_iter()
            .enumerate()
            .map(|(i, data)| {
                tree.push_leaf(data.tree_hash_root()).unwrap();
                let (_, proof) = tree.generate_proof(i).unwrap();
                Deposit {
                    proof: ssz_types::FixedVector::new(proof).unwrap(),
                    data,
                }
            })
            .collect()
    }

    #[test]
    fn genesis_state_activates_full_deposits() {
        let mut spec = E::default_spec();
        spec.altair_fork_epoch = None;
        let deposits = make_deposits(spec.min_genesis_active_validator_count as usize, &spec);
        let state: BeaconState<E> = initialize_beacon_state_from_eth1(
            Hash256::repeat_byte(0x42),
            spec.min_genesis_time - spec.genesis_delay,
            deposits,
            &spec,
        )
        .unwrap();

        assert_eq!(
            state.validators().len(),
            spec.min_genesis_active_validator_count as usize
        );
        for validator in state.validators().iter() {
            assert_eq!(validator.activation_epoch, E::genesis_epoch());
            assert_eq!(validator.activation_eligibility_epoch, E::genesis_epoch());
        }
        assert!(is_valid_genesis_candidate(&state, &spec));
    }

    #[test]
    fn altair_genesis_fills_both_sync_committees() {
        let mut spec = E::default_spec();
        spec.altair_fork_epoch = Some(E::genesis_epoch());
        let deposits = make_deposits(spec.min_genesis_active_validator_count as usize, &spec);
        let state: BeaconState<E> = initialize_beacon_state_from_eth1(
            Hash256::repeat_byte(0x42),
            spec.min_genesis_time - spec.genesis_delay,
            deposits,
            &spec,
        )
        .unwrap();

        assert!(state.is_altair());
        assert_eq!(
            state.current_sync_committee().unwrap(),
            state.next_sync_committee().unwrap()
        );
    }
}
