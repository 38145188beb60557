//! A `SignatureSet` is an abstraction over the components of a signature: one signature, the
//! pubkey(s) it's checked against, and the message it was signed over. Every object in a block
//! that carries a BLS signature gets one constructor here, so `per_block_processing` can defer
//! the (relatively expensive) signature checks until after the cheap structural checks pass.
use bls::SignatureSet;
use std::borrow::Cow;
use tree_hash::TreeHash;
use types::{
    BeaconBlock, BeaconState, BeaconStateError, ChainSpec, Deposit, DepositData, Domain, EthSpec,
    Hash256, IndexedAttestation, ProposerSlashing, PublicKey, SignedBeaconBlock,
    SignedBeaconBlockHeader, SignedRoot, SignedVoluntaryExit, Slot, SigningData, SyncAggregate,
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    BeaconStateError(BeaconStateError),
    ValidatorUnknown(u64),
    IncorrectBlockProposer { block: u64, local_shuffling: u64 },
    SignatureDecompressionFailed,
}

impl From<BeaconStateError> for Error {
    fn from(e: BeaconStateError) -> Error {
        Error::BeaconStateError(e)
    }
}

/// Public keys are read straight from the state's validator registry; this is the `get_pubkey`
/// callback every signature-set constructor below takes instead of reaching into `state` itself,
/// so a caller that already decompressed every key once can reuse the cache.
pub fn get_pubkey_from_state<E: EthSpec>(
    state: &BeaconState<E>,
    validator_index: usize,
) -> Option<Cow<'_, PublicKey>> {
    state
        .validators()
        .get(validator_index)
        .and_then(|v| v.pubkey.decompress().ok())
        .map(Cow::Owned)
}

fn hash_message(root: Hash256) -> Vec<u8> {
    root.as_bytes().to_vec()
}

pub fn block_proposal_signature_set<'a, E, F>(
    state: &'a BeaconState<E>,
    get_pubkey: F,
    signed_block: &'a SignedBeaconBlock<E>,
    block_root: Option<Hash256>,
    verified_proposer_index: Option<u64>,
    spec: &'a ChainSpec,
) -> Result<SignatureSet<'a>>
where
    E: EthSpec,
    F: Fn(usize) -> Option<Cow<'a, PublicKey>>,
{
    let block = &signed_block.message;

    let proposer_index = if let Some(proposer_index) = verified_proposer_index {
        proposer_index
    } else {
        state.get_beacon_proposer_index(block.slot(), spec)? as u64
    };
    if proposer_index != block.proposer_index() {
        return Err(Error::IncorrectBlockProposer {
            block: block.proposer_index(),
            local_shuffling: proposer_index,
        });
    }

    let domain = spec.get_domain(
        block.slot().epoch(E::slots_per_epoch()),
        Domain::BeaconProposer,
        state.fork(),
        state.genesis_validators_root(),
    );

    let message = if let Some(root) = block_root {
        hash_message(
            SigningData {
                object_root: root,
                domain,
            }
            .tree_hash_root(),
        )
    } else {
        hash_message(block.signing_root(domain))
    };

    let signature = signed_block
        .signature
        .decompress()
        .map_err(|_| Error::SignatureDecompressionFailed)?;

    Ok(SignatureSet::single(
        Cow::Owned(signature),
        get_pubkey(proposer_index as usize).ok_or(Error::ValidatorUnknown(proposer_index))?,
        message,
    ))
}

/// A signature set that is valid if the block proposer's randao reveal is correct.
pub fn randao_signature_set<'a, E, F>(
    state: &'a BeaconState<E>,
    get_pubkey: F,
    block: &'a BeaconBlock<E>,
    verified_proposer_index: Option<u64>,
    spec: &'a ChainSpec,
) -> Result<SignatureSet<'a>>
where
    E: EthSpec,
    F: Fn(usize) -> Option<Cow<'a, PublicKey>>,
{
    let proposer_index = if let Some(proposer_index) = verified_proposer_index {
        proposer_index
    } else {
        state.get_beacon_proposer_index(block.slot(), spec)? as u64
    };

    let domain = spec.get_domain(
        block.slot().epoch(E::slots_per_epoch()),
        Domain::Randao,
        state.fork(),
        state.genesis_validators_root(),
    );

    let message = hash_message(block.slot().epoch(E::slots_per_epoch()).signing_root(domain));

    let signature = block
        .body()
        .randao_reveal()
        .decompress()
        .map_err(|_| Error::SignatureDecompressionFailed)?;

    Ok(SignatureSet::single(
        Cow::Owned(signature),
        get_pubkey(proposer_index as usize).ok_or(Error::ValidatorUnknown(proposer_index))?,
        message,
    ))
}

/// Returns two signature sets, one for each `BlockHeader` included in the `ProposerSlashing`.
pub fn proposer_slashing_signature_set<'a, E, F>(
    state: &'a BeaconState<E>,
    get_pubkey: F,
    proposer_slashing: &'a ProposerSlashing,
    spec: &'a ChainSpec,
) -> Result<(SignatureSet<'a>, SignatureSet<'a>)>
where
    E: EthSpec,
    F: Fn(usize) -> Option<Cow<'a, PublicKey>>,
{
    let proposer_index = proposer_slashing.proposer_index() as usize;

    Ok((
        block_header_signature_set::<E>(
            state,
            &proposer_slashing.signed_header_1,
            get_pubkey(proposer_index).ok_or(Error::ValidatorUnknown(proposer_index as u64))?,
            spec,
        )?,
        block_header_signature_set::<E>(
            state,
            &proposer_slashing.signed_header_2,
            get_pubkey(proposer_index).ok_or(Error::ValidatorUnknown(proposer_index as u64))?,
            spec,
        )?,
    ))
}

fn block_header_signature_set<'a, E: EthSpec>(
    state: &'a BeaconState<E>,
    signed_header: &'a SignedBeaconBlockHeader,
    pubkey: Cow<'a, PublicKey>,
    spec: &'a ChainSpec,
) -> Result<SignatureSet<'a>> {
    let domain = spec.get_domain(
        signed_header.message.slot.epoch(E::slots_per_epoch()),
        Domain::BeaconProposer,
        state.fork(),
        state.genesis_validators_root(),
    );

    let message = hash_message(signed_header.message.signing_root(domain));
    let signature = signed_header
        .signature
        .decompress()
        .map_err(|_| Error::SignatureDecompressionFailed)?;

    Ok(SignatureSet::single(Cow::Owned(signature), pubkey, message))
}

/// Returns the signature set for the given `indexed_attestation`, whose `signature` is already a
/// single aggregate covering every attesting index.
pub fn indexed_attestation_signature_set<'a, E, F>(
    state: &'a BeaconState<E>,
    get_pubkey: F,
    indexed_attestation: &'a IndexedAttestation<E>,
    spec: &'a ChainSpec,
) -> Result<SignatureSet<'a>>
where
    E: EthSpec,
    F: Fn(usize) -> Option<Cow<'a, PublicKey>>,
{
    let mut pubkeys = Vec::with_capacity(indexed_attestation.attesting_indices.len());
    for &validator_idx in indexed_attestation.attesting_indices.iter() {
        pubkeys
            .push(get_pubkey(validator_idx as usize).ok_or(Error::ValidatorUnknown(validator_idx))?);
    }

    let domain = spec.get_domain(
        indexed_attestation.data.target.epoch,
        Domain::BeaconAttester,
        state.fork(),
        state.genesis_validators_root(),
    );

    let message = hash_message(indexed_attestation.data.signing_root(domain));
    let signature = indexed_attestation
        .signature
        .decompress()
        .map_err(|_| Error::SignatureDecompressionFailed)?;

    Ok(SignatureSet::multiple(Cow::Owned(signature), pubkeys, message))
}

/// Returns the signature sets for both halves of an `AttesterSlashing`.
pub fn attester_slashing_signature_sets<'a, E, F>(
    state: &'a BeaconState<E>,
    get_pubkey: F,
    attestation_1: &'a IndexedAttestation<E>,
    attestation_2: &'a IndexedAttestation<E>,
    spec: &'a ChainSpec,
) -> Result<(SignatureSet<'a>, SignatureSet<'a>)>
where
    E: EthSpec,
    F: Fn(usize) -> Option<Cow<'a, PublicKey>> + Clone,
{
    Ok((
        indexed_attestation_signature_set(state, get_pubkey.clone(), attestation_1, spec)?,
        indexed_attestation_signature_set(state, get_pubkey, attestation_2, spec)?,
    ))
}

/// Returns the BLS values in a `Deposit`, if they're all valid. Otherwise, returns `None` — a
/// malformed deposit signature does not invalidate the block, it just forfeits the deposit.
pub fn deposit_pubkey_signature_message(
    deposit_data: &DepositData,
    spec: &ChainSpec,
) -> Option<(PublicKey, bls::Signature, Vec<u8>)> {
    let pubkey = deposit_data.pubkey.decompress().ok()?;
    let signature = deposit_data.signature.decompress().ok()?;
    let domain = spec.get_deposit_domain();
    let deposit_message = types::DepositMessage::from(deposit_data);
    let message = hash_message(deposit_message.signing_root(domain));
    Some((pubkey, signature, message))
}

pub fn deposit_signature_set(deposit: &Deposit, spec: &ChainSpec) -> Option<SignatureSet<'static>> {
    let (pubkey, signature, message) = deposit_pubkey_signature_message(&deposit.data, spec)?;
    Some(SignatureSet::single(
        Cow::Owned(signature),
        Cow::Owned(pubkey),
        message,
    ))
}

/// Returns a signature set that is valid if the `SignedVoluntaryExit` was signed by the indicated
/// validator.
pub fn exit_signature_set<'a, E, F>(
    state: &'a BeaconState<E>,
    get_pubkey: F,
    signed_exit: &'a SignedVoluntaryExit,
    spec: &'a ChainSpec,
) -> Result<SignatureSet<'a>>
where
    E: EthSpec,
    F: Fn(usize) -> Option<Cow<'a, PublicKey>>,
{
    let exit = &signed_exit.message;
    let validator_index = exit.validator_index as usize;

    let domain = spec.get_domain(
        exit.epoch,
        Domain::VoluntaryExit,
        state.fork(),
        state.genesis_validators_root(),
    );

    let message = hash_message(exit.signing_root(domain));
    let signature = signed_exit
        .signature
        .decompress()
        .map_err(|_| Error::SignatureDecompressionFailed)?;

    Ok(SignatureSet::single(
        Cow::Owned(signature),
        get_pubkey(validator_index).ok_or(Error::ValidatorUnknown(validator_index as u64))?,
        message,
    ))
}

/// Returns the signature set for a sync committee's aggregate over the previous slot's block
/// root, restricted to the pubkeys of bits that are actually set. `None` means no committee
/// member participated, in which case there is nothing to check: an all-zero `SyncAggregate` is
/// vacuously valid.
pub fn sync_aggregate_signature_set<'a, E: EthSpec>(
    state: &'a BeaconState<E>,
    sync_aggregate: &'a types::SyncAggregate<E>,
    block_slot: Slot,
    spec: &'a ChainSpec,
) -> Result<Option<SignatureSet<'a>>> {
    let committee = state.current_sync_committee()?;
    let previous_slot = std::cmp::max(block_slot.as_u64(), 1).saturating_sub(1).into();

    let mut pubkeys = Vec::with_capacity(committee.pubkeys.len());
    for (pubkey, bit) in committee
        .pubkeys
        .iter()
        .zip(sync_aggregate.sync_committee_bits.iter())
    {
        if bit {
            pubkeys.push(
                pubkey
                    .decompress()
                    .map_err(|_| Error::SignatureDecompressionFailed)?,
            );
        }
    }
    if pubkeys.is_empty() {
        return Ok(None);
    }

    let domain = spec.get_domain(
        previous_slot.epoch(E::slots_per_epoch()),
        Domain::SyncCommittee,
        state.fork(),
        state.genesis_validators_root(),
    );
    let block_root = state.get_block_root(previous_slot)?;
    let message = hash_message(
        SigningData {
            object_root: block_root,
            domain,
        }
        .tree_hash_root(),
    );

    let signature = sync_aggregate
        .sync_committee_signature
        .decompress()
        .map_err(|_| Error::SignatureDecompressionFailed)?;

    Ok(Some(SignatureSet::multiple(
        Cow::Owned(signature),
        pubkeys.into_iter().map(Cow::Owned).collect(),
        message,
    )))
}
