//! Every named reason a single block operation (header, RANDAO, eth1 vote, proposer slashing,
//! attester slashing, attestation, deposit, voluntary exit) can be rejected, plus the umbrella
//! wrapper these reasons ride inside and the conversion into `BlockProcessingError`.
use super::signature_sets::Error as SignatureSetError;
use types::*;

/// A block operation was invalid for the reason `T`, or the state/arithmetic underneath it
/// couldn't be consulted at all. The latter two variants mean "we don't know if this is valid",
/// unlike `Invalid` which means "this is definitely not valid".
#[derive(Debug, PartialEq, Clone)]
pub enum BlockOperationError<T> {
    Invalid(T),
    BeaconStateError(BeaconStateError),
    SignatureSetError(SignatureSetError),
    ArithError(safe_arith::ArithError),
}

impl<T> BlockOperationError<T> {
    pub fn invalid(reason: T) -> Self {
        BlockOperationError::Invalid(reason)
    }
}

impl<T> From<BeaconStateError> for BlockOperationError<T> {
    fn from(e: BeaconStateError) -> Self {
        BlockOperationError::BeaconStateError(e)
    }
}

impl<T> From<SignatureSetError> for BlockOperationError<T> {
    fn from(e: SignatureSetError) -> Self {
        BlockOperationError::SignatureSetError(e)
    }
}

impl<T> From<safe_arith::ArithError> for BlockOperationError<T> {
    fn from(e: safe_arith::ArithError) -> Self {
        BlockOperationError::ArithError(e)
    }
}

/// Folds a `BlockOperationError<T>` plus the index of the failing list entry into the umbrella
/// `BlockProcessingError`, so callers processing e.g. `body.attestations` can report which
/// attestation in the list was the problem.
pub trait IntoWithIndex<U> {
    fn into_with_index(self, index: usize) -> U;
}

macro_rules! impl_into_with_index_without_beacon_error {
    ($error_ty: ty, $invalid_variant: ident) => {
        impl IntoWithIndex<BlockProcessingError> for BlockOperationError<$error_ty> {
            fn into_with_index(self, index: usize) -> BlockProcessingError {
                match self {
                    BlockOperationError::Invalid(e) => {
                        BlockProcessingError::$invalid_variant { index, reason: e }
                    }
                    BlockOperationError::BeaconStateError(e) => e.into(),
                    BlockOperationError::SignatureSetError(e) => {
                        BlockProcessingError::SignatureSetError(e)
                    }
                    BlockOperationError::ArithError(e) => BlockProcessingError::ArithError(e),
                }
            }
        }
    };
}

impl_into_with_index_without_beacon_error!(ProposerSlashingInvalid, ProposerSlashingInvalid);
impl_into_with_index_without_beacon_error!(AttesterSlashingInvalid, AttesterSlashingInvalid);
impl_into_with_index_without_beacon_error!(AttestationInvalid, AttestationInvalid);
impl_into_with_index_without_beacon_error!(DepositInvalid, DepositInvalid);
impl_into_with_index_without_beacon_error!(ExitInvalid, ExitInvalid);

#[derive(Debug, PartialEq, Clone)]
pub enum BlockProcessingError {
    BeaconStateError(BeaconStateError),
    SignatureSetError(SignatureSetError),
    SszTypesError(ssz_types::Error),
    ArithError(safe_arith::ArithError),
    HeaderInvalid { reason: HeaderInvalid },
    RandaoSignatureInvalid { reason: RandaoInvalid },
    Eth1DataInvalid { reason: Eth1DataInvalid },
    ProposerSlashingInvalid { index: usize, reason: ProposerSlashingInvalid },
    AttesterSlashingInvalid { index: usize, reason: AttesterSlashingInvalid },
    AttestationInvalid { index: usize, reason: AttestationInvalid },
    DepositInvalid { index: usize, reason: DepositInvalid },
    ExitInvalid { index: usize, reason: ExitInvalid },
    TooManyProposerSlashings { max: usize, found: usize },
    TooManyAttesterSlashings { max: usize, found: usize },
    TooManyAttestations { max: usize, found: usize },
    TooManyDeposits { max: usize, found: usize },
    DepositCountInvalid { expected: usize, found: usize },
    TooManyExits { max: usize, found: usize },
    InvalidFlagIndex(usize),
    SyncAggregateSignatureInvalid,
}

impl From<InvalidFlagIndex> for BlockProcessingError {
    fn from(e: InvalidFlagIndex) -> Self {
        BlockProcessingError::InvalidFlagIndex(e.0)
    }
}

impl From<BeaconStateError> for BlockProcessingError {
    fn from(e: BeaconStateError) -> Self {
        BlockProcessingError::BeaconStateError(e)
    }
}

impl From<SignatureSetError> for BlockProcessingError {
    fn from(e: SignatureSetError) -> Self {
        BlockProcessingError::SignatureSetError(e)
    }
}

impl From<ssz_types::Error> for BlockProcessingError {
    fn from(e: ssz_types::Error) -> Self {
        BlockProcessingError::SszTypesError(e)
    }
}

impl From<safe_arith::ArithError> for BlockProcessingError {
    fn from(e: safe_arith::ArithError) -> Self {
        BlockProcessingError::ArithError(e)
    }
}

impl From<BlockOperationError<HeaderInvalid>> for BlockProcessingError {
    fn from(e: BlockOperationError<HeaderInvalid>) -> Self {
        match e {
            BlockOperationError::Invalid(reason) => BlockProcessingError::HeaderInvalid { reason },
            BlockOperationError::BeaconStateError(e) => e.into(),
            BlockOperationError::SignatureSetError(e) => e.into(),
            BlockOperationError::ArithError(e) => e.into(),
        }
    }
}

impl From<BlockOperationError<RandaoInvalid>> for BlockProcessingError {
    fn from(e: BlockOperationError<RandaoInvalid>) -> Self {
        match e {
            BlockOperationError::Invalid(reason) => BlockProcessingError::RandaoSignatureInvalid { reason },
            BlockOperationError::BeaconStateError(e) => e.into(),
            BlockOperationError::SignatureSetError(e) => e.into(),
            BlockOperationError::ArithError(e) => e.into(),
        }
    }
}

impl From<BlockOperationError<Eth1DataInvalid>> for BlockProcessingError {
    fn from(e: BlockOperationError<Eth1DataInvalid>) -> Self {
        match e {
            BlockOperationError::Invalid(reason) => BlockProcessingError::Eth1DataInvalid { reason },
            BlockOperationError::BeaconStateError(e) => e.into(),
            BlockOperationError::SignatureSetError(e) => e.into(),
            BlockOperationError::ArithError(e) => e.into(),
        }
    }
}

/// Reasons `process_block_header` can reject a block.
#[derive(Debug, PartialEq, Clone)]
pub enum HeaderInvalid {
    StateSlotMismatch { state: Slot, block: Slot },
    ParentNotLatestBlock { expected: Hash256, found: Hash256 },
    ProposerSlashed(u64),
    ProposerIndexMismatch { block: u64, local_shuffling: u64 },
    ProposerSignatureInvalid,
}

/// `process_randao` rejects a block only if the reveal doesn't verify.
#[derive(Debug, PartialEq, Clone)]
pub enum RandaoInvalid {
    BadSignature,
}

/// `process_eth1_data` has no rejection path in this scope; kept for symmetry with the other
/// operation modules and in case a future vote-threshold check needs one.
#[derive(Debug, PartialEq, Clone)]
pub enum Eth1DataInvalid {}

#[derive(Debug, PartialEq, Clone)]
pub enum ProposerSlashingInvalid {
    ProposersDiffer { proposer_1: u64, proposer_2: u64 },
    SlotMismatch { slot_1: Slot, slot_2: Slot },
    ProposerEpochMismatch { epoch_1: Epoch, epoch_2: Epoch },
    HeadersIdentical,
    ProposerUnknown(u64),
    ProposerNotSlashable(u64),
    BadProposerSignature,
}

#[derive(Debug, PartialEq, Clone)]
pub enum AttesterSlashingInvalid {
    NotSlashable,
    IndexedAttestationInvalid(Box<AttestationInvalid>),
    NoSlashableIndices,
}

#[derive(Debug, PartialEq, Clone)]
pub enum AttestationInvalid {
    BadCommitteeIndex,
    IncludedTooEarly { state: Slot, delay: u64, attestation: Slot },
    IncludedTooLate { state: Slot, attestation: Slot },
    TargetEpochSlotMismatch { target_epoch: Epoch, slot_epoch: Epoch },
    WrongJustifiedCheckpoint { state: Box<Checkpoint>, attestation: Box<Checkpoint>, is_current: bool },
    BadSignature,
    BadAggregationBitlen,
    BadIndices,
    NotSorted,
}

#[derive(Debug, PartialEq, Clone)]
pub enum DepositInvalid {
    BadMerkleProof,
    BadSignature,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ExitInvalid {
    FutureEpoch { state: Epoch, exit: Epoch },
    ValidatorUnknown(u64),
    NotActive(u64),
    AlreadyExited(u64),
    TooYoungToExit { current_epoch: Epoch, earliest_exit_epoch: Epoch },
    BadSignature,
}
