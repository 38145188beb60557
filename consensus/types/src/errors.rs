use crate::*;
use std::fmt;

/// Every way a read or write against a `BeaconState` can fail: index out of range, asking for
/// an epoch the shuffling cache doesn't cover, a list hitting its SSZ bound, or arithmetic that
/// would otherwise silently wrap.
#[derive(Debug, PartialEq, Clone)]
pub enum BeaconStateError {
    UnknownValidator(usize),
    UnknownHistoricalRootsIndex(u64),
    SlotOutOfBounds,
    UnknownValidatorPubkey,
    PubkeyCacheInconsistent,
    PubkeyCacheIncomplete {
        cache_len: usize,
        registry_len: usize,
    },
    CommitteeCacheUninitialized(Option<RelativeEpoch>),
    RelativeEpochError(RelativeEpochError),
    SszTypesError(ssz_types::Error),
    ArithError(safe_arith::ArithError),
    InsufficientValidators,
    InsufficientRandaoMixes,
    InsufficientBlockRoots,
    InsufficientStateRoots,
    InsufficientHistoricalRoots,
    NoCommitteeFound {
        slot: Slot,
        index: u64,
    },
    UnknownEpoch(Epoch),
    NotAltairState,
    InconsistentFork,
    IncorrectAttestationSource,
}

impl From<RelativeEpochError> for BeaconStateError {
    fn from(e: RelativeEpochError) -> Self {
        BeaconStateError::RelativeEpochError(e)
    }
}

impl From<ssz_types::Error> for BeaconStateError {
    fn from(e: ssz_types::Error) -> Self {
        BeaconStateError::SszTypesError(e)
    }
}

impl From<safe_arith::ArithError> for BeaconStateError {
    fn from(e: safe_arith::ArithError) -> Self {
        BeaconStateError::ArithError(e)
    }
}

impl fmt::Display for BeaconStateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for BeaconStateError {}
