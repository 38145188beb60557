use crate::Epoch;
use std::fmt;

/// An epoch expressed relative to a state's current epoch, the unit committee/shuffling caches
/// are keyed on so a single state can answer "who is on the committee" for the three epochs it
/// actually has shuffling data for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelativeEpoch {
    Previous,
    Current,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochTooLow {
    pub base: Epoch,
    pub other: Epoch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochTooHigh {
    pub base: Epoch,
    pub other: Epoch,
}

impl fmt::Display for EpochTooLow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "epoch {} is more than one behind base epoch {}", self.other, self.base)
    }
}

impl fmt::Display for EpochTooHigh {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "epoch {} is more than one ahead of base epoch {}", self.other, self.base)
    }
}

impl RelativeEpoch {
    pub fn into_epoch(self, base: Epoch) -> Epoch {
        match self {
            RelativeEpoch::Previous => base.saturating_prev(),
            RelativeEpoch::Current => base,
            RelativeEpoch::Next => base.safe_add(Epoch::new(1)).unwrap_or(base),
        }
    }

    /// Maps `other` into a `RelativeEpoch` against `base`, failing if `other` is more than one
    /// epoch away in either direction.
    pub fn from_epoch(base: Epoch, other: Epoch) -> Result<Self, RelativeEpochError> {
        if other == base.saturating_prev() && other != base {
            Ok(RelativeEpoch::Previous)
        } else if other == base {
            Ok(RelativeEpoch::Current)
        } else if other == base.safe_add(Epoch::new(1)).unwrap_or(base) && other != base {
            Ok(RelativeEpoch::Next)
        } else if other < base {
            Err(RelativeEpochError::EpochTooLow(EpochTooLow { base, other }))
        } else {
            Err(RelativeEpochError::EpochTooHigh(EpochTooHigh { base, other }))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeEpochError {
    EpochTooLow(EpochTooLow),
    EpochTooHigh(EpochTooHigh),
}

impl fmt::Display for RelativeEpochError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RelativeEpochError::EpochTooLow(e) => e.fmt(f),
            RelativeEpochError::EpochTooHigh(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for RelativeEpochError {}
