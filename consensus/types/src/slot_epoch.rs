//! The `Slot` and `Epoch` newtypes, with arithmetic routed through `safe_arith` so that a
//! silent wraparound in consensus-critical counters can never happen.
use crate::consts::GENESIS_EPOCH;
use safe_arith::{ArithError, SafeArith};
use serde::{Deserialize, Serialize};
use ssz::{Decode, DecodeError, Encode};
use std::fmt;
use std::hash::Hash;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use tree_hash::TreeHash;

macro_rules! impl_u64_wrapper {
    ($name: ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            Default,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(n: u64) -> Self {
                Self(n)
            }

            pub const fn as_u64(self) -> u64 {
                self.0
            }

            pub fn as_usize(self) -> usize {
                self.0 as usize
            }

            pub fn safe_add(self, other: impl Into<Self>) -> Result<Self, ArithError> {
                self.0.safe_add(other.into().0).map(Self)
            }

            pub fn safe_add_assign(&mut self, other: impl Into<Self>) -> Result<(), ArithError> {
                self.0.safe_add_assign(other.into().0)
            }

            pub fn safe_sub(self, other: impl Into<Self>) -> Result<Self, ArithError> {
                self.0.safe_sub(other.into().0).map(Self)
            }

            pub fn safe_sub_assign(&mut self, other: impl Into<Self>) -> Result<(), ArithError> {
                self.0.safe_sub_assign(other.into().0)
            }

            pub fn safe_rem(self, other: u64) -> Result<u64, ArithError> {
                self.0.safe_rem(other)
            }

            pub fn saturating_sub(self, other: impl Into<Self>) -> Self {
                Self(self.0.saturating_sub(other.into().0))
            }

            pub fn saturating_add(self, other: impl Into<Self>) -> Self {
                Self(self.0.saturating_add(other.into().0))
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                Self(n)
            }
        }

        impl From<$name> for u64 {
            fn from(n: $name) -> u64 {
                n.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Add<u64> for $name {
            type Output = Self;
            fn add(self, other: u64) -> Self {
                Self(self.0.saturating_add(other))
            }
        }

        impl AddAssign<u64> for $name {
            fn add_assign(&mut self, other: u64) {
                self.0 = self.0.saturating_add(other);
            }
        }

        impl Sub<u64> for $name {
            type Output = Self;
            fn sub(self, other: u64) -> Self {
                Self(self.0.saturating_sub(other))
            }
        }

        impl SubAssign<u64> for $name {
            fn sub_assign(&mut self, other: u64) {
                self.0 = self.0.saturating_sub(other);
            }
        }

        impl Encode for $name {
            fn is_ssz_fixed_len() -> bool {
                <u64 as Encode>::is_ssz_fixed_len()
            }
            fn ssz_fixed_len() -> usize {
                <u64 as Encode>::ssz_fixed_len()
            }
            fn ssz_bytes_len(&self) -> usize {
                self.0.ssz_bytes_len()
            }
            fn ssz_append(&self, buf: &mut Vec<u8>) {
                self.0.ssz_append(buf)
            }
        }

        impl Decode for $name {
            fn is_ssz_fixed_len() -> bool {
                <u64 as Decode>::is_ssz_fixed_len()
            }
            fn ssz_fixed_len() -> usize {
                <u64 as Decode>::ssz_fixed_len()
            }
            fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
                u64::from_ssz_bytes(bytes).map(Self)
            }
        }

        impl TreeHash for $name {
            fn tree_hash_type() -> tree_hash::TreeHashType {
                <u64 as TreeHash>::tree_hash_type()
            }
            fn tree_hash_packed_encoding(&self) -> tree_hash::PackedEncoding {
                self.0.tree_hash_packed_encoding()
            }
            fn tree_hash_packing_factor() -> usize {
                <u64 as TreeHash>::tree_hash_packing_factor()
            }
            fn tree_hash_root(&self) -> tree_hash::Hash256 {
                self.0.tree_hash_root()
            }
        }
    };
}

impl_u64_wrapper!(Slot);
impl_u64_wrapper!(Epoch);

impl Slot {
    /// The epoch containing this slot, for a chain with `slots_per_epoch` slots per epoch.
    pub fn epoch(self, slots_per_epoch: u64) -> Epoch {
        Epoch::new(self.0.checked_div(slots_per_epoch).unwrap_or(0))
    }
}

impl Epoch {
    pub const fn genesis() -> Self {
        GENESIS_EPOCH
    }

    /// The first slot of this epoch.
    pub fn start_slot(self, slots_per_epoch: u64) -> Slot {
        Slot::new(self.0.saturating_mul(slots_per_epoch))
    }

    /// The epoch immediately prior, saturating at zero.
    pub fn saturating_prev(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_roundtrip() {
        let slot = Slot::new(130);
        assert_eq!(slot.epoch(32), Epoch::new(4));
        assert_eq!(Epoch::new(4).start_slot(32), Slot::new(128));
    }

    #[test]
    fn safe_arith_detects_underflow() {
        assert!(Slot::new(0).safe_sub(Slot::new(1)).is_err());
    }
}
