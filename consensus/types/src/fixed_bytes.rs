//! Small ergonomic extensions over `alloy_primitives`'s fixed-size byte arrays, folded in from
//! the teacher's now-standalone `fixed_bytes` crate since this workspace only needs the `Hash256`
//! convenience constructors, not a crate boundary of its own.
use alloy_primitives::B256;
use rand::RngCore;

pub trait FixedBytesExtended {
    fn zero() -> Self;
    fn repeat_byte(byte: u8) -> Self;
    fn random() -> Self;
}

impl FixedBytesExtended for B256 {
    fn zero() -> Self {
        B256::ZERO
    }

    fn repeat_byte(byte: u8) -> Self {
        B256::new([byte; 32])
    }

    fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        B256::new(bytes)
    }
}
