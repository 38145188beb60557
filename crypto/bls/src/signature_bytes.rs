use crate::{Error, Signature};
use serde::de::{Error as DeError, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ssz::{Decode, DecodeError, Encode};
use std::fmt;
use tree_hash::TreeHash;

pub const SIGNATURE_BYTES_LEN: usize = 96;

/// The wire/SSZ form of a BLS signature: 96 compressed bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct SignatureBytes([u8; SIGNATURE_BYTES_LEN]);

impl SignatureBytes {
    pub fn empty() -> Self {
        Self([0; SIGNATURE_BYTES_LEN])
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != SIGNATURE_BYTES_LEN {
            return Err(Error::InvalidSignatureLength);
        }
        let mut arr = [0u8; SIGNATURE_BYTES_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    pub fn serialize(&self) -> [u8; SIGNATURE_BYTES_LEN] {
        self.0
    }

    pub fn decompress(&self) -> Result<Signature, Error> {
        Signature::deserialize(&self.0)
    }
}

impl Default for SignatureBytes {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for SignatureBytes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for SignatureBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(self.0)))
    }
}

impl<'de> Deserialize<'de> for SignatureBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HexVisitor;
        impl Visitor<'_> for HexVisitor {
            type Value = SignatureBytes;
            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a 0x-prefixed hex string of 96 bytes")
            }
            fn visit_str<E: DeError>(self, value: &str) -> Result<Self::Value, E> {
                let bytes = hex::decode(value.trim_start_matches("0x")).map_err(E::custom)?;
                SignatureBytes::from_bytes(&bytes).map_err(E::custom)
            }
        }
        deserializer.deserialize_str(HexVisitor)
    }
}

impl Encode for SignatureBytes {
    fn is_ssz_fixed_len() -> bool {
        true
    }
    fn ssz_fixed_len() -> usize {
        SIGNATURE_BYTES_LEN
    }
    fn ssz_bytes_len(&self) -> usize {
        SIGNATURE_BYTES_LEN
    }
    fn ssz_append(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.0)
    }
}

impl Decode for SignatureBytes {
    fn is_ssz_fixed_len() -> bool {
        true
    }
    fn ssz_fixed_len() -> usize {
        SIGNATURE_BYTES_LEN
    }
    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        SignatureBytes::from_bytes(bytes).map_err(|_| DecodeError::InvalidByteLength {
            len: bytes.len(),
            expected: SIGNATURE_BYTES_LEN,
        })
    }
}

impl TreeHash for SignatureBytes {
    fn tree_hash_type() -> tree_hash::TreeHashType {
        tree_hash::TreeHashType::Vector
    }
    fn tree_hash_packed_encoding(&self) -> tree_hash::PackedEncoding {
        unreachable!("Vector of u8 should never be packed.")
    }
    fn tree_hash_packing_factor() -> usize {
        unreachable!("Vector of u8 should never be packed.")
    }
    fn tree_hash_root(&self) -> tree_hash::Hash256 {
        tree_hash::merkle_root(&self.0, 0)
    }
}
