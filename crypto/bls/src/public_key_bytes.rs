use crate::{Error, PublicKey};
use serde::de::{Error as DeError, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ssz::{Decode, DecodeError, Encode};
use std::fmt;
use std::hash::{Hash, Hasher};
use tree_hash::TreeHash;

pub const PUBLIC_KEY_BYTES_LEN: usize = 48;

/// The wire/SSZ form of a BLS public key: 48 compressed bytes, cheap to copy and hash, decoded
/// into a `PublicKey` only when a signature actually needs verifying.
#[derive(Clone, Copy)]
pub struct PublicKeyBytes([u8; PUBLIC_KEY_BYTES_LEN]);

impl PublicKeyBytes {
    pub(crate) fn from_raw(bytes: [u8; PUBLIC_KEY_BYTES_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != PUBLIC_KEY_BYTES_LEN {
            return Err(Error::InvalidPublicKeyLength);
        }
        let mut arr = [0u8; PUBLIC_KEY_BYTES_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    pub fn serialize(&self) -> [u8; PUBLIC_KEY_BYTES_LEN] {
        self.0
    }

    /// Decompresses into a curve point, failing if the bytes are not a valid, subgroup-checked
    /// public key.
    pub fn decompress(&self) -> Result<PublicKey, Error> {
        PublicKey::deserialize(&self.0)
    }
}

impl Default for PublicKeyBytes {
    fn default() -> Self {
        Self([0; PUBLIC_KEY_BYTES_LEN])
    }
}

impl PartialEq for PublicKeyBytes {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for PublicKeyBytes {}

impl Hash for PublicKeyBytes {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl fmt::Debug for PublicKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for PublicKeyBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(self.0)))
    }
}

impl<'de> Deserialize<'de> for PublicKeyBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HexVisitor;
        impl Visitor<'_> for HexVisitor {
            type Value = PublicKeyBytes;
            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a 0x-prefixed hex string of 48 bytes")
            }
            fn visit_str<E: DeError>(self, value: &str) -> Result<Self::Value, E> {
                let bytes = hex::decode(value.trim_start_matches("0x")).map_err(E::custom)?;
                PublicKeyBytes::from_bytes(&bytes).map_err(E::custom)
            }
        }
        deserializer.deserialize_str(HexVisitor)
    }
}

impl Encode for PublicKeyBytes {
    fn is_ssz_fixed_len() -> bool {
        true
    }
    fn ssz_fixed_len() -> usize {
        PUBLIC_KEY_BYTES_LEN
    }
    fn ssz_bytes_len(&self) -> usize {
        PUBLIC_KEY_BYTES_LEN
    }
    fn ssz_append(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.0)
    }
}

impl Decode for PublicKeyBytes {
    fn is_ssz_fixed_len() -> bool {
        true
    }
    fn ssz_fixed_len() -> usize {
        PUBLIC_KEY_BYTES_LEN
    }
    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        PublicKeyBytes::from_bytes(bytes)
            .map_err(|_| DecodeError::InvalidByteLength {
                len: bytes.len(),
                expected: PUBLIC_KEY_BYTES_LEN,
            })
    }
}

impl TreeHash for PublicKeyBytes {
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
