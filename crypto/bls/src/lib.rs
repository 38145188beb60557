//! BLS12-381 signatures over `blst`'s min-pubkey-size variant (48-byte public keys, 96-byte
//! signatures), the configuration every consensus signature in this workspace uses.
mod aggregate_signature;
mod error;
mod keypair;
mod public_key;
mod public_key_bytes;
mod secret_key;
mod signature;
mod signature_bytes;
mod signature_set;

pub use aggregate_signature::AggregateSignature;
pub use error::Error;
pub use keypair::Keypair;
pub use public_key::PublicKey;
pub use public_key_bytes::PublicKeyBytes;
pub use secret_key::SecretKey;
pub use signature::Signature;
pub use signature_bytes::SignatureBytes;
pub use signature_set::{verify_signature_sets, SignatureSet};

/// Ciphersuite identifier for proof-of-possession signing, shared by every domain-separated
/// signature this workspace produces.
pub const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_round_trip() {
        let sk = SecretKey::deterministic(7);
        let pk = sk.public_key();
        let msg = b"attestation data root";
        let sig = sk.sign(msg);
        assert!(sig.verify(&pk, msg));
        assert!(!sig.verify(&pk, b"a different message"));
    }

    #[test]
    fn aggregate_verify() {
        let keypairs: Vec<Keypair> = (0..4).map(|_| Keypair::random()).collect();
        let msg = b"sync committee root";
        let mut agg = AggregateSignature::infinity();
        for kp in &keypairs {
            agg.add_assign(&kp.sk.sign(msg));
        }
        let pubkeys: Vec<&PublicKey> = keypairs.iter().map(|kp| &kp.pk).collect();
        assert!(agg.fast_aggregate_verify(msg, &pubkeys));
    }

    #[test]
    fn public_key_bytes_round_trip_through_ssz() {
        use ssz::{Decode, Encode};
        let sk = SecretKey::deterministic(1);
        let pk_bytes = sk.public_key().compress();
        let encoded = pk_bytes.as_ssz_bytes();
        let decoded = PublicKeyBytes::from_ssz_bytes(&encoded).unwrap();
        assert_eq!(pk_bytes, decoded);
    }
}
