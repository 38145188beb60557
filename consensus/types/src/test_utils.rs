//! Deterministic validator key generation for tests and local genesis construction. Real
//! networks never call this: every key here is derived from its validator index, not randomness.
use crate::{ChainSpec, Hash256};
use bls::{Keypair, PublicKeyBytes, SecretKey};

/// Builds `count` keypairs whose secret keys are `SecretKey::deterministic(i)` for `i` in
/// `0..count`, so that test fixtures are reproducible across runs without persisting key
/// material anywhere.
pub fn generate_deterministic_keypairs(count: usize) -> Vec<Keypair> {
    (0..count)
        .map(|i| {
            let sk = SecretKey::deterministic(i as u64);
            let pk = sk.public_key();
            Keypair::new(sk, pk)
        })
        .collect()
}

/// BLS withdrawal credentials (`0x00` prefix + the low 31 bytes of `hash(pubkey)`) for a
/// validator whose withdrawal key is `pubkey`, as required by `DepositMessage` construction.
pub fn bls_withdrawal_credentials(pubkey: &PublicKeyBytes, spec: &ChainSpec) -> Hash256 {
    let hashed = ethereum_hashing::hash(&pubkey.serialize());
    let mut credentials = [0u8; 32];
    credentials.copy_from_slice(&hashed);
    credentials[0] = spec.bls_withdrawal_prefix_byte;
    Hash256::from(credentials)
}
