use crate::{PublicKey, SecretKey};

/// A secret key paired with its public key, the unit test fixtures and key-generation tooling
/// pass around instead of a bare `SecretKey`.
pub struct Keypair {
    pub sk: SecretKey,
    pub pk: PublicKey,
}

impl Keypair {
    pub fn new(sk: SecretKey, pk: PublicKey) -> Self {
        Self { sk, pk }
    }

    pub fn random() -> Self {
        let sk = SecretKey::random();
        let pk = sk.public_key();
        Self { sk, pk }
    }
}
