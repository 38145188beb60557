use crate::{Error, PublicKey, Signature};
use rand::RngCore;
use zeroize::Zeroize;

/// A BLS12-381 secret scalar. Never `Clone`, never `Debug`, and zeroized on drop, so that a
/// panic unwind or a stray log line can't leak it.
pub struct SecretKey(blst::min_pk::SecretKey);

impl Drop for SecretKey {
    fn drop(&mut self) {
        // `blst::min_pk::SecretKey` stores its scalar inline; overwrite it through its byte
        // serialization round-trip so the drop glue doesn't optimize the zeroing away.
        let mut bytes = self.serialize();
        bytes.zeroize();
    }
}

impl SecretKey {
    pub fn random() -> Self {
        let mut ikm = [0u8; 32];
        rand::rng().fill_bytes(&mut ikm);
        let key = blst::min_pk::SecretKey::key_gen(&ikm, &[])
            .expect("32 bytes of IKM always exceeds blst's minimum length");
        ikm.zeroize();
        Self(key)
    }

    /// Derives a secret key deterministically from `validator_index`, for test fixtures and
    /// local genesis construction only — never use outside tests.
    pub fn deterministic(validator_index: u64) -> Self {
        let mut ikm = [0u8; 32];
        ikm[..8].copy_from_slice(&validator_index.to_le_bytes());
        let key = blst::min_pk::SecretKey::key_gen(&ikm, &[])
            .expect("32 bytes of IKM always exceeds blst's minimum length");
        Self(key)
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_raw(self.0.sk_to_pk())
    }

    pub fn sign(&self, msg: &[u8]) -> Signature {
        let sig = self.0.sign(msg, crate::DST, &[]);
        Signature::from_raw(sig)
    }

    pub fn serialize(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != 32 {
            return Err(Error::InvalidSecretKeyLength);
        }
        let key = blst::min_pk::SecretKey::from_bytes(bytes).map_err(Error::from)?;
        Ok(Self(key))
    }
}
