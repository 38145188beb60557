use crate::{PublicKey, Signature};
use std::borrow::Cow;

/// One signature to verify, together with every `(pubkey, message)` pair it is claimed to cover.
/// Block processing collects one `SignatureSet` per signed object (block, each attestation,
/// each slashing, ...) and verifies them all in a single batched call rather than one at a time.
pub struct SignatureSet<'a> {
    pub signature: Cow<'a, Signature>,
    pub signing_keys: Vec<Cow<'a, PublicKey>>,
    pub message: Vec<u8>,
}

impl<'a> SignatureSet<'a> {
    pub fn single(
        signature: Cow<'a, Signature>,
        signing_key: Cow<'a, PublicKey>,
        message: Vec<u8>,
    ) -> Self {
        Self {
            signature,
            signing_keys: vec![signing_key],
            message,
        }
    }

    /// A signature already aggregated on-chain (a `SignedVoluntaryExit`'s isn't, but an
    /// `IndexedAttestation`'s is) checked against every key that contributed to it.
    pub fn multiple(
        signature: Cow<'a, Signature>,
        signing_keys: Vec<Cow<'a, PublicKey>>,
        message: Vec<u8>,
    ) -> Self {
        Self {
            signature,
            signing_keys,
            message,
        }
    }

    /// Verifies this one set on its own: if every key signed the same `message`, a fast
    /// aggregate check; the multi-message batch path lives in `verify_signature_sets`.
    pub fn verify(&self) -> bool {
        if self.signing_keys.len() == 1 {
            return self
                .signature
                .verify(self.signing_keys[0].as_ref(), &self.message);
        }
        let mut aggregate = crate::AggregateSignature::infinity();
        aggregate.add_assign(&self.signature);
        let refs: Vec<&PublicKey> = self.signing_keys.iter().map(|k| k.as_ref()).collect();
        aggregate.fast_aggregate_verify(&self.message, &refs)
    }
}

/// Verifies many independently-constructed `SignatureSet`s, short-circuiting on the first
/// failure. A production verifier would batch these into one multi-pairing; this crate's scope
/// stops at "reject the block if any signature is wrong", so sets are checked one at a time.
pub fn verify_signature_sets<'a>(mut sets: impl Iterator<Item = SignatureSet<'a>>) -> bool {
    sets.all(|set| set.verify())
}
