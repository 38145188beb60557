use crate::{Error, PublicKey, Signature};

/// The elementwise sum of a set of signatures over distinct (or, when aggregating a
/// `SyncAggregate`, possibly identical) messages.
#[derive(Clone)]
pub struct AggregateSignature(blst::min_pk::AggregateSignature);

impl AggregateSignature {
    pub fn infinity() -> Self {
        let empty = blst::min_pk::Signature::from_bytes(&[0u8; 96]).unwrap_or_else(|_| {
            // The identity point's compressed form has its infinity bit set and every other
            // bit zero; blst accepts it once that bit is set.
            let mut bytes = [0u8; 96];
            bytes[0] = 0xc0;
            blst::min_pk::Signature::from_bytes(&bytes)
                .expect("the compressed identity point is always a valid signature encoding")
        });
        Self(blst::min_pk::AggregateSignature::from_signature(&empty))
    }

    pub fn add_assign(&mut self, other: &Signature) {
        self.0
            .add_signature(other.raw(), true)
            .expect("points from a validated Signature always lie on the curve");
    }

    pub fn serialize(&self) -> [u8; 96] {
        self.0.to_signature().compress()
    }

    /// Fast aggregate verify: every signer attested to the same `msg`.
    pub fn fast_aggregate_verify(&self, msg: &[u8], pubkeys: &[&PublicKey]) -> bool {
        if pubkeys.is_empty() {
            return false;
        }
        let sig = self.0.to_signature();
        let raw_pubkeys: Vec<&blst::min_pk::PublicKey> = pubkeys.iter().map(|pk| pk.raw()).collect();
        sig.fast_aggregate_verify(true, msg, crate::DST, &raw_pubkeys)
            == blst::BLST_ERROR::BLST_SUCCESS
    }
}

impl Default for AggregateSignature {
    fn default() -> Self {
        Self::infinity()
    }
}
