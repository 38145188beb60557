use crate::{Error, PublicKeyBytes};

#[derive(Clone)]
pub struct PublicKey(blst::min_pk::PublicKey);

impl PublicKey {
    pub(crate) fn from_raw(raw: blst::min_pk::PublicKey) -> Self {
        Self(raw)
    }

    pub fn serialize(&self) -> [u8; 48] {
        self.0.compress()
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != 48 {
            return Err(Error::InvalidPublicKeyLength);
        }
        let raw = blst::min_pk::PublicKey::key_validate(bytes).map_err(Error::from)?;
        Ok(Self(raw))
    }

    pub fn compress(&self) -> PublicKeyBytes {
        PublicKeyBytes::from_raw(self.serialize())
    }

    pub(crate) fn raw(&self) -> &blst::min_pk::PublicKey {
        &self.0
    }

    /// Sums `pubkeys` into a single public key, as sync committees do to get one key that
    /// verifies a signature from the whole committee at once.
    pub fn aggregate(pubkeys: &[&PublicKey]) -> Result<Self, Error> {
        if pubkeys.is_empty() {
            return Err(Error::EmptyAggregate);
        }
        let raw_pubkeys: Vec<&blst::min_pk::PublicKey> = pubkeys.iter().map(|pk| pk.raw()).collect();
        let aggregate = blst::min_pk::AggregatePublicKey::aggregate(&raw_pubkeys, true)
            .map_err(Error::from)?;
        Ok(Self(aggregate.to_public_key()))
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.serialize() == other.serialize()
    }
}

impl Eq for PublicKey {}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.serialize()))
    }
}
