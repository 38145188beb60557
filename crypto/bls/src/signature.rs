use crate::{Error, PublicKey};

#[derive(Clone)]
pub struct Signature(blst::min_pk::Signature);

impl Signature {
    pub(crate) fn from_raw(raw: blst::min_pk::Signature) -> Self {
        Self(raw)
    }

    pub fn serialize(&self) -> [u8; 96] {
        self.0.compress()
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != 96 {
            return Err(Error::InvalidSignatureLength);
        }
        let raw = blst::min_pk::Signature::sig_validate(bytes, true).map_err(Error::from)?;
        Ok(Self(raw))
    }

    pub fn verify(&self, pubkey: &PublicKey, msg: &[u8]) -> bool {
        self.0.verify(true, msg, crate::DST, &[], pubkey.raw(), true) == blst::BLST_ERROR::BLST_SUCCESS
    }

    pub(crate) fn raw(&self) -> &blst::min_pk::Signature {
        &self.0
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.serialize() == other.serialize()
    }
}
