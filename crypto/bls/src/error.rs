use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidSecretKeyLength,
    InvalidPublicKeyLength,
    InvalidSignatureLength,
    InvalidByteLength { got: usize, expected: usize },
    BlstError(BlstErrorWrapper),
    InvalidInfinityPublicKey,
    ZeroSecretKey,
    EmptyAggregate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlstErrorWrapper(pub(crate) u32);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for Error {}

#[cfg(feature = "supranational")]
impl From<blst::BLST_ERROR> for Error {
    fn from(e: blst::BLST_ERROR) -> Self {
        Error::BlstError(BlstErrorWrapper(e as u32))
    }
}
