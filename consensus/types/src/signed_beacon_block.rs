use crate::{BeaconBlock, EthSpec, Hash256, SignatureBytes, Slot};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "E: EthSpec")]
pub struct SignedBeaconBlock<E: EthSpec> {
    pub message: BeaconBlock<E>,
    pub signature: SignatureBytes,
}

impl<E: EthSpec> SignedBeaconBlock<E> {
    pub fn slot(&self) -> Slot {
        self.message.slot()
    }

    pub fn parent_root(&self) -> Hash256 {
        self.message.parent_root()
    }

    pub fn canonical_root(&self) -> Hash256 {
        self.message.canonical_root()
    }
}
