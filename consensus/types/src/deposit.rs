use crate::{Hash256, PublicKeyBytes, SignatureBytes};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// The unsigned content of a deposit, hashed to produce the deposit tree leaf and, separately,
/// signed with `domain_deposit` to authorize the deposit.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TreeHash,
)]
pub struct DepositData {
    pub pubkey: PublicKeyBytes,
    pub withdrawal_credentials: Hash256,
    #[serde(with = "serde_utils::quoted_u64")]
    pub amount: u64,
    pub signature: SignatureBytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct DepositMessage {
    pub pubkey: PublicKeyBytes,
    pub withdrawal_credentials: Hash256,
    #[serde(with = "serde_utils::quoted_u64")]
    pub amount: u64,
}

impl From<&DepositData> for DepositMessage {
    fn from(data: &DepositData) -> Self {
        DepositMessage {
            pubkey: data.pubkey,
            withdrawal_credentials: data.withdrawal_credentials,
            amount: data.amount,
        }
    }
}

/// A deposit plus the Merkle proof that `data`'s hash-tree-root is the leaf at `index` in the
/// deposit contract's trie, verified against `Eth1Data::deposit_root` before being applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct Deposit {
    pub proof: ssz_types::FixedVector<Hash256, ssz_types::typenum::U33>,
    pub data: DepositData,
}
