//! Core SSZ containers, the `BeaconState` state machine, and the `ChainSpec`/`EthSpec`
//! configuration surface shared by every crate in this workspace.
pub mod attestation;
pub mod attestation_data;
pub mod beacon_block;
pub mod beacon_block_body;
pub mod beacon_block_header;
pub mod beacon_state;
pub mod chain_spec;
pub mod checkpoint;
pub mod consts;
pub mod deposit;
pub mod errors;
pub mod eth1_data;
pub mod eth_spec;
pub mod fixed_bytes;
pub mod fork;
pub mod fork_data;
pub mod historical_batch;
pub mod indexed_attestation;
pub mod participation_flags;
pub mod pending_attestation;
pub mod relative_epoch;
pub mod signed_beacon_block;
pub mod signing_data;
pub mod slashings;
pub mod slot_epoch;
pub mod sync_committee;
pub mod test_utils;
pub mod validator;
pub mod voluntary_exit;

pub use attestation::Attestation;
pub use attestation_data::AttestationData;
pub use beacon_block::{BeaconBlock, BeaconBlockAltair, BeaconBlockBase};
pub use beacon_block_body::{BeaconBlockBody, BeaconBlockBodyAltair, BeaconBlockBodyBase};
pub use beacon_block_header::{BeaconBlockHeader, SignedBeaconBlockHeader};
pub use beacon_state::{
    BeaconState, BeaconStateAltair, BeaconStateBase, BeaconStateCaches, Committee, CommitteeCache,
    ExitCache, PubkeyCache, TreeHashCache,
};
pub use bls::{AggregateSignature, Keypair, PublicKey, PublicKeyBytes, SecretKey, Signature,
    SignatureBytes};
pub use chain_spec::{ChainSpec, Domain};
pub use checkpoint::Checkpoint;
pub use consts::*;
pub use deposit::{Deposit, DepositData, DepositMessage};
pub use errors::BeaconStateError;
pub use eth1_data::Eth1Data;
pub use eth_spec::{EthSpec, MainnetEthSpec, MinimalEthSpec};
pub use fixed_bytes::FixedBytesExtended;
pub use fork::Fork;
pub use fork_data::ForkData;
pub use historical_batch::HistoricalBatch;
pub use indexed_attestation::IndexedAttestation;
pub use participation_flags::{InvalidFlagIndex, ParticipationFlags};
pub use pending_attestation::PendingAttestation;
pub use relative_epoch::{EpochTooHigh, EpochTooLow, RelativeEpoch, RelativeEpochError};
pub use signed_beacon_block::SignedBeaconBlock;
pub use signing_data::{SignedRoot, SigningData};
pub use slashings::{AttesterSlashing, ProposerSlashing};
pub use slot_epoch::{Epoch, Slot};
pub use sync_committee::{SyncAggregate, SyncCommittee};
pub use validator::Validator;
pub use voluntary_exit::{SignedVoluntaryExit, VoluntaryExit};

pub use tree_hash::Hash256;

pub use ssz_types;
pub use ssz_types::typenum;
