//! The beacon chain's pure state-transition function: genesis construction, per-slot and
//! per-epoch advancement, and block-operation processing, for the `Base` and `Altair` forks only.
//! Everything here is a function of values passed in by the caller — no networking, no storage,
//! no fork choice. `transition` is the entry point most callers want.
pub mod collaborators;
pub mod common;
pub mod genesis;
pub mod per_block_processing;
pub mod per_epoch_processing;
pub mod per_slot_processing;
pub mod transition;
pub mod upgrade;

pub use genesis::initialize_beacon_state_from_eth1;
pub use per_block_processing::{
    per_block_processing, BlockProcessingError, BlockSignatureStrategy, VerifyBlockRoot,
    VerifySignatures,
};
pub use per_epoch_processing::{per_epoch_processing, EpochProcessingError, EpochProcessingSummary};
pub use per_slot_processing::per_slot_processing;
pub use transition::{calculate_state_root, process_slots, transition};
