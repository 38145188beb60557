//! Network configuration. A `ChainSpec` is the single point where a running instance finds out
//! how many wei a deposit is, how long an epoch takes, how aggressively validators get slashed,
//! and so on. Unlike `EthSpec`, these are runtime values, not compile-time list bounds.
use crate::{Epoch, FixedBytesExtended, Hash256, Slot};
use serde::{Deserialize, Serialize};

/// Domain types mix into `compute_domain` to separate signatures meant for one purpose
/// (attesting, proposing, exiting, ...) from another, even if the signed root happens to
/// collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    BeaconProposer,
    BeaconAttester,
    Randao,
    Deposit,
    VoluntaryExit,
    SelectionProof,
    AggregateAndProof,
    SyncCommittee,
    SyncCommitteeSelectionProof,
    ContributionAndProof,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ChainSpec {
    /*
     * Constants
     */
    pub genesis_slot: Slot,
    pub far_future_epoch: Epoch,
    pub base_rewards_per_epoch: u64,
    pub deposit_contract_tree_depth: u64,

    /*
     * Misc
     */
    pub max_committees_per_slot: u64,
    pub target_committee_size: u64,
    pub min_per_epoch_churn_limit: u64,
    pub churn_limit_quotient: u64,
    pub shuffle_round_count: u8,
    pub min_genesis_active_validator_count: u64,
    pub min_genesis_time: u64,
    pub hysteresis_quotient: u64,
    pub hysteresis_downward_multiplier: u64,
    pub hysteresis_upward_multiplier: u64,

    /*
     * Gwei values
     */
    pub min_deposit_amount: u64,
    pub max_effective_balance: u64,
    pub ejection_balance: u64,
    pub effective_balance_increment: u64,

    /*
     * Initial values
     */
    pub genesis_fork_version: [u8; 4],
    pub bls_withdrawal_prefix_byte: u8,

    /*
     * Time parameters
     */
    pub genesis_delay: u64,
    pub seconds_per_slot: u64,
    pub min_attestation_inclusion_delay: u64,
    pub min_seed_lookahead: Epoch,
    pub max_seed_lookahead: Epoch,
    pub min_epochs_to_inactivity_penalty: u64,
    pub min_validator_withdrawability_delay: Epoch,
    pub shard_committee_period: u64,

    /*
     * Reward and penalty quotients
     */
    pub base_reward_factor: u64,
    pub whistleblower_reward_quotient: u64,
    pub proposer_reward_quotient: u64,
    pub inactivity_penalty_quotient: u64,
    pub min_slashing_penalty_quotient: u64,
    pub proportional_slashing_multiplier: u64,

    /*
     * Max operations per block
     */
    pub max_proposer_slashings: u64,
    pub max_attester_slashings: u64,
    pub max_attestations: u64,
    pub max_deposits: u64,
    pub max_voluntary_exits: u64,

    /*
     * Domain types
     */
    pub domain_beacon_proposer: u32,
    pub domain_beacon_attester: u32,
    pub domain_randao: u32,
    pub domain_deposit: u32,
    pub domain_voluntary_exit: u32,
    pub domain_selection_proof: u32,
    pub domain_aggregate_and_proof: u32,

    /*
     * Altair
     */
    pub inactivity_penalty_quotient_altair: u64,
    pub min_slashing_penalty_quotient_altair: u64,
    pub proportional_slashing_multiplier_altair: u64,
    pub min_epochs_for_block_requests: u64,
    pub epochs_per_sync_committee_period: Epoch,
    pub domain_sync_committee: u32,
    pub domain_sync_committee_selection_proof: u32,
    pub domain_contribution_and_proof: u32,
    pub inactivity_score_bias: u64,
    pub inactivity_score_recovery_rate: u64,
    pub altair_fork_epoch: Option<Epoch>,
    pub altair_fork_version: [u8; 4],

    /*
     * Networking
     */
    pub max_validators_per_committee: u64,
}

impl ChainSpec {
    /// Computes a BLS signature domain by mixing a domain type with a fork version and the
    /// genesis validators root, per `compute_domain`.
    pub fn compute_domain(
        &self,
        domain: Domain,
        fork_version: [u8; 4],
        genesis_validators_root: Hash256,
    ) -> Hash256 {
        let domain_constant = self.get_domain_constant(domain);

        let mut domain_bytes = [0u8; 4];
        domain_bytes.copy_from_slice(&domain_constant.to_le_bytes());

        let fork_data_root = crate::fork_data::compute_fork_data_root(
            fork_version,
            genesis_validators_root,
        );

        let mut result = [0u8; 32];
        result[0..4].copy_from_slice(&domain_bytes);
        result[4..32].copy_from_slice(&fork_data_root.as_slice()[0..28]);
        Hash256::from(result)
    }

    /// Picks `fork.previous_version` or `fork.current_version` depending on whether `epoch`
    /// precedes the fork's activation, then mixes it into the domain the usual way.
    pub fn get_domain(
        &self,
        epoch: Epoch,
        domain: Domain,
        fork: &crate::Fork,
        genesis_validators_root: Hash256,
    ) -> Hash256 {
        let fork_version = if epoch < fork.epoch {
            fork.previous_version
        } else {
            fork.current_version
        };
        self.compute_domain(domain, fork_version, genesis_validators_root)
    }

    /// Deposits are always signed against the genesis fork version, so they remain valid across
    /// every future hard fork.
    pub fn get_deposit_domain(&self) -> Hash256 {
        self.compute_domain(Domain::Deposit, self.genesis_fork_version, Hash256::zero())
    }

    fn get_domain_constant(&self, domain: Domain) -> u32 {
        match domain {
            Domain::BeaconProposer => self.domain_beacon_proposer,
            Domain::BeaconAttester => self.domain_beacon_attester,
            Domain::Randao => self.domain_randao,
            Domain::Deposit => self.domain_deposit,
            Domain::VoluntaryExit => self.domain_voluntary_exit,
            Domain::SelectionProof => self.domain_selection_proof,
            Domain::AggregateAndProof => self.domain_aggregate_and_proof,
            Domain::SyncCommittee => self.domain_sync_committee,
            Domain::SyncCommitteeSelectionProof => self.domain_sync_committee_selection_proof,
            Domain::ContributionAndProof => self.domain_contribution_and_proof,
        }
    }

    /// The fork version active for `epoch`, given the configured Altair activation epoch.
    pub fn fork_version_for_epoch(&self, epoch: Epoch) -> [u8; 4] {
        match self.altair_fork_epoch {
            Some(altair_epoch) if epoch >= altair_epoch => self.altair_fork_version,
            _ => self.genesis_fork_version,
        }
    }

    pub fn churn_limit(&self, active_validator_count: u64) -> u64 {
        std::cmp::max(
            self.min_per_epoch_churn_limit,
            active_validator_count / self.churn_limit_quotient,
        )
    }

    /// The first epoch an exit/activation initiated at `current_epoch` can take effect.
    pub fn compute_activation_exit_epoch(&self, current_epoch: Epoch) -> Result<Epoch, safe_arith::ArithError> {
        use safe_arith::SafeArith;
        current_epoch.safe_add(1)?.safe_add(self.max_seed_lookahead)
    }

    /// Altair weights inactivity leaks far more harshly than Base does.
    pub fn inactivity_penalty_quotient_for_altair(&self, is_altair: bool) -> u64 {
        if is_altair {
            self.inactivity_penalty_quotient_altair
        } else {
            self.inactivity_penalty_quotient
        }
    }

    pub fn proportional_slashing_multiplier_for_altair(&self, is_altair: bool) -> u64 {
        if is_altair {
            self.proportional_slashing_multiplier_altair
        } else {
            self.proportional_slashing_multiplier
        }
    }

    pub fn min_slashing_penalty_quotient_for_altair(&self, is_altair: bool) -> u64 {
        if is_altair {
            self.min_slashing_penalty_quotient_altair
        } else {
            self.min_slashing_penalty_quotient
        }
    }

    pub fn mainnet() -> Self {
        Self {
            genesis_slot: Slot::new(0),
            far_future_epoch: Epoch::new(u64::MAX),
            base_rewards_per_epoch: 4,
            deposit_contract_tree_depth: 32,

            max_committees_per_slot: 64,
            target_committee_size: 128,
            min_per_epoch_churn_limit: 4,
            churn_limit_quotient: 65_536,
            shuffle_round_count: 90,
            min_genesis_active_validator_count: 16_384,
            min_genesis_time: 1_606_824_000,
            hysteresis_quotient: 4,
            hysteresis_downward_multiplier: 1,
            hysteresis_upward_multiplier: 5,

            min_deposit_amount: 1_000_000_000,
            max_effective_balance: 32_000_000_000,
            ejection_balance: 16_000_000_000,
            effective_balance_increment: 1_000_000_000,

            genesis_fork_version: [0x00, 0x00, 0x00, 0x00],
            bls_withdrawal_prefix_byte: 0x00,

            genesis_delay: 604_800,
            seconds_per_slot: 12,
            min_attestation_inclusion_delay: 1,
            min_seed_lookahead: Epoch::new(1),
            max_seed_lookahead: Epoch::new(4),
            min_epochs_to_inactivity_penalty: 4,
            min_validator_withdrawability_delay: Epoch::new(256),
            shard_committee_period: 256,

            base_reward_factor: 64,
            whistleblower_reward_quotient: 512,
            proposer_reward_quotient: 8,
            inactivity_penalty_quotient: 67_108_864,
            min_slashing_penalty_quotient: 128,
            proportional_slashing_multiplier: 1,

            max_proposer_slashings: 16,
            max_attester_slashings: 2,
            max_attestations: 128,
            max_deposits: 16,
            max_voluntary_exits: 16,

            domain_beacon_proposer: 0x0000_0000,
            domain_beacon_attester: 0x0100_0000,
            domain_randao: 0x0200_0000,
            domain_deposit: 0x0300_0000,
            domain_voluntary_exit: 0x0400_0000,
            domain_selection_proof: 0x0500_0000,
            domain_aggregate_and_proof: 0x0600_0000,

            inactivity_penalty_quotient_altair: 3_221_225_472,
            min_slashing_penalty_quotient_altair: 64,
            proportional_slashing_multiplier_altair: 2,
            min_epochs_for_block_requests: 33_024,
            epochs_per_sync_committee_period: Epoch::new(256),
            domain_sync_committee: 0x0700_0000,
            domain_sync_committee_selection_proof: 0x0800_0000,
            domain_contribution_and_proof: 0x0900_0000,
            inactivity_score_bias: 4,
            inactivity_score_recovery_rate: 16,
            altair_fork_epoch: Some(Epoch::new(74_240)),
            altair_fork_version: [0x01, 0x00, 0x00, 0x00],

            max_validators_per_committee: 2_048,
        }
    }

    pub fn minimal() -> Self {
        Self {
            max_committees_per_slot: 4,
            target_committee_size: 4,
            shuffle_round_count: 10,
            min_genesis_active_validator_count: 64,
            genesis_delay: 300,
            seconds_per_slot: 6,
            shard_committee_period: 64,
            epochs_per_sync_committee_period: Epoch::new(8),
            altair_fork_epoch: Some(Epoch::new(0)),
            churn_limit_quotient: 32,
            max_validators_per_committee: 2_048,
            ..Self::mainnet()
        }
    }
}
