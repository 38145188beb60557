use crate::{ChainSpec, Epoch, Hash256, PublicKeyBytes};
use safe_arith::SafeArith;
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, TreeHash)]
pub struct Validator {
    pub pubkey: PublicKeyBytes,
    pub withdrawal_credentials: Hash256,
    #[serde(with = "serde_utils::quoted_u64")]
    pub effective_balance: u64,
    pub slashed: bool,
    pub activation_eligibility_epoch: Epoch,
    pub activation_epoch: Epoch,
    pub exit_epoch: Epoch,
    pub withdrawable_epoch: Epoch,
}

impl Validator {
    pub fn is_active_at(&self, epoch: Epoch) -> bool {
        self.activation_epoch <= epoch && epoch < self.exit_epoch
    }

    pub fn is_exited_at(&self, epoch: Epoch) -> bool {
        self.exit_epoch <= epoch
    }

    pub fn is_withdrawable_at(&self, epoch: Epoch) -> bool {
        self.withdrawable_epoch <= epoch
    }

    pub fn is_slashable_at(&self, epoch: Epoch) -> bool {
        !self.slashed && self.activation_epoch <= epoch && epoch < self.withdrawable_epoch
    }

    pub fn is_eligible_for_activation_queue(&self, spec: &ChainSpec) -> bool {
        self.activation_eligibility_epoch == spec.far_future_epoch
            && self.effective_balance == spec.max_effective_balance
    }

    pub fn is_eligible_for_activation(&self, finalized_epoch: Epoch, spec: &ChainSpec) -> bool {
        self.activation_eligibility_epoch <= finalized_epoch
            && self.activation_epoch == spec.far_future_epoch
    }

    /// Updates `effective_balance` from a raw validator `balance`, applying the hysteresis band
    /// so a balance oscillating near a rounding boundary does not flap the effective balance
    /// every epoch.
    pub fn update_effective_balance(
        &mut self,
        balance: u64,
        spec: &ChainSpec,
    ) -> Result<(), safe_arith::ArithError> {
        let hysteresis_increment = spec.effective_balance_increment.safe_div(spec.hysteresis_quotient)?;
        let downward_threshold = hysteresis_increment.safe_mul(spec.hysteresis_downward_multiplier)?;
        let upward_threshold = hysteresis_increment.safe_mul(spec.hysteresis_upward_multiplier)?;

        if balance.safe_add(downward_threshold)? < self.effective_balance
            || self.effective_balance.safe_add(upward_threshold)? < balance
        {
            let new_effective_balance = std::cmp::min(
                balance.safe_sub(balance.safe_rem(spec.effective_balance_increment)?)?,
                spec.max_effective_balance,
            );
            self.effective_balance = new_effective_balance;
        }

        Ok(())
    }

    pub fn initiate_activation_eligibility(&mut self, epoch: Epoch) {
        self.activation_eligibility_epoch = epoch;
    }
}
