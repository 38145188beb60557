use crate::{ChainSpec, Epoch, Validator};
use safe_arith::SafeArith;
use std::collections::HashMap;

/// Tracks, per exit epoch, how many validators have already queued an exit there, so
/// `initiate_validator_exit` can compute the next available exit epoch without rescanning the
/// entire validator registry on every call.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct ExitCache {
    initialized: bool,
    exit_epoch_counts: HashMap<Epoch, u64>,
    max_exit_epoch: Epoch,
    churn_limit: u64,
}

impl ExitCache {
    pub fn new<'a>(validators: impl IntoIterator<Item = &'a Validator>, spec: &ChainSpec) -> Self {
        let mut cache = ExitCache {
            initialized: true,
            exit_epoch_counts: HashMap::new(),
            max_exit_epoch: Epoch::new(0),
            churn_limit: 0,
        };
        for validator in validators {
            cache.record_validator_exit(validator.exit_epoch);
        }
        let _ = spec;
        cache
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn record_validator_exit(&mut self, exit_epoch: Epoch) {
        if exit_epoch == Epoch::new(u64::MAX) {
            return;
        }
        *self.exit_epoch_counts.entry(exit_epoch).or_insert(0) += 1;
        if exit_epoch > self.max_exit_epoch {
            self.max_exit_epoch = exit_epoch;
        }
    }

    /// The exit epoch a validator initiating an exit during `current_epoch` should receive,
    /// advancing past `max_exit_epoch` once the queue at that epoch is full.
    pub fn compute_exit_queue_epoch(
        &mut self,
        current_epoch: Epoch,
        active_validator_count: u64,
        spec: &ChainSpec,
    ) -> Result<Epoch, safe_arith::ArithError> {
        let churn_limit = spec.churn_limit(active_validator_count);
        if churn_limit != self.churn_limit {
            self.churn_limit = churn_limit;
        }

        let delayed_epoch = current_epoch.safe_add(spec.max_seed_lookahead)?;
        let mut exit_queue_epoch = std::cmp::max(self.max_exit_epoch, delayed_epoch);

        let exit_queue_churn = *self.exit_epoch_counts.get(&exit_queue_epoch).unwrap_or(&0);
        if exit_queue_churn >= churn_limit {
            exit_queue_epoch.safe_add_assign(Epoch::new(1))?;
        }

        self.record_validator_exit(exit_queue_epoch);

        Ok(exit_queue_epoch)
    }
}
