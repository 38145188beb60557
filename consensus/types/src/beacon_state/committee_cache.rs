use crate::*;
use safe_arith::SafeArith;
use swap_or_not_shuffle::shuffle_list;

/// A single slot/index committee: a slice into `CommitteeCache::shuffling` plus the coordinates
/// that produced it, for error messages and sync-committee-subnet mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Committee<'a> {
    pub slot: Slot,
    pub index: u64,
    pub committee: &'a [usize],
}

/// Precomputes, for one epoch, the full shuffled validator-index list and the split of it into
/// `(committees_per_slot, slots_per_epoch)` committees, plus a reverse map from validator index
/// to shuffled position, so `get_beacon_committee` is O(1) instead of re-shuffling on every call.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct CommitteeCache {
    initialized_epoch: Option<Epoch>,
    shuffling: Vec<usize>,
    shuffling_positions: Vec<Option<std::num::NonZeroUsize>>,
    committees_per_slot: u64,
    slots_per_epoch: u64,
}

impl CommitteeCache {
    pub fn initialized<E: EthSpec>(
        state: &BeaconState<E>,
        epoch: Epoch,
        spec: &ChainSpec,
    ) -> Result<Self, BeaconStateError> {
        let active_validator_indices = state.get_active_validator_indices(epoch, spec)?;
        if active_validator_indices.is_empty() {
            return Err(BeaconStateError::InsufficientValidators);
        }

        let slots_per_epoch = E::slots_per_epoch();
        let committees_per_slot = Self::compute_committees_per_slot(
            active_validator_indices.len() as u64,
            slots_per_epoch,
            spec,
        );

        let seed = state.get_seed(epoch, Domain::BeaconAttester, spec)?;

        let shuffling = shuffle_list(
            active_validator_indices,
            spec.shuffle_round_count,
            seed.as_slice(),
            false,
        )
        .ok_or(BeaconStateError::UnknownValidator(0))?;

        let mut shuffling_positions = vec![None; state.validators().len()];
        for (i, &validator_index) in shuffling.iter().enumerate() {
            if let Some(slot) = shuffling_positions.get_mut(validator_index) {
                *slot = std::num::NonZeroUsize::new(i.safe_add(1)?);
            }
        }

        Ok(Self {
            initialized_epoch: Some(epoch),
            shuffling,
            shuffling_positions,
            committees_per_slot,
            slots_per_epoch,
        })
    }

    pub fn is_initialized_at(&self, epoch: Epoch) -> bool {
        Some(epoch) == self.initialized_epoch
    }

    pub fn committees_per_slot(&self) -> u64 {
        self.committees_per_slot
    }

    pub fn epoch_committee_count(&self) -> usize {
        (self.committees_per_slot * self.slots_per_epoch) as usize
    }

    /// Number of committees a slot should be split into, bounded by `max_committees_per_slot`
    /// and by `target_committee_size` so committees do not shrink below a usable size. Mirrors
    /// `get_committee_count_per_slot`.
    fn compute_committees_per_slot(active_validator_count: u64, slots_per_epoch: u64, spec: &ChainSpec) -> u64 {
        std::cmp::max(
            1,
            std::cmp::min(
                spec.max_committees_per_slot,
                active_validator_count / slots_per_epoch / spec.target_committee_size,
            ),
        )
    }

    pub fn get_beacon_committee(&self, slot: Slot, index: u64) -> Option<Committee> {
        let slot_offset = slot.as_u64().checked_rem(self.slots_per_epoch)?;
        let committee_index =
            slot_offset.checked_mul(self.committees_per_slot)?.checked_add(index)?;
        let count = self.epoch_committee_count();
        let (start, end) =
            Self::compute_committee_range(committee_index as usize, count, self.shuffling.len())?;

        Some(Committee {
            slot,
            index,
            committee: &self.shuffling[start..end],
        })
    }

    fn compute_committee_range(
        index: usize,
        count: usize,
        list_len: usize,
    ) -> Option<(usize, usize)> {
        if count == 0 || index >= count {
            return None;
        }
        let start = list_len.checked_mul(index)?.checked_div(count)?;
        let end = list_len.checked_mul(index.checked_add(1)?)?.checked_div(count)?;
        Some((start, end))
    }

    pub fn active_validator_indices(&self) -> &[usize] {
        &self.shuffling
    }

    /// The committee position of `validator_index` within this epoch's shuffled list, used to
    /// recover `(committee_index, committee_position)` pairs for sync subcommittee lookups.
    pub fn shuffled_position(&self, validator_index: usize) -> Option<usize> {
        self.shuffling_positions
            .get(validator_index)?
            .map(|p| p.get() - 1)
    }
}
