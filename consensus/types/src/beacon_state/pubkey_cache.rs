use crate::*;
use rpds::HashTrieMapSync as HashTrieMap;

/// Maps a validator's pubkey to its index in `BeaconState::validators`.
///
/// Unlike builder registries elsewhere in the ecosystem, validator indices are never reused:
/// a validator can exit but its slot in the registry, and in this cache, stays assigned forever.
/// `import` therefore only ever appends.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct PubkeyCache {
    map: HashTrieMap<PublicKeyBytes, usize>,
    len: usize,
}

impl PubkeyCache {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, pubkey: &PublicKeyBytes) -> Option<usize> {
        self.map.get(pubkey).copied()
    }

    /// Inserts `pubkey` for the next free index, failing if `index` does not equal `self.len()`
    /// (the cache is append-only and must stay in lockstep with the validator registry).
    pub fn insert(&mut self, pubkey: PublicKeyBytes, index: usize) -> Result<(), BeaconStateError> {
        if index != self.len {
            return Err(BeaconStateError::PubkeyCacheInconsistent);
        }
        if self.map.get(&pubkey).is_some() {
            return Err(BeaconStateError::PubkeyCacheInconsistent);
        }
        self.map.insert_mut(pubkey, index);
        self.len = self.len.saturating_add(1);
        Ok(())
    }

    /// Brings the cache up to date with `validators[self.len()..]`, the pattern every accessor
    /// uses before trusting a `get` result.
    pub fn import(&mut self, validators: &[Validator]) -> Result<(), BeaconStateError> {
        if validators.len() < self.len {
            return Err(BeaconStateError::PubkeyCacheInconsistent);
        }
        for validator in &validators[self.len..] {
            self.insert(validator.pubkey, self.len)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator_with_pubkey(byte: u8) -> Validator {
        Validator {
            pubkey: PublicKeyBytes::from_bytes(&[byte; 48]).unwrap(),
            withdrawal_credentials: Hash256::zero(),
            effective_balance: 0,
            slashed: false,
            activation_eligibility_epoch: Epoch::new(0),
            activation_epoch: Epoch::new(0),
            exit_epoch: Epoch::new(u64::MAX),
            withdrawable_epoch: Epoch::new(u64::MAX),
        }
    }

    #[test]
    fn import_is_append_only() {
        let mut cache = PubkeyCache::default();
        let validators = vec![validator_with_pubkey(1), validator_with_pubkey(2)];
        cache.import(&validators).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&validators[1].pubkey), Some(1));

        let mut extended = validators.clone();
        extended.push(validator_with_pubkey(3));
        cache.import(&extended).unwrap();
        assert_eq!(cache.len(), 3);
    }
}
