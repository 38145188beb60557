//! The "swap-or-not" shuffle (`compute_shuffled_index`): a seeded permutation of `0..index_count`
//! that can be evaluated for a single index without materializing the whole list, used directly
//! by committee/proposer/sync-committee selection wherever only one position is needed.
use ethereum_hashing::hash;

/// Permutes `index` within `0..index_count` under `seed`, running `shuffle_round_count` rounds
/// of the swap-or-not shuffle. Returns `None` iff `index_count == 0` (an empty list has no valid
/// indices to return).
pub fn compute_shuffled_index(
    index: usize,
    index_count: usize,
    seed: &[u8],
    shuffle_round_count: u8,
) -> Option<usize> {
    if index_count == 0 || index >= index_count {
        return None;
    }

    let mut index = index;
    for round in 0..shuffle_round_count {
        let pivot = hash_pivot(seed, round, index_count);
        let flip = (pivot + index_count - index) % index_count;
        let position = std::cmp::max(index, flip);
        let source = hash_source_byte(seed, round, position);
        let bit = (source >> (position % 8)) & 0x01;
        if bit == 1 {
            index = flip;
        }
    }
    Some(index)
}

fn hash_pivot(seed: &[u8], round: u8, index_count: usize) -> usize {
    let mut preimage = Vec::with_capacity(seed.len() + 1);
    preimage.extend_from_slice(seed);
    preimage.push(round);
    let digest = hash(&preimage);
    let pivot_bytes: [u8; 8] = digest[0..8].try_into().expect("digest is 32 bytes");
    (u64::from_le_bytes(pivot_bytes) as usize) % index_count
}

fn hash_source_byte(seed: &[u8], round: u8, position: usize) -> u8 {
    let mut preimage = Vec::with_capacity(seed.len() + 1 + 4);
    preimage.extend_from_slice(seed);
    preimage.push(round);
    preimage.extend_from_slice(&((position / 256) as u32).to_le_bytes()[..4]);
    let digest = hash(&preimage);
    digest[(position % 256) / 8]
}

/// Shuffles the full `input` list under `seed`, `forwards` selecting the shuffle direction
/// (`false` un-shuffles, matching `unshuffle_list`). Returns `None` if any index fails to
/// shuffle, which only happens on an empty `input`.
pub fn shuffle_list(
    input: Vec<usize>,
    shuffle_round_count: u8,
    seed: &[u8],
    forwards: bool,
) -> Option<Vec<usize>> {
    let len = input.len();
    if len == 0 {
        return Some(input);
    }

    let rounds: Vec<u8> = if forwards {
        (0..shuffle_round_count).collect()
    } else {
        (0..shuffle_round_count).rev().collect()
    };

    let mut permuted_indices: Vec<usize> = (0..len).collect();
    for &round in &rounds {
        let pivot = hash_pivot(seed, round, len);
        for i in 0..len {
            let flip = (pivot + len - permuted_indices[i]) % len;
            let position = std::cmp::max(permuted_indices[i], flip);
            let source = hash_source_byte(seed, round, position);
            let bit = (source >> (position % 8)) & 0x01;
            if bit == 1 {
                permuted_indices[i] = flip;
            }
        }
    }

    Some(permuted_indices.into_iter().map(|i| input[i]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_index_matches_full_list_shuffle() {
        let seed = [7u8; 32];
        let input: Vec<usize> = (0..50).collect();
        let shuffled = shuffle_list(input.clone(), 10, &seed, true).unwrap();
        for i in 0..input.len() {
            let shuffled_position = compute_shuffled_index(i, input.len(), &seed, 10).unwrap();
            assert_eq!(shuffled[i], input[shuffled_position]);
        }
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let seed = [3u8; 32];
        let input: Vec<usize> = (0..128).collect();
        let mut shuffled = shuffle_list(input.clone(), 90, &seed, true).unwrap();
        shuffled.sort_unstable();
        assert_eq!(shuffled, input);
    }

    #[test]
    fn different_seeds_give_different_shuffles() {
        let input: Vec<usize> = (0..64).collect();
        let a = shuffle_list(input.clone(), 10, &[1u8; 32], true).unwrap();
        let b = shuffle_list(input, 10, &[2u8; 32], true).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_list_out_of_bounds() {
        assert_eq!(compute_shuffled_index(0, 0, &[0u8; 32], 10), None);
        assert_eq!(compute_shuffled_index(5, 5, &[0u8; 32], 10), None);
    }
}
