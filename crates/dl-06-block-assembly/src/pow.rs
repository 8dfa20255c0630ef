//! Nonce search over the block header hash.

use rayon::prelude::*;
use shared_types::hashing::header_hash_with_nonce;
use shared_types::{leading_zero_bits, Block};

/// Whether `nonce` gives `template` a hash with `difficulty` leading zero bits.
pub fn meets_difficulty(template: &Block, nonce: u64, difficulty: u32) -> bool {
    leading_zero_bits(&header_hash_with_nonce(template, nonce)) >= difficulty
}

/// Smallest nonce in `0..max_attempts` meeting `difficulty`.
///
/// The range is split across the rayon pool; `find_first` keeps the answer
/// independent of thread scheduling.
pub fn search_nonce(template: &Block, difficulty: u32, max_attempts: u64) -> Option<u64> {
    if difficulty == 0 {
        return Some(0);
    }
    (0..max_attempts)
        .into_par_iter()
        .find_first(|nonce| meets_difficulty(template, *nonce, difficulty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared_types::ZERO_HASH;

    fn template() -> Block {
        Block {
            index: 0,
            previous_hash: ZERO_HASH,
            merkle_root: [3u8; 32],
            difficulty: 8,
            nonce: 0,
            block_hash: ZERO_HASH,
            miner_id: "miner".into(),
            total_scientific_value: 2000.0,
            energy_consumed: 0.01,
            knowledge_created: 1,
            work_ids: vec![],
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_search_finds_smallest_nonce() {
        let block = template();
        let nonce = search_nonce(&block, 8, 1 << 20).unwrap();
        assert!(meets_difficulty(&block, nonce, 8));
        assert!((0..nonce).all(|n| !meets_difficulty(&block, n, 8)));
    }

    #[test]
    fn test_search_is_deterministic() {
        let block = template();
        assert_eq!(search_nonce(&block, 6, 1 << 16), search_nonce(&block, 6, 1 << 16));
    }

    #[test]
    fn test_exhaustion() {
        assert_eq!(search_nonce(&template(), 256, 64), None);
    }
}
