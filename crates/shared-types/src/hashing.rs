//! # Hashing
//!
//! SHA-256 helpers, the order-independent Merkle root over work leaves and
//! the canonical block header hash.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::entities::{Block, Hash, WorkId, ZERO_HASH};

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> Hash {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(data));
    out
}

/// Lowercase hex encoding.
pub fn to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

/// Leaf hash for a work unit: `sha256(id_be || signature)`.
pub fn work_leaf_hash(id: WorkId, signature: &str) -> Hash {
    let mut data = Vec::with_capacity(8 + signature.len());
    data.extend_from_slice(&id.0.to_be_bytes());
    data.extend_from_slice(signature.as_bytes());
    sha256(&data)
}

/// Merkle root over `leaves`, independent of input order.
///
/// Leaves are sorted, then hashed pairwise level by level after padding to
/// the next power of two with the last leaf. Empty input yields [`ZERO_HASH`].
pub fn merkle_root(leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return ZERO_HASH;
    }

    let mut level: Vec<Hash> = leaves.to_vec();
    level.sort_unstable();
    if level.len() == 1 {
        return level[0];
    }

    let target = level.len().next_power_of_two();
    while level.len() < target {
        level.push(level[level.len() - 1]);
    }

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let mut combined = [0u8; 64];
                combined[..32].copy_from_slice(&pair[0]);
                combined[32..].copy_from_slice(&pair[1]);
                sha256(&combined)
            })
            .collect();
    }

    level[0]
}

#[derive(Serialize)]
struct HeaderPreimage<'a> {
    index: u64,
    previous_hash: &'a Hash,
    merkle_root: &'a Hash,
    difficulty: u32,
    nonce: u64,
    miner_id: &'a str,
    total_scientific_value: u64,
    energy_consumed: u64,
    knowledge_created: u64,
    timestamp_ms: i64,
}

/// Canonical header hash for `block` (all fields but `block_hash`).
pub fn block_header_hash(block: &Block) -> Hash {
    header_hash_with_nonce(block, block.nonce)
}

/// Header hash for `block` as if it carried `nonce`.
pub fn header_hash_with_nonce(block: &Block, nonce: u64) -> Hash {
    let preimage = HeaderPreimage {
        index: block.index,
        previous_hash: &block.previous_hash,
        merkle_root: &block.merkle_root,
        difficulty: block.difficulty,
        nonce,
        miner_id: &block.miner_id,
        total_scientific_value: block.total_scientific_value.to_bits(),
        energy_consumed: block.energy_consumed.to_bits(),
        knowledge_created: block.knowledge_created,
        timestamp_ms: block.timestamp.timestamp_millis(),
    };
    // Serializing a struct of integers and byte arrays cannot fail.
    let bytes = bincode::serialize(&preimage).unwrap_or_default();
    sha256(&bytes)
}

/// Count of leading zero bits in `hash`.
pub fn leading_zero_bits(hash: &Hash) -> u32 {
    let mut bits = 0;
    for byte in hash {
        if *byte == 0 {
            bits += 8;
        } else {
            bits += byte.leading_zeros();
            break;
        }
    }
    bits
}
