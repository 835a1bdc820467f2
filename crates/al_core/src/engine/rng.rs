//! Seed derivation.
//!
//! A career has one master seed. Every consumer (schedule, each roster,
//! each fixture) draws from its own ChaCha stream derived from the master
//! seed plus labels, so adding a consumer never shifts another's rolls.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// SHA-256 over the master seed and length-prefixed labels, first 8 bytes.
pub fn derive_seed(master_seed: u64, labels: &[&str]) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(master_seed.to_le_bytes());
    for label in labels {
        hasher.update((label.len() as u64).to_le_bytes());
        hasher.update(label.as_bytes());
    }
    let digest = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

pub fn child_rng(master_seed: u64, labels: &[&str]) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_seed(master_seed, labels))
}
