use bevy::ecs::system::Resource;
use serde::{Deserialize, Serialize};


/// Seeded linear congruential generator.
///
/// Every random choice of the encounter (spawn point, enemy template) goes
/// through this so that a run can be replayed from its seed.
#[derive(Debug, Resource, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RollbackRng {
    pub seed: u32,
}

impl RollbackRng {
    // Constants for the LCG algorithm. These are common choices.
    const A: u32 = 1664525;  // Multiplier
    const C: u32 = 1013904223; // Increment
    // Modulus M is implicitly 2^32 because we are using u32 and letting overflow happen.

    /// Creates a new RNG instance with a given seed.
    pub fn new(initial_seed: u32) -> Self {
        RollbackRng { seed: initial_seed }
    }

    /// Seeds from the thread rng, for runs that do not need to be replayed.
    pub fn from_entropy() -> Self {
        Self::new(rand::random::<u32>())
    }

    /// Uses `seed` when given, entropy otherwise.
    pub fn from_seed_or_entropy(seed: Option<u32>) -> Self {
        seed.map(Self::new).unwrap_or_else(Self::from_entropy)
    }

    /// Generates the next u32 random number.
    pub fn next_u32(&mut self) -> u32 {
        // X_n+1 = (a * X_n + c) mod 2^32
        self.seed = self.seed.wrapping_mul(Self::A).wrapping_add(Self::C);
        self.seed
    }

    /// Generates a random f32 value between 0.0 (inclusive) and 1.0 (exclusive).
    pub fn next_f32(&mut self) -> f32 {
        // The low bits of an LCG are weak, keep the top 24 which fit the f32 mantissa.
        (self.next_u32() >> 8) as f32 / 16_777_216.0
    }

    /// Uniform index in `0..len`, `None` when `len` is zero.
    pub fn next_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let index = (self.next_f32() * len as f32) as usize;
        Some(index.min(len - 1))
    }

    /// Picks an index with probability proportional to its weight.
    /// Returns `None` when every weight is zero.
    pub fn next_weighted(&mut self, weights: &[u32]) -> Option<usize> {
        let total: u64 = weights.iter().map(|w| *w as u64).sum();
        if total == 0 {
            return None;
        }
        let mut roll = (self.next_f32() as f64 * total as f64) as u64;
        for (index, weight) in weights.iter().enumerate() {
            let weight = *weight as u64;
            if roll < weight {
                return Some(index);
            }
            roll -= weight;
        }
        // Rounding at the very top of the range lands on the last weighted entry.
        weights.iter().rposition(|w| *w > 0)
    }
}
