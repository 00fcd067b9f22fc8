// Uniform random chain selection (§4.4 step 1, §9 "random chain selection").
// One PRNG per miner, seeded once from a secure system source at startup and
// reused for the life of the process -- not reseeded per attempt.

use cw_common::ChainId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

pub struct ChainSelector {
    rng: Mutex<StdRng>,
}

impl ChainSelector {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Uniformly sample one chain id from `chains`. Panics if `chains` is
    /// empty; a version with no chains is a programming error upstream.
    pub fn sample(&self, chains: &[ChainId]) -> ChainId {
        assert!(!chains.is_empty(), "chainweb version names no chains");
        let mut rng = self.rng.lock().expect("chain selector rng poisoned");
        let idx = rng.gen_range(0..chains.len());
        chains[idx]
    }
}

impl Default for ChainSelector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_always_returns_a_member() {
        let selector = ChainSelector::new();
        let chains = vec![ChainId::new(0), ChainId::new(1), ChainId::new(2)];
        for _ in 0..100 {
            let picked = selector.sample(&chains);
            assert!(chains.contains(&picked));
        }
    }
}
