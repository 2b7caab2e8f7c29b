use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

/// Seeded generator when a seed is given, entropy-seeded otherwise.
pub fn rng_from_seed(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}

/// Child generator whose stream is fully determined by the state of `parent`.
pub fn rng_derive(parent: &mut impl RngCore) -> SmallRng {
    SmallRng::seed_from_u64(parent.next_u64())
}

/// One child generator per task, drawn sequentially from `parent`.
pub fn rng_split(parent: &mut impl RngCore, count: usize) -> Vec<SmallRng> {
    (0..count).map(|_| rng_derive(parent)).collect()
}
