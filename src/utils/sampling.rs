use num_traits::Float;
use rand::distributions::uniform::SampleUniform;
use rand::seq::SliceRandom;
use rand::Rng;

/// Running sum of `weights`. The last element is the total mass.
pub fn cumulative_sum<W: Float>(weights: &[W]) -> Vec<W> {
    let mut acc = W::zero();
    weights.iter()
        .map(|w| {
            acc = acc + *w;
            acc
        })
        .collect()
}

/// Draws `dst.len()` positions with replacement, each position `i` with probability
/// proportional to `cumsum[i] - cumsum[i - 1]`. Returns the number of draws written,
/// which is zero when the total mass is not positive.
pub fn replacement_sampling_weighted<W: Float + SampleUniform>(
    rng: &mut impl Rng,
    cumsum: &[W],
    dst: &mut [usize],
) -> usize {
    let total = match cumsum.last() {
        Some(total) if *total > W::zero() => *total,
        _ => return 0,
    };

    let mut n = 0;
    for dst_val in dst.iter_mut() {
        let u = rng.gen_range(W::zero()..total);
        // Zero-mass positions share their cumsum with the previous one and are never hit
        let j = cumsum.partition_point(|c| *c <= u);
        *dst_val = j.min(cumsum.len() - 1);
        n += 1;
    }
    n
}

pub fn random_permutation(rng: &mut impl Rng, n: usize) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..n).collect();
    perm.shuffle(rng);
    perm
}
