use log::debug;
use rand::Rng;
use crate::utils::{random_permutation, IndexType, NodeIdx, SamplingError, SamplingResult};

/// Disjoint train/val/test index sets, each ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Splits {
    pub train: Vec<usize>,
    pub val: Vec<usize>,
    pub test: Vec<usize>,
}

impl Splits {
    fn sorted(mut self) -> Self {
        self.train.sort_unstable();
        self.val.sort_unstable();
        self.test.sort_unstable();
        self
    }

    /// Train, val and test masks over `size` elements.
    pub fn masks(&self, size: usize) -> SamplingResult<(Vec<bool>, Vec<bool>, Vec<bool>)> {
        Ok((
            index_to_mask(&self.train, size)?,
            index_to_mask(&self.val, size)?,
            index_to_mask(&self.test, size)?,
        ))
    }
}

pub type Fold = (Vec<usize>, Vec<usize>);

pub fn index_to_mask(index: &[usize], size: usize) -> SamplingResult<Vec<bool>> {
    let mut mask = vec![false; size];
    for i in index.iter().cloned() {
        if i >= size {
            return Err(SamplingError::NodeOutOfRange(NodeIdx::new(i), size));
        }
        mask[i] = true;
    }
    Ok(mask)
}

fn check_ratios(train_ratio: f64, val_ratio: f64) -> SamplingResult<()> {
    let valid = |r: f64| (0.0..=1.0).contains(&r);
    if !valid(train_ratio) || !valid(val_ratio) || train_ratio + val_ratio > 1.0 {
        return Err(SamplingError::InvalidRatio(train_ratio, val_ratio));
    }
    Ok(())
}

/// Splits `0..n` by a random permutation: the first `n * train_ratio` elements train, the
/// next `n * val_ratio` validate and the rest test. Sizes are rounded down.
pub fn random_splits(
    rng: &mut impl Rng,
    n: usize,
    train_ratio: f64,
    val_ratio: f64,
) -> SamplingResult<Splits> {
    check_ratios(train_ratio, val_ratio)?;

    let perm = random_permutation(rng, n);
    let train_end = ((n as f64 * train_ratio) as usize).min(n);
    let val_end = ((n as f64 * (train_ratio + val_ratio)) as usize).clamp(train_end, n);

    debug!("Random split of {} elements: {} train, {} val", n, train_end, val_end - train_end);

    Ok(Splits {
        train: perm[..train_end].to_vec(),
        val: perm[train_end..val_end].to_vec(),
        test: perm[val_end..].to_vec(),
    }.sorted())
}

/// Takes `train_per_class` and `val_per_class` random members of every class in
/// `0..=max(labels)`. Every class needs more members than the two combined.
///
/// With `total_val`, the validation set is instead the first `total_val` elements of a
/// random permutation of all non-train elements, and the test set the following
/// `total_test` elements (or all remaining ones). Without it, the test set is everything
/// not in train or val.
pub fn random_splits_per_class(
    rng: &mut impl Rng,
    labels: &[usize],
    train_per_class: usize,
    val_per_class: usize,
    total_val: Option<usize>,
    total_test: Option<usize>,
) -> SamplingResult<Splits> {
    let class_count = labels.iter().max().map_or(0, |c| c + 1);
    let required = train_per_class + val_per_class;

    let mut splits = Splits::default();
    let mut assigned = vec![false; labels.len()];
    for class in 0..class_count {
        let members: Vec<usize> = (0..labels.len()).filter(|i| labels[*i] == class).collect();
        if members.len() <= required {
            return Err(SamplingError::ClassTooSmall(class, members.len(), required + 1));
        }

        let perm = random_permutation(rng, members.len());
        for (k, p) in perm[..required].iter().enumerate() {
            let i = members[*p];
            if k < train_per_class {
                splits.train.push(i);
            } else {
                splits.val.push(i);
            }
        }
    }

    for i in splits.train.iter() {
        assigned[*i] = true;
    }

    match total_val.filter(|v| *v > 0) {
        Some(total_val) => {
            let remaining: Vec<usize> = (0..labels.len()).filter(|i| !assigned[*i]).collect();
            let perm = random_permutation(rng, remaining.len());
            let remaining: Vec<usize> = perm.into_iter().map(|p| remaining[p]).collect();

            let val_end = total_val.min(remaining.len());
            let test_end = match total_test.filter(|t| *t > 0) {
                Some(total_test) => (val_end + total_test).min(remaining.len()),
                None => remaining.len(),
            };
            splits.val = remaining[..val_end].to_vec();
            splits.test = remaining[val_end..test_end].to_vec();
        }
        None => {
            for i in splits.val.iter() {
                assigned[*i] = true;
            }
            splits.test = (0..labels.len()).filter(|i| !assigned[*i]).collect();
        }
    }

    debug!(
        "Per class split over {} classes: {} train, {} val, {} test",
        class_count, splits.train.len(), splits.val.len(), splits.test.len()
    );

    Ok(splits.sorted())
}

fn check_split_count(n: usize, n_splits: usize) -> SamplingResult<()> {
    if n_splits == 0 || n_splits > n {
        return Err(SamplingError::InvalidSplitCount(n_splits, n));
    }
    Ok(())
}

fn folds_from_assignment(fold_of: &[usize], n_splits: usize) -> Vec<Fold> {
    (0..n_splits)
        .map(|k| {
            let (test, train): (Vec<usize>, Vec<usize>) = (0..fold_of.len()).partition(|i| fold_of[*i] == k);
            (train, test)
        })
        .collect()
}

/// `n_splits` contiguous folds over `0..n`, shuffled first when `shuffle` is set. The first
/// `n % n_splits` folds hold one extra element. Returns `(train, test)` per fold.
pub fn k_fold(
    rng: &mut impl Rng,
    n: usize,
    n_splits: usize,
    shuffle: bool,
) -> SamplingResult<Vec<Fold>> {
    check_split_count(n, n_splits)?;

    let order: Vec<usize> = if shuffle {
        random_permutation(rng, n)
    } else {
        (0..n).collect()
    };

    let mut fold_of = vec![0_usize; n];
    let mut start = 0;
    for k in 0..n_splits {
        let size = n / n_splits + if k < n % n_splits { 1 } else { 0 };
        for i in order[start..start + size].iter() {
            fold_of[*i] = k;
        }
        start += size;
    }

    Ok(folds_from_assignment(&fold_of, n_splits))
}

/// Folds with near-equal class proportions. Members of each class are dealt round-robin
/// over the folds, and the rotation carries over from one class to the next.
pub fn stratified_k_fold(
    rng: &mut impl Rng,
    labels: &[usize],
    n_splits: usize,
    shuffle: bool,
) -> SamplingResult<Vec<Fold>> {
    check_split_count(labels.len(), n_splits)?;

    let class_count = labels.iter().max().map_or(0, |c| c + 1);
    let mut fold_of = vec![0_usize; labels.len()];
    let mut k = 0;
    for class in 0..class_count {
        let mut members: Vec<usize> = (0..labels.len()).filter(|i| labels[*i] == class).collect();
        if shuffle {
            members = random_permutation(rng, members.len()).into_iter().map(|p| members[p]).collect();
        }

        for i in members {
            fold_of[i] = k;
            k = (k + 1) % n_splits;
        }
    }

    Ok(folds_from_assignment(&fold_of, n_splits))
}
