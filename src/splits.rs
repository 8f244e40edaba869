use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::constants::labels;
use crate::data::CleanDataset;
use crate::errors::PipelineError;

/// Logical dataset partitions produced by the split stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SplitLabel {
    /// Training partition.
    Train,
    /// Held-out test partition.
    Test,
}

/// Minimum rows a label class needs so both partitions receive at least one.
const MIN_CLASS_ROWS: usize = 2;

/// Partition a dataset into train/test subsets, stratified by label.
///
/// Deterministic given `(dataset, test_size, seed)`: per-class index pools
/// are shuffled with a seeded RNG in ascending label order, the rounded
/// per-class test count is taken from the front of each pool, and subset
/// rows keep the dataset's original order. Identical inputs always yield
/// identical partitions, which reproducible downstream metrics rely on.
pub fn stratified_split(
    dataset: &CleanDataset,
    test_size: f64,
    seed: u64,
) -> Result<(CleanDataset, CleanDataset), PipelineError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PipelineError::Config(format!(
            "test_size must lie in (0,1), got {test_size}"
        )));
    }

    let mut by_label: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for (idx, row) in dataset.rows.iter().enumerate() {
        by_label.entry(row.label).or_default().push(idx);
    }

    // Both classes must be populated well enough that each partition receives
    // at least one row of each; an empty or single-class dataset fails here,
    // naming the starved class, rather than downstream at feature fitting.
    for class in [labels::NEGATIVE_CLASS, labels::POSITIVE_CLASS] {
        let count = by_label.get(&class).map_or(0, Vec::len);
        if count < MIN_CLASS_ROWS {
            return Err(PipelineError::InsufficientData {
                label: class,
                count,
                required: MIN_CLASS_ROWS,
            });
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut test_indices = Vec::new();
    let mut train_indices = Vec::new();

    for (_, mut pool) in by_label {
        let count = pool.len();
        let mut n_test = (count as f64 * test_size).round() as usize;
        // Rounding may starve one side of a small class; both must keep a row.
        n_test = n_test.clamp(1, count - 1);

        pool.shuffle(&mut rng);
        test_indices.extend_from_slice(&pool[..n_test]);
        train_indices.extend_from_slice(&pool[n_test..]);
    }

    // Subsets preserve dataset row order; positional indices are never
    // persisted as data.
    train_indices.sort_unstable();
    test_indices.sort_unstable();

    let gather = |indices: &[usize]| CleanDataset {
        rows: indices.iter().map(|idx| dataset.rows[*idx].clone()).collect(),
    };
    let train = gather(&train_indices);
    let test = gather(&test_indices);
    debug!(
        train = train.len(),
        test = test.len(),
        seed,
        "stratified split complete"
    );
    Ok((train, test))
}
