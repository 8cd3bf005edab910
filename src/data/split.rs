use serde::{Deserialize, Serialize};

use super::model::Dataset;
use crate::error::DataError;
use crate::rng::SimpleRng;

/// Percentages for a train / validation / test partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitRatios {
    pub train: f64,
    pub validation: f64,
    pub test: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 70.0,
            validation: 15.0,
            test: 15.0,
        }
    }
}

/// Shuffle seed used when none is given.
pub const DEFAULT_SPLIT_SEED: u64 = 42;

#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Dataset,
    pub validation: Dataset,
    pub test: Dataset,
}

/// Shuffle rows and cut them into train, validation and test parts.
///
/// Only complete datasets can be split; the error lists every column that
/// still has gaps. Train and validation sizes are floored, test takes the rest.
pub fn split_dataset(dataset: &Dataset, ratios: SplitRatios, seed: u64) -> Result<Split, DataError> {
    let gaps: Vec<String> = dataset
        .columns()
        .iter()
        .filter(|c| c.missing_count() > 0)
        .map(|c| c.name().to_string())
        .collect();
    if !gaps.is_empty() {
        return Err(DataError::MissingValues(gaps));
    }

    let total = ratios.train + ratios.validation + ratios.test;
    if (total - 100.0).abs() > 0.1 {
        return Err(DataError::InvalidSplit(total));
    }

    let n = dataset.len();
    let mut order: Vec<usize> = (0..n).collect();
    SimpleRng::new(seed).shuffle(&mut order);

    let train_end = ((n as f64 * ratios.train / 100.0) as usize).min(n);
    let val_end = (train_end + (n as f64 * ratios.validation / 100.0) as usize).min(n);

    log::info!(
        "split {n} rows into {} / {} / {}",
        train_end,
        val_end - train_end,
        n - val_end
    );

    Ok(Split {
        train: dataset.select_rows(&order[..train_end]),
        validation: dataset.select_rows(&order[train_end..val_end]),
        test: dataset.select_rows(&order[val_end..]),
    })
}
