//! Model-based fills for numeric targets.

use log::debug;
use serde::{Deserialize, Serialize};

use super::scalar::mean;
use super::{expect_kind, target_column, Inapplicable};
use crate::data::model::{Column, ColumnKind, Dataset, Value};
use crate::data::precision::{estimate_precision, round_to};
use crate::learn::LinearModel;
use crate::rng::SimpleRng;

// ---------------------------------------------------------------------------
// Single-target regression
// ---------------------------------------------------------------------------

/// Predict numeric gaps from every other numeric column with ordinary least
/// squares.
///
/// Trains on rows where the target and all predictors are present and fills
/// only gaps whose predictors are all present; other gaps stay missing.
pub fn fill_regression(dataset: &Dataset, target: &str) -> Result<Column, Inapplicable> {
    let column = target_column(dataset, target)?;
    expect_kind(column, ColumnKind::Numeric)?;

    let predictors: Vec<Vec<Option<f64>>> = dataset
        .columns_of_kind(ColumnKind::Numeric)
        .into_iter()
        .filter(|c| c.name() != target)
        .map(Column::numbers)
        .collect();
    if predictors.is_empty() {
        return Err(Inapplicable::NoPredictors);
    }

    let y = column.numbers();
    let features = |row: usize| -> Option<Vec<f64>> { predictors.iter().map(|p| p[row]).collect() };

    let mut train_x = Vec::new();
    let mut train_y = Vec::new();
    let mut predict_rows = Vec::new();
    let mut predict_x = Vec::new();
    for (row, target_value) in y.iter().enumerate() {
        let Some(x) = features(row) else { continue };
        match target_value {
            Some(v) => {
                train_x.push(x);
                train_y.push(*v);
            }
            None => {
                predict_rows.push(row);
                predict_x.push(x);
            }
        }
    }
    debug!(
        "regression on '{target}': {} predictor(s), {} training row(s), {} to predict",
        predictors.len(),
        train_x.len(),
        predict_x.len()
    );
    if train_x.is_empty() {
        return Err(Inapplicable::EmptyTraining);
    }
    if predict_x.is_empty() {
        return Err(Inapplicable::NothingToPredict);
    }

    let model = LinearModel::fit(&train_x, &train_y).ok_or(Inapplicable::EmptyTraining)?;
    let decimals = estimate_precision(column);

    let mut cells = column.cells().to_vec();
    for (row, y) in predict_rows.into_iter().zip(model.predict(&predict_x)) {
        cells[row] = Some(Value::Number(round_to(y, decimals)));
    }
    Ok(column.with_cells(cells))
}

// ---------------------------------------------------------------------------
// Iterative (round-robin) imputation
// ---------------------------------------------------------------------------

/// Order in which columns with gaps are visited each round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitOrder {
    /// Fewest missing values first.
    #[default]
    Ascending,
    /// Most missing values first.
    Descending,
    /// Left to right.
    Roman,
    /// Right to left.
    Arabic,
    /// Reshuffled every round from the seed.
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IterativeParams {
    /// Number of rounds over all columns.
    pub max_iter: usize,
    /// Early stop once the largest change is below `tol · max|observed|`.
    pub tol: f64,
    pub seed: u64,
    pub order: VisitOrder,
    /// Ridge penalty of each per-column regression.
    pub ridge_alpha: f64,
}

impl Default for IterativeParams {
    fn default() -> Self {
        Self {
            max_iter: 10,
            tol: 1e-3,
            seed: 0,
            order: VisitOrder::Ascending,
            ridge_alpha: 1e-6,
        }
    }
}

/// Jointly impute every numeric column by regressing each on the others in
/// turn, then keep the target's imputed values.
///
/// Needs at least two numeric columns with present values. Columns that are
/// entirely missing take no part.
pub fn fill_iterative(dataset: &Dataset, target: &str, params: &IterativeParams) -> Result<Column, Inapplicable> {
    let column = target_column(dataset, target)?;
    expect_kind(column, ColumnKind::Numeric)?;
    if column.present_count() == 0 {
        return Err(Inapplicable::NoPresentValues(target.to_string()));
    }

    let numeric = dataset.columns_of_kind(ColumnKind::Numeric);
    if numeric.len() < 2 {
        return Err(Inapplicable::NoPredictors);
    }
    let usable: Vec<&Column> = numeric.into_iter().filter(|c| c.present_count() > 0).collect();
    if usable.len() < 2 {
        return Err(Inapplicable::NoPredictors);
    }
    let target_idx = usable
        .iter()
        .position(|c| c.name() == target)
        .ok_or_else(|| Inapplicable::UnknownColumn(target.to_string()))?;

    let observed: Vec<Vec<Option<f64>>> = usable.iter().map(|c| c.numbers()).collect();
    let imputed = impute_matrix(&observed, params);

    let decimals = estimate_precision(column);
    let mut cells = column.cells().to_vec();
    for (row, cell) in cells.iter_mut().enumerate() {
        if cell.is_none() {
            *cell = Some(Value::Number(round_to(imputed[target_idx][row], decimals)));
        }
    }
    Ok(column.with_cells(cells))
}

/// Column-major round-robin imputation. Every column must have at least one
/// observed value.
fn impute_matrix(observed: &[Vec<Option<f64>>], params: &IterativeParams) -> Vec<Vec<f64>> {
    let n_cols = observed.len();
    let n_rows = observed.first().map_or(0, Vec::len);

    // Initial fill with column means.
    let mut current: Vec<Vec<f64>> = observed
        .iter()
        .map(|col| {
            let present: Vec<f64> = col.iter().flatten().copied().collect();
            let fill = mean(&present).unwrap_or(0.0);
            col.iter().map(|v| v.unwrap_or(fill)).collect()
        })
        .collect();

    let missing_counts: Vec<usize> = observed
        .iter()
        .map(|col| col.iter().filter(|v| v.is_none()).count())
        .collect();
    let mut order: Vec<usize> = (0..n_cols).filter(|&j| missing_counts[j] > 0).collect();
    match params.order {
        VisitOrder::Ascending => order.sort_by_key(|&j| missing_counts[j]),
        VisitOrder::Descending => order.sort_by_key(|&j| std::cmp::Reverse(missing_counts[j])),
        VisitOrder::Roman | VisitOrder::Random => {}
        VisitOrder::Arabic => order.reverse(),
    }

    let scale = observed
        .iter()
        .flat_map(|col| col.iter().flatten())
        .fold(0.0f64, |m, v| m.max(v.abs()));
    let threshold = params.tol * scale;
    let mut rng = SimpleRng::new(params.seed);

    for round in 0..params.max_iter {
        if params.order == VisitOrder::Random {
            rng.shuffle(&mut order);
        }
        let previous = current.clone();

        for &j in &order {
            let others: Vec<usize> = (0..n_cols).filter(|&k| k != j).collect();
            let row_features = |row: usize, m: &[Vec<f64>]| -> Vec<f64> { others.iter().map(|&k| m[k][row]).collect() };

            let (mut train_x, mut train_y) = (Vec::new(), Vec::new());
            for row in 0..n_rows {
                if let Some(v) = observed[j][row] {
                    train_x.push(row_features(row, &current));
                    train_y.push(v);
                }
            }
            let Some(model) = LinearModel::fit_ridge(&train_x, &train_y, params.ridge_alpha) else {
                continue;
            };
            for row in 0..n_rows {
                if observed[j][row].is_none() {
                    current[j][row] = model.predict_row(&row_features(row, &current));
                }
            }
        }

        let change = current
            .iter()
            .zip(&previous)
            .flat_map(|(a, b)| a.iter().zip(b).map(|(x, y)| (x - y).abs()))
            .fold(0.0f64, f64::max);
        debug!("iterative round {}: largest change {change:e}", round + 1);
        if change < threshold {
            debug!("iterative imputation converged after {} round(s)", round + 1);
            break;
        }
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear_dataset() -> Dataset {
        // y = 2x + 1, z = x + 1
        Dataset::from_records(
            &["x", "y", "z"],
            &[
                vec!["1.0", "3.0", "2.0"],
                vec!["2.0", "5.0", "3.0"],
                vec!["3.0", "7.0", "4.0"],
                vec!["4.0", "", "5.0"],
                vec!["5.0", "11.0", "6.0"],
                vec!["", "", "7.0"],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_regression_fills_rows_with_complete_predictors() {
        let ds = linear_dataset();
        let out = fill_regression(&ds, "y").unwrap();
        assert_eq!(out.numbers()[3], Some(9.0));
        // Row 5 lacks x, so it stays missing.
        assert_eq!(out.numbers()[5], None);
        assert_eq!(out.missing_count(), 1);
    }

    #[test]
    fn test_regression_without_predictors() {
        let ds = Dataset::from_records(&["y", "c"], &[["1", "a"], ["", "b"]]).unwrap();
        assert_eq!(fill_regression(&ds, "y"), Err(Inapplicable::NoPredictors));
    }

    #[test]
    fn test_regression_nothing_to_predict() {
        let ds = Dataset::from_records(&["y", "x"], &[["1", "1"], ["", ""]]).unwrap();
        assert_eq!(fill_regression(&ds, "y"), Err(Inapplicable::NothingToPredict));
    }

    #[test]
    fn test_regression_empty_training() {
        let ds = Dataset::from_records(&["y", "x"], &[["1", ""], ["", "2"]]).unwrap();
        assert_eq!(fill_regression(&ds, "y"), Err(Inapplicable::EmptyTraining));
    }

    #[test]
    fn test_iterative_closes_every_gap() {
        let ds = linear_dataset();
        let out = fill_iterative(&ds, "y", &IterativeParams::default()).unwrap();
        assert_eq!(out.missing_count(), 0);
        let y = out.numbers();
        assert_relative_eq!(y[3].unwrap(), 9.0, epsilon = 0.11);
        assert_relative_eq!(y[5].unwrap(), 13.0, epsilon = 0.11);
    }

    #[test]
    fn test_iterative_needs_two_numeric_columns() {
        let ds = Dataset::from_records(&["y", "c"], &[["1", "a"], ["", "b"]]).unwrap();
        assert_eq!(
            fill_iterative(&ds, "y", &IterativeParams::default()),
            Err(Inapplicable::NoPredictors)
        );
    }

    #[test]
    fn test_iterative_random_order_is_reproducible() {
        let ds = linear_dataset();
        let params = IterativeParams {
            order: VisitOrder::Random,
            seed: 11,
            ..IterativeParams::default()
        };
        let a = fill_iterative(&ds, "y", &params).unwrap();
        let b = fill_iterative(&ds, "y", &params).unwrap();
        assert_eq!(a, b);
    }
}
