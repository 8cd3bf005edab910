//! Fill strategies and the dispatcher that applies them to a dataset.
//!
//! Strategies are pure: they read a snapshot of the dataset and return a new
//! target column, or an [`Inapplicable`] reason when they cannot run. Only
//! [`apply`] writes back, and only to the target column (or, for row
//! removal, by replacing the dataset with a filtered copy).

pub mod classify;
pub mod encoding;
pub mod grouped;
pub mod regression;
pub mod scalar;

use std::fmt;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::filter::remove_rows_with_missing;
use crate::data::model::{Column, ColumnKind, Dataset};
use crate::error::DataError;
use crate::learn::LogisticConfig;

pub use classify::KnnParams;
pub use regression::{IterativeParams, VisitOrder};

/// The closed set of fill methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMethod {
    /// Fill with a caller-supplied value.
    Constant(String),
    Mean,
    Median,
    Mode,
    /// Mean within groups of the named key columns.
    GroupMean(Vec<String>),
    /// Most frequent value within groups of the named key columns.
    GroupMode(Vec<String>),
    /// Linear regression on the other numeric columns.
    Regression,
    /// Round-robin regression over all numeric columns.
    Iterative(IterativeParams),
    KnnCategorical(KnnParams),
    LogisticCategorical(LogisticConfig),
    /// Drop rows missing any of the named columns; empty means every column.
    RemoveRows(Vec<String>),
}

impl FillMethod {
    /// Default text used for categorical gaps.
    pub const UNKNOWN: &'static str = "Unknown";

    pub fn unknown() -> Self {
        FillMethod::Constant(Self::UNKNOWN.to_string())
    }

    pub fn name(&self) -> &'static str {
        match self {
            FillMethod::Constant(_) => "constant",
            FillMethod::Mean => "mean",
            FillMethod::Median => "median",
            FillMethod::Mode => "mode",
            FillMethod::GroupMean(_) => "group_mean",
            FillMethod::GroupMode(_) => "group_mode",
            FillMethod::Regression => "regression",
            FillMethod::Iterative(_) => "iterative",
            FillMethod::KnnCategorical(_) => "knn_categorical",
            FillMethod::LogisticCategorical(_) => "logistic_categorical",
            FillMethod::RemoveRows(_) => "remove_rows",
        }
    }

    /// Whether the method is offered for a target of this kind.
    pub fn supports(&self, kind: ColumnKind) -> bool {
        match self {
            FillMethod::Constant(_) | FillMethod::RemoveRows(_) => true,
            FillMethod::Mean
            | FillMethod::Median
            | FillMethod::GroupMean(_)
            | FillMethod::Regression
            | FillMethod::Iterative(_) => kind == ColumnKind::Numeric,
            FillMethod::Mode
            | FillMethod::GroupMode(_)
            | FillMethod::KnnCategorical(_)
            | FillMethod::LogisticCategorical(_) => kind == ColumnKind::Categorical,
        }
    }
}

impl fmt::Display for FillMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a strategy left the dataset untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Inapplicable {
    #[error("column '{0}' does not exist")]
    UnknownColumn(String),

    #[error("'{column}' is {found}, method needs a {expected} column")]
    WrongKind {
        column: String,
        expected: ColumnKind,
        found: ColumnKind,
    },

    #[error("column '{0}' has no present values")]
    NoPresentValues(String),

    #[error("column '{0}' has nothing missing")]
    NothingMissing(String),

    #[error("fill value {0:?} would itself count as missing")]
    MissingConstant(String),

    #[error("no usable group columns")]
    NoGroupColumns,

    #[error("no predictor columns available")]
    NoPredictors,

    #[error("no complete rows to train on")]
    EmptyTraining,

    #[error("no missing rows have complete predictors")]
    NothingToPredict,
}

/// Result of one [`apply`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Every gap in the target was closed.
    Filled { filled: usize },
    /// Some gaps remain because their predictors were missing too.
    Partial { filled: usize, remaining: usize },
    RowsRemoved { removed: usize, rows_left: usize },
    Unchanged(Inapplicable),
}

impl Outcome {
    pub fn changed(&self) -> bool {
        !matches!(self, Outcome::Unchanged(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Filled { filled } => write!(f, "filled {filled} missing value(s)"),
            Outcome::Partial { filled, remaining } => write!(
                f,
                "filled {filled} missing value(s), {remaining} left without complete predictors"
            ),
            Outcome::RowsRemoved { removed, rows_left } => {
                write!(f, "removed {removed} row(s), {rows_left} left")
            }
            Outcome::Unchanged(reason) => write!(f, "unchanged: {reason}"),
        }
    }
}

/// Require a numeric or categorical target.
pub(crate) fn expect_kind(column: &Column, expected: ColumnKind) -> Result<(), Inapplicable> {
    if column.kind() == expected {
        Ok(())
    } else {
        Err(Inapplicable::WrongKind {
            column: column.name().to_string(),
            expected,
            found: column.kind(),
        })
    }
}

pub(crate) fn target_column<'a>(dataset: &'a Dataset, target: &str) -> Result<&'a Column, Inapplicable> {
    dataset
        .column(target)
        .ok_or_else(|| Inapplicable::UnknownColumn(target.to_string()))
}

/// Compute the filled column for `target` without touching the dataset.
pub fn fill(dataset: &Dataset, target: &str, method: &FillMethod) -> Result<Column, Inapplicable> {
    let column = target_column(dataset, target)?;
    match method {
        FillMethod::Constant(value) => scalar::fill_constant(column, value),
        FillMethod::Mean => scalar::fill_mean(column),
        FillMethod::Median => scalar::fill_median(column),
        FillMethod::Mode => scalar::fill_mode(column),
        FillMethod::GroupMean(keys) => grouped::fill_group_mean(dataset, target, keys),
        FillMethod::GroupMode(keys) => grouped::fill_group_mode(dataset, target, keys),
        FillMethod::Regression => regression::fill_regression(dataset, target),
        FillMethod::Iterative(params) => regression::fill_iterative(dataset, target, params),
        FillMethod::KnnCategorical(params) => classify::fill_knn(dataset, target, params),
        FillMethod::LogisticCategorical(config) => classify::fill_logistic(dataset, target, config),
        FillMethod::RemoveRows(_) => Ok(column.clone()),
    }
}

/// Apply `method` to the `target` column of `dataset`.
///
/// On any [`Inapplicable`] reason the dataset is left exactly as it was.
pub fn apply(dataset: &mut Dataset, target: &str, method: &FillMethod) -> Outcome {
    let before = match dataset.column(target) {
        Some(col) => col.missing_count(),
        None => {
            warn!("{method}: target column '{target}' does not exist");
            return Outcome::Unchanged(Inapplicable::UnknownColumn(target.to_string()));
        }
    };

    if let FillMethod::RemoveRows(columns) = method {
        return match remove_rows_with_missing(dataset, columns) {
            Ok(filtered) => {
                let removed = dataset.len() - filtered.len();
                *dataset = filtered;
                info!("{method} on {columns:?}: dropped {removed} row(s)");
                Outcome::RowsRemoved {
                    removed,
                    rows_left: dataset.len(),
                }
            }
            Err(DataError::UnknownColumn(name)) => {
                warn!("{method}: column '{name}' does not exist");
                Outcome::Unchanged(Inapplicable::UnknownColumn(name))
            }
            Err(other) => {
                warn!("{method}: {other}");
                Outcome::Unchanged(Inapplicable::UnknownColumn(target.to_string()))
            }
        };
    }

    let filled = match fill(dataset, target, method) {
        Ok(column) => column,
        Err(reason) => {
            debug!("{method} on '{target}' not applied: {reason}");
            return Outcome::Unchanged(reason);
        }
    };

    let remaining = filled.missing_count();
    if let Err(err) = dataset.replace_column(filled) {
        warn!("{method} on '{target}' produced an unusable column: {err}");
        return Outcome::Unchanged(Inapplicable::UnknownColumn(target.to_string()));
    }

    let outcome = if remaining == 0 {
        Outcome::Filled { filled: before }
    } else {
        warn!("{method} on '{target}': {remaining} gap(s) left without complete predictors");
        Outcome::Partial {
            filled: before.saturating_sub(remaining),
            remaining,
        }
    };
    info!("{method} on '{target}': {outcome}");
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::from_records(
            &["x", "g"],
            &[vec!["1.0", "a"], vec!["", "a"], vec!["3.0", "b"], vec!["", ""]],
        )
        .unwrap()
    }

    #[test]
    fn test_supports_matches_kind_lists() {
        let numeric = [
            FillMethod::Mean,
            FillMethod::Median,
            FillMethod::GroupMean(vec![]),
            FillMethod::Regression,
            FillMethod::Iterative(IterativeParams::default()),
        ];
        let categorical = [
            FillMethod::Mode,
            FillMethod::GroupMode(vec![]),
            FillMethod::KnnCategorical(KnnParams::default()),
            FillMethod::LogisticCategorical(LogisticConfig::default()),
        ];
        for m in &numeric {
            assert!(m.supports(ColumnKind::Numeric) && !m.supports(ColumnKind::Categorical));
        }
        for m in &categorical {
            assert!(m.supports(ColumnKind::Categorical) && !m.supports(ColumnKind::Numeric));
        }
        assert!(FillMethod::unknown().supports(ColumnKind::Categorical));
        assert!(FillMethod::RemoveRows(vec![]).supports(ColumnKind::Numeric));
    }

    #[test]
    fn test_apply_unknown_target_leaves_dataset() {
        let mut ds = dataset();
        let snapshot = ds.clone();
        let outcome = apply(&mut ds, "missing_col", &FillMethod::Mean);
        assert_eq!(
            outcome,
            Outcome::Unchanged(Inapplicable::UnknownColumn("missing_col".into()))
        );
        assert_eq!(ds, snapshot);
    }

    #[test]
    fn test_apply_wrong_kind_is_noop() {
        let mut ds = dataset();
        let snapshot = ds.clone();
        let outcome = apply(&mut ds, "g", &FillMethod::Mean);
        assert!(!outcome.changed());
        assert_eq!(ds, snapshot);
    }

    #[test]
    fn test_apply_mean_reports_filled() {
        let mut ds = dataset();
        assert_eq!(apply(&mut ds, "x", &FillMethod::Mean), Outcome::Filled { filled: 2 });
        assert_eq!(ds.column("x").unwrap().missing_count(), 0);
    }

    #[test]
    fn test_apply_remove_rows_without_columns_checks_every_column() {
        let mut ds = Dataset::from_records(
            &["a", "b"],
            &[vec!["1", "x"], vec!["2", ""], vec!["", "y"]],
        )
        .unwrap();
        let outcome = apply(&mut ds, "a", &FillMethod::RemoveRows(vec![]));
        assert_eq!(outcome, Outcome::RowsRemoved { removed: 2, rows_left: 1 });
        assert_eq!(ds.row_ids(), &[0]);
        assert_eq!(ds.missing_total(), 0);
    }

    #[test]
    fn test_apply_remove_rows_on_target_only() {
        let mut ds = dataset();
        let outcome = apply(&mut ds, "x", &FillMethod::RemoveRows(vec!["x".into()]));
        assert_eq!(outcome, Outcome::RowsRemoved { removed: 2, rows_left: 2 });
        assert_eq!(ds.row_ids(), &[0, 2]);
    }

    #[test]
    fn test_fill_method_serde_names() {
        let json = serde_json::to_string(&FillMethod::GroupMean(vec!["g".into()])).unwrap();
        assert_eq!(json, r#"{"group_mean":["g"]}"#);
        let back: FillMethod = serde_json::from_str(r#""median""#).unwrap();
        assert_eq!(back, FillMethod::Median);
        let knn: FillMethod = serde_json::from_str(r#"{"knn_categorical":{}}"#).unwrap();
        assert_eq!(knn, FillMethod::KnnCategorical(KnnParams { n_neighbors: 5 }));
    }
}
