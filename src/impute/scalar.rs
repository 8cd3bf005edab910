//! Single-column fills: constant, mean, median and mode.

use std::collections::HashMap;

use super::{expect_kind, Inapplicable};
use crate::data::model::{Cell, Column, ColumnKind, Value};
use crate::data::normalize::{normalize_cell, parse_number};
use crate::data::precision::{estimate_precision, round_cells, round_to};

/// Fill gaps with `value`.
///
/// Numeric columns parse the value (anything unparseable becomes `0`) and
/// round it, and the rest of the column, to the estimated precision.
/// Categorical columns take the trimmed text as given, unless it is itself
/// a missing spelling.
pub fn fill_constant(column: &Column, value: &str) -> Result<Column, Inapplicable> {
    match column.kind() {
        ColumnKind::Numeric => {
            let decimals = estimate_precision(column);
            let number = parse_number(value.trim()).unwrap_or_else(|| {
                log::debug!("fill value {value:?} is not a number, using 0");
                0.0
            });
            let fill = Value::Number(round_to(number, decimals));
            Ok(column.with_cells(round_cells(fill_gaps(column, &fill), decimals)))
        }
        ColumnKind::Categorical => {
            let text = normalize_cell(value)
                .ok_or_else(|| Inapplicable::MissingConstant(value.to_string()))?;
            Ok(column.with_cells(fill_gaps(column, &Value::Text(text.to_string()))))
        }
    }
}

pub fn fill_mean(column: &Column) -> Result<Column, Inapplicable> {
    fill_with_statistic(column, mean)
}

pub fn fill_median(column: &Column) -> Result<Column, Inapplicable> {
    fill_with_statistic(column, median)
}

/// Fill categorical gaps with the most frequent present value.
pub fn fill_mode(column: &Column) -> Result<Column, Inapplicable> {
    expect_kind(column, ColumnKind::Categorical)?;
    let mode = mode_of(column.present())
        .ok_or_else(|| Inapplicable::NoPresentValues(column.name().to_string()))?;
    Ok(column.with_cells(fill_gaps(column, &mode)))
}

fn fill_with_statistic(column: &Column, stat: fn(&[f64]) -> Option<f64>) -> Result<Column, Inapplicable> {
    expect_kind(column, ColumnKind::Numeric)?;
    let decimals = estimate_precision(column);
    let value = stat(&column.present_numbers())
        .ok_or_else(|| Inapplicable::NoPresentValues(column.name().to_string()))?;
    let fill = Value::Number(round_to(value, decimals));
    Ok(column.with_cells(round_cells(fill_gaps(column, &fill), decimals)))
}

/// Copy of the cells with every gap replaced by `fill`.
pub(crate) fn fill_gaps(column: &Column, fill: &Value) -> Vec<Cell> {
    column
        .cells()
        .iter()
        .map(|c| Some(c.clone().unwrap_or_else(|| fill.clone())))
        .collect()
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    Some(if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    })
}

/// Most frequent value; ties go to the value seen first.
pub(crate) fn mode_of<'a>(values: impl IntoIterator<Item = &'a Value>) -> Option<Value> {
    let mut counts: HashMap<&Value, (usize, usize)> = HashMap::new();
    for (order, v) in values.into_iter().enumerate() {
        counts.entry(v).or_insert((0, order)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
        .map(|(v, _)| v.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(col: &Column) -> Vec<String> {
        col.to_raw()
    }

    #[test]
    fn test_mean_fill_rounds_to_column_precision() {
        let col = Column::from_raw("x", ["1.0", "2.0", "NaN", "4.0"]);
        let out = fill_mean(&col).unwrap();
        assert_eq!(out.numbers(), vec![Some(1.0), Some(2.0), Some(2.3), Some(4.0)]);
        assert_eq!(out.kind(), ColumnKind::Numeric);
    }

    #[test]
    fn test_median_fill() {
        let col = Column::from_raw("x", ["1.5", "", "9.5", "2.5", "None"]);
        let out = fill_median(&col).unwrap();
        assert_eq!(out.numbers(), vec![Some(1.5), Some(2.5), Some(9.5), Some(2.5), Some(2.5)]);
    }

    #[test]
    fn test_median_even_count() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_mean_fill_is_idempotent() {
        let col = Column::from_raw("x", ["1.25", "", "2.5", "3.125"]);
        let once = fill_mean(&col).unwrap();
        assert_eq!(fill_mean(&once).unwrap(), once);
    }

    #[test]
    fn test_mean_on_categorical_is_inapplicable() {
        let col = Column::from_raw("c", ["a", "", "b"]);
        assert!(matches!(fill_mean(&col), Err(Inapplicable::WrongKind { .. })));
    }

    #[test]
    fn test_mean_without_values_is_inapplicable() {
        let col = Column::from_raw("x", ["", "nan"]);
        assert_eq!(fill_mean(&col), Err(Inapplicable::NoPresentValues("x".into())));
    }

    #[test]
    fn test_mode_fill() {
        let col = Column::from_raw("c", ["a", "a", "b", "NaN"]);
        let out = fill_mode(&col).unwrap();
        assert_eq!(texts(&out), vec!["a", "a", "b", "a"]);
    }

    #[test]
    fn test_mode_tie_goes_to_first_seen() {
        let col = Column::from_raw("c", ["z", "a", "a", "z", ""]);
        let out = fill_mode(&col).unwrap();
        assert_eq!(out.get(4), Some(&Value::Text("z".into())));
    }

    #[test]
    fn test_mode_without_values_is_inapplicable() {
        let col = Column::from_raw("c", ["x", ""]).with_cells(vec![None, None]);
        assert_eq!(fill_mode(&col), Err(Inapplicable::NoPresentValues("c".into())));
    }

    #[test]
    fn test_constant_numeric_rounds_and_falls_back_to_zero() {
        let col = Column::from_raw("x", ["1.5", "", "2.5"]);
        let out = fill_constant(&col, " 7.26 ").unwrap();
        assert_eq!(out.numbers(), vec![Some(1.5), Some(7.3), Some(2.5)]);

        let out = fill_constant(&col, "abc").unwrap();
        assert_eq!(out.numbers(), vec![Some(1.5), Some(0.0), Some(2.5)]);

        let out = fill_constant(&col, "nan").unwrap();
        assert_eq!(out.numbers()[1], Some(0.0));
    }

    #[test]
    fn test_constant_categorical_uses_text() {
        let col = Column::from_raw("c", ["a", "", "b"]);
        let out = fill_constant(&col, crate::impute::FillMethod::UNKNOWN).unwrap();
        assert_eq!(texts(&out), vec!["a", "Unknown", "b"]);
    }

    #[test]
    fn test_constant_categorical_rejects_missing_spelling() {
        let col = Column::from_raw("c", ["a", ""]);
        assert_eq!(
            fill_constant(&col, "None"),
            Err(Inapplicable::MissingConstant("None".into()))
        );
    }
}
