//! Per-column missing-value statistics.

use serde::Serialize;

use crate::data::model::{Column, ColumnKind, Dataset};

/// Headline facts about one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub kind: ColumnKind,
    pub rows: usize,
    pub missing: usize,
    pub missing_percent: f64,
}

impl ColumnProfile {
    pub fn of(column: &Column) -> Self {
        let missing = column.missing_count();
        ColumnProfile {
            name: column.name().to_string(),
            kind: column.kind(),
            rows: column.len(),
            missing,
            missing_percent: percent(missing, column.len()),
        }
    }
}

/// One line of the missing-value overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingStat {
    pub name: String,
    pub count: usize,
    pub percent: f64,
    /// Compact form, e.g. `"12% - 30"`.
    pub label: String,
}

/// Missing count and share of every column, in column order.
pub fn missing_overview(dataset: &Dataset) -> Vec<MissingStat> {
    dataset
        .columns()
        .iter()
        .map(|col| {
            let count = col.missing_count();
            let percent = percent(count, col.len());
            MissingStat {
                name: col.name().to_string(),
                count,
                percent,
                label: missing_label(count, percent),
            }
        })
        .collect()
}

/// `0%` when nothing is missing, `<1%` below one percent, else the
/// rounded whole percentage.
pub fn missing_label(count: usize, percent: f64) -> String {
    if count == 0 {
        format!("0% - {count}")
    } else if percent < 1.0 {
        format!("<1% - {count}")
    } else {
        format!("{}% - {count}", percent.round_ties_even() as i64)
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_profile_counts_missing() {
        let col = Column::from_raw("age", ["31", "", "NaN", "40"]);
        let p = ColumnProfile::of(&col);
        assert_eq!(p.kind, ColumnKind::Numeric);
        assert_eq!(p.rows, 4);
        assert_eq!(p.missing, 2);
        assert_relative_eq!(p.missing_percent, 50.0);
    }

    #[test]
    fn test_missing_labels() {
        assert_eq!(missing_label(0, 0.0), "0% - 0");
        assert_eq!(missing_label(1, 0.5), "<1% - 1");
        assert_eq!(missing_label(3, 12.5), "12% - 3");
        assert_eq!(missing_label(7, 66.7), "67% - 7");
    }

    #[test]
    fn test_overview_keeps_column_order() {
        let ds = Dataset::from_records(&["b", "a"], &[["1", ""], ["", ""], ["3", "x"]]).unwrap();
        let overview = missing_overview(&ds);
        let names: Vec<&str> = overview.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(overview[0].label, "33% - 1");
        assert_eq!(overview[1].label, "67% - 2");
    }

    #[test]
    fn test_empty_column_has_zero_percent() {
        let p = ColumnProfile::of(&Column::from_raw("e", Vec::<String>::new()));
        assert_eq!(p.missing_percent, 0.0);
    }
}
