//! Distribution summaries: a column turned into ordered (label, count)
//! buckets ready for a bar chart.
//!
//! Numeric data with many distinct values is cut into equal-width bins with
//! readable bounds; anything else is counted value by value. Missing cells
//! always get their own bucket, last.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::data::model::{format_number, Column, Value};
use crate::data::normalize::parse_number;

/// Label of the bucket counting missing cells.
pub const MISSING_LABEL: &str = "missing";
/// Number of equal-width bins for wide numeric columns.
pub const BIN_COUNT: usize = 19;
/// Numeric columns with more distinct values than this are binned.
pub const MAX_DISTINCT_UNBINNED: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BucketKind {
    /// Values in `(left, right]`.
    Interval { left: f64, right: f64 },
    Value,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub count: usize,
    #[serde(flatten)]
    pub kind: BucketKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub column: String,
    /// True when at least one present value parses as a number.
    pub numeric: bool,
    pub buckets: Vec<Bucket>,
}

impl Distribution {
    /// Sum of all bucket counts; equals the column's row count.
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }

    pub fn missing(&self) -> usize {
        self.buckets
            .iter()
            .filter(|b| b.kind == BucketKind::Missing)
            .map(|b| b.count)
            .sum()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.buckets.iter().map(|b| b.label.as_str()).collect()
    }

    pub fn counts(&self) -> Vec<usize> {
        self.buckets.iter().map(|b| b.count).collect()
    }
}

/// Summarize a normalized column.
pub fn summarize(column: &Column) -> Distribution {
    let mut numbers: Vec<f64> = Vec::new();
    let mut others: Vec<&Value> = Vec::new();
    for value in column.present() {
        match value {
            Value::Number(v) => numbers.push(*v),
            Value::Text(s) => match parse_number(s) {
                Some(v) => numbers.push(v),
                None => others.push(value),
            },
        }
    }
    let numeric = !numbers.is_empty();

    let mut buckets = if numeric {
        let distinct: HashSet<u64> = numbers.iter().map(|v| v.to_bits()).collect();
        if distinct.len() > MAX_DISTINCT_UNBINNED {
            binned(&numbers)
        } else {
            numeric_counts(&numbers)
        }
    } else {
        Vec::new()
    };
    // Present values that are not numbers keep their own buckets.
    buckets.extend(frequency_counts(&others));

    let missing = column.missing_count();
    if missing > 0 {
        buckets.push(Bucket {
            label: MISSING_LABEL.to_string(),
            count: missing,
            kind: BucketKind::Missing,
        });
    }

    Distribution {
        column: column.name().to_string(),
        numeric,
        buckets,
    }
}

/// Counts per distinct number, ascending by value.
fn numeric_counts(numbers: &[f64]) -> Vec<Bucket> {
    let mut sorted = numbers.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mut buckets: Vec<Bucket> = Vec::new();
    for v in sorted {
        let label = format_number(v);
        match buckets.last_mut() {
            Some(last) if last.label == label => last.count += 1,
            _ => buckets.push(Bucket {
                label,
                count: 1,
                kind: BucketKind::Value,
            }),
        }
    }
    buckets
}

/// Counts per distinct value, most frequent first; ties keep first-seen order.
fn frequency_counts(values: &[&Value]) -> Vec<Bucket> {
    let mut order: Vec<&Value> = Vec::new();
    let mut counts: HashMap<&Value, usize> = HashMap::new();
    for &v in values {
        let count = counts.entry(v).or_insert(0);
        if *count == 0 {
            order.push(v);
        }
        *count += 1;
    }
    let mut buckets: Vec<Bucket> = order
        .into_iter()
        .map(|v| Bucket {
            label: value_label(v),
            count: counts[v],
            kind: BucketKind::Value,
        })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets
}

/// Label of a verbatim value. A value that reads as the missing label,
/// possibly already wrapped in quotes, gets one more pair of quotes so the
/// missing bucket keeps its label to itself.
fn value_label(value: &Value) -> String {
    let text = value.to_string();
    let mut inner = text.as_str();
    while let Some(rest) = inner.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        inner = rest;
    }
    if inner == MISSING_LABEL {
        format!("\"{text}\"")
    } else {
        text
    }
}

/// Equal-width bins over `[min, max]`, closed on the right, with the first
/// edge pulled left by 0.1% of the range so the minimum falls inside.
fn binned(numbers: &[f64]) -> Vec<Bucket> {
    let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
    let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / BIN_COUNT as f64;

    let mut edges: Vec<f64> = (0..=BIN_COUNT).map(|i| min + width * i as f64).collect();
    edges[BIN_COUNT] = max;
    edges[0] -= (max - min) * 0.001;

    let mut counts = vec![0usize; BIN_COUNT];
    for &v in numbers {
        let idx = edges.partition_point(|&e| e < v).saturating_sub(1);
        counts[idx.min(BIN_COUNT - 1)] += 1;
    }

    let avg = numbers.iter().sum::<f64>() / numbers.len() as f64;
    let bounds: Vec<(f64, f64)> = edges.windows(2).map(|w| (w[0], w[1])).collect();
    let labels = interval_labels(&bounds, avg);

    bounds
        .into_iter()
        .zip(labels)
        .zip(counts)
        .map(|(((left, right), label), count)| Bucket {
            label,
            count,
            kind: BucketKind::Interval { left, right },
        })
        .collect()
}

/// Readable labels for bin bounds.
///
/// Above an average of 100 the bounds snap outward to a unit one order of
/// magnitude below the average (left down, right up minus one). Otherwise
/// both bounds round to integers and the left one is shifted by one. If
/// rounding makes two labels collide, the exact bounds are printed with
/// just enough decimals to tell them apart.
pub fn interval_labels(bounds: &[(f64, f64)], avg: f64) -> Vec<String> {
    let labels: Vec<String> = if avg > 100.0 {
        let n = avg.log10().floor() as i32;
        let unit = 10f64.powi(n - 1);
        bounds
            .iter()
            .map(|&(l, r)| {
                let left = ((l / unit).floor() * unit) as i64;
                let right = ((r / unit).ceil() * unit) as i64 - 1;
                format!("{left}–{right}")
            })
            .collect()
    } else {
        bounds
            .iter()
            .map(|&(l, r)| {
                let left = l.round_ties_even() as i64 + 1;
                let right = r.round_ties_even() as i64;
                format!("{left}–{right}")
            })
            .collect()
    };
    if all_unique(&labels) {
        return labels;
    }

    for decimals in 1..=12 {
        let precise: Vec<String> = bounds
            .iter()
            .map(|&(l, r)| format!("{l:.decimals$}–{r:.decimals$}"))
            .collect();
        if all_unique(&precise) {
            return precise;
        }
    }
    bounds
        .iter()
        .enumerate()
        .map(|(i, &(l, r))| format!("{l}–{r} #{}", i + 1))
        .collect()
}

fn all_unique(labels: &[String]) -> bool {
    let mut seen = HashSet::new();
    labels.iter().all(|l| seen.insert(l))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorical_counts_by_frequency() {
        let col = Column::from_raw("c", ["b", "a", "a", "", "c", "a", "b", "None"]);
        let dist = summarize(&col);
        assert!(!dist.numeric);
        assert_eq!(dist.labels(), vec!["a", "b", "c", MISSING_LABEL]);
        assert_eq!(dist.counts(), vec![3, 2, 1, 2]);
        assert_eq!(dist.total(), col.len());
    }

    #[test]
    fn test_few_numbers_ordered_by_value() {
        let col = Column::from_raw("n", ["3", "1", "3", "2", "", "1", "3"]);
        let dist = summarize(&col);
        assert!(dist.numeric);
        assert_eq!(dist.labels(), vec!["1.0", "2.0", "3.0", MISSING_LABEL]);
        assert_eq!(dist.counts(), vec![2, 1, 3, 1]);
    }

    #[test]
    fn test_no_missing_bucket_without_gaps() {
        let dist = summarize(&Column::from_raw("c", ["x", "y"]));
        assert_eq!(dist.missing(), 0);
        assert!(dist.buckets.iter().all(|b| b.kind != BucketKind::Missing));
    }

    #[test]
    fn test_small_scale_bins() {
        let raw: Vec<String> = (0..=40).map(|i| i.to_string()).collect();
        let dist = summarize(&Column::from_raw("n", &raw));
        assert_eq!(dist.buckets.len(), BIN_COUNT);
        assert_eq!(dist.total(), 41);
        // First bin (-0.04, 2.105]: 0, 1, 2.
        assert_eq!(dist.buckets[0].count, 3);
        assert_eq!(dist.buckets[0].label, "1–2");
        assert!(all_unique(&dist.labels().iter().map(|s| s.to_string()).collect::<Vec<_>>()));
    }

    #[test]
    fn test_large_scale_labels_snap_to_unit() {
        // 100, 200, ..., 2200: average 1150, so the unit is 100.
        let raw: Vec<String> = (1..=22).map(|i| (i * 100).to_string()).collect();
        let dist = summarize(&Column::from_raw("n", &raw));
        assert_eq!(dist.buckets.len(), BIN_COUNT);
        assert_eq!(dist.buckets[0].label, "0–299");
        assert_eq!(dist.buckets[BIN_COUNT - 1].label, "2000–2199");
        for label in dist.labels() {
            let (l, r) = label.split_once('–').unwrap();
            let l: i64 = l.parse().unwrap();
            let r: i64 = r.parse().unwrap();
            assert_eq!(l % 100, 0, "{label}");
            assert_eq!((r + 1) % 100, 0, "{label}");
        }
    }

    #[test]
    fn test_max_lands_in_last_bin() {
        let raw: Vec<String> = (0..25).map(|i| format!("{}.5", i)).collect();
        let dist = summarize(&Column::from_raw("n", &raw));
        assert_eq!(dist.buckets.last().unwrap().count, 2);
        assert_eq!(dist.total(), 25);
    }

    #[test]
    fn test_colliding_labels_fall_back_to_decimals() {
        let raw: Vec<String> = (0..30).map(|i| format!("0.{:02}", i)).collect();
        let dist = summarize(&Column::from_raw("n", &raw));
        let labels = dist.labels();
        let unique: HashSet<&&str> = labels.iter().collect();
        assert_eq!(unique.len(), labels.len());
    }

    #[test]
    fn test_literal_missing_value_is_quoted() {
        let col = Column::from_raw("status", ["missing", "ok", "", "missing", "\"missing\""]);
        let dist = summarize(&col);
        assert_eq!(
            dist.labels(),
            vec!["\"missing\"", "ok", "\"\"missing\"\"", MISSING_LABEL]
        );
        assert_eq!(dist.counts(), vec![2, 1, 1, 1]);
        assert_eq!(dist.missing(), 1);
    }

    #[test]
    fn test_mixed_column_keeps_text_buckets() {
        let col = Column::from_raw("m", ["1", "2", "two", "two", ""]);
        let dist = summarize(&col);
        assert!(dist.numeric);
        assert_eq!(dist.labels(), vec!["1.0", "2.0", "two", MISSING_LABEL]);
        assert_eq!(dist.total(), 5);
    }
}
