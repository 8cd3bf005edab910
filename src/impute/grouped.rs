//! Fills computed within groups of one or more key columns.
//!
//! A row's group key is the tuple of its key-column values, and exists only
//! when every key cell is present. Gaps whose key is undefined, or whose key
//! never appears among rows with a present target, fall back to the
//! statistic over the whole column.

use std::collections::HashMap;

use log::debug;

use super::scalar::{mean, mode_of};
use super::{expect_kind, target_column, Inapplicable};
use crate::data::model::{Cell, Column, ColumnKind, Dataset, Value};
use crate::data::precision::{estimate_precision, round_cells, round_to};

type GroupKey = Vec<Value>;

/// Fill numeric gaps with the rounded mean of the row's group.
pub fn fill_group_mean(dataset: &Dataset, target: &str, group_by: &[String]) -> Result<Column, Inapplicable> {
    let column = target_column(dataset, target)?;
    expect_kind(column, ColumnKind::Numeric)?;
    let keys = key_columns(dataset, target, group_by)?;
    let decimals = estimate_precision(column);

    let values = column.numbers();
    let global = mean(&column.present_numbers())
        .map(|m| round_to(m, decimals))
        .ok_or_else(|| Inapplicable::NoPresentValues(target.to_string()))?;

    let row_keys = group_keys(dataset.len(), &keys);
    let mut sums: HashMap<&GroupKey, (f64, usize)> = HashMap::new();
    for (value, key) in values.iter().zip(&row_keys) {
        if let (Some(v), Some(key)) = (value, key) {
            let entry = sums.entry(key).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }
    let group_means: HashMap<&GroupKey, f64> = sums
        .into_iter()
        .map(|(key, (sum, n))| (key, round_to(sum / n as f64, decimals)))
        .collect();
    debug!("group mean of '{target}' over {} group(s)", group_means.len());

    let cells: Vec<Cell> = column
        .cells()
        .iter()
        .zip(&row_keys)
        .map(|(cell, key)| {
            cell.clone().or_else(|| {
                let fill = key
                    .as_ref()
                    .and_then(|k| group_means.get(k).copied())
                    .unwrap_or(global);
                Some(Value::Number(fill))
            })
        })
        .collect();

    Ok(column.with_cells(round_cells(cells, decimals)))
}

/// Fill categorical gaps with the most frequent value of the row's group.
pub fn fill_group_mode(dataset: &Dataset, target: &str, group_by: &[String]) -> Result<Column, Inapplicable> {
    let column = target_column(dataset, target)?;
    expect_kind(column, ColumnKind::Categorical)?;
    let keys = key_columns(dataset, target, group_by)?;

    let global = mode_of(column.present())
        .ok_or_else(|| Inapplicable::NoPresentValues(target.to_string()))?;

    let row_keys = group_keys(dataset.len(), &keys);
    let mut members: HashMap<&GroupKey, Vec<&Value>> = HashMap::new();
    for (cell, key) in column.cells().iter().zip(&row_keys) {
        if let (Some(v), Some(key)) = (cell, key) {
            members.entry(key).or_default().push(v);
        }
    }
    let group_modes: HashMap<&GroupKey, Value> = members
        .into_iter()
        .filter_map(|(key, vals)| mode_of(vals).map(|m| (key, m)))
        .collect();
    debug!("group mode of '{target}' over {} group(s)", group_modes.len());

    let cells: Vec<Cell> = column
        .cells()
        .iter()
        .zip(&row_keys)
        .map(|(cell, key)| {
            cell.clone().or_else(|| {
                key.as_ref()
                    .and_then(|k| group_modes.get(k).cloned())
                    .or_else(|| Some(global.clone()))
            })
        })
        .collect();

    Ok(column.with_cells(cells))
}

/// Resolve key names, dropping unknown names, the target itself and repeats.
fn key_columns<'a>(dataset: &'a Dataset, target: &str, group_by: &[String]) -> Result<Vec<&'a Column>, Inapplicable> {
    let mut keys: Vec<&Column> = Vec::new();
    for name in group_by {
        if name == target || keys.iter().any(|k| k.name() == name) {
            continue;
        }
        match dataset.column(name) {
            Some(col) => keys.push(col),
            None => debug!("ignoring unknown group column '{name}'"),
        }
    }
    if keys.is_empty() {
        return Err(Inapplicable::NoGroupColumns);
    }
    Ok(keys)
}

/// Per-row group key; `None` when any key cell is missing.
fn group_keys(rows: usize, keys: &[&Column]) -> Vec<Option<GroupKey>> {
    (0..rows)
        .map(|row| keys.iter().map(|col| col.get(row).cloned()).collect())
        .collect()
}
