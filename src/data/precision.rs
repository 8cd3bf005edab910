//! Decimal-precision estimation and rounding for numeric fills.

use super::model::{format_number, Cell, Column, Value};

/// Precision used when a column has no present numbers to learn from.
pub const DEFAULT_PRECISION: u32 = 4;

/// Digits after the decimal point in a number's textual form.
pub fn decimal_places(v: f64) -> usize {
    format_number(v)
        .split_once('.')
        .map_or(0, |(_, frac)| frac.len())
}

/// Mean decimal-place count of the column's present numbers, rounded half
/// to even.
pub fn estimate_precision(column: &Column) -> u32 {
    let places: Vec<usize> = column
        .present_numbers()
        .into_iter()
        .map(decimal_places)
        .collect();
    if places.is_empty() {
        return DEFAULT_PRECISION;
    }
    let mean = places.iter().sum::<usize>() as f64 / places.len() as f64;
    mean.round_ties_even().max(0.0) as u32
}

/// Round half to even at `decimals` places.
pub fn round_to(v: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let scaled = v * factor;
    if !scaled.is_finite() {
        return v;
    }
    scaled.round_ties_even() / factor
}

/// Round every present number of a column; text cells pass through.
pub fn round_cells(cells: Vec<Cell>, decimals: u32) -> Vec<Cell> {
    cells
        .into_iter()
        .map(|cell| match cell {
            Some(Value::Number(v)) => Some(Value::Number(round_to(v, decimals))),
            other => other,
        })
        .collect()
}
