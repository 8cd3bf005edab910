//! Missing-value normalization.
//!
//! Every raw cell is trimmed; empty cells and the null spellings below
//! become `None`. What survives is parsed as a number only if the whole
//! column parses, which fixes the column kind once for all later strategies.

use super::model::{Cell, Column, ColumnKind, Value};

/// Spellings treated as missing after trimming. Matching is case-sensitive.
pub const MISSING_TOKENS: [&str; 5] = ["nan", "NaN", "null", "None", "<NA>"];

/// Trim a raw cell and decide whether it is present.
pub fn normalize_cell(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || MISSING_TOKENS.contains(&trimmed) {
        None
    } else {
        Some(trimmed)
    }
}

/// Parse a trimmed cell as a finite number.
pub fn parse_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric iff every present value parses. No present values counts as numeric.
pub fn infer_kind<'a>(present: impl IntoIterator<Item = &'a str>) -> ColumnKind {
    if present.into_iter().all(|s| parse_number(s).is_some()) {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}

impl Column {
    /// Normalize raw text into a column and cache its kind.
    ///
    /// Re-normalizing the output of [`Column::to_raw`] yields the same column.
    pub fn from_raw<I, S>(name: impl Into<String>, raw: I) -> Column
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw: Vec<S> = raw.into_iter().collect();
        let trimmed: Vec<Option<&str>> = raw.iter().map(|s| normalize_cell(s.as_ref())).collect();
        let kind = infer_kind(trimmed.iter().flatten().copied());

        let cells: Vec<Cell> = trimmed
            .into_iter()
            .map(|cell| {
                cell.map(|s| match kind {
                    // Parse cannot fail here: the kind was inferred from these values.
                    ColumnKind::Numeric => {
                        parse_number(s).map_or_else(|| Value::Text(s.to_string()), Value::Number)
                    }
                    ColumnKind::Categorical => Value::Text(s.to_string()),
                })
            })
            .collect();

        Column {
            name: name.into(),
            kind,
            cells,
        }
    }
}
