use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::DataError;

// ---------------------------------------------------------------------------
// Value – a single present cell
// ---------------------------------------------------------------------------

/// A present cell value. Absence is `None` at the cell level, never a
/// special string, so the text `"None"` and a missing cell cannot be confused
/// once a column has been normalized.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

/// One cell of a column: `None` is the missing marker.
pub type Cell = Option<Value>;

// -- Manual Eq/Ord/Hash so values can form group keys --

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Number(_), Value::Text(_)) => Ordering::Less,
            (Value::Text(_), Value::Number(_)) => Ordering::Greater,
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Number(v) => v.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => f.write_str(&format_number(*v)),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl Value {
    /// The numeric payload, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::Text(_) => None,
        }
    }
}

/// Textual form of a number: integral values keep one decimal (`3.0`),
/// anything else uses the shortest representation that round-trips.
///
/// Magnitudes below `1e-4` or from `1e16` up switch to scientific notation
/// with a signed, two-digit exponent (`1e-07`, `1.5e+20`).
pub fn format_number(v: f64) -> String {
    let abs = v.abs();
    if v.is_finite() && abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let sci = format!("{v:e}");
        let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let exp: i32 = exp.parse().unwrap_or(0);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    } else if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => f.write_str("numeric"),
            ColumnKind::Categorical => f.write_str("categorical"),
        }
    }
}

/// A named, normalized sequence of cells with its kind inferred once.
///
/// Build one with [`Column::from_raw`]; fill strategies derive new columns
/// from it but never change the kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub(crate) name: String,
    pub(crate) kind: ColumnKind,
    pub(crate) cells: Vec<Cell>,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Numeric
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.cells.get(row).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn is_missing(&self, row: usize) -> bool {
        matches!(self.cells.get(row), Some(None))
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    pub fn present_count(&self) -> usize {
        self.len() - self.missing_count()
    }

    /// Numeric view of every cell; text and missing cells map to `None`.
    pub fn numbers(&self) -> Vec<Option<f64>> {
        self.cells
            .iter()
            .map(|c| c.as_ref().and_then(Value::as_f64))
            .collect()
    }

    /// Present numeric values in row order.
    pub fn present_numbers(&self) -> Vec<f64> {
        self.numbers().into_iter().flatten().collect()
    }

    /// Present values in row order.
    pub fn present(&self) -> impl Iterator<Item = &Value> {
        self.cells.iter().flatten()
    }

    /// Raw text of every cell; missing cells become empty strings.
    pub fn to_raw(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|c| c.as_ref().map(Value::to_string).unwrap_or_default())
            .collect()
    }

    /// Same name and kind, different cells.
    pub(crate) fn with_cells(&self, cells: Vec<Cell>) -> Column {
        Column {
            name: self.name.clone(),
            kind: self.kind,
            cells,
        }
    }

    pub(crate) fn select_rows(&self, rows: &[usize]) -> Column {
        self.with_cells(rows.iter().map(|&r| self.cells[r].clone()).collect())
    }
}

// ---------------------------------------------------------------------------
// Dataset – ordered, row-aligned columns
// ---------------------------------------------------------------------------

/// Ordered named columns of equal length.
///
/// `row_ids` records each row's position in the dataset as first loaded, so
/// filtered or shuffled views can still be traced back to their source rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_ids: Vec<usize>,
}

impl Dataset {
    /// Assemble a dataset, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self, DataError> {
        let rows = columns.first().map_or(0, Column::len);
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(DataError::DuplicateColumn(col.name.clone()));
            }
            if col.len() != rows {
                return Err(DataError::LengthMismatch {
                    name: col.name.clone(),
                    expected: rows,
                    got: col.len(),
                });
            }
        }
        Ok(Dataset {
            columns,
            row_ids: (0..rows).collect(),
        })
    }

    /// Build a dataset from a header row and raw text records, normalizing
    /// every column on the way in.
    pub fn from_records<H, R, S>(headers: &[H], records: &[R]) -> Result<Self, DataError>
    where
        H: AsRef<str>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let width = headers.len();
        let mut raw: Vec<Vec<&str>> = vec![Vec::with_capacity(records.len()); width];
        for (row, record) in records.iter().enumerate() {
            let record = record.as_ref();
            if record.len() != width {
                return Err(DataError::RaggedRow {
                    row,
                    expected: width,
                    got: record.len(),
                });
            }
            for (slot, field) in raw.iter_mut().zip(record) {
                slot.push(field.as_ref());
            }
        }
        let columns = headers
            .iter()
            .zip(raw)
            .map(|(name, values)| Column::from_raw(name.as_ref(), values))
            .collect();
        Dataset::new(columns)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.row_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_ids.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Original positions of the rows currently held.
    pub fn row_ids(&self) -> &[usize] {
        &self.row_ids
    }

    /// Columns of one kind, in dataset order.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.kind == kind).collect()
    }

    /// Total number of missing cells across all columns.
    pub fn missing_total(&self) -> usize {
        self.columns.iter().map(Column::missing_count).sum()
    }

    /// Swap in a same-named column of the same length.
    pub fn replace_column(&mut self, column: Column) -> Result<(), DataError> {
        if column.len() != self.len() {
            return Err(DataError::LengthMismatch {
                name: column.name.clone(),
                expected: self.len(),
                got: column.len(),
            });
        }
        let slot = self
            .columns
            .iter_mut()
            .find(|c| c.name == column.name)
            .ok_or_else(|| DataError::UnknownColumn(column.name.clone()))?;
        *slot = column;
        Ok(())
    }

    /// A new dataset holding only the given row positions, in that order.
    pub(crate) fn select_rows(&self, rows: &[usize]) -> Dataset {
        Dataset {
            columns: self.columns.iter().map(|c| c.select_rows(rows)).collect(),
            row_ids: rows.iter().map(|&r| self.row_ids[r]).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_keeps_one_decimal_for_integers() {
        assert_eq!(format_number(3.0), "3.0");
        assert_eq!(format_number(-12.0), "-12.0");
        assert_eq!(format_number(2.25), "2.25");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn test_format_number_scientific_at_extreme_magnitudes() {
        assert_eq!(format_number(1e-7), "1e-07");
        assert_eq!(format_number(-1.5e-5), "-1.5e-05");
        assert_eq!(format_number(1e16), "1e+16");
        assert_eq!(format_number(2.5e120), "2.5e+120");
        assert_eq!(format_number(0.0001), "0.0001");
        assert_eq!(format_number(0.0), "0.0");
    }

    #[test]
    fn test_value_ordering_and_equality() {
        assert_eq!(Value::Number(1.5), Value::Number(1.5));
        assert!(Value::Number(100.0) < Value::Text("a".into()));
        assert!(Value::Text("a".into()) < Value::Text("b".into()));
    }

    #[test]
    fn test_new_rejects_unequal_lengths() {
        let a = Column::from_raw("a", ["1", "2"]);
        let b = Column::from_raw("b", ["x"]);
        let err = Dataset::new(vec![a, b]).unwrap_err();
        assert_eq!(
            err,
            DataError::LengthMismatch {
                name: "b".into(),
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn test_new_rejects_duplicate_names() {
        let a = Column::from_raw("a", ["1"]);
        let b = Column::from_raw("a", ["2"]);
        assert_eq!(
            Dataset::new(vec![a, b]).unwrap_err(),
            DataError::DuplicateColumn("a".into())
        );
    }

    #[test]
    fn test_from_records_transposes_and_normalizes() {
        let ds = Dataset::from_records(
            &["n", "c"],
            &[vec!["1.5", "x"], vec![" ", "y"], vec!["2", "None"]],
        )
        .unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.width(), 2);
        let n = ds.column("n").unwrap();
        assert_eq!(n.kind(), ColumnKind::Numeric);
        assert_eq!(n.numbers(), vec![Some(1.5), None, Some(2.0)]);
        let c = ds.column("c").unwrap();
        assert_eq!(c.kind(), ColumnKind::Categorical);
        assert_eq!(c.missing_count(), 1);
        assert_eq!(ds.missing_total(), 2);
    }

    #[test]
    fn test_from_records_rejects_ragged_rows() {
        let err = Dataset::from_records(&["a", "b"], &[vec!["1", "2"], vec!["3"]]).unwrap_err();
        assert_eq!(
            err,
            DataError::RaggedRow {
                row: 1,
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn test_select_rows_keeps_original_ids() {
        let ds = Dataset::from_records(&["a"], &[["1"], ["2"], ["3"], ["4"]]).unwrap();
        let picked = ds.select_rows(&[3, 1]);
        assert_eq!(picked.row_ids(), &[3, 1]);
        let again = picked.select_rows(&[1]);
        assert_eq!(again.row_ids(), &[1]);
        assert_eq!(again.column("a").unwrap().numbers(), vec![Some(2.0)]);
    }

    #[test]
    fn test_replace_column_checks_name_and_length() {
        let mut ds = Dataset::from_records(&["a"], &[["1"], ["2"]]).unwrap();
        let short = Column::from_raw("a", ["1"]);
        assert!(ds.replace_column(short).is_err());
        let other = Column::from_raw("z", ["1", "2"]);
        assert_eq!(
            ds.replace_column(other).unwrap_err(),
            DataError::UnknownColumn("z".into())
        );
    }
}
