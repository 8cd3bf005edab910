use thiserror::Error;

/// Faults raised while building or reshaping a [`Dataset`](crate::Dataset).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("column '{name}' has {got} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("row {row} has {got} fields, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("missing values remain in columns: {}", .0.join(", "))]
    MissingValues(Vec<String>),

    #[error("split percentages must sum to 100, got {0}")]
    InvalidSplit(f64),
}
