//! Label encoding for categorical columns.
//!
//! Maps each distinct present value of a column (compared by its text) to an
//! integer index (0, 1, 2, ...) in sorted order. Missing cells stay unmapped.

use std::collections::{BTreeSet, HashMap};

use crate::data::model::{Column, Value};

/// Fitted value ↔ code mapping for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMapping {
    /// Distinct texts in sorted order; the index is the code.
    classes: Vec<String>,
    class_to_idx: HashMap<String, usize>,
}

impl LabelMapping {
    /// Fit on the column's present values only.
    pub fn fit(column: &Column) -> Self {
        let classes: Vec<String> = column
            .present()
            .map(Value::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let class_to_idx = classes
            .iter()
            .enumerate()
            .map(|(idx, class)| (class.clone(), idx))
            .collect();
        LabelMapping {
            classes,
            class_to_idx,
        }
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn encode(&self, value: &Value) -> Option<usize> {
        self.class_to_idx.get(&value.to_string()).copied()
    }

    /// Code of every cell; missing cells map to `None`.
    pub fn encode_column(&self, column: &Column) -> Vec<Option<usize>> {
        column
            .cells()
            .iter()
            .map(|c| c.as_ref().and_then(|v| self.encode(v)))
            .collect()
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_sorted_order() {
        let col = Column::from_raw("c", ["red", "blue", "", "red", "green"]);
        let mapping = LabelMapping::fit(&col);
        assert_eq!(mapping.n_classes(), 3);
        assert_eq!(
            mapping.encode_column(&col),
            vec![Some(2), Some(0), None, Some(2), Some(1)]
        );
        assert_eq!(mapping.decode(1), Some("green"));
        assert_eq!(mapping.decode(9), None);
    }

    #[test]
    fn test_unseen_value_is_unmapped() {
        let mapping = LabelMapping::fit(&Column::from_raw("c", ["a"]));
        assert_eq!(mapping.encode(&Value::Text("b".into())), None);
    }
}
