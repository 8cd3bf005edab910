//! Classifier-based fills for categorical targets.
//!
//! Every categorical column is label-encoded on its own present values. The
//! other categorical columns are the features: rows where they are all
//! present train (target present) or get predicted (target missing). A gap
//! with any missing feature is left as it is.

use log::debug;
use serde::{Deserialize, Serialize};

use super::encoding::LabelMapping;
use super::{expect_kind, target_column, Inapplicable};
use crate::data::model::{Column, ColumnKind, Dataset, Value};
use crate::learn::{KnnClassifier, LogisticConfig, SoftmaxClassifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnnParams {
    pub n_neighbors: usize,
}

impl Default for KnnParams {
    fn default() -> Self {
        Self { n_neighbors: 5 }
    }
}

/// Encoded training and prediction sets for one categorical target.
struct Partition {
    mapping: LabelMapping,
    train_x: Vec<Vec<f64>>,
    train_y: Vec<usize>,
    predict_rows: Vec<usize>,
    predict_x: Vec<Vec<f64>>,
}

fn partition(dataset: &Dataset, target: &str) -> Result<Partition, Inapplicable> {
    let column = target_column(dataset, target)?;
    expect_kind(column, ColumnKind::Categorical)?;

    let features: Vec<Vec<Option<usize>>> = dataset
        .columns_of_kind(ColumnKind::Categorical)
        .into_iter()
        .filter(|c| c.name() != target)
        .map(|c| LabelMapping::fit(c).encode_column(c))
        .collect();
    if features.is_empty() {
        return Err(Inapplicable::NoPredictors);
    }

    let mapping = LabelMapping::fit(column);
    let codes = mapping.encode_column(column);

    let mut part = Partition {
        mapping,
        train_x: Vec::new(),
        train_y: Vec::new(),
        predict_rows: Vec::new(),
        predict_x: Vec::new(),
    };
    for (row, code) in codes.into_iter().enumerate() {
        let x: Option<Vec<f64>> = features
            .iter()
            .map(|f| f[row].map(|c| c as f64))
            .collect();
        let Some(x) = x else { continue };
        match code {
            Some(label) => {
                part.train_x.push(x);
                part.train_y.push(label);
            }
            None => {
                part.predict_rows.push(row);
                part.predict_x.push(x);
            }
        }
    }
    debug!(
        "classifier fill of '{target}': {} feature(s), {} training row(s), {} to predict",
        features.len(),
        part.train_x.len(),
        part.predict_x.len()
    );

    if part.predict_x.is_empty() {
        return Err(Inapplicable::NothingToPredict);
    }
    if part.train_x.is_empty() {
        return Err(Inapplicable::EmptyTraining);
    }
    Ok(part)
}

/// Write decoded predictions into a copy of the target column.
fn write_back(column: &Column, part: &Partition, predicted: &[usize]) -> Column {
    let mut cells = column.cells().to_vec();
    for (&row, &code) in part.predict_rows.iter().zip(predicted) {
        if let Some(text) = part.mapping.decode(code) {
            cells[row] = Some(Value::Text(text.to_string()));
        }
    }
    column.with_cells(cells)
}

/// Fill categorical gaps with the majority label of the nearest rows.
pub fn fill_knn(dataset: &Dataset, target: &str, params: &KnnParams) -> Result<Column, Inapplicable> {
    let part = partition(dataset, target)?;
    let knn = KnnClassifier::fit(part.train_x.clone(), part.train_y.clone(), params.n_neighbors)
        .ok_or(Inapplicable::EmptyTraining)?;
    let predicted = knn.predict(&part.predict_x);
    let column = target_column(dataset, target)?;
    Ok(write_back(column, &part, &predicted))
}

/// Fill categorical gaps with a multinomial logistic regression classifier.
pub fn fill_logistic(dataset: &Dataset, target: &str, config: &LogisticConfig) -> Result<Column, Inapplicable> {
    let part = partition(dataset, target)?;
    let clf = SoftmaxClassifier::fit(&part.train_x, &part.train_y, config)
        .ok_or(Inapplicable::EmptyTraining)?;
    let predicted = clf.predict(&part.predict_x);
    let column = target_column(dataset, target)?;
    Ok(write_back(column, &part, &predicted))
}
