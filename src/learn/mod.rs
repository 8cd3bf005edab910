//! Small dense models used by the predictive fill strategies.
//!
//! All of them work on row-major `&[Vec<f64>]` feature matrices with no
//! missing entries; partitioning rows into complete training and prediction
//! sets is the caller's job.

pub mod knn;
pub mod linear;
pub mod logistic;

pub use knn::KnnClassifier;
pub use linear::LinearModel;
pub use logistic::{LogisticConfig, SoftmaxClassifier};
