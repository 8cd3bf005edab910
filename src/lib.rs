//! Missing-value imputation and distribution summaries for tabular data.
//!
//! A [`Dataset`] is built from raw text (the normalizer decides what counts
//! as missing), a [`FillMethod`] is applied to one column at a time through
//! [`impute::apply`], and [`summary::summarize`] turns a column into a
//! histogram-ready label/count sequence.

pub mod data;
pub mod error;
pub mod impute;
pub mod learn;
pub mod profile;
pub mod rng;
pub mod state;
pub mod summary;

pub use data::model::{Column, ColumnKind, Dataset, Value};
pub use error::DataError;
pub use impute::{FillMethod, Inapplicable, Outcome};
pub use summary::{summarize, Distribution};
