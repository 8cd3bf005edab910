use log::info;

use crate::data::model::Dataset;
use crate::data::split::{split_dataset, Split, SplitRatios, DEFAULT_SPLIT_SEED};
use crate::error::DataError;
use crate::impute::{self, FillMethod, Inapplicable, Outcome};
use crate::profile::{missing_overview, ColumnProfile, MissingStat};
use crate::summary::{summarize, Distribution};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Everything a front end needs between user actions, independent of rendering.
#[derive(Debug, Default)]
pub struct Session {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// Column the user is working on.
    pub selected: Option<String>,

    /// Status / error message shown to the user.
    pub status_message: Option<String>,
}

impl Session {
    /// Ingest a newly loaded dataset and select its first column.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.selected = dataset.column_names().first().map(|s| s.to_string());
        info!(
            "loaded {} row(s) x {} column(s)",
            dataset.len(),
            dataset.width()
        );
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Select a column by name; unknown names leave the selection as is.
    pub fn select_column(&mut self, name: &str) -> bool {
        let known = self
            .dataset
            .as_ref()
            .is_some_and(|ds| ds.column(name).is_some());
        if known {
            self.selected = Some(name.to_string());
        }
        known
    }

    pub fn profile(&self) -> Option<ColumnProfile> {
        let (ds, name) = (self.dataset.as_ref()?, self.selected.as_ref()?);
        ds.column(name).map(ColumnProfile::of)
    }

    /// Distribution of the selected column.
    pub fn distribution(&self) -> Option<Distribution> {
        let (ds, name) = (self.dataset.as_ref()?, self.selected.as_ref()?);
        ds.column(name).map(summarize)
    }

    pub fn overview(&self) -> Vec<MissingStat> {
        self.dataset.as_ref().map(missing_overview).unwrap_or_default()
    }

    /// Apply `method` to the selected column and record the outcome as the
    /// status message.
    ///
    /// A column without gaps is reported as such and left alone, except for
    /// row removal, which may still act on other columns.
    pub fn apply(&mut self, method: &FillMethod) -> Option<Outcome> {
        let name = self.selected.clone()?;
        let ds = self.dataset.as_mut()?;

        let has_gaps = ds.column(&name).is_some_and(|c| c.missing_count() > 0);
        let outcome = if has_gaps || matches!(method, FillMethod::RemoveRows(_)) {
            impute::apply(ds, &name, method)
        } else {
            Outcome::Unchanged(Inapplicable::NothingMissing(name.clone()))
        };

        self.status_message = Some(format!("Column '{name}': {outcome}"));
        Some(outcome)
    }

    /// Split the loaded dataset with the default seed.
    pub fn split(&self, ratios: SplitRatios) -> Option<Result<Split, DataError>> {
        self.dataset
            .as_ref()
            .map(|ds| split_dataset(ds, ratios, DEFAULT_SPLIT_SEED))
    }
}
