use super::model::{Column, Dataset};
use crate::error::DataError;

// ---------------------------------------------------------------------------
// Row filtering: keep rows that are complete in the required columns
// ---------------------------------------------------------------------------

/// Return positions of rows that have a value in every `required` column.
///
/// An empty `required` slice places no constraint, so every row passes.
pub fn complete_rows(row_count: usize, required: &[&Column]) -> Vec<usize> {
    (0..row_count)
        .filter(|&row| required.iter().all(|col| !col.is_missing(row)))
        .collect()
}

/// Drop every row missing a value in any of `columns`.
///
/// No columns named means every column is required. Unknown names are a
/// caller bug and are reported instead of silently ignored. Surviving rows
/// keep their original ids.
pub fn remove_rows_with_missing(dataset: &Dataset, columns: &[String]) -> Result<Dataset, DataError> {
    let required: Vec<&Column> = if columns.is_empty() {
        dataset.columns().iter().collect()
    } else {
        columns
            .iter()
            .map(|name| {
                dataset
                    .column(name)
                    .ok_or_else(|| DataError::UnknownColumn(name.clone()))
            })
            .collect::<Result<_, _>>()?
    };

    let keep = complete_rows(dataset.len(), &required);
    log::debug!(
        "row filter on {} column(s) keeps {} of {} rows",
        required.len(),
        keep.len(),
        dataset.len()
    );
    Ok(dataset.select_rows(&keep))
}
