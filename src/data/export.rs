use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::Dataset;

/// Write the dataset as delimited text with a header row. Missing cells are
/// written empty, numbers in their textual form.
pub fn write_csv<W: Write>(dataset: &Dataset, output: W, delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(output);
    writer
        .write_record(dataset.column_names())
        .context("writing CSV header")?;

    let raw: Vec<Vec<String>> = dataset.columns().iter().map(|c| c.to_raw()).collect();
    for row in 0..dataset.len() {
        writer
            .write_record(raw.iter().map(|col| col[row].as_str()))
            .with_context(|| format!("writing CSV row {row}"))?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

/// Save to a `.csv` path, comma separated.
pub fn save_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(dataset, file, b',')
}
