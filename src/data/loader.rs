use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value as JsonValue;

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row, `;` or `,` separated (sniffed from the header)
/// * `.json` – `[{ "col": value, ... }, ...]`
///
/// Every cell is handed to the normalizer as text, so the loader never
/// decides what is missing.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let text = std::fs::read_to_string(path).context("reading CSV file")?;
            read_csv(text.as_bytes(), sniff_delimiter(&text))
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            parse_json(&text)
        }
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Pick `;` when the first line holds more semicolons than commas.
pub fn sniff_delimiter(text: &str) -> u8 {
    let first_line = text.lines().next().unwrap_or("");
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Read delimited text with a header row.
pub fn read_csv<R: Read>(input: R, delimiter: u8) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.is_empty() {
        bail!("CSV has no header row");
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    Ok(Dataset::from_records(&headers, &records)?)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "city": "Gdańsk", "age": 31, "income": null },
///   { "city": "Kraków", "age": 45, "income": 5200.5 }
/// ]
/// ```
///
/// Columns are the union of keys across records, in key order; a key absent
/// from a record reads as missing.
pub fn parse_json(text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut names = BTreeSet::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        names.extend(obj.keys().cloned());
    }
    let headers: Vec<String> = names.into_iter().collect();

    let rows: Vec<Vec<String>> = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_raw).unwrap_or_default())
                .collect()
        })
        .collect();

    Ok(Dataset::from_records(&headers, &rows)?)
}

fn json_to_raw(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}
