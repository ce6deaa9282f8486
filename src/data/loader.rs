use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value as JsonValue;

use super::model::{FieldDef, FieldKind, FieldValue, TableLayer};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a table layer from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row with field names, one feature per row
/// * `.json` – `[{ "year": 2010, "median_ndvi": 0.41, ... }, ...]`
///
/// Field kinds are inferred from the cell contents.
pub fn load_table(path: &Path, name: &str) -> Result<TableLayer> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path, name),
        "json" => load_json(path, name),
        other => bail!("Unsupported table extension: .{other}"),
    }
}

/// Write a table layer as CSV. Undefined values become empty cells.
pub fn save_csv(table: &TableLayer, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    writer
        .write_record(table.fields().iter().map(|f| f.name.as_str()))
        .context("writing CSV header")?;

    for feature in table.features() {
        writer
            .write_record(feature.values().iter().map(csv_cell))
            .context("writing CSV row")?;
    }
    writer.flush().with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

fn csv_cell(value: &FieldValue) -> String {
    match value {
        FieldValue::Float(v) if !v.is_finite() => String::new(),
        // Debug keeps the decimal point so 1.0 reloads as a float
        FieldValue::Float(v) => format!("{v:?}"),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path, name: &str) -> Result<TableLayer> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: {} cells but {} header fields",
                record.len(),
                headers.len()
            );
        }
        rows.push(record.iter().map(guess_field_type).collect());
    }

    build_table(name, headers, rows)
}

fn guess_field_type(s: &str) -> FieldValue {
    let s = s.trim();
    if s.is_empty() {
        return FieldValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return FieldValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return if f.is_nan() { FieldValue::Null } else { FieldValue::Float(f) };
    }
    if s == "true" || s == "false" {
        return FieldValue::Bool(s == "true");
    }
    FieldValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "date": "05-03-2010", "year": 2010, "month": 3, "day": 5,
///     "median_ndvi": 0.41, "landsat": "MODIS" },
///   ...
/// ]
/// ```
///
/// Rows may omit keys; missing cells are null.
fn load_json(path: &Path, name: &str) -> Result<TableLayer> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map_or(FieldValue::Null, json_to_field))
                .collect()
        })
        .collect();

    build_table(name, headers, rows)
}

fn json_to_field(val: &JsonValue) -> FieldValue {
    match val {
        JsonValue::String(s) => FieldValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                FieldValue::Float(f)
            } else {
                FieldValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => FieldValue::Bool(*b),
        JsonValue::Null => FieldValue::Null,
        other => FieldValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Kind inference
// ---------------------------------------------------------------------------

/// Settle one kind per column and coerce the cells to it.
///
/// Integers widen to floats; any other mix falls back to text.
fn build_table(name: &str, headers: Vec<String>, mut rows: Vec<Vec<FieldValue>>) -> Result<TableLayer> {
    let kinds: Vec<FieldKind> = (0..headers.len())
        .map(|col| column_kind(rows.iter().map(|r| &r[col])))
        .collect();

    for row in &mut rows {
        for (cell, kind) in row.iter_mut().zip(kinds.iter()) {
            coerce(cell, *kind);
        }
    }

    let fields = headers
        .iter()
        .zip(kinds.iter())
        .map(|(h, k)| FieldDef::new(h, *k))
        .collect();

    let mut table = TableLayer::new(name, fields);
    for row in rows {
        table.add_feature(row)?;
    }
    Ok(table)
}

fn column_kind<'a>(cells: impl Iterator<Item = &'a FieldValue>) -> FieldKind {
    let mut kind: Option<FieldKind> = None;
    for k in cells.filter_map(|c| c.kind()) {
        kind = Some(match (kind, k) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(FieldKind::Integer), FieldKind::Float)
            | (Some(FieldKind::Float), FieldKind::Integer) => FieldKind::Float,
            _ => FieldKind::Text,
        });
    }
    kind.unwrap_or(FieldKind::Text)
}

fn coerce(cell: &mut FieldValue, kind: FieldKind) {
    if cell.fits(kind) {
        return;
    }
    if kind == FieldKind::Text {
        *cell = FieldValue::String(cell.to_string());
    }
}
