use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use calamine::{open_workbook, Data, Reader, Xlsx};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{RawRecord, RawRows, RawValue};
use crate::error::{InventoryError, Result};

// ---------------------------------------------------------------------------
// RecordSource – where raw rows come from
// ---------------------------------------------------------------------------

/// Supplies raw rows, with their header, for a named table / sheet.
///
/// A source is constructed once, handed to the pipeline, and closed
/// explicitly when the shell is done with it. Fetching from a closed source
/// fails with [`InventoryError::SourceUnavailable`].
pub trait RecordSource {
    fn fetch_rows(&mut self, table: &str, sheet: &str) -> Result<RawRows>;

    fn close(&mut self);

    /// Human-readable location, for status lines and logs.
    fn describe(&self) -> String;
}

// ---------------------------------------------------------------------------
// FileSource – tables stored as files in a directory
// ---------------------------------------------------------------------------

/// Extensions tried, in order, when resolving a table name to a file.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["xlsx", "csv", "json", "parquet"];

/// Reads `<dir>/<table>.<ext>` for one of [`SUPPORTED_EXTENSIONS`].
///
/// Only workbooks carry more than one sheet; for the other formats the sheet
/// name is ignored.
#[derive(Debug)]
pub struct FileSource {
    dir: PathBuf,
    open: bool,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileSource {
            dir: dir.into(),
            open: true,
        }
    }

    /// First existing file for `table`, trying each supported extension.
    pub fn resolve(&self, table: &str) -> Option<PathBuf> {
        SUPPORTED_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{table}.{ext}")))
            .find(|p| p.is_file())
    }
}

impl RecordSource for FileSource {
    fn fetch_rows(&mut self, table: &str, sheet: &str) -> Result<RawRows> {
        if !self.open {
            return Err(InventoryError::SourceUnavailable(format!(
                "{} has been closed",
                self.describe()
            )));
        }

        let path = self.resolve(table).ok_or_else(|| {
            InventoryError::SourceUnavailable(format!(
                "no table named '{table}' in {} (looked for .{})",
                self.dir.display(),
                SUPPORTED_EXTENSIONS.join(", .")
            ))
        })?;

        log::info!("Reading table '{table}' from {}", path.display());
        load_file(&path, sheet)
            .map_err(|e| InventoryError::SourceUnavailable(format!("{e:#}")))
    }

    fn close(&mut self) {
        log::debug!("Closing {}", self.describe());
        self.open = false;
    }

    fn describe(&self) -> String {
        format!("folder {}", self.dir.display())
    }
}

/// Load raw rows from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx`    – worksheet `sheet`, first row is the header
/// * `.csv`     – header row, every cell read as text
/// * `.json`    – `[{ "Código": "...", "Precio Outlet": "$10", ... }, ...]`
/// * `.parquet` – flat columns (strings, ints, floats, bools)
pub fn load_file(path: &Path, sheet: &str) -> anyhow::Result<RawRows> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if ext != "xlsx" {
        log::debug!("Ignoring sheet name '{sheet}' for .{ext} source");
    }

    match ext.as_str() {
        "xlsx" => load_xlsx(path, sheet),
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// XLSX loader
// ---------------------------------------------------------------------------

fn load_xlsx(path: &Path, sheet: &str) -> anyhow::Result<RawRows> {
    let mut workbook: Xlsx<_> = open_workbook(path).context("opening workbook")?;
    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("reading worksheet '{sheet}'"))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(RawRows::default());
    };
    let headers: Vec<String> = header_row.iter().map(|c| c.to_string()).collect();

    let records = rows
        .map(|row| {
            headers
                .iter()
                .zip(row.iter())
                .filter(|(h, _)| !h.is_empty())
                .map(|(h, cell)| (h.clone(), cell_to_raw(cell)))
                .collect::<RawRecord>()
        })
        .collect();

    let columns = headers.into_iter().filter(|h| !h.is_empty()).collect();
    Ok(RawRows::new(columns, records))
}

fn cell_to_raw(cell: &Data) -> RawValue {
    match cell {
        Data::Empty => RawValue::Empty,
        Data::String(s) => RawValue::Text(s.clone()),
        Data::Int(i) => RawValue::Integer(*i),
        Data::Float(f) => RawValue::Float(*f),
        Data::Bool(b) => RawValue::Bool(*b),
        Data::DateTime(dt) => RawValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawValue::Text(s.clone()),
        Data::Error(e) => RawValue::Text(format!("{e:?}")),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one part per line.
fn load_csv(path: &Path) -> anyhow::Result<RawRows> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| {
                let value = if v.is_empty() {
                    RawValue::Empty
                } else {
                    RawValue::Text(v.to_string())
                };
                (h.clone(), value)
            })
            .collect();
        records.push(record);
    }

    Ok(RawRows::new(headers, records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON: a top-level array of flat objects. There is no
/// header, so an empty array has no columns either.
fn load_json(path: &Path) -> anyhow::Result<RawRows> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let records = rows
        .iter()
        .enumerate()
        .map(|(i, row)| -> anyhow::Result<RawRecord> {
            let obj = row
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            Ok(obj
                .iter()
                .map(|(k, v)| (k.clone(), json_to_raw(v)))
                .collect())
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(RawRows::from_records(records))
}

fn json_to_raw(val: &JsonValue) -> RawValue {
    match val {
        JsonValue::String(s) => RawValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                RawValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                RawValue::Float(f)
            } else {
                RawValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => RawValue::Bool(*b),
        JsonValue::Null => RawValue::Empty,
        other => RawValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table. Works with files written by both Pandas
/// (`df.to_parquet()`) and Polars (`df.write_parquet()`).
fn load_parquet(path: &Path) -> anyhow::Result<RawRows> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let names: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();

        for row in 0..batch.num_rows() {
            let record: RawRecord = names
                .iter()
                .zip(batch.columns())
                .map(|(name, col)| (name.clone(), arrow_cell_to_raw(col, row)))
                .collect();
            records.push(record);
        }
    }

    Ok(RawRows::new(columns, records))
}

/// Extract a single raw value from an Arrow column at a given row.
fn arrow_cell_to_raw(col: &ArrayRef, row: usize) -> RawValue {
    if col.is_null(row) {
        return RawValue::Empty;
    }
    match col.data_type() {
        DataType::Utf8 => RawValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => RawValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => RawValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => RawValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => RawValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => RawValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => RawValue::Bool(col.as_boolean().value(row)),
        other => {
            log::warn!("Unsupported parquet column type {other:?}; reading as empty");
            RawValue::Empty
        }
    }
}

// ---------------------------------------------------------------------------
// InMemorySource – rows registered up front
// ---------------------------------------------------------------------------

/// Serves rows registered per `(table, sheet)`.
#[derive(Debug, Default)]
pub struct InMemorySource {
    tables: HashMap<(String, String), RawRows>,
    closed: bool,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(
        mut self,
        table: impl Into<String>,
        sheet: impl Into<String>,
        rows: impl Into<RawRows>,
    ) -> Self {
        self.tables
            .insert((table.into(), sheet.into()), rows.into());
        self
    }
}

impl RecordSource for InMemorySource {
    fn fetch_rows(&mut self, table: &str, sheet: &str) -> Result<RawRows> {
        if self.closed {
            return Err(InventoryError::SourceUnavailable(
                "in-memory source has been closed".to_string(),
            ));
        }
        self.tables
            .get(&(table.to_string(), sheet.to_string()))
            .cloned()
            .ok_or_else(|| {
                InventoryError::SourceUnavailable(format!("no sheet '{sheet}' in table '{table}'"))
            })
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn describe(&self) -> String {
        format!("in-memory source ({} tables)", self.tables.len())
    }
}
