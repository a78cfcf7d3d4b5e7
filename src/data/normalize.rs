use std::collections::BTreeMap;

use super::model::{Column, PartRecord, PartTable, RawRecord, RawRows, RawValue};
use crate::error::{InventoryError, Result};

// ---------------------------------------------------------------------------
// Price parsing
// ---------------------------------------------------------------------------

/// Parse a raw price string such as `"$1,234.56"`.
///
/// Every character outside `[0-9.]` is dropped first; an empty remainder
/// reads as `0`. A remainder that still is not a finite number (`"1.2.3"`,
/// `"."`, a digit run too long for `f64`) is rejected rather than guessed at.
pub fn parse_price(raw: &str) -> Result<f64> {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if stripped.is_empty() {
        return Ok(0.0);
    }

    match stripped.parse::<f64>() {
        Ok(price) if price.is_finite() => Ok(price),
        _ => Err(InventoryError::PriceParse {
            raw: raw.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// A price that could not be read and was replaced by `0`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceIssue {
    /// Zero-based index of the record in the source sequence.
    pub row: usize,
    /// The raw value as delivered by the source.
    pub raw: String,
}

/// Turn raw source rows into a typed [`PartTable`].
///
/// The schema is checked against `rows.columns`, so a header-only table with
/// the wrong columns fails just like a populated one.
pub fn normalize(rows: &RawRows) -> Result<PartTable> {
    normalize_with_report(rows).map(|(table, _)| table)
}

/// Like [`normalize`], but also returns the prices that had to be zeroed.
pub fn normalize_with_report(rows: &RawRows) -> Result<(PartTable, Vec<PriceIssue>)> {
    check_schema(&rows.columns)?;

    let trimmed: Vec<BTreeMap<&str, &RawValue>> = rows.records.iter().map(trim_keys).collect();

    let mut issues = Vec::new();
    let mut records = Vec::with_capacity(rows.len());

    for (row, fields) in trimmed.iter().enumerate() {
        let price_raw = raw_text(fields, Column::OutletPrice);
        let outlet_price = match parse_price(&price_raw) {
            Ok(price) => price,
            Err(e) => {
                log::warn!("Row {row}: {e}; using 0");
                issues.push(PriceIssue { row, raw: price_raw });
                0.0
            }
        };

        records.push(PartRecord {
            code: raw_text(fields, Column::Code).trim().to_string(),
            description: raw_text(fields, Column::Description).trim().to_string(),
            outlet_price,
            brand: raw_text(fields, Column::Brand),
            model: raw_text(fields, Column::Model),
            category: raw_text(fields, Column::Category).trim().to_string(),
        });
    }

    log::debug!(
        "Normalized {} records ({} unreadable prices)",
        records.len(),
        issues.len()
    );
    Ok((PartTable::from_records(records), issues))
}

/// Index a record by trimmed column name. On a clash the first key wins.
fn trim_keys(record: &RawRecord) -> BTreeMap<&str, &RawValue> {
    let mut out = BTreeMap::new();
    for (key, value) in &record.fields {
        out.entry(key.trim()).or_insert(value);
    }
    out
}

fn check_schema(columns: &[String]) -> Result<()> {
    let missing: Vec<String> = Column::ALL
        .iter()
        .map(|c| c.header())
        .filter(|h| !columns.iter().any(|c| c.trim() == *h))
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(InventoryError::Schema { missing })
    }
}

/// String form of a cell; absent and empty cells read as `""`.
fn raw_text(fields: &BTreeMap<&str, &RawValue>, column: Column) -> String {
    fields
        .get(column.header())
        .map(|v| v.to_string())
        .unwrap_or_default()
}
