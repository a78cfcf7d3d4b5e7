use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook};

use super::model::{Column, PartRecord, PartTable};
use crate::error::Result;

pub const CSV_FILE_NAME: &str = "inventario_filtrado.csv";
pub const CSV_MIME: &str = "text/csv";
pub const WORKBOOK_FILE_NAME: &str = "inventario_filtrado.xlsx";
pub const WORKBOOK_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const WORKBOOK_SHEET_NAME: &str = "Inventario";

// ---------------------------------------------------------------------------
// Currency formatting
// ---------------------------------------------------------------------------

/// Render a price as `$1,234.50`: thousands separators, exactly two decimals.
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac_part}")
}

// ---------------------------------------------------------------------------
// Display table
// ---------------------------------------------------------------------------

/// One row ready for display; the price is already a currency string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub code: String,
    pub description: String,
    pub outlet_price: String,
    pub brand: String,
    pub model: String,
    pub category: String,
}

impl DisplayRow {
    fn from_record(rec: &PartRecord) -> Self {
        DisplayRow {
            code: rec.code.clone(),
            description: rec.description.clone(),
            outlet_price: format_currency(rec.outlet_price),
            brand: rec.brand.clone(),
            model: rec.model.clone(),
            category: rec.category.clone(),
        }
    }

    /// Cells in canonical column order.
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.code,
            &self.description,
            &self.outlet_price,
            &self.brand,
            &self.model,
            &self.category,
        ]
    }
}

/// Display-only view of a [`PartTable`]. Never parse it back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayTable {
    pub rows: Vec<DisplayRow>,
}

impl DisplayTable {
    pub fn headers(&self) -> [&'static str; 6] {
        Column::headers()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn format_for_display(table: &PartTable) -> DisplayTable {
    DisplayTable {
        rows: table.iter().map(DisplayRow::from_record).collect(),
    }
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// UTF-8 CSV with a header row; prices are written exactly as displayed.
pub fn export_csv(table: &PartTable) -> Result<Vec<u8>> {
    let display = format_for_display(table);

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(display.headers())?;
    for row in &display.rows {
        writer.write_record(row.cells())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    log::info!("Exported {} rows to CSV ({} bytes)", display.len(), bytes.len());
    Ok(bytes)
}

// ---------------------------------------------------------------------------
// Workbook export
// ---------------------------------------------------------------------------

/// Single-sheet `.xlsx` workbook with the same header and cells as the CSV.
///
/// The document creation time is pinned so identical tables give identical
/// bytes.
pub fn export_workbook(table: &PartTable) -> Result<Vec<u8>> {
    let display = format_for_display(table);

    let mut workbook = Workbook::new();
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

    let header_format = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(WORKBOOK_SHEET_NAME)?;

    for (col, header) in display.headers().iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *header, &header_format)?;
        sheet.set_column_width(col, column_width(&display, col as usize, header))?;
    }

    for (i, row) in display.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, cell) in row.cells().iter().enumerate() {
            sheet.write_string(r, col as u16, *cell)?;
        }
    }

    let bytes = workbook.save_to_buffer()?;
    log::info!(
        "Exported {} rows to workbook ({} bytes)",
        display.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Rough character width for a column, capped so descriptions stay readable.
fn column_width(display: &DisplayTable, col: usize, header: &str) -> f64 {
    let widest = display
        .rows
        .iter()
        .map(|row| row.cells()[col].chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(8);
    (widest.clamp(8, 60) + 2) as f64
}
