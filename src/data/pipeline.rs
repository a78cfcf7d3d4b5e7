use super::export::{export_csv, export_workbook, format_for_display, DisplayTable};
use super::filter::{distinct_categories, filter, price_bounds, FilterCriteria, PriceRange};
use super::model::PartTable;
use super::normalize::{normalize_with_report, PriceIssue};
use super::source::RecordSource;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Inventory – one fetched, normalized table plus its derived indices
// ---------------------------------------------------------------------------

/// The full normalized inventory. Every query starts from this complete
/// table; nothing here changes after [`Inventory::load`].
#[derive(Debug, Clone)]
pub struct Inventory {
    table: PartTable,
    categories: Vec<String>,
    bounds: Option<PriceRange>,
    price_issues: Vec<PriceIssue>,
}

/// Outcome of one filter interaction.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub table: PartTable,
    pub display: DisplayTable,
}

impl QueryResult {
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        export_csv(&self.table)
    }

    pub fn to_workbook(&self) -> Result<Vec<u8>> {
        export_workbook(&self.table)
    }
}

impl Inventory {
    /// Fetch `table`/`sheet` from `source` and normalize it.
    ///
    /// Either the whole table loads or an error is returned; no partial
    /// inventory is ever built.
    pub fn load(source: &mut dyn RecordSource, table: &str, sheet: &str) -> Result<Self> {
        let rows = source.fetch_rows(table, sheet)?;
        log::info!(
            "Fetched {} rows for '{table}' / '{sheet}' from {}",
            rows.len(),
            source.describe()
        );
        let (table, price_issues) = normalize_with_report(&rows)?;
        Ok(Self::build(table, price_issues))
    }

    pub fn from_table(table: PartTable) -> Self {
        Self::build(table, Vec::new())
    }

    fn build(table: PartTable, price_issues: Vec<PriceIssue>) -> Self {
        Inventory {
            categories: distinct_categories(&table),
            bounds: price_bounds(&table),
            table,
            price_issues,
        }
    }

    pub fn table(&self) -> &PartTable {
        &self.table
    }

    /// Sorted distinct categories for the category picker.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Observed price span, `None` when the inventory is empty.
    pub fn price_bounds(&self) -> Option<PriceRange> {
        self.bounds
    }

    /// Prices that could not be read and were set to `0`.
    pub fn price_issues(&self) -> &[PriceIssue] {
        &self.price_issues
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Filter the full table and prepare its display form.
    pub fn query(&self, criteria: &FilterCriteria) -> Result<QueryResult> {
        let table = filter(&self.table, criteria)?;
        let display = format_for_display(&table);
        Ok(QueryResult { table, display })
    }
}
