use std::ops::RangeInclusive;
use std::path::Path;

use crate::color::CategoryColors;
use crate::config::Settings;
use crate::data::export::{CSV_FILE_NAME, WORKBOOK_FILE_NAME};
use crate::data::filter::{CategoryFilter, FilterCriteria, PriceRange};
use crate::data::pipeline::{Inventory, QueryResult};
use crate::data::source::{FileSource, RecordSource};
use crate::error::InventoryError;

// ---------------------------------------------------------------------------
// Filter inputs as edited in the side panel
// ---------------------------------------------------------------------------

/// Raw widget values. Turned into [`FilterCriteria`] on every refilter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterInputs {
    pub code: String,
    pub description: String,
    pub category: CategoryFilter,
    pub price_min: f64,
    pub price_max: f64,
}

impl FilterInputs {
    /// Inputs that show everything in `inventory`.
    pub fn reset_for(inventory: &Inventory) -> Self {
        let (price_min, price_max) = inventory
            .price_bounds()
            .map_or((0.0, 0.0), |b| (b.min(), b.max()));
        FilterInputs {
            price_min,
            price_max,
            ..Default::default()
        }
    }

    /// Ranges for the min and max sliders. Each thumb stops at the other,
    /// so the widgets alone can never produce an inverted range.
    pub fn price_slider_ranges(
        &self,
        bounds: PriceRange,
    ) -> (RangeInclusive<f64>, RangeInclusive<f64>) {
        let (lo, hi) = (bounds.min(), bounds.max());
        let max = self.price_max.clamp(lo, hi);
        let min = self.price_min.clamp(lo, max);
        (lo..=max, min..=hi)
    }

    pub fn to_criteria(&self, inventory: &Inventory) -> Result<FilterCriteria, InventoryError> {
        let price_range = match inventory.price_bounds() {
            Some(_) => Some(PriceRange::new(self.price_min, self.price_max)?),
            None => None,
        };
        Ok(FilterCriteria {
            code_substring: self.code.clone(),
            description_substring: self.description.clone(),
            category: self.category.clone(),
            price_range,
        })
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: Settings,

    /// Where rows come from; replaced when the user picks another folder.
    source: Box<dyn RecordSource>,

    /// Loaded inventory (None until a load succeeds).
    pub inventory: Option<Inventory>,

    pub inputs: FilterInputs,

    /// Result of the last successful filter pass.
    pub result: Option<QueryResult>,

    pub category_colors: CategoryColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Informational note (e.g. unreadable prices, last export).
    pub notice: Option<String>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let source = Box::new(FileSource::new(settings.source_dir.clone()));
        Self::with_source(settings, source)
    }

    pub fn with_source(settings: Settings, source: Box<dyn RecordSource>) -> Self {
        Self {
            settings,
            source,
            inventory: None,
            inputs: FilterInputs::default(),
            result: None,
            category_colors: CategoryColors::default(),
            status_message: None,
            notice: None,
        }
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// Close the current source and read tables from `dir` from now on.
    pub fn set_source_dir(&mut self, dir: &Path) {
        self.source.close();
        self.settings.source_dir = dir.to_path_buf();
        self.source = Box::new(FileSource::new(dir));
        self.reload();
    }

    /// Fetch and normalize the configured table, replacing any loaded data.
    ///
    /// On failure nothing from the previous or the failed load stays visible.
    pub fn reload(&mut self) {
        let table = self.settings.table_name.clone();
        let sheet = self.settings.sheet_name.clone();

        match Inventory::load(&mut *self.source, &table, &sheet) {
            Ok(inventory) => {
                log::info!(
                    "Loaded {} parts in {} categories",
                    inventory.len(),
                    inventory.categories().len()
                );
                self.notice = match inventory.price_issues().len() {
                    0 => None,
                    n => Some(format!("{n} precio(s) ilegibles se tomaron como $0.00")),
                };
                self.inputs = FilterInputs::reset_for(&inventory);
                self.category_colors = CategoryColors::new(inventory.categories());
                self.inventory = Some(inventory);
                self.status_message = None;
                self.refilter();
            }
            Err(e) => {
                log::error!("Failed to load inventory: {e}");
                self.inventory = None;
                self.result = None;
                self.notice = None;
                self.status_message = Some(format!("{}: {e}", e.headline()));
            }
        }
    }

    /// Recompute the result after a filter change.
    pub fn refilter(&mut self) {
        let Some(inventory) = &self.inventory else {
            return;
        };
        let outcome = self
            .inputs
            .to_criteria(inventory)
            .and_then(|criteria| inventory.query(&criteria));

        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("Filter rejected: {e}");
                self.status_message = Some(format!("{}: {e}", e.headline()));
            }
        }
    }

    /// Bytes and suggested file name for a download.
    pub fn export(&self, kind: ExportKind) -> Option<Result<(Vec<u8>, &'static str), InventoryError>> {
        let result = self.result.as_ref()?;
        Some(match kind {
            ExportKind::Csv => result.to_csv().map(|b| (b, CSV_FILE_NAME)),
            ExportKind::Workbook => result.to_workbook().map(|b| (b, WORKBOOK_FILE_NAME)),
        })
    }

    /// Release the source; called when the window closes.
    pub fn shutdown(&mut self) {
        self.source.close();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Csv,
    Workbook,
}
