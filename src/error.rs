use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Every failure the inventory pipeline can report.
///
/// Each stage raises its own kind so the shell can react differently to a
/// source outage, a schema mismatch or a bad API call.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The record source could not deliver rows (missing file, bad sheet, closed source…).
    #[error("record source unavailable: {0}")]
    SourceUnavailable(String),

    /// One or more of the six required columns is absent after header trimming.
    #[error("missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A price string still was not a number after stripping non-numeric characters.
    #[error("could not interpret price {raw:?}")]
    PriceParse { raw: String },

    /// Caller asked for a price range whose lower bound exceeds the upper one.
    #[error("invalid price range: min {min} is greater than max {max}")]
    InvalidRange { min: f64, max: f64 },

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook export failed: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

impl InventoryError {
    /// Short, user-facing headline for the failure kind.
    pub fn headline(&self) -> &'static str {
        match self {
            InventoryError::SourceUnavailable(_) => "Error al cargar los datos",
            InventoryError::Schema { .. } => "La hoja no tiene las columnas esperadas",
            InventoryError::PriceParse { .. } => "Precio ilegible",
            InventoryError::InvalidRange { .. } => "Rango de precio inválido",
            InventoryError::Csv(_) | InventoryError::Workbook(_) => "Error al exportar",
        }
    }
}

pub type Result<T> = std::result::Result<T, InventoryError>;
