use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Settings file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "inventario.json";
/// Environment variable pointing at an alternative settings file.
pub const CONFIG_ENV_VAR: &str = "INVENTARIO_CONFIG";

pub const DEFAULT_TABLE_NAME: &str = "INVENTARIO FINAL AUTOPARTES Phyton";
pub const DEFAULT_SHEET_NAME: &str = "Escaneo c precios de venta";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Start-up settings. Every field has a default, so a partial (or absent)
/// settings file is fine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Folder holding the inventory file (`<table_name>.xlsx`, `.csv`, …).
    pub source_dir: PathBuf,
    pub table_name: String,
    pub sheet_name: String,
    /// Optional contact link shown in the header (e.g. a WhatsApp chat).
    pub contact_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            contact_url: None,
        }
    }
}

impl Settings {
    /// Resolve and read the settings file.
    ///
    /// `INVENTARIO_CONFIG` wins when set (and must exist); otherwise
    /// `inventario.json` is used if present, else defaults.
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(local);
        }
        log::debug!("No {DEFAULT_CONFIG_FILE} found, using default settings");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        let settings = Self::from_json(&text)
            .with_context(|| format!("parsing settings file {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(Settings::from_json("{}").unwrap(), Settings::default());
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let s = Settings::from_json(
            r#"{"source_dir": "/srv/inventario", "contact_url": "https://wa.me/5214772479133"}"#,
        )
        .unwrap();
        assert_eq!(s.source_dir, PathBuf::from("/srv/inventario"));
        assert_eq!(s.sheet_name, DEFAULT_SHEET_NAME);
        assert_eq!(s.contact_url.as_deref(), Some("https://wa.me/5214772479133"));
    }

    #[test]
    fn malformed_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventario.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Settings::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("inventario.json"));
    }
}
