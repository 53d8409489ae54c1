// Engine settings
// Loaded from ~/.config/tabgrid/engine.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    // Undo history
    #[serde(rename = "history.maxEntries")]
    pub history_max_entries: usize,

    // New sheets
    #[serde(rename = "sheet.namePrefix")]
    pub sheet_name_prefix: String,

    #[serde(rename = "sheet.rowCount")]
    pub sheet_row_count: usize,

    #[serde(rename = "sheet.columnCount")]
    pub sheet_column_count: usize,

    // Recalculation
    #[serde(rename = "recalc.scrubStaleFormulas")]
    pub scrub_stale_formulas: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            history_max_entries: 100,
            sheet_name_prefix: "Sheet".to_string(),
            sheet_row_count: 1000,
            sheet_column_count: 100,
            scrub_stale_formulas: true,
        }
    }
}

impl EngineSettings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tabgrid");
        config_dir.join("engine.json")
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                log::warn!("Error parsing {}: {}", path.display(), e);
                log::warn!("Using default engine settings");
                Self::default()
            }),
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        let mut settings: Self = serde_json::from_str(&cleaned)?;
        settings.normalize();
        Ok(settings)
    }

    /// Save current settings to the default location
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    // Sizes are at least 1
    fn normalize(&mut self) {
        self.history_max_entries = self.history_max_entries.max(1);
        self.sheet_row_count = self.sheet_row_count.max(1);
        self.sheet_column_count = self.sheet_column_count.max(1);
        if self.sheet_name_prefix.trim().is_empty() {
            self.sheet_name_prefix = Self::default().sheet_name_prefix;
        }
    }
}
