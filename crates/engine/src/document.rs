use serde::{Deserialize, Serialize};
use tabgrid_config::EngineSettings;
use tabgrid_core::{CellCoord, SelectionArea};

use crate::sheet::{normalize_sheet_name, Sheet, SheetId};

/// The root value: ordered sheets plus focus state for undo/redo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub sheets: Vec<Sheet>,
    pub selected_sheet: Option<SheetId>,
    /// Where the caller should restore focus after the last dispatch
    pub current_active_cell: Option<CellCoord>,
    pub current_selections: Option<Vec<SelectionArea>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(&EngineSettings::default())
    }
}

impl Document {
    /// A document with one empty sheet.
    pub fn new(settings: &EngineSettings) -> Self {
        let mut doc = Self::with_sheets(Vec::new());
        let sheet = doc.create_sheet(settings);
        doc.selected_sheet = Some(sheet.id.clone());
        doc.sheets.push(sheet);
        doc
    }

    pub fn with_sheets(sheets: Vec<Sheet>) -> Self {
        let selected_sheet = sheets.first().map(|s| s.id.clone());
        Self {
            sheets,
            selected_sheet,
            current_active_cell: None,
            current_selections: None,
        }
    }

    pub fn sheet(&self, id: &SheetId) -> Option<&Sheet> {
        self.sheets.iter().find(|s| &s.id == id)
    }

    pub fn sheet_mut(&mut self, id: &SheetId) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| &s.id == id)
    }

    pub fn sheet_index(&self, id: &SheetId) -> Option<usize> {
        self.sheets.iter().position(|s| &s.id == id)
    }

    /// Look up by display name: exact match first, then case-insensitive.
    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name).or_else(|| {
            let key = normalize_sheet_name(name);
            self.sheets.iter().find(|s| normalize_sheet_name(&s.name) == key)
        })
    }

    pub fn selected(&self) -> Option<&Sheet> {
        self.selected_sheet.as_ref().and_then(|id| self.sheet(id))
    }

    /// Returns true if no sheet other than `exclude` uses `name` (case-insensitive)
    pub fn is_name_available(&self, name: &str, exclude: Option<&SheetId>) -> bool {
        let key = normalize_sheet_name(name);
        !self
            .sheets
            .iter()
            .any(|s| Some(&s.id) != exclude && normalize_sheet_name(&s.name) == key)
    }

    /// Next free `{prefix}{n}` name.
    pub fn next_sheet_name(&self, prefix: &str) -> String {
        let mut n = self.sheets.len() + 1;
        loop {
            let name = format!("{prefix}{n}");
            if self.is_name_available(&name, None) {
                return name;
            }
            n += 1;
        }
    }

    /// An empty sheet with a fresh ID and unused name. Not inserted.
    pub fn create_sheet(&self, settings: &EngineSettings) -> Sheet {
        Sheet::new(SheetId::generate(), self.next_sheet_name(&settings.sheet_name_prefix))
            .with_counts(settings.sheet_row_count, settings.sheet_column_count)
    }

    /// Visible sheets in order.
    pub fn visible_sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter().filter(|s| !s.hidden)
    }
}
