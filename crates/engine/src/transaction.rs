//! Recording writer used by reducer handlers.

use rustc_hash::FxHashMap;
use tabgrid_core::{CellCoord, SelectionArea};

use crate::cell::CellConfig;
use crate::document::Document;
use crate::patch::{Change, Patch, PatchPath};
use crate::sheet::{Sheet, SheetId, SheetProp};

/// Mutates a document in place and records every effective write.
///
/// Repeated writes to one location collapse into a single change holding
/// the first old value and the last new value. Sheet insertion or removal
/// ends the collapsing window.
pub struct Transaction<'a> {
    doc: &'a mut Document,
    changes: Vec<Change>,
    slots: FxHashMap<PatchPath, usize>,
}

impl<'a> Transaction<'a> {
    pub fn new(doc: &'a mut Document) -> Self {
        Self {
            doc,
            changes: Vec::new(),
            slots: FxHashMap::default(),
        }
    }

    pub fn document(&self) -> &Document {
        &*self.doc
    }

    pub fn sheet(&self, id: &SheetId) -> Option<&Sheet> {
        self.doc.sheet(id)
    }

    pub fn cell(&self, id: &SheetId, coord: CellCoord) -> Option<&CellConfig> {
        self.doc.sheet(id)?.cell(coord)
    }

    /// Replace a cell. Returns false if the sheet does not exist.
    pub fn write_cell(&mut self, id: &SheetId, coord: CellCoord, value: Option<CellConfig>) -> bool {
        let Some(sheet) = self.doc.sheet_mut(id) else {
            return false;
        };
        let value = value.filter(|cell| !cell.is_empty());
        let old = sheet.set_cell(coord, value.clone());
        if old != value {
            self.record(Patch::cell(id, coord, value), Patch::cell(id, coord, old));
        }
        true
    }

    /// Edit a cell through a closure, creating it if absent.
    pub fn edit_cell(&mut self, id: &SheetId, coord: CellCoord, edit: impl FnOnce(&mut CellConfig)) {
        let Some(sheet) = self.doc.sheet(id) else {
            return;
        };
        let mut cell = sheet.cell(coord).cloned().unwrap_or_default();
        edit(&mut cell);
        self.write_cell(id, coord, Some(cell));
    }

    pub fn set_prop(&mut self, id: &SheetId, prop: SheetProp) {
        let Some(sheet) = self.doc.sheet_mut(id) else {
            return;
        };
        let old = sheet.replace_prop(prop.clone());
        if old != prop {
            self.record(
                Patch::Sheet { id: id.clone(), prop },
                Patch::Sheet { id: id.clone(), prop: old },
            );
        }
    }

    pub fn select_sheet(&mut self, id: Option<SheetId>) {
        if self.doc.selected_sheet != id {
            let old = std::mem::replace(&mut self.doc.selected_sheet, id.clone());
            self.record(Patch::SelectedSheet { id }, Patch::SelectedSheet { id: old });
        }
    }

    /// Remember where the caller should put focus back.
    pub fn set_focus(&mut self, cell: Option<CellCoord>, selections: Option<Vec<SelectionArea>>) {
        if self.doc.current_active_cell != cell {
            let old = std::mem::replace(&mut self.doc.current_active_cell, cell);
            self.record(Patch::CurrentActiveCell { cell }, Patch::CurrentActiveCell { cell: old });
        }
        if self.doc.current_selections != selections {
            let old = std::mem::replace(&mut self.doc.current_selections, selections.clone());
            self.record(
                Patch::CurrentSelections { selections },
                Patch::CurrentSelections { selections: old },
            );
        }
    }

    pub fn insert_sheet(&mut self, index: usize, sheet: Sheet) {
        let index = index.min(self.doc.sheets.len());
        self.doc.sheets.insert(index, sheet.clone());
        self.record(Patch::InsertSheet { index, sheet: Box::new(sheet) }, Patch::RemoveSheet { index });
    }

    pub fn remove_sheet(&mut self, index: usize) -> Option<Sheet> {
        if index >= self.doc.sheets.len() {
            return None;
        }
        let sheet = self.doc.sheets.remove(index);
        self.record(
            Patch::RemoveSheet { index },
            Patch::InsertSheet { index, sheet: Box::new(sheet.clone()) },
        );
        Some(sheet)
    }

    /// Replay a patch, recording it like any other write.
    pub fn apply(&mut self, patch: Patch) {
        match patch {
            Patch::SelectedSheet { id } => self.select_sheet(id),
            Patch::CurrentActiveCell { cell } => {
                let selections = self.doc.current_selections.clone();
                self.set_focus(cell, selections);
            }
            Patch::CurrentSelections { selections } => {
                let cell = self.doc.current_active_cell;
                self.set_focus(cell, selections);
            }
            Patch::InsertSheet { index, sheet } => {
                if index > self.doc.sheets.len() || self.doc.sheet(&sheet.id).is_some() {
                    log::debug!("skipping insert of sheet {} at slot {}", sheet.id, index);
                    return;
                }
                self.insert_sheet(index, *sheet);
            }
            Patch::RemoveSheet { index } => {
                if self.remove_sheet(index).is_none() {
                    log::debug!("skipping removal of missing sheet slot {}", index);
                }
            }
            Patch::Sheet { id, prop } => {
                if self.doc.sheet(&id).is_none() {
                    log::debug!("skipping patch for unknown sheet {}", id);
                    return;
                }
                self.set_prop(&id, prop);
            }
            Patch::Cell { sheet, coord, value } => {
                if !self.write_cell(&sheet, coord, value.map(|v| *v)) {
                    log::debug!("skipping cell patch for unknown sheet {}", sheet);
                }
            }
        }
    }

    fn record(&mut self, forward: Patch, inverse: Patch) {
        let path = forward.path();
        if let PatchPath::SheetSlot(_) = path {
            self.slots.clear();
            self.changes.push(Change { forward, inverse });
            return;
        }
        match self.slots.get(&path) {
            Some(&slot) => self.changes[slot].forward = forward,
            None => {
                self.slots.insert(path, self.changes.len());
                self.changes.push(Change { forward, inverse });
            }
        }
    }

    /// Effective changes, in write order.
    pub fn finish(self) -> Vec<Change> {
        self.changes.into_iter().filter(|c| !c.is_noop()).collect()
    }
}
