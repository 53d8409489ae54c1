use tabgrid_core::{CellCoord, SelectionArea};

use super::{editable_sheet, find_sheet};
use crate::sheet::{is_valid_sheet_name, Sheet, SheetId, SheetProp};
use crate::transaction::Transaction;

pub(super) fn select_sheet(tx: &mut Transaction, id: &SheetId) {
    if find_sheet(tx, id).is_some() {
        tx.select_sheet(Some(id.clone()));
    }
}

/// Move the selection to the next or previous visible sheet, wrapping around.
pub(super) fn select_adjacent(tx: &mut Transaction, forward: bool) {
    let doc = tx.document();
    let visible: Vec<SheetId> = doc.visible_sheets().map(|s| s.id.clone()).collect();
    if visible.is_empty() {
        return;
    }
    let len = visible.len();
    let current = doc.selected_sheet.as_ref().and_then(|id| visible.iter().position(|v| v == id));
    let next = match (current, forward) {
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
        (None, true) => 0,
        (None, false) => len - 1,
    };
    tx.select_sheet(Some(visible[next].clone()));
}

pub(super) fn rename_sheet(tx: &mut Transaction, id: &SheetId, name: &str) {
    if editable_sheet(tx, id).is_none() {
        return;
    }
    if !is_valid_sheet_name(name) {
        log::debug!("rejecting empty sheet name");
        return;
    }
    let name = name.trim();
    if !tx.document().is_name_available(name, Some(id)) {
        log::debug!("sheet name {:?} is taken", name);
        return;
    }
    tx.set_prop(id, SheetProp::Name(name.to_string()));
}

/// Insert after `index` (or append) and select the new sheet.
pub(super) fn new_sheet(tx: &mut Transaction, sheet: &Sheet, index: Option<usize>) {
    let doc = tx.document();
    if doc.sheet(&sheet.id).is_some() {
        log::debug!("sheet {} already exists", sheet.id);
        return;
    }
    if !is_valid_sheet_name(&sheet.name) || !doc.is_name_available(&sheet.name, None) {
        log::debug!("sheet name {:?} is empty or taken", sheet.name);
        return;
    }
    let slot = match index {
        Some(index) => (index + 1).min(doc.sheets.len()),
        None => doc.sheets.len(),
    };
    tx.insert_sheet(slot, sheet.clone());
    tx.select_sheet(Some(sheet.id.clone()));
}

pub(super) fn delete_sheet(tx: &mut Transaction, id: &SheetId) {
    let doc = tx.document();
    let Some(index) = doc.sheet_index(id) else {
        log::debug!("unknown sheet {}", id);
        return;
    };
    if doc.sheets.len() <= 1 {
        log::debug!("refusing to delete the last sheet");
        return;
    }
    if doc.sheets[index].locked {
        log::debug!("sheet {} is protected", doc.sheets[index].name);
        return;
    }
    if doc.selected_sheet.as_ref() == Some(id) {
        let remaining: Vec<&Sheet> = doc.sheets.iter().filter(|s| &s.id != id).collect();
        let next = remaining[index.saturating_sub(1).min(remaining.len() - 1)].id.clone();
        tx.select_sheet(Some(next));
    }
    tx.remove_sheet(index);
}

/// Hiding moves the selection to the nearest visible neighbour and is
/// refused for the last visible sheet.
pub(super) fn set_sheet_hidden(tx: &mut Transaction, id: &SheetId, hidden: bool) {
    let Some(sheet) = find_sheet(tx, id) else {
        return;
    };
    if !hidden {
        tx.set_prop(id, SheetProp::Hidden(false));
        return;
    }
    if sheet.hidden {
        return;
    }

    let doc = tx.document();
    let visible: Vec<SheetId> = doc.visible_sheets().map(|s| s.id.clone()).collect();
    let Some(index) = visible.iter().position(|v| v == id) else {
        return;
    };
    let neighbour = if index == 0 { 1 } else { index - 1 };
    let Some(neighbour) = visible.get(neighbour).cloned() else {
        log::debug!("refusing to hide the last visible sheet");
        return;
    };
    if doc.selected_sheet.as_ref() == Some(id) {
        tx.select_sheet(Some(neighbour));
    }
    tx.set_prop(id, SheetProp::Hidden(true));
}

pub(super) fn set_sheet_locked(tx: &mut Transaction, id: &SheetId, locked: bool) {
    if find_sheet(tx, id).is_some() {
        tx.set_prop(id, SheetProp::Locked(locked));
    }
}

pub(super) fn change_tab_color(tx: &mut Transaction, id: &SheetId, color: Option<String>) {
    if editable_sheet(tx, id).is_some() {
        tx.set_prop(id, SheetProp::TabColor(color));
    }
}

pub(super) fn change_selection(
    tx: &mut Transaction,
    id: &SheetId,
    active_cell: Option<CellCoord>,
    selections: &[SelectionArea],
) {
    if find_sheet(tx, id).is_none() {
        return;
    }
    tx.set_prop(id, SheetProp::ActiveCell(active_cell));
    tx.set_prop(id, SheetProp::Selections(selections.to_vec()));
}

/// Remember the copied selection so focus can return to it.
pub(super) fn copy(tx: &mut Transaction, id: &SheetId) {
    if let Some(sheet) = find_sheet(tx, id) {
        tx.set_focus(sheet.active_cell, Some(sheet.selections));
    }
}
