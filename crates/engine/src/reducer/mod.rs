//! The document state machine.
//!
//! [`apply_action`] runs one handler against a document inside a
//! [`Transaction`] and returns the recorded diff. Handlers never fail: a
//! missing or protected target leaves the document untouched, and per-cell
//! problems end up as error markers on the cell.

mod cells;
mod clipboard;
mod fill;
mod format;
mod sheets;
mod structure;

use tabgrid_core::{Area, Axis, LineShift};

use crate::action::Action;
use crate::bounds::{target_selections, CellBounds};
use crate::document::Document;
use crate::patch::{Change, PatchSet};
use crate::protection::can_mutate_sheet;
use crate::sheet::{Sheet, SheetId};
use crate::transaction::Transaction;

/// Output of [`reduce`].
#[derive(Debug, Clone)]
pub struct Transition {
    pub document: Document,
    pub patches: PatchSet,
}

/// Copy-on-write transition: `doc` is left as is.
pub fn reduce(doc: &Document, action: &Action, bounds: &dyn CellBounds) -> Transition {
    let mut document = doc.clone();
    let patches = apply_action(&mut document, action, bounds);
    Transition { document, patches }
}

/// Apply `action` in place and return its forward and inverse patches.
pub fn apply_action(doc: &mut Document, action: &Action, bounds: &dyn CellBounds) -> PatchSet {
    PatchSet::from_changes(&record_action(doc, action, bounds))
}

pub(crate) fn record_action(doc: &mut Document, action: &Action, bounds: &dyn CellBounds) -> Vec<Change> {
    let mut tx = Transaction::new(doc);
    match action {
        Action::SelectSheet { id } => sheets::select_sheet(&mut tx, id),
        Action::SelectNextSheet => sheets::select_adjacent(&mut tx, true),
        Action::SelectPrevSheet => sheets::select_adjacent(&mut tx, false),
        Action::ChangeSheetName { id, name } => sheets::rename_sheet(&mut tx, id, name),
        Action::NewSheet { sheet, index } => sheets::new_sheet(&mut tx, sheet, *index),
        Action::DeleteSheet { id } => sheets::delete_sheet(&mut tx, id),
        Action::ShowSheet { id } => sheets::set_sheet_hidden(&mut tx, id, false),
        Action::HideSheet { id } => sheets::set_sheet_hidden(&mut tx, id, true),
        Action::ProtectSheet { id } => sheets::set_sheet_locked(&mut tx, id, true),
        Action::UnprotectSheet { id } => sheets::set_sheet_locked(&mut tx, id, false),
        Action::ChangeTabColor { id, color } => sheets::change_tab_color(&mut tx, id, color.clone()),
        Action::SheetSelectionChange { id, active_cell, selections } => {
            sheets::change_selection(&mut tx, id, *active_cell, selections)
        }
        Action::Copy { id } => sheets::copy(&mut tx, id),

        Action::ChangeSheetCell { id, cell, value, datatype } => {
            cells::change_sheet_cell(&mut tx, id, *cell, value, *datatype)
        }
        Action::SetCellError { id, cell, value, datatype, error, error_message } => {
            cells::set_cell_error(&mut tx, id, *cell, value.clone(), *datatype, error, error_message.clone())
        }
        Action::DeleteCells { id, active_cell, selections } => {
            cells::delete_cells(&mut tx, bounds, id, *active_cell, selections)
        }
        Action::RemoveCells { id, active_cell, selections } => {
            cells::remove_cells(&mut tx, bounds, id, *active_cell, selections)
        }
        Action::ValidationSuccess { id, cell, valid, prompt } => {
            cells::validation_success(&mut tx, id, *cell, *valid, prompt.clone())
        }
        Action::SetLoading { id, cell, loading } => cells::set_loading(&mut tx, id, *cell, *loading),
        Action::UpdateCells { changes } => cells::update_cells(&mut tx, changes),

        Action::FormattingChangeAuto { id } => format::set_plaintext(&mut tx, bounds, id, false),
        Action::FormattingChangePlain { id } => format::set_plaintext(&mut tx, bounds, id, true),
        Action::FormattingChange { id, change } => format::formatting_change(&mut tx, bounds, id, change),
        Action::ClearFormatting { id } => format::clear_formatting(&mut tx, bounds, id),
        Action::SetBorder { id, color, style, variant } => {
            format::set_border(&mut tx, bounds, id, color.clone(), *style, *variant)
        }
        Action::MergeCells { id } => format::merge_cells(&mut tx, bounds, id),
        Action::Resize { id, axis, index, dimension } => format::resize(&mut tx, id, *axis, *index, *dimension),
        Action::FrozenRowChange { id, count } => format::frozen_change(&mut tx, id, Axis::Row, *count),
        Action::FrozenColumnChange { id, count } => format::frozen_change(&mut tx, id, Axis::Column, *count),
        Action::UpdateScroll { id, scroll_state } => format::update_scroll(&mut tx, id, *scroll_state),
        Action::ChangeFilter { id, filter_view_index, column, filter } => {
            format::change_filter(&mut tx, id, *filter_view_index, *column, filter.clone())
        }
        Action::SetLineHidden { id, axis, index, hidden } => {
            format::set_line_hidden(&mut tx, id, *axis, *index, *hidden)
        }

        Action::UpdateFill { id, active_cell, fill_selection, selections } => {
            fill::update_fill(&mut tx, bounds, id, *active_cell, *fill_selection, selections)
        }

        Action::InsertRow { id, active_cell } => {
            structure::shift_lines(&mut tx, id, LineShift::insert(Axis::Row, active_cell.row))
        }
        Action::InsertColumn { id, active_cell } => {
            structure::shift_lines(&mut tx, id, LineShift::insert(Axis::Column, active_cell.col))
        }
        Action::DeleteRow { id, active_cell } => {
            structure::shift_lines(&mut tx, id, LineShift::delete(Axis::Row, active_cell.row))
        }
        Action::DeleteColumn { id, active_cell } => {
            structure::shift_lines(&mut tx, id, LineShift::delete(Axis::Column, active_cell.col))
        }

        Action::Paste { id, active_cell, rows, selections, cut_selection, cut_sheet } => {
            let paste = clipboard::PasteRequest {
                active_cell: *active_cell,
                rows,
                selections: selections.as_deref(),
                cut_selection: cut_selection.map(|s| s.range),
                cut_sheet: cut_sheet.as_ref(),
            };
            clipboard::paste(&mut tx, id, paste)
        }

        Action::ApplyPatches { patches } => {
            for patch in patches {
                tx.apply(patch.clone());
            }
        }
    }

    let changes = tx.finish();
    if changes.is_empty() {
        log::debug!("{} left the document unchanged", action.name());
    }
    changes
}

/// A snapshot of the target sheet, or `None` if it is missing.
fn find_sheet(tx: &Transaction, id: &SheetId) -> Option<Sheet> {
    let sheet = tx.sheet(id).cloned();
    if sheet.is_none() {
        log::debug!("unknown sheet {}", id);
    }
    sheet
}

/// A snapshot of the target sheet, or `None` if it is missing or protected.
fn editable_sheet(tx: &Transaction, id: &SheetId) -> Option<Sheet> {
    let sheet = find_sheet(tx, id)?;
    if !can_mutate_sheet(&sheet) {
        log::debug!("sheet {} is protected", sheet.name);
        return None;
    }
    Some(sheet)
}

/// Areas the sheet's own selection covers.
fn selected_areas(sheet: &Sheet, bounds: &dyn CellBounds) -> Vec<Area> {
    target_selections(sheet, bounds).into_iter().map(|s| s.range).collect()
}
