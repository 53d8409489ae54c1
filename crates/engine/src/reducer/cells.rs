use tabgrid_core::{Area, CellCoord, SelectionArea};

use super::editable_sheet;
use crate::bounds::{effective_bounds, CellBounds};
use crate::cell::{detect_datatype, DataType};
use crate::protection::can_mutate_cell;
use crate::recalc::CellsBySheet;
use crate::sheet::{Sheet, SheetId};
use crate::transaction::Transaction;
use crate::validation::{validate, DataValidation, ValidationKind};

pub(super) fn change_sheet_cell(
    tx: &mut Transaction,
    id: &SheetId,
    coord: CellCoord,
    value: &str,
    datatype: Option<DataType>,
) {
    let Some(sheet) = editable_sheet(tx, id) else {
        return;
    };
    if coord.is_header() || !can_mutate_cell(&sheet, coord) {
        log::debug!("cell {:?} on {} is locked or out of range", coord, sheet.name);
        return;
    }

    let old = sheet.cell(coord).cloned().unwrap_or_default();
    let text_changed = old.text() != value;
    let spill = old.spill_area(coord);

    let mut cell = old;
    cell.text = (!value.is_empty()).then(|| value.to_string());
    cell.datatype = datatype.or_else(|| detect_datatype(value));
    cell.clear_evaluation();
    cell.formula_range = None;
    if let Some(rule) = cell.data_validation.as_mut() {
        if let Some(outcome) = validate(rule, value) {
            cell.valid = Some(outcome.valid);
            if outcome.prompt.is_some() {
                rule.prompt = outcome.prompt;
            }
        }
    }
    tx.write_cell(id, coord, Some(cell));

    if text_changed {
        if let Some(area) = spill {
            clear_spill(tx, &sheet, coord, area, None);
        }
    }
    tx.set_focus(sheet.active_cell, Some(sheet.selections.clone()));
}

pub(super) fn set_cell_error(
    tx: &mut Transaction,
    id: &SheetId,
    coord: CellCoord,
    value: Option<String>,
    datatype: Option<DataType>,
    error: &str,
    error_message: Option<String>,
) {
    let Some(sheet) = editable_sheet(tx, id) else {
        return;
    };
    if coord.is_header() || !can_mutate_cell(&sheet, coord) {
        return;
    }
    tx.edit_cell(id, coord, |cell| {
        cell.text = value;
        cell.datatype = datatype;
        cell.error = Some(error.to_string());
        cell.error_message = error_message;
    });
}

/// Clear content inside the selection, keeping formatting. Clearing a spill
/// anchor clears its whole block.
pub(super) fn delete_cells(
    tx: &mut Transaction,
    bounds: &dyn CellBounds,
    id: &SheetId,
    active_cell: Option<CellCoord>,
    selections: &[SelectionArea],
) {
    let Some(sheet) = editable_sheet(tx, id) else {
        return;
    };
    for area in action_areas(&sheet, bounds, active_cell, selections) {
        for coord in sheet.coords_in(area) {
            if !can_mutate_cell(&sheet, coord) {
                continue;
            }
            let Some(mut cell) = tx.cell(id, coord).cloned() else {
                continue;
            };
            let spill = cell.spill_area(coord);
            cell.clear_content();
            tx.write_cell(id, coord, Some(cell));
            if let Some(spill) = spill {
                clear_spill(tx, &sheet, coord, spill, None);
            }
        }
    }
    tx.set_focus(active_cell, Some(selections.to_vec()));
}

/// Remove cells outright, formatting included. Removing a spill anchor
/// clears its whole block.
pub(super) fn remove_cells(
    tx: &mut Transaction,
    bounds: &dyn CellBounds,
    id: &SheetId,
    active_cell: Option<CellCoord>,
    selections: &[SelectionArea],
) {
    let Some(sheet) = editable_sheet(tx, id) else {
        return;
    };
    for area in action_areas(&sheet, bounds, active_cell, selections) {
        for coord in sheet.coords_in(area) {
            if can_mutate_cell(&sheet, coord) {
                release_spill(tx, &sheet, coord, None);
                tx.write_cell(id, coord, None);
            }
        }
    }
}

pub(super) fn validation_success(
    tx: &mut Transaction,
    id: &SheetId,
    coord: CellCoord,
    valid: Option<bool>,
    prompt: Option<String>,
) {
    let Some(sheet) = editable_sheet(tx, id) else {
        return;
    };
    if coord.is_header() || !can_mutate_cell(&sheet, coord) {
        return;
    }
    tx.edit_cell(id, coord, |cell| {
        if valid.is_some() {
            cell.valid = valid;
        }
        if let Some(prompt) = prompt {
            cell.data_validation
                .get_or_insert_with(|| DataValidation::new(ValidationKind::Custom))
                .prompt = Some(prompt);
        }
    });
}

/// Cosmetic flag around an awaited evaluation; cell locks do not apply.
pub(super) fn set_loading(tx: &mut Transaction, id: &SheetId, coord: CellCoord, loading: bool) {
    if editable_sheet(tx, id).is_none() || coord.is_header() {
        return;
    }
    tx.edit_cell(id, coord, |cell| cell.loading = loading);
}

/// Merge evaluator results. Sheets are matched by name; protected sheets
/// and locked cells drop their updates.
pub(super) fn update_cells(tx: &mut Transaction, changes: &CellsBySheet) {
    for (name, rows) in changes {
        let Some(id) = tx.document().sheet_by_name(name).map(|s| s.id.clone()) else {
            log::debug!("recalc result for unknown sheet {:?}", name);
            continue;
        };
        let Some(sheet) = editable_sheet(tx, &id) else {
            continue;
        };
        for (row, cols) in rows {
            for (col, update) in cols {
                let coord = CellCoord::new(*row, *col);
                if coord.is_header() || !can_mutate_cell(&sheet, coord) {
                    continue;
                }
                let mut cell = tx.cell(&id, coord).cloned().unwrap_or_default();
                if let Some(spill) = cell.spill_area(coord) {
                    clear_spill(tx, &sheet, coord, spill, None);
                }
                update.apply_to(&mut cell);
                tx.write_cell(&id, coord, Some(cell));
            }
        }
    }
}

/// Selections carried by the action, or the bounds of its active cell.
pub(super) fn action_areas(
    sheet: &Sheet,
    bounds: &dyn CellBounds,
    active_cell: Option<CellCoord>,
    selections: &[SelectionArea],
) -> Vec<Area> {
    if !selections.is_empty() {
        return selections.iter().map(|s| s.range).collect();
    }
    effective_bounds(sheet, bounds, active_cell).into_iter().collect()
}

/// Clear the dependents of a spill block, keeping their formatting. Cells
/// inside `spare` are left alone.
pub(super) fn clear_spill(tx: &mut Transaction, sheet: &Sheet, anchor: CellCoord, area: Area, spare: Option<Area>) {
    for coord in sheet.coords_in(area) {
        if coord == anchor || spare.is_some_and(|spare| spare.contains(coord)) || !can_mutate_cell(sheet, coord) {
            continue;
        }
        if let Some(mut cell) = tx.cell(&sheet.id, coord).cloned() {
            cell.clear_content();
            tx.write_cell(&sheet.id, coord, Some(cell));
        }
    }
}

/// Clear the block spilled from `coord` as the transaction currently sees it.
/// Call before overwriting or removing the anchor.
pub(super) fn release_spill(tx: &mut Transaction, sheet: &Sheet, coord: CellCoord, spare: Option<Area>) {
    if let Some(area) = tx.cell(&sheet.id, coord).and_then(|cell| cell.spill_area(coord)) {
        clear_spill(tx, sheet, coord, area, spare);
    }
}
