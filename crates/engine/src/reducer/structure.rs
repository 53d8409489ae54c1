//! Row and column insertion and deletion.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;
use tabgrid_core::{Axis, CellCoord, LineShift, ShiftKind};

use super::editable_sheet;
use crate::cell::CellConfig;
use crate::formula::shift_formula;
use crate::sheet::{CellMap, FilterView, Sheet, SheetId, SheetProp};
use crate::transaction::Transaction;

/// Shift every line at or after the pivot. Formulas are rewritten against
/// the original coordinates before any content moves.
pub(super) fn shift_lines(tx: &mut Transaction, id: &SheetId, shift: LineShift) {
    if shift.pivot == 0 {
        return;
    }
    let Some(sheet) = editable_sheet(tx, id) else {
        return;
    };

    let cells = shifted_cells(&sheet, &shift);
    let touched: BTreeSet<CellCoord> = sheet.coords().chain(coords_of(&cells)).collect();
    for coord in touched {
        let value = cells.get(&coord.row).and_then(|row| row.get(&coord.col)).cloned();
        tx.write_cell(id, coord, value);
    }

    tx.set_prop(id, SheetProp::MergedCells(shift.move_merged_cells(&sheet.merged_cells)));

    let (sizes, hidden) = match shift.axis {
        Axis::Row => (&sheet.row_sizes, &sheet.hidden_rows),
        Axis::Column => (&sheet.column_sizes, &sheet.hidden_columns),
    };
    for (index, size) in shifted_sizes(sizes, &shift) {
        let prop = match shift.axis {
            Axis::Row => SheetProp::RowSize { index, size },
            Axis::Column => SheetProp::ColumnSize { index, size },
        };
        tx.set_prop(id, prop);
    }
    let hidden: BTreeMap<usize, ()> = shift.shift_entries(hidden.iter().map(|i| (*i, ())));
    let hidden: BTreeSet<usize> = hidden.into_keys().collect();
    tx.set_prop(
        id,
        match shift.axis {
            Axis::Row => SheetProp::HiddenRows(hidden),
            Axis::Column => SheetProp::HiddenColumns(hidden),
        },
    );

    let views = sheet.filter_views.iter().map(|view| shifted_filter_view(view, &shift)).collect();
    tx.set_prop(id, SheetProp::FilterViews(views));

    let resize = |count: usize| match shift.kind {
        ShiftKind::Insert => count + 1,
        ShiftKind::Delete => count.saturating_sub(1).max(1),
    };
    tx.set_prop(
        id,
        match shift.axis {
            Axis::Row => SheetProp::RowCount(resize(sheet.row_count)),
            Axis::Column => SheetProp::ColumnCount(resize(sheet.column_count)),
        },
    );
}

/// The whole cell map after the shift.
fn shifted_cells(sheet: &Sheet, shift: &LineShift) -> CellMap {
    let mut cells = CellMap::new();
    for coord in sheet.coords() {
        let Some(config) = sheet.cell(coord) else {
            continue;
        };
        let Some(target) = shift.shift_coord(coord) else {
            continue;
        };
        cells
            .entry(target.row)
            .or_default()
            .insert(target.col, rewrite_formula(config, shift, &sheet.name));
    }

    // The inserted line inherits the formatting of the line it pushed away
    if shift.kind == ShiftKind::Insert {
        for coord in sheet.coords().filter(|c| c.index(shift.axis) == shift.pivot) {
            let Some(config) = sheet.cell(coord) else {
                continue;
            };
            let mut clone = config.clone_formatting();
            clone.clear_evaluation();
            clone.formula_range = None;
            clone.loading = false;
            if !clone.is_empty() {
                cells.entry(coord.row).or_default().insert(coord.col, clone);
            }
        }
    }
    cells
}

fn rewrite_formula(config: &CellConfig, shift: &LineShift, sheet_name: &str) -> CellConfig {
    let mut cell = config.clone();
    if !cell.is_formula() {
        return cell;
    }
    match shift_formula(cell.text(), shift, sheet_name) {
        Ok(text) => cell.text = Some(text),
        Err(err) => {
            cell.error = Some(err.code().to_string());
            cell.error_message = Some(err.message().to_string());
            cell.text = Some(err.details().to_string());
        }
    }
    cell
}

fn coords_of(cells: &CellMap) -> impl Iterator<Item = CellCoord> + '_ {
    cells
        .iter()
        .flat_map(|(row, cols)| cols.keys().map(move |col| CellCoord::new(*row, *col)))
}

/// Every size slot whose value changes: moved entries plus vacated indices.
fn shifted_sizes(sizes: &FxHashMap<usize, f64>, shift: &LineShift) -> Vec<(usize, Option<f64>)> {
    let moved: BTreeMap<usize, f64> = shift.shift_entries(sizes.iter().map(|(i, s)| (*i, *s)));
    let indices: BTreeSet<usize> = sizes.keys().copied().chain(moved.keys().copied()).collect();
    indices
        .into_iter()
        .map(|index| (index, moved.get(&index).copied()))
        .filter(|(index, size)| sizes.get(index) != size.as_ref())
        .collect()
}

fn shifted_filter_view(view: &FilterView, shift: &LineShift) -> FilterView {
    let bounds = view.bounds.and_then(|area| shift.shift_area(&area));
    let filters = match shift.axis {
        Axis::Row => view.filters.clone(),
        Axis::Column => shift.shift_entries(view.filters.clone()),
    };
    FilterView { bounds, filters }
}
