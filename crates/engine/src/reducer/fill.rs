//! Fill handle: replicate the anchor selection into the dragged extension.

use tabgrid_core::{Area, CellCoord, FillDirection, SelectionArea};

use super::cells::release_spill;
use super::editable_sheet;
use crate::bounds::{effective_bounds, CellBounds};
use crate::cell::CellConfig;
use crate::formula::translate;
use crate::protection::can_mutate_cell;
use crate::sheet::SheetId;
use crate::transaction::Transaction;

pub(super) fn update_fill(
    tx: &mut Transaction,
    bounds: &dyn CellBounds,
    id: &SheetId,
    active_cell: Option<CellCoord>,
    fill_selection: SelectionArea,
    selections: &[SelectionArea],
) {
    let Some(sheet) = editable_sheet(tx, id) else {
        return;
    };
    let anchor = match selections.last() {
        Some(selection) => Some(selection.range),
        None => effective_bounds(&sheet, bounds, active_cell),
    };
    let Some(anchor) = anchor else {
        return;
    };

    let pairs: Vec<(CellCoord, CellCoord)> = fill_pairs(&anchor, &fill_selection.range)
        .into_iter()
        .filter(|(_, destination)| !destination.is_header() && can_mutate_cell(&sheet, *destination))
        .collect();
    for (_, destination) in &pairs {
        release_spill(tx, &sheet, *destination, None);
    }
    for (source, destination) in pairs {
        let cell = sheet.cell(source).map(|config| filled_cell(config, source, destination));
        tx.write_cell(id, destination, cell);
    }

    tx.set_focus(active_cell, Some(vec![fill_selection]));
}

/// Copy of `config` moved from `source` to `destination`. Formula text is
/// re-anchored and its evaluation state dropped.
fn filled_cell(config: &CellConfig, source: CellCoord, destination: CellCoord) -> CellConfig {
    let mut cell = config.clone();
    if !cell.is_formula() {
        return cell;
    }
    cell.result = None;
    cell.parent_cell = None;
    cell.formula_range = None;
    cell.timestamp = None;
    cell.error = None;
    cell.error_message = None;
    match translate(cell.text(), source, destination, None) {
        Ok(text) => cell.text = Some(text),
        Err(err) => {
            cell.error = Some(err.code().to_string());
            cell.error_message = Some(err.message().to_string());
            cell.text = Some(err.details().to_string());
        }
    }
    cell
}

/// `(source, destination)` pairs for every cell of the extension, cycling
/// through the anchor when the extension is longer.
fn fill_pairs(anchor: &Area, extent: &Area) -> Vec<(CellCoord, CellCoord)> {
    let height = anchor.height();
    let width = anchor.width();
    let mut pairs = Vec::new();
    match FillDirection::detect(anchor, extent) {
        FillDirection::Down => {
            for (k, row) in (anchor.bottom + 1..=extent.bottom).enumerate() {
                let source_row = anchor.top + k % height;
                for col in anchor.left..=anchor.right {
                    pairs.push((CellCoord::new(source_row, col), CellCoord::new(row, col)));
                }
            }
        }
        FillDirection::Up => {
            for (k, row) in (extent.top..anchor.top).rev().enumerate() {
                let source_row = anchor.bottom - k % height;
                for col in anchor.left..=anchor.right {
                    pairs.push((CellCoord::new(source_row, col), CellCoord::new(row, col)));
                }
            }
        }
        FillDirection::Left => {
            for row in anchor.top..=anchor.bottom {
                for (k, col) in (extent.left..anchor.left).rev().enumerate() {
                    let source_col = anchor.right - k % width;
                    pairs.push((CellCoord::new(row, source_col), CellCoord::new(row, col)));
                }
            }
        }
        FillDirection::Right => {
            for row in anchor.top..=anchor.bottom {
                for (k, col) in (anchor.right + 1..=extent.right).enumerate() {
                    let source_col = anchor.left + k % width;
                    pairs.push((CellCoord::new(row, source_col), CellCoord::new(row, col)));
                }
            }
        }
    }
    pairs
}
