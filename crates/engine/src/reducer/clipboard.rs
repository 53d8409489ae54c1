//! Paste and cut.

use tabgrid_core::{Area, CellCoord, SelectionArea};

use super::cells::release_spill;
use super::{editable_sheet, find_sheet};
use crate::action::PasteCell;
use crate::cell::{detect_datatype, CellConfig};
use crate::formula::translate;
use crate::protection::{can_mutate_cell, can_mutate_sheet};
use crate::sheet::{Sheet, SheetId, SheetProp};
use crate::transaction::Transaction;

pub(super) struct PasteRequest<'a> {
    pub active_cell: Option<CellCoord>,
    pub rows: &'a [Vec<PasteCell>],
    pub selections: Option<&'a [SelectionArea]>,
    pub cut_selection: Option<Area>,
    pub cut_sheet: Option<&'a SheetId>,
}

/// Write the payload at the last selection (or the active cell), tiling it
/// when the selection is larger, then clear the cut source.
pub(super) fn paste(tx: &mut Transaction, id: &SheetId, request: PasteRequest) {
    let Some(sheet) = editable_sheet(tx, id) else {
        return;
    };
    let row_span = request.rows.len();
    let col_span = request.rows.iter().map(Vec::len).max().unwrap_or(0);
    if row_span == 0 || col_span == 0 {
        return;
    }
    let selection = match sheet.selections.last() {
        Some(selection) => selection.range,
        None => match request.active_cell {
            Some(cell) => Area::cell(cell),
            None => return,
        },
    };
    let destination = Area {
        bottom: selection.bottom.max(selection.top + row_span - 1),
        right: selection.right.max(selection.left + col_span - 1),
        ..selection
    };

    let writes: Vec<(CellCoord, &PasteCell)> = destination
        .cells()
        .filter(|coord| !coord.is_header() && can_mutate_cell(&sheet, *coord))
        .filter_map(|coord| {
            let r = (coord.row - destination.top) % row_span;
            let c = (coord.col - destination.left) % col_span;
            match request.rows[r].get(c) {
                None | Some(PasteCell::Empty) => None,
                Some(payload) => Some((coord, payload)),
            }
        })
        .collect();

    // Overwritten anchors drop their blocks before anything lands in them
    for (coord, _) in &writes {
        release_spill(tx, &sheet, *coord, None);
    }
    for (coord, payload) in writes {
        match payload {
            PasteCell::Empty => {}
            PasteCell::Text(text) => {
                tx.edit_cell(id, coord, |cell| {
                    cell.text = (!text.is_empty()).then(|| text.clone());
                    cell.datatype = detect_datatype(text);
                    cell.clear_evaluation();
                    cell.formula_range = None;
                });
            }
            PasteCell::Config { config, source_cell } => {
                tx.write_cell(id, coord, Some(pasted_cell(config, *source_cell, coord)));
            }
        }
    }

    if let Some(cut) = request.cut_selection {
        let cut_sheet = request.cut_sheet.unwrap_or(id);
        clear_cut_source(tx, cut_sheet, cut, (cut_sheet == id).then_some(destination));
    }

    match request.selections {
        Some(selections) => tx.set_prop(id, SheetProp::Selections(selections.to_vec())),
        None if destination != selection => {
            tx.set_prop(id, SheetProp::Selections(vec![SelectionArea::new(destination)]))
        }
        None => {}
    }
    tx.set_focus(request.active_cell, request.selections.map(<[SelectionArea]>::to_vec));
}

/// A copied cell re-anchored at `destination`. Untranslatable formulas keep
/// their best-effort text and carry `#REF!`.
fn pasted_cell(config: &CellConfig, source_cell: Option<CellCoord>, destination: CellCoord) -> CellConfig {
    let mut cell = CellConfig {
        formula_range: None,
        result: None,
        parent_cell: None,
        result_type: None,
        timestamp: None,
        ..config.clone()
    };
    let Some(source) = source_cell.filter(|_| cell.is_formula()) else {
        return cell;
    };
    match translate(cell.text(), source, destination, None) {
        Ok(text) => cell.text = Some(text),
        Err(err) => {
            cell.text = Some(err.details().to_string());
            cell.error = Some(err.code().to_string());
            cell.error_message = Some(err.message().to_string());
        }
    }
    cell
}

/// Delete the cut rectangle, sparing locked cells and anything just pasted.
fn clear_cut_source(tx: &mut Transaction, id: &SheetId, cut: Area, pasted: Option<Area>) {
    let Some(sheet): Option<Sheet> = find_sheet(tx, id) else {
        return;
    };
    if !can_mutate_sheet(&sheet) {
        log::debug!("cut source {} is protected", sheet.name);
        return;
    }
    for coord in sheet.coords_in(cut) {
        if pasted.is_some_and(|area| area.contains(coord)) || !can_mutate_cell(&sheet, coord) {
            continue;
        }
        release_spill(tx, &sheet, coord, pasted);
        tx.write_cell(id, coord, None);
    }
}
