use tabgrid_core::{Axis, BorderVariant};

use super::{editable_sheet, find_sheet, selected_areas};
use crate::bounds::{effective_bounds, CellBounds};
use crate::cell::{BorderEdge, BorderStyle, Borders, FormatChange};
use crate::protection::can_mutate_cell;
use crate::sheet::{FilterDefinition, FilterView, ScrollState, SheetId, SheetProp};
use crate::transaction::Transaction;

/// Toggle plain-text display on the selection. Leaving plain-text mode only
/// touches populated cells.
pub(super) fn set_plaintext(tx: &mut Transaction, bounds: &dyn CellBounds, id: &SheetId, plaintext: bool) {
    let Some(sheet) = editable_sheet(tx, id) else {
        return;
    };
    for area in selected_areas(&sheet, bounds) {
        let coords: Vec<_> = if plaintext { area.cells().collect() } else { sheet.coords_in(area) };
        for coord in coords {
            if !coord.is_header() && can_mutate_cell(&sheet, coord) {
                tx.edit_cell(id, coord, |cell| cell.plaintext = plaintext);
            }
        }
    }
}

/// Apply one formatting key to every cell of the selection. Locked cells are
/// skipped, except for changes to the lock itself.
pub(super) fn formatting_change(tx: &mut Transaction, bounds: &dyn CellBounds, id: &SheetId, change: &FormatChange) {
    let Some(sheet) = editable_sheet(tx, id) else {
        return;
    };
    for area in selected_areas(&sheet, bounds) {
        for coord in area.cells() {
            if coord.is_header() || (!change.is_protection() && !can_mutate_cell(&sheet, coord)) {
                continue;
            }
            tx.edit_cell(id, coord, |cell| cell.apply_format(change));
        }
    }
    tx.set_focus(sheet.active_cell, Some(sheet.selections.clone()));
}

pub(super) fn clear_formatting(tx: &mut Transaction, bounds: &dyn CellBounds, id: &SheetId) {
    let Some(sheet) = editable_sheet(tx, id) else {
        return;
    };
    for area in selected_areas(&sheet, bounds) {
        for coord in sheet.coords_in(area) {
            if can_mutate_cell(&sheet, coord) {
                tx.edit_cell(id, coord, |cell| cell.clear_formatting());
            }
        }
    }
}

/// Draw `variant` over the selection. Edges that land inside a merge are
/// drawn on the merge's top-left cell.
pub(super) fn set_border(
    tx: &mut Transaction,
    bounds: &dyn CellBounds,
    id: &SheetId,
    color: Option<String>,
    style: BorderStyle,
    variant: BorderVariant,
) {
    let Some(sheet) = editable_sheet(tx, id) else {
        return;
    };
    let edge = BorderEdge { color, style };
    for area in selected_areas(&sheet, bounds) {
        for (coord, edges) in variant.edges(&area) {
            let target = sheet.merged_area_at(coord).map_or(coord, |merged| merged.top_left());
            if target.is_header() || !can_mutate_cell(&sheet, target) {
                continue;
            }
            match variant {
                BorderVariant::None => {
                    if tx.cell(id, target).is_some() {
                        tx.edit_cell(id, target, |cell| cell.borders = Borders::default());
                    }
                }
                _ => tx.edit_cell(id, target, |cell| cell.borders.apply(edges, &edge)),
            }
        }
    }
}

/// Merge the last selection, or unmerge it when exactly that area is merged.
pub(super) fn merge_cells(tx: &mut Transaction, bounds: &dyn CellBounds, id: &SheetId) {
    let Some(sheet) = editable_sheet(tx, id) else {
        return;
    };
    let area = match sheet.selections.last() {
        Some(selection) => Some(selection.range),
        None => effective_bounds(&sheet, bounds, sheet.active_cell),
    };
    let Some(area) = area else {
        return;
    };
    if area.is_single_cell() || area.touches_header() {
        return;
    }

    let mut merged = sheet.merged_cells.clone();
    if let Some(index) = merged.iter().position(|m| *m == area) {
        merged.remove(index);
    } else if merged.iter().any(|m| m.intersects(&area)) {
        log::debug!("merge {:?} overlaps an existing merge", area);
        return;
    } else {
        merged.push(area);
    }
    tx.set_prop(id, SheetProp::MergedCells(merged));
}

/// Column widths for `Axis::Column`, row heights for `Axis::Row`.
pub(super) fn resize(tx: &mut Transaction, id: &SheetId, axis: Axis, index: usize, dimension: f64) {
    if index == 0 || !dimension.is_finite() || editable_sheet(tx, id).is_none() {
        return;
    }
    let size = Some(dimension.max(0.0));
    let prop = match axis {
        Axis::Column => SheetProp::ColumnSize { index, size },
        Axis::Row => SheetProp::RowSize { index, size },
    };
    tx.set_prop(id, prop);
}

pub(super) fn frozen_change(tx: &mut Transaction, id: &SheetId, axis: Axis, count: usize) {
    if editable_sheet(tx, id).is_none() {
        return;
    }
    let prop = match axis {
        Axis::Row => SheetProp::FrozenRows(count),
        Axis::Column => SheetProp::FrozenColumns(count),
    };
    tx.set_prop(id, prop);
}

pub(super) fn update_scroll(tx: &mut Transaction, id: &SheetId, scroll_state: ScrollState) {
    if find_sheet(tx, id).is_some() {
        tx.set_prop(id, SheetProp::ScrollState(scroll_state));
    }
}

/// Set or clear one column filter. An index past the end creates a new view.
pub(super) fn change_filter(
    tx: &mut Transaction,
    id: &SheetId,
    view_index: usize,
    column: usize,
    filter: Option<FilterDefinition>,
) {
    let Some(sheet) = editable_sheet(tx, id) else {
        return;
    };
    let mut views = sheet.filter_views;
    match filter {
        Some(filter) => match views.get_mut(view_index) {
            Some(view) => {
                view.filters.insert(column, filter);
            }
            None => {
                let mut view = FilterView::default();
                view.filters.insert(column, filter);
                views.push(view);
            }
        },
        None => {
            if let Some(view) = views.get_mut(view_index) {
                view.filters.remove(&column);
            }
        }
    }
    tx.set_prop(id, SheetProp::FilterViews(views));
}

pub(super) fn set_line_hidden(tx: &mut Transaction, id: &SheetId, axis: Axis, index: usize, hidden: bool) {
    if index == 0 {
        return;
    }
    let Some(sheet) = editable_sheet(tx, id) else {
        return;
    };
    let mut lines = match axis {
        Axis::Row => sheet.hidden_rows,
        Axis::Column => sheet.hidden_columns,
    };
    if hidden {
        lines.insert(index);
    } else {
        lines.remove(&index);
    }
    let prop = match axis {
        Axis::Row => SheetProp::HiddenRows(lines),
        Axis::Column => SheetProp::HiddenColumns(lines),
    };
    tx.set_prop(id, prop);
}

