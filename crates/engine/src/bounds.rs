//! Resolving a cell to the rectangle it occupies on screen.

use tabgrid_core::{Area, CellCoord, SelectionArea};

use crate::sheet::Sheet;

/// Geometry provider supplied by the host (`getCellBounds`).
///
/// Returns the rectangle a cell covers, accounting for merges the host
/// knows about, or `None` when the cell cannot be resolved.
pub trait CellBounds {
    fn cell_bounds(&self, cell: Option<CellCoord>) -> Option<Area>;
}

impl<F> CellBounds for F
where
    F: Fn(Option<CellCoord>) -> Option<Area>,
{
    fn cell_bounds(&self, cell: Option<CellCoord>) -> Option<Area> {
        self(cell)
    }
}

/// Every cell is its own 1x1 rectangle.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleCellBounds;

impl CellBounds for SingleCellBounds {
    fn cell_bounds(&self, cell: Option<CellCoord>) -> Option<Area> {
        cell.map(Area::cell)
    }
}

/// Host bounds, widened to the sheet's own merge containing the cell.
pub fn effective_bounds(sheet: &Sheet, bounds: &dyn CellBounds, cell: Option<CellCoord>) -> Option<Area> {
    let area = bounds.cell_bounds(cell).or_else(|| cell.map(Area::cell))?;
    Some(match cell.and_then(|c| sheet.merged_area_at(c)) {
        Some(merged) => merged.union(&area),
        None => area,
    })
}

/// The sheet's selections, or the active cell's bounds when nothing is selected.
pub fn target_selections(sheet: &Sheet, bounds: &dyn CellBounds) -> Vec<SelectionArea> {
    if !sheet.selections.is_empty() {
        return sheet.selections.clone();
    }
    effective_bounds(sheet, bounds, sheet.active_cell)
        .map(|area| vec![SelectionArea::new(area)])
        .unwrap_or_default()
}
