//! Sheet and cell protection checks consulted before every write.

use tabgrid_core::CellCoord;

use crate::sheet::Sheet;

/// False when the sheet is protected.
pub fn can_mutate_sheet(sheet: &Sheet) -> bool {
    !sheet.locked
}

/// False when the sheet is protected or the cell itself is locked.
pub fn can_mutate_cell(sheet: &Sheet, coord: CellCoord) -> bool {
    can_mutate_sheet(sheet) && !sheet.is_cell_locked(coord)
}
