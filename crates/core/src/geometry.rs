//! Geometry helpers shared by fill, structural edits, merges, and borders.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::area::{Area, Axis, CellCoord};

/// First and last populated key of a sparse line map.
pub fn min_max<V>(map: &BTreeMap<usize, V>) -> Option<(usize, usize)> {
    let first = *map.keys().next()?;
    let last = *map.keys().next_back()?;
    Some((first, last))
}

/// Direction of a fill drag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FillDirection {
    Down,
    Up,
    Left,
    Right,
}

impl FillDirection {
    /// Compare the extended rectangle against the anchor. Vertical growth wins.
    pub fn detect(anchor: &Area, extent: &Area) -> FillDirection {
        if extent.bottom > anchor.bottom {
            FillDirection::Down
        } else if extent.top < anchor.top {
            FillDirection::Up
        } else if extent.left < anchor.left {
            FillDirection::Left
        } else {
            FillDirection::Right
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftKind {
    Insert,
    Delete,
}

/// A row or column insert/delete at `pivot`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineShift {
    pub axis: Axis,
    pub pivot: usize,
    pub kind: ShiftKind,
}

impl LineShift {
    pub fn insert(axis: Axis, pivot: usize) -> Self {
        Self { axis, pivot, kind: ShiftKind::Insert }
    }

    pub fn delete(axis: Axis, pivot: usize) -> Self {
        Self { axis, pivot, kind: ShiftKind::Delete }
    }

    pub fn delta(&self) -> isize {
        match self.kind {
            ShiftKind::Insert => 1,
            ShiftKind::Delete => -1,
        }
    }

    /// Shift a reference or rectangle edge. Every index at or after the pivot
    /// moves by one; `None` means the edge fell onto the header line.
    pub fn shift_edge(&self, index: usize) -> Option<usize> {
        if index < self.pivot {
            return Some(index);
        }
        match self.kind {
            ShiftKind::Insert => Some(index + 1),
            ShiftKind::Delete => index.checked_sub(1).filter(|i| *i > 0),
        }
    }

    /// Shift a line of content. The deleted line itself has no destination.
    pub fn shift_line(&self, index: usize) -> Option<usize> {
        if index < self.pivot {
            return Some(index);
        }
        match self.kind {
            ShiftKind::Insert => Some(index + 1),
            ShiftKind::Delete if index == self.pivot => None,
            ShiftKind::Delete => Some(index - 1),
        }
    }

    /// Move both edges of an area on the shift axis.
    pub fn shift_area(&self, area: &Area) -> Option<Area> {
        match self.axis {
            Axis::Row => Some(Area {
                top: self.shift_edge(area.top)?,
                bottom: self.shift_edge(area.bottom)?,
                ..*area
            }),
            Axis::Column => Some(Area {
                left: self.shift_edge(area.left)?,
                right: self.shift_edge(area.right)?,
                ..*area
            }),
        }
    }

    /// Move merge rectangles, dropping any that stop being a real merge.
    pub fn move_merged_cells(&self, merged: &[Area]) -> Vec<Area> {
        merged
            .iter()
            .filter_map(|area| self.shift_area(area))
            .filter(|area| !area.is_single_cell())
            .collect()
    }

    /// Re-key line-indexed entries (rows of cells, size overrides, hidden lines).
    pub fn shift_entries<V, I, C>(&self, entries: I) -> C
    where
        I: IntoIterator<Item = (usize, V)>,
        C: FromIterator<(usize, V)>,
    {
        entries
            .into_iter()
            .filter_map(|(index, value)| self.shift_line(index).map(|to| (to, value)))
            .collect()
    }

    pub fn shift_coord(&self, coord: CellCoord) -> Option<CellCoord> {
        match self.axis {
            Axis::Row => self.shift_line(coord.row).map(|row| CellCoord::new(row, coord.col)),
            Axis::Column => self.shift_line(coord.col).map(|col| CellCoord::new(coord.row, col)),
        }
    }
}

/// Which edges of a selection receive a border.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderVariant {
    All,
    Inner,
    Horizontal,
    Vertical,
    Outer,
    Left,
    Right,
    Top,
    Bottom,
    None,
}

/// Edge flags for one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Edges {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Edges {
    pub const ALL: Edges = Edges { top: true, right: true, bottom: true, left: true };

    pub fn any(&self) -> bool {
        self.top || self.right || self.bottom || self.left
    }
}

impl BorderVariant {
    /// Edges to draw for every cell of `area`, in row-major order.
    /// Cells with no edges are omitted. `None` yields every cell with all
    /// edges so callers can clear them.
    pub fn edges(&self, area: &Area) -> Vec<(CellCoord, Edges)> {
        area.cells()
            .map(|cell| (cell, self.edges_for(area, cell)))
            .filter(|(_, edges)| edges.any())
            .collect()
    }

    fn edges_for(&self, area: &Area, cell: CellCoord) -> Edges {
        let at_top = cell.row == area.top;
        let at_bottom = cell.row == area.bottom;
        let at_left = cell.col == area.left;
        let at_right = cell.col == area.right;
        match self {
            BorderVariant::All | BorderVariant::None => Edges::ALL,
            BorderVariant::Outer => Edges { top: at_top, right: at_right, bottom: at_bottom, left: at_left },
            BorderVariant::Inner => {
                let mut edges = Edges::default();
                if !at_left && !at_right {
                    edges.left = true;
                    edges.right = true;
                }
                if !at_top && !at_bottom {
                    edges.top = true;
                    edges.bottom = true;
                }
                if area.top != area.bottom {
                    edges.bottom |= at_top;
                    edges.top |= at_bottom;
                }
                if area.left != area.right {
                    edges.right |= at_left;
                    edges.left |= at_right;
                }
                edges
            }
            BorderVariant::Horizontal => Edges { bottom: !at_bottom, ..Edges::default() },
            BorderVariant::Vertical => Edges { right: !at_right, ..Edges::default() },
            BorderVariant::Left => Edges { left: at_left, ..Edges::default() },
            BorderVariant::Right => Edges { right: at_right, ..Edges::default() },
            BorderVariant::Top => Edges { top: at_top, ..Edges::default() },
            BorderVariant::Bottom => Edges { bottom: at_bottom, ..Edges::default() },
        }
    }
}
