use serde::{Deserialize, Serialize};

/// A cell position. Both components are 1-based.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    #[serde(rename = "rowIndex")]
    pub row: usize,
    #[serde(rename = "columnIndex")]
    pub col: usize,
}

impl CellCoord {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// True for positions on the header row or header column.
    pub fn is_header(&self) -> bool {
        self.row == 0 || self.col == 0
    }

    /// Component on the given axis.
    pub fn index(&self, axis: Axis) -> usize {
        match axis {
            Axis::Row => self.row,
            Axis::Column => self.col,
        }
    }
}

/// Row or column axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Row,
    Column,
}

/// Inclusive rectangle of cells. Deserialized corners are normalized like
/// [`Area::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Corners")]
pub struct Area {
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
}

#[derive(Deserialize)]
struct Corners {
    top: usize,
    left: usize,
    bottom: usize,
    right: usize,
}

impl From<Corners> for Area {
    fn from(c: Corners) -> Self {
        Area::new(c.top, c.left, c.bottom, c.right)
    }
}

impl Area {
    /// Build an area from two corners in any order.
    pub fn new(top: usize, left: usize, bottom: usize, right: usize) -> Self {
        Self {
            top: top.min(bottom),
            left: left.min(right),
            bottom: top.max(bottom),
            right: left.max(right),
        }
    }

    pub fn cell(coord: CellCoord) -> Self {
        Self {
            top: coord.row,
            left: coord.col,
            bottom: coord.row,
            right: coord.col,
        }
    }

    pub fn top_left(&self) -> CellCoord {
        CellCoord::new(self.top, self.left)
    }

    pub fn height(&self) -> usize {
        self.bottom.saturating_sub(self.top) + 1
    }

    pub fn width(&self) -> usize {
        self.right.saturating_sub(self.left) + 1
    }

    pub fn is_single_cell(&self) -> bool {
        self.top == self.bottom && self.left == self.right
    }

    /// True if the area touches the header row or header column.
    pub fn touches_header(&self) -> bool {
        self.top == 0 || self.left == 0
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.row >= self.top && coord.row <= self.bottom && coord.col >= self.left && coord.col <= self.right
    }

    pub fn intersects(&self, other: &Area) -> bool {
        self.top <= other.bottom && other.top <= self.bottom && self.left <= other.right && other.left <= self.right
    }

    pub fn intersection(&self, other: &Area) -> Option<Area> {
        if !self.intersects(other) {
            return None;
        }
        Some(Area {
            top: self.top.max(other.top),
            left: self.left.max(other.left),
            bottom: self.bottom.min(other.bottom),
            right: self.right.min(other.right),
        })
    }

    /// Smallest area covering both.
    pub fn union(&self, other: &Area) -> Area {
        Area {
            top: self.top.min(other.top),
            left: self.left.min(other.left),
            bottom: self.bottom.max(other.bottom),
            right: self.right.max(other.right),
        }
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (self.top..=self.bottom).flat_map(move |row| (self.left..=self.right).map(move |col| CellCoord::new(row, col)))
    }
}

/// One entry of a sheet's selection list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionArea {
    #[serde(rename = "bounds")]
    pub range: Area,
}

impl SelectionArea {
    pub fn new(range: Area) -> Self {
        Self { range }
    }

    /// Selection list for a lone active cell.
    pub fn from_active_cell(cell: Option<CellCoord>) -> Vec<SelectionArea> {
        cell.map(|c| vec![SelectionArea::new(Area::cell(c))]).unwrap_or_default()
    }
}

impl From<Area> for SelectionArea {
    fn from(range: Area) -> Self {
        Self::new(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_normalizes_corners() {
        let area = Area::new(5, 4, 2, 1);
        assert_eq!(area, Area { top: 2, left: 1, bottom: 5, right: 4 });
        assert_eq!(area.height(), 4);
        assert_eq!(area.width(), 4);
    }

    #[test]
    fn test_deserialized_corners_are_normalized() {
        let area: Area = serde_json::from_str(r#"{"top":5,"left":3,"bottom":2,"right":1}"#).unwrap();
        assert_eq!(area, Area::new(2, 1, 5, 3));
        assert_eq!(area.height(), 4);
        assert_eq!(area.width(), 3);

        let hand_built = Area { top: 5, left: 3, bottom: 2, right: 1 };
        assert_eq!(hand_built.height(), 1);
        assert_eq!(hand_built.width(), 1);
    }

    #[test]
    fn test_intersection() {
        let a = Area::new(1, 1, 4, 4);
        let b = Area::new(3, 3, 6, 6);
        assert_eq!(a.intersection(&b), Some(Area::new(3, 3, 4, 4)));

        let c = Area::new(5, 5, 6, 6);
        assert!(!a.intersects(&c));
        assert_eq!(a.intersection(&c), None);
    }

    #[test]
    fn test_cells_row_major() {
        let cells: Vec<_> = Area::new(1, 1, 2, 2).cells().collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(1, 1),
                CellCoord::new(1, 2),
                CellCoord::new(2, 1),
                CellCoord::new(2, 2),
            ]
        );
    }

    #[test]
    fn test_selection_from_active_cell() {
        assert!(SelectionArea::from_active_cell(None).is_empty());
        let sel = SelectionArea::from_active_cell(Some(CellCoord::new(3, 2)));
        assert_eq!(sel, vec![SelectionArea::new(Area::new(3, 2, 3, 2))]);
    }

    #[test]
    fn test_header_detection() {
        assert!(CellCoord::new(0, 3).is_header());
        assert!(!CellCoord::new(1, 1).is_header());
        assert!(Area::new(0, 1, 3, 3).touches_header());
    }
}
