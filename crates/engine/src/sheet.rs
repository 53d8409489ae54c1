use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::mem;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tabgrid_core::{Area, CellCoord, SelectionArea};

use crate::cell::CellConfig;

/// Stable sheet identity, unaffected by renames and reordering.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetId(String);

impl SheetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SheetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Sparse `row -> column -> cell` storage. Rows never stay empty.
pub type CellMap = BTreeMap<usize, BTreeMap<usize, CellConfig>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollState {
    pub scroll_top: f64,
    pub scroll_left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    /// Keep rows whose value is one of `values`
    In,
    NotIn,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDefinition {
    pub operator: FilterOperator,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Area>,
    #[serde(default)]
    pub filters: BTreeMap<usize, FilterDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sheet {
    pub id: SheetId,
    pub name: String,
    pub cells: CellMap,
    pub active_cell: Option<CellCoord>,
    pub selections: Vec<SelectionArea>,
    pub column_sizes: FxHashMap<usize, f64>,
    pub row_sizes: FxHashMap<usize, f64>,
    pub merged_cells: Vec<Area>,
    pub frozen_rows: usize,
    pub frozen_columns: usize,
    pub hidden_rows: BTreeSet<usize>,
    pub hidden_columns: BTreeSet<usize>,
    pub filter_views: Vec<FilterView>,
    pub scroll_state: ScrollState,
    pub row_count: usize,
    pub column_count: usize,
    pub locked: bool,
    pub hidden: bool,
    pub tab_color: Option<String>,
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new(SheetId::new(""), "")
    }
}

impl Sheet {
    pub fn new(id: SheetId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            cells: CellMap::new(),
            active_cell: Some(CellCoord::new(1, 1)),
            selections: Vec::new(),
            column_sizes: FxHashMap::default(),
            row_sizes: FxHashMap::default(),
            merged_cells: Vec::new(),
            frozen_rows: 0,
            frozen_columns: 0,
            hidden_rows: BTreeSet::new(),
            hidden_columns: BTreeSet::new(),
            filter_views: Vec::new(),
            scroll_state: ScrollState::default(),
            row_count: 1000,
            column_count: 100,
            locked: false,
            hidden: false,
            tab_color: None,
        }
    }

    pub fn with_counts(mut self, rows: usize, columns: usize) -> Self {
        self.row_count = rows;
        self.column_count = columns;
        self
    }

    pub fn cell(&self, coord: CellCoord) -> Option<&CellConfig> {
        self.cells.get(&coord.row)?.get(&coord.col)
    }

    /// Replace the cell at `coord`, returning the previous one.
    /// Empty configs are stored as absence.
    pub fn set_cell(&mut self, coord: CellCoord, value: Option<CellConfig>) -> Option<CellConfig> {
        match value.filter(|cell| !cell.is_empty()) {
            Some(cell) => self.cells.entry(coord.row).or_default().insert(coord.col, cell),
            None => {
                let row = self.cells.get_mut(&coord.row)?;
                let old = row.remove(&coord.col);
                if row.is_empty() {
                    self.cells.remove(&coord.row);
                }
                old
            }
        }
    }

    pub fn is_cell_locked(&self, coord: CellCoord) -> bool {
        self.cell(coord).is_some_and(|cell| cell.locked)
    }

    /// Every populated coordinate, row-major.
    pub fn coords(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells
            .iter()
            .flat_map(|(row, cols)| cols.keys().map(move |col| CellCoord::new(*row, *col)))
    }

    /// Populated coordinates inside `area`.
    pub fn coords_in(&self, area: Area) -> Vec<CellCoord> {
        self.cells
            .range(area.top..=area.bottom)
            .flat_map(|(row, cols)| cols.range(area.left..=area.right).map(move |(col, _)| CellCoord::new(*row, *col)))
            .collect()
    }

    pub fn merged_area_at(&self, coord: CellCoord) -> Option<Area> {
        self.merged_cells.iter().copied().find(|area| area.contains(coord))
    }

    /// Read the current value of a property, shaped like `like`.
    pub fn prop(&self, like: &SheetProp) -> SheetProp {
        match like {
            SheetProp::Name(_) => SheetProp::Name(self.name.clone()),
            SheetProp::ActiveCell(_) => SheetProp::ActiveCell(self.active_cell),
            SheetProp::Selections(_) => SheetProp::Selections(self.selections.clone()),
            SheetProp::ColumnSize { index, .. } => SheetProp::ColumnSize {
                index: *index,
                size: self.column_sizes.get(index).copied(),
            },
            SheetProp::RowSize { index, .. } => SheetProp::RowSize {
                index: *index,
                size: self.row_sizes.get(index).copied(),
            },
            SheetProp::MergedCells(_) => SheetProp::MergedCells(self.merged_cells.clone()),
            SheetProp::FrozenRows(_) => SheetProp::FrozenRows(self.frozen_rows),
            SheetProp::FrozenColumns(_) => SheetProp::FrozenColumns(self.frozen_columns),
            SheetProp::HiddenRows(_) => SheetProp::HiddenRows(self.hidden_rows.clone()),
            SheetProp::HiddenColumns(_) => SheetProp::HiddenColumns(self.hidden_columns.clone()),
            SheetProp::FilterViews(_) => SheetProp::FilterViews(self.filter_views.clone()),
            SheetProp::ScrollState(_) => SheetProp::ScrollState(self.scroll_state),
            SheetProp::RowCount(_) => SheetProp::RowCount(self.row_count),
            SheetProp::ColumnCount(_) => SheetProp::ColumnCount(self.column_count),
            SheetProp::Locked(_) => SheetProp::Locked(self.locked),
            SheetProp::Hidden(_) => SheetProp::Hidden(self.hidden),
            SheetProp::TabColor(_) => SheetProp::TabColor(self.tab_color.clone()),
        }
    }

    /// Write a property, returning its previous value.
    pub fn replace_prop(&mut self, prop: SheetProp) -> SheetProp {
        match prop {
            SheetProp::Name(v) => SheetProp::Name(mem::replace(&mut self.name, v)),
            SheetProp::ActiveCell(v) => SheetProp::ActiveCell(mem::replace(&mut self.active_cell, v)),
            SheetProp::Selections(v) => SheetProp::Selections(mem::replace(&mut self.selections, v)),
            SheetProp::ColumnSize { index, size } => SheetProp::ColumnSize {
                index,
                size: replace_size(&mut self.column_sizes, index, size),
            },
            SheetProp::RowSize { index, size } => SheetProp::RowSize {
                index,
                size: replace_size(&mut self.row_sizes, index, size),
            },
            SheetProp::MergedCells(v) => SheetProp::MergedCells(mem::replace(&mut self.merged_cells, v)),
            SheetProp::FrozenRows(v) => SheetProp::FrozenRows(mem::replace(&mut self.frozen_rows, v)),
            SheetProp::FrozenColumns(v) => SheetProp::FrozenColumns(mem::replace(&mut self.frozen_columns, v)),
            SheetProp::HiddenRows(v) => SheetProp::HiddenRows(mem::replace(&mut self.hidden_rows, v)),
            SheetProp::HiddenColumns(v) => SheetProp::HiddenColumns(mem::replace(&mut self.hidden_columns, v)),
            SheetProp::FilterViews(v) => SheetProp::FilterViews(mem::replace(&mut self.filter_views, v)),
            SheetProp::ScrollState(v) => SheetProp::ScrollState(mem::replace(&mut self.scroll_state, v)),
            SheetProp::RowCount(v) => SheetProp::RowCount(mem::replace(&mut self.row_count, v)),
            SheetProp::ColumnCount(v) => SheetProp::ColumnCount(mem::replace(&mut self.column_count, v)),
            SheetProp::Locked(v) => SheetProp::Locked(mem::replace(&mut self.locked, v)),
            SheetProp::Hidden(v) => SheetProp::Hidden(mem::replace(&mut self.hidden, v)),
            SheetProp::TabColor(v) => SheetProp::TabColor(mem::replace(&mut self.tab_color, v)),
        }
    }
}

fn replace_size(sizes: &mut FxHashMap<usize, f64>, index: usize, size: Option<f64>) -> Option<f64> {
    match size {
        Some(size) => sizes.insert(index, size),
        None => sizes.remove(&index),
    }
}

/// One addressable sheet property and its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "prop", content = "value", rename_all = "camelCase")]
pub enum SheetProp {
    Name(String),
    ActiveCell(Option<CellCoord>),
    Selections(Vec<SelectionArea>),
    ColumnSize { index: usize, size: Option<f64> },
    RowSize { index: usize, size: Option<f64> },
    MergedCells(Vec<Area>),
    FrozenRows(usize),
    FrozenColumns(usize),
    HiddenRows(BTreeSet<usize>),
    HiddenColumns(BTreeSet<usize>),
    FilterViews(Vec<FilterView>),
    ScrollState(ScrollState),
    RowCount(usize),
    ColumnCount(usize),
    Locked(bool),
    Hidden(bool),
    TabColor(Option<String>),
}

/// Identifies a property slot regardless of its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetPropKey {
    Name,
    ActiveCell,
    Selections,
    ColumnSize(usize),
    RowSize(usize),
    MergedCells,
    FrozenRows,
    FrozenColumns,
    HiddenRows,
    HiddenColumns,
    FilterViews,
    ScrollState,
    RowCount,
    ColumnCount,
    Locked,
    Hidden,
    TabColor,
}

impl SheetProp {
    pub fn key(&self) -> SheetPropKey {
        match self {
            SheetProp::Name(_) => SheetPropKey::Name,
            SheetProp::ActiveCell(_) => SheetPropKey::ActiveCell,
            SheetProp::Selections(_) => SheetPropKey::Selections,
            SheetProp::ColumnSize { index, .. } => SheetPropKey::ColumnSize(*index),
            SheetProp::RowSize { index, .. } => SheetPropKey::RowSize(*index),
            SheetProp::MergedCells(_) => SheetPropKey::MergedCells,
            SheetProp::FrozenRows(_) => SheetPropKey::FrozenRows,
            SheetProp::FrozenColumns(_) => SheetPropKey::FrozenColumns,
            SheetProp::HiddenRows(_) => SheetPropKey::HiddenRows,
            SheetProp::HiddenColumns(_) => SheetPropKey::HiddenColumns,
            SheetProp::FilterViews(_) => SheetPropKey::FilterViews,
            SheetProp::ScrollState(_) => SheetPropKey::ScrollState,
            SheetProp::RowCount(_) => SheetPropKey::RowCount,
            SheetProp::ColumnCount(_) => SheetPropKey::ColumnCount,
            SheetProp::Locked(_) => SheetPropKey::Locked,
            SheetProp::Hidden(_) => SheetPropKey::Hidden,
            SheetProp::TabColor(_) => SheetPropKey::TabColor,
        }
    }
}

/// Normalize a sheet name for case-insensitive comparison
pub fn normalize_sheet_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A sheet name is valid if it is non-empty after trimming
pub fn is_valid_sheet_name(name: &str) -> bool {
    !name.trim().is_empty()
}

/// Quote a sheet name for use in formula text when it is not a bare identifier.
pub fn sanitize_sheet_name(name: &str) -> String {
    let bare = name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.')
        && name.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_');
    if bare {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}
