//! Everything a host can ask the document to do.

use serde::{Deserialize, Serialize};
use tabgrid_core::{Axis, BorderVariant, CellCoord, SelectionArea};

use crate::cell::{BorderStyle, CellConfig, DataType, FormatChange};
use crate::patch::Patch;
use crate::recalc::CellsBySheet;
use crate::sheet::{FilterDefinition, ScrollState, Sheet, SheetId};

/// One incoming clipboard cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PasteCell {
    /// Raw text, classified like typed input
    Text(String),
    /// A copied cell, with the coordinate it was copied from
    #[serde(rename_all = "camelCase")]
    Config {
        config: Box<CellConfig>,
        #[serde(default)]
        source_cell: Option<CellCoord>,
    },
    /// A hole in the payload; the destination is left alone
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum Action {
    SelectSheet {
        id: SheetId,
    },
    SelectNextSheet,
    SelectPrevSheet,
    ChangeSheetName {
        id: SheetId,
        name: String,
    },
    /// Insert after `index`, or append when `None`.
    NewSheet {
        sheet: Box<Sheet>,
        index: Option<usize>,
    },
    ChangeSheetCell {
        id: SheetId,
        cell: CellCoord,
        value: String,
        /// Detected from `value` when not given
        datatype: Option<DataType>,
    },
    SetCellError {
        id: SheetId,
        cell: CellCoord,
        value: Option<String>,
        datatype: Option<DataType>,
        error: String,
        error_message: Option<String>,
    },
    UpdateFill {
        id: SheetId,
        active_cell: Option<CellCoord>,
        fill_selection: SelectionArea,
        selections: Vec<SelectionArea>,
    },
    DeleteSheet {
        id: SheetId,
    },
    SheetSelectionChange {
        id: SheetId,
        active_cell: Option<CellCoord>,
        selections: Vec<SelectionArea>,
    },
    /// Leave plain-text mode on the selection.
    FormattingChangeAuto {
        id: SheetId,
    },
    /// Show the selection's content as entered.
    FormattingChangePlain {
        id: SheetId,
    },
    FormattingChange {
        id: SheetId,
        change: FormatChange,
    },
    /// Clear content, keep formatting.
    DeleteCells {
        id: SheetId,
        active_cell: Option<CellCoord>,
        selections: Vec<SelectionArea>,
    },
    /// Remove cells entirely.
    RemoveCells {
        id: SheetId,
        active_cell: Option<CellCoord>,
        selections: Vec<SelectionArea>,
    },
    ClearFormatting {
        id: SheetId,
    },
    Resize {
        id: SheetId,
        axis: Axis,
        index: usize,
        dimension: f64,
    },
    /// Merge the last selection, or unmerge it if it is already merged.
    MergeCells {
        id: SheetId,
    },
    Copy {
        id: SheetId,
    },
    FrozenRowChange {
        id: SheetId,
        count: usize,
    },
    FrozenColumnChange {
        id: SheetId,
        count: usize,
    },
    SetBorder {
        id: SheetId,
        color: Option<String>,
        style: BorderStyle,
        variant: BorderVariant,
    },
    UpdateScroll {
        id: SheetId,
        scroll_state: ScrollState,
    },
    /// Set a column filter, or clear it when `filter` is `None`.
    ChangeFilter {
        id: SheetId,
        filter_view_index: usize,
        column: usize,
        filter: Option<FilterDefinition>,
    },
    DeleteRow {
        id: SheetId,
        active_cell: CellCoord,
    },
    DeleteColumn {
        id: SheetId,
        active_cell: CellCoord,
    },
    InsertRow {
        id: SheetId,
        active_cell: CellCoord,
    },
    InsertColumn {
        id: SheetId,
        active_cell: CellCoord,
    },
    Paste {
        id: SheetId,
        active_cell: Option<CellCoord>,
        rows: Vec<Vec<PasteCell>>,
        selections: Option<Vec<SelectionArea>>,
        cut_selection: Option<SelectionArea>,
        /// Sheet the cut came from; defaults to the paste target
        cut_sheet: Option<SheetId>,
    },
    ValidationSuccess {
        id: SheetId,
        cell: CellCoord,
        valid: Option<bool>,
        prompt: Option<String>,
    },
    ShowSheet {
        id: SheetId,
    },
    HideSheet {
        id: SheetId,
    },
    ProtectSheet {
        id: SheetId,
    },
    UnprotectSheet {
        id: SheetId,
    },
    /// Evaluator results, keyed by sheet name.
    UpdateCells {
        changes: CellsBySheet,
    },
    ChangeTabColor {
        id: SheetId,
        color: Option<String>,
    },
    SetLoading {
        id: SheetId,
        cell: CellCoord,
        loading: bool,
    },
    SetLineHidden {
        id: SheetId,
        axis: Axis,
        index: usize,
        hidden: bool,
    },
    /// Replay recorded patches (undo/redo).
    ApplyPatches {
        patches: Vec<Patch>,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SelectSheet { .. } => "SELECT_SHEET",
            Action::SelectNextSheet => "SELECT_NEXT_SHEET",
            Action::SelectPrevSheet => "SELECT_PREV_SHEET",
            Action::ChangeSheetName { .. } => "CHANGE_SHEET_NAME",
            Action::NewSheet { .. } => "NEW_SHEET",
            Action::ChangeSheetCell { .. } => "CHANGE_SHEET_CELL",
            Action::SetCellError { .. } => "SET_CELL_ERROR",
            Action::UpdateFill { .. } => "UPDATE_FILL",
            Action::DeleteSheet { .. } => "DELETE_SHEET",
            Action::SheetSelectionChange { .. } => "SHEET_SELECTION_CHANGE",
            Action::FormattingChangeAuto { .. } => "FORMATTING_CHANGE_AUTO",
            Action::FormattingChangePlain { .. } => "FORMATTING_CHANGE_PLAIN",
            Action::FormattingChange { .. } => "FORMATTING_CHANGE",
            Action::DeleteCells { .. } => "DELETE_CELLS",
            Action::RemoveCells { .. } => "REMOVE_CELLS",
            Action::ClearFormatting { .. } => "CLEAR_FORMATTING",
            Action::Resize { .. } => "RESIZE",
            Action::MergeCells { .. } => "MERGE_CELLS",
            Action::Copy { .. } => "COPY",
            Action::FrozenRowChange { .. } => "FROZEN_ROW_CHANGE",
            Action::FrozenColumnChange { .. } => "FROZEN_COLUMN_CHANGE",
            Action::SetBorder { .. } => "SET_BORDER",
            Action::UpdateScroll { .. } => "UPDATE_SCROLL",
            Action::ChangeFilter { .. } => "CHANGE_FILTER",
            Action::DeleteRow { .. } => "DELETE_ROW",
            Action::DeleteColumn { .. } => "DELETE_COLUMN",
            Action::InsertRow { .. } => "INSERT_ROW",
            Action::InsertColumn { .. } => "INSERT_COLUMN",
            Action::Paste { .. } => "PASTE",
            Action::ValidationSuccess { .. } => "VALIDATION_SUCCESS",
            Action::ShowSheet { .. } => "SHOW_SHEET",
            Action::HideSheet { .. } => "HIDE_SHEET",
            Action::ProtectSheet { .. } => "PROTECT_SHEET",
            Action::UnprotectSheet { .. } => "UNPROTECT_SHEET",
            Action::UpdateCells { .. } => "UPDATE_CELLS",
            Action::ChangeTabColor { .. } => "CHANGE_TAB_COLOR",
            Action::SetLoading { .. } => "SET_LOADING",
            Action::SetLineHidden { .. } => "SET_LINE_HIDDEN",
            Action::ApplyPatches { .. } => "APPLY_PATCHES",
        }
    }
}

/// Per-dispatch history routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Record the diff as a new undo step
    pub undoable: bool,
    /// Fold the diff into the previous undo step
    pub replace: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self { undoable: true, replace: false }
    }
}

impl DispatchOptions {
    /// Apply without touching history.
    pub fn silent() -> Self {
        Self { undoable: false, replace: false }
    }

    /// Fold into the previous undo step.
    pub fn replace() -> Self {
        Self { undoable: false, replace: true }
    }
}
