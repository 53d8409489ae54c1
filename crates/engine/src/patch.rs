//! Explicit diff type for document transitions.
//!
//! Every write made while reducing an action is recorded as a [`Change`]:
//! the value written (`forward`) and the value it replaced (`inverse`).
//! A [`PatchSet`] lists forward patches in write order and inverse patches
//! in reverse order, so applying one after the other restores the input.

use serde::{Deserialize, Serialize};
use tabgrid_core::{CellCoord, SelectionArea};

use crate::cell::CellConfig;
use crate::sheet::{Sheet, SheetId, SheetProp, SheetPropKey};

/// A value written to one location of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Patch {
    SelectedSheet { id: Option<SheetId> },
    CurrentActiveCell { cell: Option<CellCoord> },
    CurrentSelections { selections: Option<Vec<SelectionArea>> },
    InsertSheet { index: usize, sheet: Box<Sheet> },
    RemoveSheet { index: usize },
    Sheet { id: SheetId, prop: SheetProp },
    Cell { sheet: SheetId, coord: CellCoord, value: Option<Box<CellConfig>> },
}

/// The location a patch writes to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatchPath {
    SelectedSheet,
    CurrentActiveCell,
    CurrentSelections,
    SheetSlot(usize),
    Sheet(SheetId, SheetPropKey),
    Cell(SheetId, CellCoord),
}

impl Patch {
    pub fn path(&self) -> PatchPath {
        match self {
            Patch::SelectedSheet { .. } => PatchPath::SelectedSheet,
            Patch::CurrentActiveCell { .. } => PatchPath::CurrentActiveCell,
            Patch::CurrentSelections { .. } => PatchPath::CurrentSelections,
            Patch::InsertSheet { index, .. } | Patch::RemoveSheet { index } => PatchPath::SheetSlot(*index),
            Patch::Sheet { id, prop } => PatchPath::Sheet(id.clone(), prop.key()),
            Patch::Cell { sheet, coord, .. } => PatchPath::Cell(sheet.clone(), *coord),
        }
    }

    pub fn cell(sheet: &SheetId, coord: CellCoord, value: Option<CellConfig>) -> Patch {
        Patch::Cell {
            sheet: sheet.clone(),
            coord,
            value: value.map(Box::new),
        }
    }
}

/// One recorded write.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub forward: Patch,
    pub inverse: Patch,
}

impl Change {
    pub fn is_noop(&self) -> bool {
        self.forward == self.inverse
    }
}

/// Forward and inverse patches for one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchSet {
    pub patches: Vec<Patch>,
    pub inverse_patches: Vec<Patch>,
}

impl PatchSet {
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty() && self.inverse_patches.is_empty()
    }

    pub fn from_changes(changes: &[Change]) -> Self {
        Self {
            patches: changes.iter().map(|c| c.forward.clone()).collect(),
            inverse_patches: changes.iter().rev().map(|c| c.inverse.clone()).collect(),
        }
    }
}

/// Blank out formula snapshots the evaluator never executed.
///
/// A formula cell without a `timestamp` has not been computed yet; restoring
/// it on undo would resurrect a stale value, so its patch writes absence.
pub fn scrub_stale_formulas(patches: Vec<Patch>) -> Vec<Patch> {
    patches
        .into_iter()
        .map(|patch| match patch {
            Patch::Cell { sheet, coord, value: Some(cell) } if cell.is_formula() && cell.timestamp.is_none() => {
                Patch::Cell { sheet, coord, value: None }
            }
            other => other,
        })
        .collect()
}
