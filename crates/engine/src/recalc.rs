//! Recalculation boundary.
//!
//! The engine never evaluates formulas. After each dispatch it reports the
//! cells whose content changed, and the host's evaluator later sends results
//! back in the same shape through [`Action::UpdateCells`](crate::action::Action).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tabgrid_core::CellCoord;

use crate::cell::{CellConfig, CellStyle, CellValue, DataType};
use crate::document::Document;
use crate::error::RecalcError;
use crate::patch::{Change, Patch};

/// `sheet name -> row -> column -> update`
pub type CellsBySheet = BTreeMap<String, BTreeMap<usize, BTreeMap<usize, CellUpdate>>>;

/// Fields an evaluator may clear on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdateField {
    Result,
    ResultType,
    Error,
    ErrorMessage,
    FormulaRange,
    ParentCell,
    Timestamp,
}

/// A partial cell. Set fields overwrite, `clear` removes, style only fills gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datatype: Option<DataType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CellValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_type: Option<DataType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula_range: Option<[usize; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_cell: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clear: Vec<UpdateField>,
    #[serde(flatten)]
    pub style: CellStyle,
}

impl CellUpdate {
    /// Content of `cell` as the evaluator needs it.
    pub fn from_content(cell: &CellConfig) -> Self {
        Self {
            text: cell.text.clone(),
            datatype: cell.datatype,
            ..Self::default()
        }
    }

    /// Merge into `cell`. Style already set on the cell is never overwritten.
    pub fn apply_to(&self, cell: &mut CellConfig) {
        fn set<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                slot.clone_from(value);
            }
        }

        for field in &self.clear {
            match field {
                UpdateField::Result => cell.result = None,
                UpdateField::ResultType => cell.result_type = None,
                UpdateField::Error => cell.error = None,
                UpdateField::ErrorMessage => cell.error_message = None,
                UpdateField::FormulaRange => cell.formula_range = None,
                UpdateField::ParentCell => cell.parent_cell = None,
                UpdateField::Timestamp => cell.timestamp = None,
            }
        }
        set(&mut cell.text, &self.text);
        set(&mut cell.datatype, &self.datatype);
        set(&mut cell.result, &self.result);
        set(&mut cell.result_type, &self.result_type);
        set(&mut cell.error, &self.error);
        set(&mut cell.error_message, &self.error_message);
        set(&mut cell.timestamp, &self.timestamp);
        set(&mut cell.formula_range, &self.formula_range);
        set(&mut cell.parent_cell, &self.parent_cell);
        cell.style.fill_missing(&self.style);
    }
}

/// Cells whose text or datatype changed in this dispatch, keyed by sheet name.
pub fn pending_from_changes(doc: &Document, changes: &[Change]) -> CellsBySheet {
    let mut pending = CellsBySheet::new();
    for change in changes {
        let (Patch::Cell { sheet, coord, value: new }, Patch::Cell { value: old, .. }) =
            (&change.forward, &change.inverse)
        else {
            continue;
        };
        let content = |cell: &Option<Box<CellConfig>>| {
            cell.as_deref().map(|c| (c.text.clone(), c.datatype)).unwrap_or_default()
        };
        if content(new) == content(old) {
            continue;
        }
        let Some(sheet) = doc.sheet(sheet) else {
            continue;
        };
        let update = new.as_deref().map(CellUpdate::from_content).unwrap_or_default();
        insert(&mut pending, &sheet.name, *coord, update);
    }
    pending
}

fn insert(pending: &mut CellsBySheet, sheet: &str, coord: CellCoord, update: CellUpdate) {
    pending
        .entry(sheet.to_string())
        .or_default()
        .entry(coord.row)
        .or_default()
        .insert(coord.col, update);
}

pub fn cells_by_sheet_to_json(changes: &CellsBySheet) -> Result<String, RecalcError> {
    serde_json::to_string(changes).map_err(|e| RecalcError::Encode(e.to_string()))
}

pub fn cells_by_sheet_from_json(json: &str) -> Result<CellsBySheet, RecalcError> {
    serde_json::from_str(json).map_err(|e| RecalcError::Decode(e.to_string()))
}
