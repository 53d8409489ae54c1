pub mod action;
pub mod bounds;
pub mod cell;
pub mod document;
pub mod engine;
pub mod error;
pub mod format;
pub mod formula;
pub mod history;
pub mod patch;
pub mod protection;
pub mod recalc;
pub mod reducer;
pub mod sheet;
pub mod transaction;
pub mod validation;

pub use action::{Action, DispatchOptions, PasteCell};
pub use bounds::{CellBounds, SingleCellBounds};
pub use cell::{CellConfig, CellValue, DataType};
pub use document::Document;
pub use engine::{DispatchOutcome, Engine};
pub use error::{RecalcError, TranslateError};
pub use history::{History, UndoSink};
pub use patch::{Patch, PatchSet};
pub use recalc::{CellUpdate, CellsBySheet};
pub use reducer::{apply_action, reduce, Transition};
pub use sheet::{Sheet, SheetId};
