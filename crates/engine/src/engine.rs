//! Dispatch front end: reducer + undo sink + settings.

use tabgrid_config::EngineSettings;

use crate::action::{Action, DispatchOptions};
use crate::bounds::{CellBounds, SingleCellBounds};
use crate::document::Document;
use crate::history::{History, UndoSink};
use crate::patch::{scrub_stale_formulas, PatchSet};
use crate::recalc::{pending_from_changes, CellsBySheet};
use crate::reducer::record_action;
use crate::sheet::Sheet;

/// Result of one dispatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOutcome {
    pub patches: PatchSet,
    /// Cells whose content changed and need evaluation
    pub recalc: CellsBySheet,
}

/// Owns the document and routes every dispatch's diff to an undo sink.
pub struct Engine<S: UndoSink = History> {
    document: Document,
    bounds: Box<dyn CellBounds>,
    sink: S,
    settings: EngineSettings,
}

impl Engine<History> {
    pub fn new(document: Document) -> Self {
        Self::with_settings(document, EngineSettings::default())
    }

    pub fn with_settings(document: Document, settings: EngineSettings) -> Self {
        let history = History::with_max_entries(settings.history_max_entries);
        Self::with_sink(document, history, settings)
    }

    pub fn history(&self) -> &History {
        &self.sink
    }

    pub fn can_undo(&self) -> bool {
        self.sink.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.sink.can_redo()
    }

    /// Revert the last undo step. `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<DispatchOutcome> {
        let patches = self.sink.undo()?;
        Some(self.dispatch_with(Action::ApplyPatches { patches }, DispatchOptions::silent()))
    }

    pub fn redo(&mut self) -> Option<DispatchOutcome> {
        let patches = self.sink.redo()?;
        Some(self.dispatch_with(Action::ApplyPatches { patches }, DispatchOptions::silent()))
    }
}

impl<S: UndoSink> Engine<S> {
    pub fn with_sink(document: Document, sink: S, settings: EngineSettings) -> Self {
        Self {
            document,
            bounds: Box::new(SingleCellBounds),
            sink,
            settings,
        }
    }

    /// Replace the merged-cell bounds provider.
    pub fn with_bounds(mut self, bounds: impl CellBounds + 'static) -> Self {
        self.bounds = Box::new(bounds);
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// A `NewSheet` action for a fresh sheet named after the settings prefix.
    pub fn new_sheet_action(&self, index: Option<usize>) -> Action {
        let sheet: Sheet = self.document.create_sheet(&self.settings);
        Action::NewSheet { sheet: Box::new(sheet), index }
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchOutcome {
        self.dispatch_with(action, DispatchOptions::default())
    }

    pub fn dispatch_with(&mut self, action: Action, options: DispatchOptions) -> DispatchOutcome {
        let changes = record_action(&mut self.document, &action, self.bounds.as_ref());
        let patches = PatchSet::from_changes(&changes);
        let recalc = pending_from_changes(&self.document, &changes);

        if !patches.is_empty() {
            if options.replace {
                let inverse = match action {
                    Action::UpdateCells { .. } if self.settings.scrub_stale_formulas => {
                        scrub_stale_formulas(patches.inverse_patches.clone())
                    }
                    _ => patches.inverse_patches.clone(),
                };
                self.sink.replace_undo_patch(patches.patches.clone(), Some(inverse));
            } else if options.undoable {
                self.sink.add_undo_patch(patches.clone());
            }
        }

        DispatchOutcome { patches, recalc }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{CellConfig, CellValue, DataType};
    use crate::patch::Patch;
    use crate::recalc::CellUpdate;
    use tabgrid_core::CellCoord;

    #[derive(Default)]
    struct RecordingSink {
        added: Vec<PatchSet>,
        replaced: Vec<(Vec<Patch>, Option<Vec<Patch>>)>,
    }

    impl UndoSink for RecordingSink {
        fn add_undo_patch(&mut self, patches: PatchSet) {
            self.added.push(patches);
        }

        fn replace_undo_patch(&mut self, patches: Vec<Patch>, inverse_patches: Option<Vec<Patch>>) {
            self.replaced.push((patches, inverse_patches));
        }
    }

    fn edit(doc: &Document, value: &str) -> Action {
        Action::ChangeSheetCell {
            id: doc.sheets[0].id.clone(),
            cell: CellCoord::new(1, 1),
            value: value.to_string(),
            datatype: None,
        }
    }

    #[test]
    fn test_routing_to_sink() {
        let doc = Document::default();
        let mut engine = Engine::with_sink(doc.clone(), RecordingSink::default(), EngineSettings::default());

        engine.dispatch(edit(&doc, "1"));
        engine.dispatch_with(edit(&doc, "2"), DispatchOptions::silent());
        engine.dispatch_with(edit(&doc, "3"), DispatchOptions::replace());
        // No-op dispatch records nothing
        engine.dispatch(edit(&doc, "3"));

        assert_eq!(engine.sink().added.len(), 1);
        assert_eq!(engine.sink().replaced.len(), 1);
    }

    #[test]
    fn test_dispatch_reports_recalc_cells() {
        let doc = Document::default();
        let mut engine = Engine::new(doc.clone());
        let outcome = engine.dispatch(edit(&doc, "=1+1"));

        let update = &outcome.recalc["Sheet1"][&1][&1];
        assert_eq!(update.text.as_deref(), Some("=1+1"));
        assert_eq!(update.datatype, Some(DataType::Formula));
    }

    #[test]
    fn test_replace_update_scrubs_unevaluated_formula() {
        let doc = Document::default();
        let mut engine = Engine::new(doc.clone());
        engine.dispatch(edit(&doc, "=1+1"));

        let mut changes = CellsBySheet::new();
        changes.entry("Sheet1".to_string()).or_default().entry(1).or_default().insert(
            1,
            CellUpdate {
                result: Some(CellValue::number(2.0)),
                timestamp: Some(1),
                ..CellUpdate::default()
            },
        );
        engine.dispatch_with(Action::UpdateCells { changes }, DispatchOptions::replace());

        let last = engine.history().last().unwrap();
        assert_eq!(engine.history().undo_len(), 1);
        let id = doc.sheets[0].id.clone();
        assert_eq!(last.inverse_patches[0], Patch::cell(&id, CellCoord::new(1, 1), None));

        engine.undo();
        assert_eq!(engine.document().sheets[0].cell(CellCoord::new(1, 1)), None);
        engine.redo();
        let cell: &CellConfig = engine.document().sheets[0].cell(CellCoord::new(1, 1)).unwrap();
        assert_eq!(cell.result, Some(CellValue::number(2.0)));
    }
}
