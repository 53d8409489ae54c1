use tabgrid_core::{Area, Axis, BorderVariant, CellCoord, SelectionArea};
use tabgrid_engine::action::{Action, DispatchOptions, PasteCell};
use tabgrid_engine::bounds::SingleCellBounds;
use tabgrid_engine::cell::{BorderStyle, CellConfig, CellValue, FormatChange};
use tabgrid_engine::recalc::{CellUpdate, CellsBySheet};
use tabgrid_engine::sheet::{FilterDefinition, FilterOperator, Sheet, SheetId};
use tabgrid_engine::{apply_action, reduce, Document, Engine};
use tabgrid_config::EngineSettings;

fn sid() -> SheetId {
    SheetId::new("s1")
}

fn doc() -> Document {
    Document::with_sheets(vec![Sheet::new(sid(), "Sheet1")])
}

fn cell(row: usize, col: usize) -> CellCoord {
    CellCoord::new(row, col)
}

fn edit(row: usize, col: usize, value: &str) -> Action {
    Action::ChangeSheetCell {
        id: sid(),
        cell: cell(row, col),
        value: value.to_string(),
        datatype: None,
    }
}

fn run(doc: &mut Document, action: Action) {
    apply_action(doc, &action, &SingleCellBounds);
}

fn text(doc: &Document, row: usize, col: usize) -> Option<String> {
    doc.sheets[0].cell(cell(row, col)).and_then(|c| c.text.clone())
}

fn selection(top: usize, left: usize, bottom: usize, right: usize) -> SelectionArea {
    SelectionArea::new(Area::new(top, left, bottom, right))
}

// ============================================================================
// Fill
// ============================================================================

#[test]
fn fill_repeats_plain_text() {
    let mut doc = doc();
    run(&mut doc, edit(1, 1, "Hello"));
    run(
        &mut doc,
        Action::UpdateFill {
            id: sid(),
            active_cell: Some(cell(1, 1)),
            fill_selection: selection(1, 1, 3, 1),
            selections: vec![selection(1, 1, 1, 1)],
        },
    );

    assert_eq!(text(&doc, 2, 1).as_deref(), Some("Hello"));
    assert_eq!(text(&doc, 3, 1).as_deref(), Some("Hello"));
    assert_eq!(doc.current_selections, Some(vec![selection(1, 1, 3, 1)]));
}

#[test]
fn fill_translates_formula_per_row() {
    let mut doc = doc();
    run(&mut doc, edit(5, 1, "=SUM(A1,A2)"));
    run(
        &mut doc,
        Action::UpdateFill {
            id: sid(),
            active_cell: Some(cell(5, 1)),
            fill_selection: selection(5, 1, 8, 1),
            selections: vec![selection(5, 1, 5, 1)],
        },
    );

    assert_eq!(text(&doc, 6, 1).as_deref(), Some("=SUM(A2,A3)"));
    assert_eq!(text(&doc, 7, 1).as_deref(), Some("=SUM(A3,A4)"));
    assert_eq!(text(&doc, 8, 1).as_deref(), Some("=SUM(A4,A5)"));
}

#[test]
fn fill_skips_locked_destination() {
    let mut doc = doc();
    run(&mut doc, edit(1, 1, "x"));
    run(&mut doc, edit(2, 1, "keep"));
    doc.sheets[0].cells.get_mut(&2).unwrap().get_mut(&1).unwrap().locked = true;

    run(
        &mut doc,
        Action::UpdateFill {
            id: sid(),
            active_cell: Some(cell(1, 1)),
            fill_selection: selection(1, 1, 3, 1),
            selections: vec![selection(1, 1, 1, 1)],
        },
    );

    assert_eq!(text(&doc, 2, 1).as_deref(), Some("keep"));
    assert_eq!(text(&doc, 3, 1).as_deref(), Some("x"));
}

// ============================================================================
// Structural edits
// ============================================================================

#[test]
fn insert_row_at_top_moves_content_down() {
    let mut doc = doc();
    run(&mut doc, edit(1, 1, "hello"));
    run(&mut doc, Action::InsertRow { id: sid(), active_cell: cell(1, 1) });

    assert_eq!(text(&doc, 1, 1), None);
    assert_eq!(text(&doc, 2, 1).as_deref(), Some("hello"));
}

#[test]
fn insert_column_rewrites_references() {
    let mut doc = doc();
    run(&mut doc, edit(1, 1, "1"));
    run(&mut doc, edit(1, 3, "=A1+$B$1"));
    run(&mut doc, Action::InsertColumn { id: sid(), active_cell: cell(1, 2) });

    assert_eq!(text(&doc, 1, 4).as_deref(), Some("=A1+$C$1"));
    assert_eq!(text(&doc, 1, 1).as_deref(), Some("1"));
}

#[test]
fn delete_first_row_marks_ref_error() {
    let mut doc = doc();
    run(&mut doc, edit(3, 1, "=A1+A4"));
    run(&mut doc, Action::DeleteRow { id: sid(), active_cell: cell(1, 1) });

    let moved = doc.sheets[0].cell(cell(2, 1)).unwrap();
    assert_eq!(moved.text(), "=#REF!+A3");
    assert_eq!(moved.error.as_deref(), Some("#REF!"));
}

#[test]
fn structural_edit_moves_merges() {
    let mut doc = doc();
    run(
        &mut doc,
        Action::SheetSelectionChange {
            id: sid(),
            active_cell: Some(cell(2, 1)),
            selections: vec![selection(2, 1, 3, 2)],
        },
    );
    run(&mut doc, Action::MergeCells { id: sid() });
    assert_eq!(doc.sheets[0].merged_cells, vec![Area::new(2, 1, 3, 2)]);

    run(&mut doc, Action::InsertRow { id: sid(), active_cell: cell(1, 1) });
    assert_eq!(doc.sheets[0].merged_cells, vec![Area::new(3, 1, 4, 2)]);
}

// ============================================================================
// Paste / cut
// ============================================================================

#[test]
fn paste_out_of_range_formula_marks_ref_error() {
    let mut doc = doc();
    run(
        &mut doc,
        Action::Paste {
            id: sid(),
            active_cell: Some(cell(2, 1)),
            rows: vec![vec![PasteCell::Config {
                config: Box::new(CellConfig::with_text("=SUM(A1,2)")),
                source_cell: Some(cell(1, 2)),
            }]],
            selections: None,
            cut_selection: None,
            cut_sheet: None,
        },
    );

    let pasted = doc.sheets[0].cell(cell(2, 1)).unwrap();
    assert_eq!(pasted.text(), "=SUM(#REF!,2)");
    assert_eq!(pasted.error.as_deref(), Some("#REF!"));
}

#[test]
fn paste_tiles_over_larger_selection() {
    let mut doc = doc();
    run(
        &mut doc,
        Action::SheetSelectionChange {
            id: sid(),
            active_cell: Some(cell(1, 1)),
            selections: vec![selection(1, 1, 4, 1)],
        },
    );
    run(
        &mut doc,
        Action::Paste {
            id: sid(),
            active_cell: Some(cell(1, 1)),
            rows: vec![vec![PasteCell::Text("a".into())], vec![PasteCell::Text("b".into())]],
            selections: None,
            cut_selection: None,
            cut_sheet: None,
        },
    );

    let column: Vec<_> = (1..=4).map(|row| text(&doc, row, 1)).collect();
    assert_eq!(
        column,
        vec![Some("a".into()), Some("b".into()), Some("a".into()), Some("b".into())]
    );
}

#[test]
fn cut_keeps_locked_source_cells() {
    let mut doc = doc();
    run(&mut doc, edit(1, 1, "a"));
    run(&mut doc, edit(2, 1, "b"));
    doc.sheets[0].cells.get_mut(&1).unwrap().get_mut(&1).unwrap().locked = true;

    run(
        &mut doc,
        Action::Paste {
            id: sid(),
            active_cell: Some(cell(1, 3)),
            rows: vec![vec![PasteCell::Text("a".into())], vec![PasteCell::Text("b".into())]],
            selections: None,
            cut_selection: Some(selection(1, 1, 2, 1)),
            cut_sheet: None,
        },
    );

    assert_eq!(text(&doc, 1, 3).as_deref(), Some("a"));
    assert_eq!(text(&doc, 2, 3).as_deref(), Some("b"));
    assert_eq!(text(&doc, 1, 1).as_deref(), Some("a"));
    assert_eq!(text(&doc, 2, 1), None);
    assert_eq!(doc.sheets[0].selections, vec![selection(1, 3, 2, 3)]);
}

#[test]
fn cut_never_clears_the_paste_destination() {
    let mut doc = doc();
    run(&mut doc, edit(1, 1, "a"));
    run(&mut doc, edit(2, 1, "b"));
    run(
        &mut doc,
        Action::Paste {
            id: sid(),
            active_cell: Some(cell(2, 1)),
            rows: vec![vec![PasteCell::Text("a".into())], vec![PasteCell::Text("b".into())]],
            selections: None,
            cut_selection: Some(selection(1, 1, 2, 1)),
            cut_sheet: None,
        },
    );

    assert_eq!(text(&doc, 1, 1), None);
    assert_eq!(text(&doc, 2, 1).as_deref(), Some("a"));
    assert_eq!(text(&doc, 3, 1).as_deref(), Some("b"));
}

// ============================================================================
// Spill blocks
// ============================================================================

/// A1 spills down to A3; A2:A3 are bold dependents.
fn spilled_doc() -> Document {
    let mut doc = doc();
    let sheet = &mut doc.sheets[0];
    sheet.set_cell(
        cell(1, 1),
        Some(CellConfig { formula_range: Some([1, 3]), ..CellConfig::with_text("=SEQUENCE(3)") }),
    );
    for row in 2..=3 {
        let mut dependent = CellConfig::with_text(row.to_string());
        dependent.parent_cell = Some("A1".into());
        dependent.style.bold = Some(true);
        sheet.set_cell(cell(row, 1), Some(dependent));
    }
    doc
}

fn assert_block_cleared(doc: &Document) {
    for row in 2..=3 {
        let dependent = doc.sheets[0].cell(cell(row, 1));
        assert_eq!(dependent.and_then(|c| c.text.clone()), None, "A{row} kept its value");
        assert_eq!(dependent.and_then(|c| c.parent_cell.clone()), None, "A{row} kept its parent");
    }
}

#[test]
fn editing_anchor_clears_spill_block() {
    let mut doc = spilled_doc();
    run(&mut doc, edit(1, 1, "=1"));

    assert_eq!(text(&doc, 1, 1).as_deref(), Some("=1"));
    assert_eq!(doc.sheets[0].cell(cell(1, 1)).unwrap().formula_range, None);
    assert_block_cleared(&doc);
}

#[test]
fn deleting_anchor_keeps_dependent_formatting() {
    let mut doc = spilled_doc();
    run(&mut doc, Action::DeleteCells { id: sid(), active_cell: Some(cell(1, 1)), selections: vec![] });

    assert_eq!(text(&doc, 1, 1), None);
    assert_block_cleared(&doc);
    for row in 2..=3 {
        assert_eq!(doc.sheets[0].cell(cell(row, 1)).unwrap().style.bold, Some(true));
    }
}

#[test]
fn removing_anchor_clears_spill_block() {
    let mut doc = spilled_doc();
    run(&mut doc, Action::RemoveCells { id: sid(), active_cell: Some(cell(1, 1)), selections: vec![] });

    assert_eq!(doc.sheets[0].cell(cell(1, 1)), None);
    assert_block_cleared(&doc);
}

#[test]
fn spill_block_survives_when_anchor_is_locked() {
    let mut doc = spilled_doc();
    doc.sheets[0].cells.get_mut(&1).unwrap().get_mut(&1).unwrap().locked = true;
    let before = doc.clone();
    run(&mut doc, Action::RemoveCells { id: sid(), active_cell: Some(cell(1, 1)), selections: vec![] });

    assert_eq!(doc, before);
}

#[test]
fn pasting_over_anchor_clears_spill_block() {
    let mut doc = spilled_doc();
    run(
        &mut doc,
        Action::Paste {
            id: sid(),
            active_cell: Some(cell(1, 1)),
            rows: vec![vec![PasteCell::Text("x".into())]],
            selections: None,
            cut_selection: None,
            cut_sheet: None,
        },
    );

    assert_eq!(text(&doc, 1, 1).as_deref(), Some("x"));
    assert_eq!(doc.sheets[0].cell(cell(1, 1)).unwrap().formula_range, None);
    assert_block_cleared(&doc);
}

#[test]
fn pasting_over_spill_block_keeps_pasted_values() {
    let mut doc = spilled_doc();
    run(
        &mut doc,
        Action::Paste {
            id: sid(),
            active_cell: Some(cell(1, 1)),
            rows: vec![vec![PasteCell::Text("x".into())], vec![PasteCell::Text("y".into())]],
            selections: None,
            cut_selection: None,
            cut_sheet: None,
        },
    );

    assert_eq!(text(&doc, 1, 1).as_deref(), Some("x"));
    assert_eq!(text(&doc, 2, 1).as_deref(), Some("y"));
    assert_eq!(text(&doc, 3, 1), None);
}

#[test]
fn cutting_anchor_clears_spill_block() {
    let mut doc = spilled_doc();
    run(
        &mut doc,
        Action::Paste {
            id: sid(),
            active_cell: Some(cell(1, 3)),
            rows: vec![vec![PasteCell::Config {
                config: Box::new(CellConfig::with_text("=SEQUENCE(3)")),
                source_cell: Some(cell(1, 1)),
            }]],
            selections: None,
            cut_selection: Some(selection(1, 1, 1, 1)),
            cut_sheet: None,
        },
    );

    assert_eq!(text(&doc, 1, 3).as_deref(), Some("=SEQUENCE(3)"));
    assert_eq!(doc.sheets[0].cell(cell(1, 1)), None);
    assert_block_cleared(&doc);
}

#[test]
fn filling_over_anchor_clears_spill_block() {
    let mut doc = spilled_doc();
    run(&mut doc, edit(1, 2, "z"));
    run(
        &mut doc,
        Action::UpdateFill {
            id: sid(),
            active_cell: Some(cell(1, 2)),
            fill_selection: selection(1, 1, 1, 2),
            selections: vec![selection(1, 2, 1, 2)],
        },
    );

    assert_eq!(text(&doc, 1, 1).as_deref(), Some("z"));
    assert_block_cleared(&doc);
}

#[test]
fn recalc_result_on_anchor_clears_previous_block() {
    let doc = spilled_doc();
    let mut changes = CellsBySheet::new();
    changes.entry("Sheet1".to_string()).or_default().entry(1).or_default().insert(
        1,
        CellUpdate {
            result: Some(CellValue::number(1.0)),
            timestamp: Some(1),
            ..CellUpdate::default()
        },
    );
    let transition = reduce(&doc, &Action::UpdateCells { changes }, &SingleCellBounds);

    assert_eq!(transition.document.sheets[0].cell(cell(1, 1)).unwrap().result, Some(CellValue::number(1.0)));
    assert_block_cleared(&transition.document);
}

#[test]
fn recalc_result_for_locked_cell_is_dropped() {
    let mut doc = doc();
    run(&mut doc, edit(1, 1, "=1"));
    run(&mut doc, edit(2, 1, "=2"));
    doc.sheets[0].cells.get_mut(&2).unwrap().get_mut(&1).unwrap().locked = true;

    let update = CellUpdate { result: Some(CellValue::number(2.0)), timestamp: Some(1), ..CellUpdate::default() };
    let mut changes = CellsBySheet::new();
    let rows = changes.entry("Sheet1".to_string()).or_default();
    rows.entry(2).or_default().insert(1, update.clone());
    let only_locked = reduce(&doc, &Action::UpdateCells { changes: changes.clone() }, &SingleCellBounds);
    assert!(only_locked.patches.is_empty());
    assert_eq!(only_locked.document, doc);

    changes.get_mut("Sheet1").unwrap().entry(1).or_default().insert(1, update);
    let mixed = reduce(&doc, &Action::UpdateCells { changes }, &SingleCellBounds);
    let sheet = &mixed.document.sheets[0];
    assert_eq!(sheet.cell(cell(1, 1)).unwrap().result, Some(CellValue::number(2.0)));
    assert_eq!(sheet.cell(cell(2, 1)).unwrap().result, None);
}

// ============================================================================
// Protection
// ============================================================================

fn locked_doc() -> Document {
    let mut doc = doc();
    run(&mut doc, edit(1, 1, "1"));
    run(&mut doc, edit(2, 1, "=A1"));
    run(&mut doc, Action::ProtectSheet { id: sid() });
    doc
}

#[test]
fn locked_sheet_rejects_every_mutation() {
    let doc = locked_doc();
    let mut changes = CellsBySheet::new();
    changes
        .entry("Sheet1".to_string())
        .or_default()
        .entry(2)
        .or_default()
        .insert(1, CellUpdate { timestamp: Some(1), ..CellUpdate::default() });

    let actions = vec![
        edit(1, 1, "2"),
        Action::DeleteCells { id: sid(), active_cell: Some(cell(1, 1)), selections: vec![] },
        Action::RemoveCells { id: sid(), active_cell: Some(cell(1, 1)), selections: vec![] },
        Action::FormattingChange { id: sid(), change: FormatChange::Bold(true) },
        Action::FormattingChangePlain { id: sid() },
        Action::ClearFormatting { id: sid() },
        Action::SetBorder {
            id: sid(),
            color: None,
            style: BorderStyle::Thin,
            variant: BorderVariant::All,
        },
        Action::MergeCells { id: sid() },
        Action::Resize { id: sid(), axis: Axis::Column, index: 1, dimension: 120.0 },
        Action::FrozenRowChange { id: sid(), count: 1 },
        Action::ChangeTabColor { id: sid(), color: Some("#f00".into()) },
        Action::ChangeFilter {
            id: sid(),
            filter_view_index: 0,
            column: 1,
            filter: Some(FilterDefinition { operator: FilterOperator::In, values: vec!["1".into()] }),
        },
        Action::InsertRow { id: sid(), active_cell: cell(1, 1) },
        Action::DeleteColumn { id: sid(), active_cell: cell(1, 1) },
        Action::UpdateFill {
            id: sid(),
            active_cell: Some(cell(1, 1)),
            fill_selection: selection(1, 1, 3, 1),
            selections: vec![],
        },
        Action::Paste {
            id: sid(),
            active_cell: Some(cell(1, 1)),
            rows: vec![vec![PasteCell::Text("x".into())]],
            selections: None,
            cut_selection: None,
            cut_sheet: None,
        },
        Action::ChangeSheetName { id: sid(), name: "Renamed".into() },
        Action::UpdateCells { changes },
    ];

    for action in actions {
        let transition = reduce(&doc, &action, &SingleCellBounds);
        assert!(transition.patches.is_empty(), "{} changed a locked sheet", action.name());
        assert_eq!(transition.document, doc, "{}", action.name());
    }
}

#[test]
fn locked_sheet_allows_view_state() {
    let doc = locked_doc();
    let transition = reduce(
        &doc,
        &Action::SheetSelectionChange {
            id: sid(),
            active_cell: Some(cell(2, 2)),
            selections: vec![selection(2, 2, 2, 2)],
        },
        &SingleCellBounds,
    );
    assert_eq!(transition.document.sheets[0].active_cell, Some(cell(2, 2)));

    let unlocked = reduce(&doc, &Action::UnprotectSheet { id: sid() }, &SingleCellBounds).document;
    assert!(!unlocked.sheets[0].locked);
}

#[test]
fn locked_cell_can_still_be_unlocked() {
    let mut doc = doc();
    run(&mut doc, edit(1, 1, "x"));
    run(&mut doc, Action::FormattingChange { id: sid(), change: FormatChange::Locked(true) });
    run(&mut doc, edit(1, 1, "y"));
    assert_eq!(text(&doc, 1, 1).as_deref(), Some("x"));

    run(&mut doc, Action::FormattingChange { id: sid(), change: FormatChange::Locked(false) });
    run(&mut doc, edit(1, 1, "y"));
    assert_eq!(text(&doc, 1, 1).as_deref(), Some("y"));
}

#[test]
fn unknown_sheet_is_a_no_op() {
    let doc = doc();
    let action = Action::ChangeSheetCell {
        id: SheetId::new("missing"),
        cell: cell(1, 1),
        value: "x".into(),
        datatype: None,
    };
    let transition = reduce(&doc, &action, &SingleCellBounds);
    assert_eq!(transition.document, doc);
    assert!(transition.patches.is_empty());
}

// ============================================================================
// Sheets
// ============================================================================

#[test]
fn sheet_lifecycle_with_undo() {
    let mut engine = Engine::with_settings(doc(), EngineSettings::default());
    let before = engine.document().clone();

    let action = engine.new_sheet_action(None);
    engine.dispatch(action);
    assert_eq!(engine.document().sheets.len(), 2);
    let added = engine.document().sheets[1].clone();
    assert_eq!(added.name, "Sheet2");
    assert_eq!(engine.document().selected_sheet, Some(added.id.clone()));

    // Names are unique regardless of case
    let rename = engine.dispatch(Action::ChangeSheetName { id: added.id.clone(), name: "sheet1".into() });
    assert!(rename.patches.is_empty());

    engine.dispatch(Action::DeleteSheet { id: added.id.clone() });
    assert_eq!(engine.document().sheets.len(), 1);
    assert_eq!(engine.document().selected_sheet, Some(sid()));

    // The last sheet cannot go
    assert!(engine.dispatch(Action::DeleteSheet { id: sid() }).patches.is_empty());

    engine.undo();
    engine.undo();
    assert_eq!(engine.document(), &before);
    assert!(!engine.can_undo());
}

#[test]
fn hide_sheet_moves_selection_to_neighbour() {
    let mut doc = Document::with_sheets(vec![
        Sheet::new(SheetId::new("a"), "A"),
        Sheet::new(SheetId::new("b"), "B"),
    ]);
    run(&mut doc, Action::SelectSheet { id: SheetId::new("b") });
    run(&mut doc, Action::HideSheet { id: SheetId::new("b") });
    assert_eq!(doc.selected_sheet, Some(SheetId::new("a")));
    assert!(doc.sheets[1].hidden);

    // The last visible sheet stays visible
    run(&mut doc, Action::HideSheet { id: SheetId::new("a") });
    assert!(!doc.sheets[0].hidden);

    run(&mut doc, Action::SelectNextSheet);
    assert_eq!(doc.selected_sheet, Some(SheetId::new("a")));
}

// ============================================================================
// Engine
// ============================================================================

#[test]
fn undo_redo_through_engine() {
    let mut engine = Engine::new(doc());
    let start = engine.document().clone();

    engine.dispatch(edit(1, 1, "1"));
    engine.dispatch(edit(2, 1, "=A1*2"));
    engine.dispatch(Action::InsertRow { id: sid(), active_cell: cell(1, 1) });
    let edited = engine.document().clone();
    assert_eq!(edited.sheets[0].cell(cell(3, 1)).map(|c| c.text()), Some("=A2*2"));

    while engine.can_undo() {
        engine.undo();
    }
    assert_eq!(engine.document(), &start);

    while engine.can_redo() {
        engine.redo();
    }
    assert_eq!(engine.document(), &edited);
}

#[test]
fn silent_dispatch_skips_history() {
    let mut engine = Engine::new(doc());
    engine.dispatch_with(edit(1, 1, "x"), DispatchOptions::silent());
    assert!(!engine.can_undo());
    assert_eq!(engine.document().sheets[0].cell(cell(1, 1)).map(|c| c.text()), Some("x"));
}

#[test]
fn history_depth_follows_settings() {
    let settings = EngineSettings { history_max_entries: 2, ..EngineSettings::default() };
    let mut engine = Engine::with_settings(doc(), settings);
    for value in ["1", "2", "3"] {
        engine.dispatch(edit(1, 1, value));
    }
    assert_eq!(engine.history().undo_len(), 2);
    engine.undo();
    engine.undo();
    assert_eq!(engine.document().sheets[0].cell(cell(1, 1)).map(|c| c.text()), Some("1"));
}

#[test]
fn new_sheets_follow_settings() {
    let settings = EngineSettings::parse(r#"{ "sheet.namePrefix": "Tab", "sheet.rowCount": 50 }"#).unwrap();
    let mut engine = Engine::with_settings(doc(), settings);

    let action = engine.new_sheet_action(Some(0));
    engine.dispatch(action);

    let added = &engine.document().sheets[1];
    assert_eq!(added.name, "Tab2");
    assert_eq!(added.row_count, 50);
    assert_eq!(added.column_count, 100);
}
