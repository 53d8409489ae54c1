//! Syntactic rewriting of cell references inside formula text.
//!
//! Only `A1`-style references are recognised, optionally with `$` markers
//! and a sheet prefix (`Sheet2!B3`, `'My Sheet'!$C$1`). Ranges are handled
//! endpoint by endpoint; an unqualified end (`Other!A1:A5`) belongs to the
//! sheet of its start. Text inside string literals is never touched.
//! Whole-row and whole-column ranges (`A:A`, `1:1`) are left as written.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tabgrid_core::{letters_to_number, number_to_letters, Axis, CellCoord, LineShift};

use crate::error::{TranslateError, REF_ERROR};
use crate::sheet::normalize_sheet_name;

// Groups: 1 = sheet prefix, 2 = column `$`, 3 = column letters, 4 = row `$`, 5 = row digits
static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:('(?:[^']|'')+'|[A-Za-z_][A-Za-z0-9_.]*)!)?(\$?)([A-Za-z]{1,3})(\$?)([0-9]+)")
        .expect("reference pattern compiles")
});

/// A row or column pivot for structural translation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisShift {
    pub axis: Axis,
    pub index: usize,
}

/// Rewrite `formula` as if it moved from `source` to `destination`.
///
/// Without `shift`, relative components move by `destination - source` and
/// absolute components stay. With `shift`, only the shift axis moves, and
/// only references at or after `shift.index`, absolute or not.
pub fn translate(
    formula: &str,
    source: CellCoord,
    destination: CellCoord,
    shift: Option<AxisShift>,
) -> Result<String, TranslateError> {
    let rows = destination.row as isize - source.row as isize;
    let cols = destination.col as isize - source.col as isize;
    let rewrite = match shift {
        None => Rewrite::Translate { rows, cols },
        Some(AxisShift { axis, index }) => Rewrite::Shift {
            axis,
            pivot: index,
            delta: match axis {
                Axis::Row => rows,
                Axis::Column => cols,
            },
            sheet: None,
        },
    };
    rewrite_formula(formula, &rewrite)
}

/// Rewrite references of a formula living on `sheet_name` after a row or
/// column insert/delete. References qualified with another sheet are kept.
pub fn shift_formula(formula: &str, shift: &LineShift, sheet_name: &str) -> Result<String, TranslateError> {
    let rewrite = Rewrite::Shift {
        axis: shift.axis,
        pivot: shift.pivot,
        delta: shift.delta(),
        sheet: Some(sheet_name),
    };
    rewrite_formula(formula, &rewrite)
}

enum Rewrite<'a> {
    Translate { rows: isize, cols: isize },
    Shift { axis: Axis, pivot: usize, delta: isize, sheet: Option<&'a str> },
}

struct Reference<'t> {
    prefix: Option<&'t str>,
    /// Sheet the reference points at, inherited from the range start if unqualified
    sheet: Option<&'t str>,
    col_abs: bool,
    col: usize,
    row_abs: bool,
    row: usize,
}

fn rewrite_formula(formula: &str, rewrite: &Rewrite) -> Result<String, TranslateError> {
    let mut out = String::with_capacity(formula.len());
    let mut failed: Vec<String> = Vec::new();

    // Even segments are outside string literals
    for (i, segment) in formula.split('"').enumerate() {
        if i > 0 {
            out.push('"');
        }
        if i % 2 == 1 {
            out.push_str(segment);
            continue;
        }
        out.push_str(&rewrite_segment(segment, rewrite, &mut failed));
    }

    if failed.is_empty() {
        Ok(out)
    } else {
        Err(TranslateError::RefOutOfBounds {
            message: format!("Reference {} moves outside the sheet", failed.join(", ")),
            details: out,
        })
    }
}

fn rewrite_segment(segment: &str, rewrite: &Rewrite, failed: &mut Vec<String>) -> String {
    // End offset and sheet qualifier span of the last accepted reference
    let mut previous: Option<(usize, Option<Range<usize>>)> = None;
    REFERENCE
        .replace_all(segment, |caps: &Captures| {
            let Some(found) = caps.get(0) else {
                return String::new();
            };
            let whole = found.as_str();
            let Some(mut reference) = parse_reference(segment, caps) else {
                previous = None;
                return whole.to_string();
            };
            let qualifier = match (caps.get(1), &previous) {
                (Some(prefix), _) => Some(prefix.range()),
                (None, Some((end, span))) if found.start() == end + 1 && segment[*end..].starts_with(':') => {
                    span.clone()
                }
                _ => None,
            };
            reference.sheet = qualifier.clone().map(|span| &segment[span]);
            previous = Some((found.end(), qualifier));
            match apply(&reference, rewrite) {
                Some((col, row)) if col == reference.col && row == reference.row => whole.to_string(),
                Some((col, row)) => format!(
                    "{}{}{}{}{}",
                    reference.prefix.map(|p| format!("{p}!")).unwrap_or_default(),
                    if reference.col_abs { "$" } else { "" },
                    number_to_letters(col),
                    if reference.row_abs { "$" } else { "" },
                    row
                ),
                None => {
                    failed.push(whole.to_string());
                    format!("{}{}", reference.prefix.map(|p| format!("{p}!")).unwrap_or_default(), REF_ERROR)
                }
            }
        })
        .into_owned()
}

/// Accept a regex match only when it is a standalone token.
fn parse_reference<'t>(segment: &'t str, caps: &Captures<'t>) -> Option<Reference<'t>> {
    let whole = caps.get(0)?;
    let before = segment[..whole.start()].chars().next_back();
    let after = segment[whole.end()..].chars().next();
    if before.is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '$' | '\'')) {
        return None;
    }
    if after.is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '(' | '!' | '.' | '$')) {
        return None;
    }
    let row: usize = caps.get(5)?.as_str().parse().ok()?;
    if row == 0 {
        return None;
    }
    Some(Reference {
        prefix: caps.get(1).map(|m| m.as_str()),
        sheet: caps.get(1).map(|m| m.as_str()),
        col_abs: !caps.get(2)?.as_str().is_empty(),
        col: letters_to_number(caps.get(3)?.as_str())?,
        row_abs: !caps.get(4)?.as_str().is_empty(),
        row,
    })
}

/// New `(col, row)`, or `None` if the reference leaves the sheet.
fn apply(reference: &Reference, rewrite: &Rewrite) -> Option<(usize, usize)> {
    match rewrite {
        Rewrite::Translate { rows, cols } => {
            let col = if reference.col_abs { Some(reference.col) } else { offset(reference.col, *cols) };
            let row = if reference.row_abs { Some(reference.row) } else { offset(reference.row, *rows) };
            Some((col?, row?))
        }
        Rewrite::Shift { axis, pivot, delta, sheet } => {
            if let (Some(target), Some(sheet)) = (reference.sheet, sheet) {
                if normalize_sheet_name(&unquote(target)) != normalize_sheet_name(sheet) {
                    return Some((reference.col, reference.row));
                }
            }
            let moved = |index: usize| if index >= *pivot { offset(index, *delta) } else { Some(index) };
            match axis {
                Axis::Row => Some((reference.col, moved(reference.row)?)),
                Axis::Column => Some((moved(reference.col)?, reference.row)),
            }
        }
    }
}

fn offset(index: usize, delta: isize) -> Option<usize> {
    let moved = index as isize + delta;
    (moved >= 1).then_some(moved as usize)
}

fn unquote(prefix: &str) -> String {
    prefix
        .strip_prefix('\'')
        .and_then(|p| p.strip_suffix('\''))
        .map(|p| p.replace("''", "'"))
        .unwrap_or_else(|| prefix.to_string())
}
