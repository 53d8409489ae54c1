use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tabgrid_core::{Area, CellCoord, Edges};

use crate::validation::DataValidation;

/// Declared or detected type of a cell's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Boolean,
    Date,
    Formula,
    Hyperlink,
    Array,
    Error,
    Null,
    #[serde(rename = "richtext")]
    RichText,
}

/// Cached evaluation output
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Boolean(bool),
    Number(OrderedFloat<f64>),
    Text(String),
    Array(Vec<Vec<CellValue>>),
}

impl CellValue {
    pub fn number(n: f64) -> Self {
        CellValue::Number(OrderedFloat(n))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(n.0),
            CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

/// Vertical text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

/// Text overflow behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextWrap {
    Clip,       // Text is clipped at cell boundary
    Wrap,       // Text wraps to multiple lines within the cell
    Overflow,   // Text overflows into adjacent empty cells
}

/// User-set visual attributes. Unset fields inherit the grid default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u16>,
    /// Custom number format, e.g. `#,##0.00`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap: Option<TextWrap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_align: Option<HorizontalAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<VerticalAlign>,
}

impl CellStyle {
    pub fn is_empty(&self) -> bool {
        *self == CellStyle::default()
    }

    /// Copy every attribute of `other` that is not already set here.
    pub fn fill_missing(&mut self, other: &CellStyle) {
        fn keep<T: Clone>(slot: &mut Option<T>, incoming: &Option<T>) {
            if slot.is_none() {
                slot.clone_from(incoming);
            }
        }
        keep(&mut self.bold, &other.bold);
        keep(&mut self.italic, &other.italic);
        keep(&mut self.underline, &other.underline);
        keep(&mut self.strike, &other.strike);
        keep(&mut self.fill, &other.fill);
        keep(&mut self.color, &other.color);
        keep(&mut self.font_family, &other.font_family);
        keep(&mut self.font_size, &other.font_size);
        keep(&mut self.format, &other.format);
        keep(&mut self.decimals, &other.decimals);
        keep(&mut self.wrap, &other.wrap);
        keep(&mut self.rotation, &other.rotation);
        keep(&mut self.horizontal_align, &other.horizontal_align);
        keep(&mut self.vertical_align, &other.vertical_align);
    }
}

/// Line style of a border edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
}

impl BorderStyle {
    pub fn width(&self) -> u8 {
        match self {
            BorderStyle::Medium => 2,
            BorderStyle::Thick | BorderStyle::Double => 3,
            _ => 1,
        }
    }

    /// Dash pattern; empty means solid.
    pub fn dash(&self) -> &'static [u8] {
        match self {
            BorderStyle::Dashed => &[2, 2],
            BorderStyle::Dotted => &[1, 1],
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorderEdge {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub style: BorderStyle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Borders {
    #[serde(rename = "strokeTop", skip_serializing_if = "Option::is_none")]
    pub top: Option<BorderEdge>,
    #[serde(rename = "strokeRight", skip_serializing_if = "Option::is_none")]
    pub right: Option<BorderEdge>,
    #[serde(rename = "strokeBottom", skip_serializing_if = "Option::is_none")]
    pub bottom: Option<BorderEdge>,
    #[serde(rename = "strokeLeft", skip_serializing_if = "Option::is_none")]
    pub left: Option<BorderEdge>,
}

impl Borders {
    pub fn is_empty(&self) -> bool {
        *self == Borders::default()
    }

    /// Set `edge` on every flagged side.
    pub fn apply(&mut self, edges: Edges, edge: &BorderEdge) {
        if edges.top {
            self.top = Some(edge.clone());
        }
        if edges.right {
            self.right = Some(edge.clone());
        }
        if edges.bottom {
            self.bottom = Some(edge.clone());
        }
        if edges.left {
            self.left = Some(edge.clone());
        }
    }
}

/// A single formatting key change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum FormatChange {
    Bold(bool),
    Italic(bool),
    Underline(bool),
    Strike(bool),
    Fill(Option<String>),
    Color(Option<String>),
    FontFamily(Option<String>),
    FontSize(Option<u16>),
    /// Custom number format; setting one leaves plain-text mode
    Format(Option<String>),
    Decimals(Option<u8>),
    Wrap(Option<TextWrap>),
    Rotation(Option<i16>),
    HorizontalAlign(Option<HorizontalAlign>),
    VerticalAlign(Option<VerticalAlign>),
    Locked(bool),
    Hidden(bool),
    Extra { name: String, value: Option<String> },
}

impl FormatChange {
    /// Protection changes are allowed on locked cells.
    pub fn is_protection(&self) -> bool {
        matches!(self, FormatChange::Locked(_))
    }
}

/// Configuration of one cell: content, evaluation state, protection, style.
///
/// A cell equal to `CellConfig::default()` is the same as no cell at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellConfig {
    /// Raw user input or formula source
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
    /// Set by the evaluator when a formula result is written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    /// `[width, height]` of the block spilled by an array formula anchor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula_range: Option<[usize; 2]>,
    /// Address of the anchor this spilled cell belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_cell: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_validation: Option<DataValidation>,
    /// Display text as entered, without number formatting
    #[serde(skip_serializing_if = "is_false")]
    pub plaintext: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyperlink: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub locked: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(flatten)]
    pub style: CellStyle,
    #[serde(flatten)]
    pub borders: Borders,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl CellConfig {
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            datatype: detect_datatype(&text),
            text: Some(text),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == CellConfig::default()
    }

    pub fn is_formula(&self) -> bool {
        self.datatype == Some(DataType::Formula)
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// The spill block anchored at `anchor`, if this cell is an array formula anchor.
    pub fn spill_area(&self, anchor: CellCoord) -> Option<Area> {
        let [width, height] = self.formula_range?;
        if width == 0 || height == 0 {
            return None;
        }
        Some(Area::new(anchor.row, anchor.col, anchor.row + height - 1, anchor.col + width - 1))
    }

    /// Drop content and evaluation state, keeping style, borders, and protection.
    pub fn clear_content(&mut self) {
        *self = CellConfig {
            locked: self.locked,
            hidden: self.hidden,
            style: std::mem::take(&mut self.style),
            borders: std::mem::take(&mut self.borders),
            extra: std::mem::take(&mut self.extra),
            ..CellConfig::default()
        };
    }

    /// A copy without content, used to seed inserted rows and columns.
    pub fn clone_formatting(&self) -> CellConfig {
        CellConfig {
            text: None,
            result: None,
            datatype: None,
            result_type: None,
            ..self.clone()
        }
    }

    pub fn clear_formatting(&mut self) {
        self.style = CellStyle::default();
        self.borders = Borders::default();
        self.extra.clear();
    }

    /// Reset evaluation output after the content changed.
    pub fn clear_evaluation(&mut self) {
        self.result = None;
        self.result_type = None;
        self.error = None;
        self.error_message = None;
        self.timestamp = None;
        self.parent_cell = None;
        self.valid = None;
    }

    pub fn apply_format(&mut self, change: &FormatChange) {
        let style = &mut self.style;
        match change {
            FormatChange::Bold(v) => style.bold = Some(*v),
            FormatChange::Italic(v) => style.italic = Some(*v),
            FormatChange::Underline(v) => style.underline = Some(*v),
            FormatChange::Strike(v) => style.strike = Some(*v),
            FormatChange::Fill(v) => style.fill.clone_from(v),
            FormatChange::Color(v) => style.color.clone_from(v),
            FormatChange::FontFamily(v) => style.font_family.clone_from(v),
            FormatChange::FontSize(v) => style.font_size = *v,
            FormatChange::Format(v) => {
                style.format.clone_from(v);
                self.plaintext = false;
            }
            FormatChange::Decimals(v) => style.decimals = *v,
            FormatChange::Wrap(v) => style.wrap = *v,
            FormatChange::Rotation(v) => style.rotation = *v,
            FormatChange::HorizontalAlign(v) => style.horizontal_align = *v,
            FormatChange::VerticalAlign(v) => style.vertical_align = *v,
            FormatChange::Locked(v) => self.locked = *v,
            FormatChange::Hidden(v) => self.hidden = *v,
            FormatChange::Extra { name, value } => match value {
                Some(value) => {
                    self.extra.insert(name.clone(), value.clone());
                }
                None => {
                    self.extra.remove(name);
                }
            },
        }
    }
}

/// Classify raw user input.
pub fn detect_datatype(text: &str) -> Option<DataType> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('=') {
        return Some(DataType::Formula);
    }
    if trimmed.eq_ignore_ascii_case("TRUE") || trimmed.eq_ignore_ascii_case("FALSE") {
        return Some(DataType::Boolean);
    }
    if trimmed.parse::<f64>().is_ok_and(f64::is_finite) {
        return Some(DataType::Number);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_datatype() {
        assert_eq!(detect_datatype("42"), Some(DataType::Number));
        assert_eq!(detect_datatype(" -1.5e3 "), Some(DataType::Number));
        assert_eq!(detect_datatype("true"), Some(DataType::Boolean));
        assert_eq!(detect_datatype("FALSE"), Some(DataType::Boolean));
        assert_eq!(detect_datatype("=SUM(A1)"), Some(DataType::Formula));
        assert_eq!(detect_datatype("hello"), None);
        assert_eq!(detect_datatype("inf"), None);
        assert_eq!(detect_datatype(""), None);
    }

    #[test]
    fn test_clear_content_keeps_formatting() {
        let mut cell = CellConfig::with_text("=A1");
        cell.result = Some(CellValue::number(3.0));
        cell.style.bold = Some(true);
        cell.borders.top = Some(BorderEdge::default());
        cell.locked = true;

        cell.clear_content();

        assert_eq!(cell.text, None);
        assert_eq!(cell.result, None);
        assert_eq!(cell.style.bold, Some(true));
        assert!(cell.borders.top.is_some());
        assert!(cell.locked);
    }

    #[test]
    fn test_clone_formatting_drops_content() {
        let mut cell = CellConfig::with_text("12");
        cell.result_type = Some(DataType::Number);
        cell.style.fill = Some("#ff0000".into());

        let clone = cell.clone_formatting();
        assert_eq!(clone.text, None);
        assert_eq!(clone.datatype, None);
        assert_eq!(clone.result_type, None);
        assert_eq!(clone.style.fill.as_deref(), Some("#ff0000"));
    }

    #[test]
    fn test_empty_cell() {
        assert!(CellConfig::default().is_empty());
        let mut cell = CellConfig::with_text("x");
        assert!(!cell.is_empty());
        cell.clear_content();
        assert!(cell.is_empty());
    }

    #[test]
    fn test_border_style_geometry() {
        assert_eq!(BorderStyle::Thin.width(), 1);
        assert_eq!(BorderStyle::Double.width(), 3);
        assert!(BorderStyle::Medium.dash().is_empty());
        assert_eq!(BorderStyle::Dotted.dash(), &[1, 1]);
    }

    #[test]
    fn test_spill_area() {
        let mut cell = CellConfig::default();
        assert_eq!(cell.spill_area(CellCoord::new(2, 2)), None);
        cell.formula_range = Some([3, 2]);
        assert_eq!(cell.spill_area(CellCoord::new(2, 2)), Some(Area::new(2, 2, 3, 4)));
    }

    #[test]
    fn test_format_change_custom_format_leaves_plaintext() {
        let mut cell = CellConfig { plaintext: true, ..CellConfig::default() };
        cell.apply_format(&FormatChange::Format(Some("0.00".into())));
        assert!(!cell.plaintext);
        assert_eq!(cell.style.format.as_deref(), Some("0.00"));
    }

    #[test]
    fn test_style_fill_missing_never_overwrites() {
        let mut style = CellStyle { bold: Some(false), ..CellStyle::default() };
        let incoming = CellStyle {
            bold: Some(true),
            color: Some("red".into()),
            ..CellStyle::default()
        };
        style.fill_missing(&incoming);
        assert_eq!(style.bold, Some(false));
        assert_eq!(style.color.as_deref(), Some("red"));
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let json = r#"{"text":"=SUM(A1)","datatype":"formula","resultType":"number","result":3,"formulaRange":[1,2],"bold":true,"strokeTop":{"style":"thick"}}"#;
        let cell: CellConfig = serde_json::from_str(json).unwrap();
        assert!(cell.is_formula());
        assert_eq!(cell.result, Some(CellValue::number(3.0)));
        assert_eq!(cell.result_type, Some(DataType::Number));
        assert_eq!(cell.formula_range, Some([1, 2]));
        assert_eq!(cell.style.bold, Some(true));
        assert_eq!(cell.borders.top.as_ref().map(|e| e.style.width()), Some(3));
    }
}
