//! Data validation rules attached to cells.
//!
//! A failed check never blocks a write. The reducer stores the value and
//! flags the cell with `valid = false` and a user-facing prompt.
//!
//! ## Case Sensitivity
//!
//! List matching is case-sensitive. Boolean matching accepts `TRUE`/`FALSE`
//! in any case.

use serde::{Deserialize, Serialize};

use crate::cell::{detect_datatype, CellValue, DataType};

/// What kind of value a rule accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationKind {
    /// Value must be one of `formulae`.
    List,
    /// `TRUE`/`FALSE`, or one of the checked/unchecked values in `formulae`.
    Boolean,
    Decimal,
    /// Integer within bounds.
    Whole,
    /// Character count within bounds.
    TextLength,
    /// Formula rule; only the external evaluator can decide it.
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonOperator {
    Between,
    NotBetween,
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

/// A validation rule as stored on a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataValidation {
    #[serde(rename = "type")]
    pub kind: ValidationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<ComparisonOperator>,
    #[serde(default)]
    pub formulae: Vec<CellValue>,
    /// If true, empty values are always valid.
    #[serde(default = "default_true")]
    pub allow_blank: bool,
    /// Message shown when the value is rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

fn default_true() -> bool {
    true
}

impl DataValidation {
    pub fn new(kind: ValidationKind) -> Self {
        Self {
            kind,
            operator: None,
            formulae: Vec::new(),
            allow_blank: true,
            prompt: None,
        }
    }

    pub fn list(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            formulae: values.into_iter().map(|v| CellValue::Text(v.into())).collect(),
            ..Self::new(ValidationKind::List)
        }
    }

    pub fn with_constraint(mut self, operator: ComparisonOperator, values: &[f64]) -> Self {
        self.operator = Some(operator);
        self.formulae = values.iter().map(|v| CellValue::number(*v)).collect();
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }
}

/// Result of checking a value against a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub prompt: Option<String>,
}

/// Check `value` against `rule`.
///
/// Returns `None` when the rule cannot be decided locally (custom formulas).
pub fn validate(rule: &DataValidation, value: &str) -> Option<ValidationOutcome> {
    let trimmed = value.trim();
    if trimmed.is_empty() && rule.allow_blank {
        return Some(ValidationOutcome { valid: true, prompt: None });
    }

    let valid = match rule.kind {
        ValidationKind::Custom => return None,
        ValidationKind::List => rule.formulae.iter().any(|item| display(item) == value),
        ValidationKind::Boolean => {
            detect_datatype(trimmed) == Some(DataType::Boolean)
                || rule.formulae.iter().any(|item| display(item) == value)
        }
        ValidationKind::Decimal => match trimmed.parse::<f64>() {
            Ok(x) => check_constraint(rule, x),
            Err(_) => false,
        },
        ValidationKind::Whole => match trimmed.parse::<f64>() {
            Ok(x) if x.fract() == 0.0 => check_constraint(rule, x),
            _ => false,
        },
        ValidationKind::TextLength => check_constraint(rule, value.chars().count() as f64),
    };

    let prompt = if valid { None } else { Some(rule.prompt.clone().unwrap_or_else(|| default_prompt(rule))) };
    Some(ValidationOutcome { valid, prompt })
}

fn check_constraint(rule: &DataValidation, x: f64) -> bool {
    let Some(operator) = rule.operator else {
        return true;
    };
    let mut bounds = rule.formulae.iter().filter_map(CellValue::as_number);
    let Some(a) = bounds.next() else {
        return true;
    };
    eval_numeric_constraint(x, operator, a, bounds.next())
}

/// Evaluate a numeric constraint.
///
/// # Between Inclusivity
/// - `Between(a, b)`: true if `a <= x <= b`
/// - `NotBetween(a, b)`: true if `x < a || x > b`
pub fn eval_numeric_constraint(x: f64, operator: ComparisonOperator, a: f64, b: Option<f64>) -> bool {
    match operator {
        ComparisonOperator::Between => {
            let max = b.unwrap_or(a);
            x >= a && x <= max
        }
        ComparisonOperator::NotBetween => {
            let max = b.unwrap_or(a);
            x < a || x > max
        }
        ComparisonOperator::Equal => (x - a).abs() < f64::EPSILON,
        ComparisonOperator::NotEqual => (x - a).abs() >= f64::EPSILON,
        ComparisonOperator::GreaterThan => x > a,
        ComparisonOperator::LessThan => x < a,
        ComparisonOperator::GreaterThanOrEqual => x >= a,
        ComparisonOperator::LessThanOrEqual => x <= a,
    }
}

fn display(value: &CellValue) -> String {
    match value {
        CellValue::Text(s) => s.clone(),
        CellValue::Number(n) => n.0.to_string(),
        CellValue::Boolean(b) => if *b { "TRUE".into() } else { "FALSE".into() },
        CellValue::Null | CellValue::Array(_) => String::new(),
    }
}

fn default_prompt(rule: &DataValidation) -> String {
    match rule.kind {
        ValidationKind::List => "Enter a value from the list".into(),
        ValidationKind::Boolean => "Enter TRUE or FALSE".into(),
        ValidationKind::Whole => "Enter a whole number".into(),
        ValidationKind::Decimal => "Enter a valid number".into(),
        ValidationKind::TextLength => "Text length is out of range".into(),
        ValidationKind::Custom => "Invalid value".into(),
    }
}
