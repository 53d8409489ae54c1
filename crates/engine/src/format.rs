//! Numeric display formatting.

use crate::cell::{CellConfig, CellValue, DataType};

/// Number format type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumberFormat {
    #[default]
    General,
    Number { decimals: u8, thousands: bool },
    Currency { decimals: u8 },
    Percent { decimals: u8 },
}

impl NumberFormat {
    /// Interpret a format pattern such as `0.00`, `#,##0`, `$#,##0.00` or `0%`.
    /// Unrecognised patterns fall back to `General`.
    pub fn parse(pattern: &str) -> NumberFormat {
        let pattern = pattern.trim();
        if pattern.is_empty() || pattern.eq_ignore_ascii_case("general") {
            return NumberFormat::General;
        }
        let decimals = pattern
            .split_once('.')
            .map(|(_, frac)| frac.chars().take_while(|c| *c == '0' || *c == '#').count() as u8)
            .unwrap_or(0);
        if pattern.ends_with('%') {
            NumberFormat::Percent { decimals }
        } else if pattern.starts_with('$') {
            NumberFormat::Currency { decimals }
        } else if pattern.contains('0') || pattern.contains('#') {
            NumberFormat::Number { decimals, thousands: pattern.contains(',') }
        } else {
            NumberFormat::General
        }
    }

    pub fn with_decimals(self, decimals: u8) -> NumberFormat {
        match self {
            NumberFormat::General => NumberFormat::Number { decimals, thousands: false },
            NumberFormat::Number { thousands, .. } => NumberFormat::Number { decimals, thousands },
            NumberFormat::Currency { .. } => NumberFormat::Currency { decimals },
            NumberFormat::Percent { .. } => NumberFormat::Percent { decimals },
        }
    }
}

/// Format a number according to the specified format
pub fn format_number(n: f64, format: &NumberFormat) -> String {
    match format {
        NumberFormat::General => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", n as i64)
            } else {
                let s = format!("{:.10}", n);
                s.trim_end_matches('0').trim_end_matches('.').to_string()
            }
        }
        NumberFormat::Number { decimals, thousands } => {
            let s = format!("{:.*}", *decimals as usize, n);
            if *thousands {
                group_thousands(&s)
            } else {
                s
            }
        }
        NumberFormat::Currency { decimals } => {
            let s = group_thousands(&format!("{:.*}", *decimals as usize, n.abs()));
            if n < 0.0 {
                format!("-${}", s)
            } else {
                format!("${}", s)
            }
        }
        NumberFormat::Percent { decimals } => {
            format!("{:.*}%", *decimals as usize, n * 100.0)
        }
    }
}

fn group_thousands(s: &str) -> String {
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s),
    };
    let (int, frac) = match digits.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (digits, None),
    };
    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match frac {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Text to display for a cell, or `None` for an empty cell.
pub fn format_display(cell: &CellConfig) -> Option<String> {
    if let Some(error) = &cell.error {
        return Some(error.clone());
    }

    let value = if cell.is_formula() {
        cell.result.clone()?
    } else {
        let text = cell.text.as_ref()?;
        if cell.plaintext {
            return Some(text.clone());
        }
        match cell.datatype {
            Some(DataType::Number) => text.trim().parse().map(CellValue::number).unwrap_or_else(|_| CellValue::Text(text.clone())),
            Some(DataType::Boolean) => CellValue::Boolean(text.trim().eq_ignore_ascii_case("TRUE")),
            _ => CellValue::Text(text.clone()),
        }
    };

    let format = cell.style.format.as_deref().map(NumberFormat::parse).unwrap_or_default();
    let format = match cell.style.decimals {
        Some(decimals) => format.with_decimals(decimals),
        None => format,
    };

    match value {
        CellValue::Null => None,
        CellValue::Boolean(b) => Some(if b { "TRUE".into() } else { "FALSE".into() }),
        CellValue::Number(n) => Some(format_number(n.0, &format)),
        CellValue::Text(s) => Some(s),
        CellValue::Array(rows) => rows.first().and_then(|r| r.first()).map(|v| match v {
            CellValue::Number(n) => format_number(n.0, &format),
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => if *b { "TRUE".into() } else { "FALSE".into() },
            _ => String::new(),
        }),
    }
}
