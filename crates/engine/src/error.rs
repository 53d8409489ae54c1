use std::fmt;

/// Cell error code for references that leave the sheet.
pub const REF_ERROR: &str = "#REF!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// A reference moved onto or past the header line.
    RefOutOfBounds {
        /// Formula text with each offending reference replaced by `#REF!`
        details: String,
        message: String,
    },
}

impl TranslateError {
    /// User-facing cell error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RefOutOfBounds { .. } => REF_ERROR,
        }
    }

    /// Best-effort formula text to keep on the cell.
    pub fn details(&self) -> &str {
        match self {
            Self::RefOutOfBounds { details, .. } => details,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::RefOutOfBounds { message, .. } => message,
        }
    }
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RefOutOfBounds { message, .. } => write!(f, "{}: {message}", REF_ERROR),
        }
    }
}

impl std::error::Error for TranslateError {}

#[derive(Debug)]
pub enum RecalcError {
    /// JSON parse / deserialization error.
    Decode(String),
    /// Serialization error.
    Encode(String),
}

impl fmt::Display for RecalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(msg) => write!(f, "recalc decode error: {msg}"),
            Self::Encode(msg) => write!(f, "recalc encode error: {msg}"),
        }
    }
}

impl std::error::Error for RecalcError {}
