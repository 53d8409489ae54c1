//! Formula text handling. Evaluation lives outside this crate; here we only
//! rewrite references when cells move.

pub mod translate;

pub use translate::{shift_formula, translate, AxisShift};
