//! Core types shared across the workspace.
//!
//! Coordinates are 1-based: `A1` is row 1, column 1. Index 0 is the header
//! line of either axis and is never a valid cell.

pub mod address;
pub mod area;
pub mod geometry;

pub use address::{address_to_coord, coord_to_address, letters_to_number, number_to_letters};
pub use area::{Area, Axis, CellCoord, SelectionArea};
pub use geometry::{BorderVariant, Edges, FillDirection, LineShift, ShiftKind};
