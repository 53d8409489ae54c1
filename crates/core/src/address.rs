//! A1-style addressing.

use crate::area::CellCoord;

/// Convert a 1-based column number to letters: 1=A, 26=Z, 27=AA.
/// Returns an empty string for 0.
pub fn number_to_letters(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    while n > 0 {
        let rem = (n - 1) % 26;
        result.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    result
}

/// Convert column letters to a 1-based column number. Case-insensitive.
pub fn letters_to_number(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut n: usize = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    Some(n)
}

pub fn coord_to_address(coord: CellCoord) -> String {
    format!("{}{}", number_to_letters(coord.col), coord.row)
}

/// Parse `B12` / `$B$12` into a coordinate.
pub fn address_to_coord(address: &str) -> Option<CellCoord> {
    let cleaned: String = address.chars().filter(|c| *c != '$').collect();
    let split = cleaned.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cleaned.split_at(split);
    let col = letters_to_number(letters)?;
    let row: usize = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some(CellCoord::new(row, col))
}
