//! Key legend and coordinate tables as plain text lines.
//!
//! Shared by the player screen and the worksheet export.

use cryptogram_core::alphabet::{
    ALPHABET, COORDINATE_COLS, COORDINATE_ROWS, SANDWICH_COLS, SANDWICH_ROWS,
};
use cryptogram_core::{CipherKey, CipherMode};
use unicode_width::UnicodeWidthStr;

/// Columns used by one token slot
pub const SLOT_WIDTH: usize = 4;

/// Letters per legend row
const LEGEND_ROW: usize = 14;

pub fn panel_title(mode: CipherMode) -> &'static str {
    if mode.is_coordinate() {
        "TABLA DE COORDENADAS"
    } else {
        "CLAVE DE SUSTITUCIÓN"
    }
}

pub fn instructions(mode: CipherMode) -> &'static str {
    if mode.is_coordinate() {
        "Busca las coordenadas en la tabla para descifrar el mensaje."
    } else {
        "Descifra el mensaje oculto utilizando la clave."
    }
}

/// Terminal columns taken by `s`. Emoji and CJK take two.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Center `s` in `width` columns
pub fn center(s: &str, width: usize) -> String {
    let w = display_width(s);
    if w >= width {
        return s.to_string();
    }
    let left = (width - w) / 2;
    let right = width - w - left;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(right))
}

/// Key panel for `mode`: the 27-letter legend, or the coordinate table
pub fn panel_lines(key: &CipherKey, mode: CipherMode) -> Vec<String> {
    match mode {
        CipherMode::Coordinates => grid_table(key),
        CipherMode::CoordinatesRows => sandwich_table(key),
        _ => legend(key),
    }
}

/// Letters over tokens, two blocks of at most [`LEGEND_ROW`] letters
fn legend(key: &CipherKey) -> Vec<String> {
    let mut lines = Vec::new();
    for chunk in ALPHABET.chunks(LEGEND_ROW) {
        let letters: String = chunk
            .iter()
            .map(|c| center(&c.to_string(), SLOT_WIDTH))
            .collect();
        let tokens: String = chunk
            .iter()
            .map(|&c| center(key.get(c).unwrap_or(" "), SLOT_WIDTH))
            .collect();
        lines.push(letters.trim_end().to_string());
        lines.push(tokens.trim_end().to_string());
    }
    lines
}

/// 3×9 table with column numbers on top
fn grid_table(key: &CipherKey) -> Vec<String> {
    let mut lines = Vec::new();
    let header: String = (1..=COORDINATE_COLS)
        .map(|col| center(&col.to_string(), SLOT_WIDTH))
        .collect();
    lines.push(format!("   {}", header));
    for row in COORDINATE_ROWS {
        lines.push(format!(" {} {}", row, table_row(key, row, COORDINATE_COLS)));
    }
    lines
}

/// 2×14 table with the column numbers printed between the rows
fn sandwich_table(key: &CipherKey) -> Vec<String> {
    let numbers: String = (1..=SANDWICH_COLS)
        .map(|col| center(&col.to_string(), SLOT_WIDTH))
        .collect();
    let [top, bottom] = SANDWICH_ROWS;
    vec![
        format!(" {} {}", top, table_row(key, top, SANDWICH_COLS)),
        format!("   {}", numbers),
        format!(" {} {}", bottom, table_row(key, bottom, SANDWICH_COLS)),
    ]
}

fn table_row(key: &CipherKey, row: char, cols: usize) -> String {
    (1..=cols)
        .map(|col| {
            let letter = key.letter_at(row, col).unwrap_or(' ');
            center(&format!("[{}]", letter), SLOT_WIDTH)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptogram_core::KeyGenerator;

    #[test]
    fn test_display_width() {
        assert_eq!(display_width("A"), 1);
        assert_eq!(display_width("★"), 1);
        assert_eq!(display_width("🚀"), 2);
        assert_eq!(display_width("⚽"), 2);
        assert_eq!(display_width("D14"), 3);
        assert_eq!(display_width("✅"), 2);
        assert_eq!(display_width("⭐"), 2);
        assert_eq!(display_width("Año ✅"), 6);
    }

    #[test]
    fn test_center_pads_to_width() {
        assert_eq!(center("A", 4), " A  ");
        assert_eq!(display_width(&center("🍎", 4)), 4);
        assert_eq!(center("LONGER", 4), "LONGER");
    }

    #[test]
    fn test_legend_lists_every_letter() {
        let key = KeyGenerator::with_seed(1).generate(CipherMode::Symbols);
        let lines = panel_lines(&key, CipherMode::Symbols);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with(" A"));
        assert!(lines[2].contains('Ñ'));
        let token = key.get('A').unwrap();
        assert!(lines[1].contains(token));
    }

    #[test]
    fn test_grid_table_places_letters() {
        let key = CipherKey::from_pairs([('H', "A1"), ('Z', "D9")]);
        let lines = panel_lines(&key, CipherMode::Coordinates);
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with(" A [H]"));
        assert!(lines[3].starts_with(" D"));
        assert!(lines[3].trim_end().ends_with("[Z]"));
    }

    #[test]
    fn test_sandwich_has_numbers_between_rows() {
        let key = KeyGenerator::with_seed(2).generate(CipherMode::CoordinatesRows);
        let lines = panel_lines(&key, CipherMode::CoordinatesRows);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with(" A"));
        assert!(lines[1].contains("14"));
        assert!(lines[2].starts_with(" D"));
        // The last slot of the bottom row is never used
        assert!(lines[2].trim_end().ends_with("[ ]"));
    }
}
