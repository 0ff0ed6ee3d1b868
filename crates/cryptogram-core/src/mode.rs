use crate::CryptogramError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Cipher variant used to build a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CipherMode {
    /// Shuffled Latin alphabet
    Letters,
    /// Greek capitals (only 24, three letters pass through)
    Greek,
    /// Cyrillic capitals
    Cyrillic,
    /// Pictographic symbols
    Symbols,
    /// Symbols where two tokens stand for two letters each
    SymbolsHard,
    /// `<Row><Col>` codes on a 3×9 table
    Coordinates,
    /// `<Row><Col>` codes on a 2×14 table
    CoordinatesRows,
}

impl Default for CipherMode {
    fn default() -> Self {
        Self::Symbols
    }
}

impl CipherMode {
    /// All modes, in declaration order
    pub fn all() -> &'static [CipherMode] {
        &[
            CipherMode::Letters,
            CipherMode::Greek,
            CipherMode::Cyrillic,
            CipherMode::Symbols,
            CipherMode::SymbolsHard,
            CipherMode::Coordinates,
            CipherMode::CoordinatesRows,
        ]
    }

    /// Modes offered in the editor
    pub fn selectable() -> &'static [CipherMode] {
        &[
            CipherMode::Letters,
            CipherMode::Symbols,
            CipherMode::SymbolsHard,
            CipherMode::Greek,
            CipherMode::Coordinates,
            CipherMode::CoordinatesRows,
        ]
    }

    /// Short label shown on library cards and mode buttons
    pub fn display_name(&self) -> &'static str {
        match self {
            CipherMode::Letters => "LETRAS",
            CipherMode::Greek => "GRIEGO",
            CipherMode::Cyrillic => "CIRÍLICO",
            CipherMode::Symbols => "SÍMBOLOS",
            CipherMode::SymbolsHard => "SÍMB. DIFÍCIL",
            CipherMode::Coordinates => "COORDENADAS",
            CipherMode::CoordinatesRows => "FILAS COORD.",
        }
    }

    /// Wire name used in saved records
    pub fn as_str(&self) -> &'static str {
        match self {
            CipherMode::Letters => "LETTERS",
            CipherMode::Greek => "GREEK",
            CipherMode::Cyrillic => "CYRILLIC",
            CipherMode::Symbols => "SYMBOLS",
            CipherMode::SymbolsHard => "SYMBOLS_HARD",
            CipherMode::Coordinates => "COORDINATES",
            CipherMode::CoordinatesRows => "COORDINATES_ROWS",
        }
    }

    /// Tokens are `<Row><Col>` codes
    pub fn is_coordinate(&self) -> bool {
        matches!(self, CipherMode::Coordinates | CipherMode::CoordinatesRows)
    }

    /// Two-row table with the column numbers printed between the rows
    pub fn is_sandwich(&self) -> bool {
        matches!(self, CipherMode::CoordinatesRows)
    }

    /// Some tokens deliberately stand for more than one letter
    pub fn has_collisions(&self) -> bool {
        matches!(self, CipherMode::SymbolsHard)
    }
}

impl std::fmt::Display for CipherMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for CipherMode {
    type Err = CryptogramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_uppercase();
        CipherMode::all()
            .iter()
            .copied()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| CryptogramError::UnknownMode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_match_serde() {
        for mode in CipherMode::all() {
            let json = serde_json::to_string(mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.as_str()));
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("symbols-hard".parse::<CipherMode>().unwrap(), CipherMode::SymbolsHard);
        assert_eq!("COORDINATES_ROWS".parse::<CipherMode>().unwrap(), CipherMode::CoordinatesRows);
        assert!("klingon".parse::<CipherMode>().is_err());
    }

    #[test]
    fn test_mode_flags() {
        assert!(CipherMode::Coordinates.is_coordinate());
        assert!(!CipherMode::Coordinates.is_sandwich());
        assert!(CipherMode::CoordinatesRows.is_sandwich());
        assert!(CipherMode::SymbolsHard.has_collisions());
        assert!(!CipherMode::selectable().contains(&CipherMode::Cyrillic));
    }
}
