//! Token resolution and the position-stable cell layout of a puzzle.

use crate::alphabet::{self, to_upper};
use crate::CipherKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Range;

/// Resolve the display token for an arbitrary input character.
///
/// Direct lookup of the uppercased character first, then the base letter
/// for accented vowels, otherwise the character itself (punctuation, digits,
/// letters a short token set left unmapped).
pub fn resolve_token(c: char, key: &CipherKey) -> String {
    let upper = to_upper(c);
    if let Some(token) = key.get(upper) {
        return token.to_string();
    }
    if let Some(token) = alphabet::base_letter(upper).and_then(|base| key.get(base)) {
        return token.to_string();
    }
    c.to_string()
}

/// Stable identifier of a cell: its position in the uppercased text,
/// counted word by word with whitespace skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub usize);

impl CellId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "char-{}", self.0)
    }
}

/// One character position of the puzzle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleCell {
    pub id: CellId,
    /// Character from the uppercased source text
    pub original: char,
    /// Token displayed above the cell
    pub token: String,
    /// Whether the cell takes a guess (letters and accented vowels)
    pub solvable: bool,
    /// Whether the original carries an accent
    pub accented: bool,
}

impl PuzzleCell {
    /// Letter a guess has to match. Accented vowels accept their base letter.
    pub fn answer(&self) -> char {
        alphabet::normalize(self.original)
    }
}

/// Cell layout built from `(text, key)`.
///
/// Words keep their order and every non-whitespace character becomes a cell,
/// so rendering stays 1:1 with the source. Building twice from the same
/// inputs yields identical ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    text: String,
    cells: Vec<PuzzleCell>,
    words: Vec<Range<usize>>,
    /// Token → solvable cells showing it, in id order
    token_index: HashMap<String, Vec<CellId>>,
}

impl Puzzle {
    pub fn build(text: &str, key: &CipherKey) -> Self {
        let upper = text.to_uppercase();
        let mut cells = Vec::new();
        let mut words = Vec::new();
        let mut token_index: HashMap<String, Vec<CellId>> = HashMap::new();

        for word in upper.split_whitespace() {
            let start = cells.len();
            for original in word.chars() {
                let id = CellId(cells.len());
                let token = resolve_token(original, key);
                let solvable = alphabet::is_solvable(original);
                if solvable {
                    token_index.entry(token.clone()).or_default().push(id);
                }
                cells.push(PuzzleCell {
                    id,
                    original,
                    token,
                    solvable,
                    accented: alphabet::is_accented(original),
                });
            }
            words.push(start..cells.len());
        }

        Self {
            text: text.to_string(),
            cells,
            words,
            token_index,
        }
    }

    /// Source text as given
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All cells in id order
    pub fn cells(&self) -> &[PuzzleCell] {
        &self.cells
    }

    pub fn cell(&self, id: CellId) -> Option<&PuzzleCell> {
        self.cells.get(id.0)
    }

    /// Cells grouped by word
    pub fn words(&self) -> impl Iterator<Item = &[PuzzleCell]> + '_ {
        self.words.iter().map(move |range| &self.cells[range.clone()])
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn solvable_cells(&self) -> impl Iterator<Item = &PuzzleCell> + '_ {
        self.cells.iter().filter(|c| c.solvable)
    }

    pub fn solvable_count(&self) -> usize {
        self.solvable_cells().count()
    }

    /// Solvable cells sharing `token`
    pub fn token_group(&self, token: &str) -> &[CellId] {
        self.token_index
            .get(token)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Solvable cells sharing the token of `id` (including `id` itself)
    pub fn group_of(&self, id: CellId) -> &[CellId] {
        match self.cell(id) {
            Some(cell) if cell.solvable => self.token_group(&cell.token),
            _ => &[],
        }
    }

    /// Every token group, ordered by the first cell showing it
    pub fn token_groups(&self) -> Vec<&[CellId]> {
        let mut groups: Vec<&[CellId]> = self.token_index.values().map(Vec::as_slice).collect();
        groups.sort_by_key(|g| g.first().copied());
        groups
    }

    /// First cell at or after `from` (wrapping) that takes a guess
    pub fn next_solvable(&self, from: CellId, forward: bool) -> Option<CellId> {
        let n = self.cells.len();
        if n == 0 {
            return None;
        }
        (1..=n)
            .map(|step| {
                if forward {
                    (from.0 + step) % n
                } else {
                    (from.0 + n * 2 - step % n) % n
                }
            })
            .map(CellId)
            .find(|id| self.cells[id.0].solvable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CipherMode, KeyGenerator};

    fn hola_key() -> CipherKey {
        CipherKey::from_pairs([('H', "3"), ('O', "7"), ('L', "9"), ('A', "1")])
    }

    #[test]
    fn test_resolve_token_lookup_order() {
        let key = CipherKey::from_pairs([('A', "★"), ('E', "☀")]);
        assert_eq!(resolve_token('a', &key), "★");
        assert_eq!(resolve_token('Á', &key), "★");
        assert_eq!(resolve_token('é', &key), "☀");
        assert_eq!(resolve_token(',', &key), ",");
        assert_eq!(resolve_token('7', &key), "7");
        // Unmapped letter passes through unchanged
        assert_eq!(resolve_token('z', &key), "z");
    }

    #[test]
    fn test_build_hola() {
        let puzzle = Puzzle::build("hola", &hola_key());
        let tokens: Vec<&str> = puzzle.cells().iter().map(|c| c.token.as_str()).collect();
        assert_eq!(tokens, vec!["3", "7", "9", "1"]);
        assert!(puzzle.cells().iter().all(|c| c.solvable));
    }

    #[test]
    fn test_ids_are_word_major_and_skip_whitespace() {
        let puzzle = Puzzle::build("  el   sol\tbrilla ", &CipherKey::new());
        assert_eq!(puzzle.word_count(), 3);
        let words: Vec<String> = puzzle
            .words()
            .map(|w| w.iter().map(|c| c.original).collect())
            .collect();
        assert_eq!(words, vec!["EL", "SOL", "BRILLA"]);

        let ids: Vec<usize> = puzzle.cells().iter().map(|c| c.id.index()).collect();
        assert_eq!(ids, (0..11).collect::<Vec<_>>());
        assert_eq!(puzzle.cells()[2].id.to_string(), "char-2");
    }

    #[test]
    fn test_build_is_stable() {
        let key = KeyGenerator::with_seed(5).generate(CipherMode::Symbols);
        let text = "¿Dónde está el 2º gato?";
        assert_eq!(Puzzle::build(text, &key), Puzzle::build(text, &key));
    }

    #[test]
    fn test_non_letters_become_unsolvable_cells() {
        let key = KeyGenerator::with_seed(5).generate(CipherMode::Symbols);
        let puzzle = Puzzle::build("¡Hola, 2!", &key);
        let originals: String = puzzle.cells().iter().map(|c| c.original).collect();
        assert_eq!(originals, "¡HOLA,2!");
        assert_eq!(puzzle.solvable_count(), 4);
        let digit = &puzzle.cells()[6];
        assert!(!digit.solvable);
        assert_eq!(digit.token, "2");
    }

    #[test]
    fn test_accented_cells_share_the_base_token() {
        let key = KeyGenerator::with_seed(8).generate(CipherMode::Symbols);
        let puzzle = Puzzle::build("está este", &key);
        let a_accent = &puzzle.cells()[3];
        assert!(a_accent.accented);
        assert_eq!(a_accent.answer(), 'A');
        assert_eq!(a_accent.token, key.get('A').unwrap());

        let e_group = puzzle.group_of(CellId(0));
        assert_eq!(e_group, &[CellId(0), CellId(4), CellId(7)]);
    }

    #[test]
    fn test_round_trip_through_inverse_key() {
        for (seed, mode) in CipherMode::all().iter().enumerate() {
            let key = KeyGenerator::with_seed(seed as u64).generate(*mode);
            let puzzle = Puzzle::build("Murciélago veloz, ñandú y pingüino", &key);
            for cell in puzzle.solvable_cells() {
                let letters = key.letters_for(&cell.token);
                if letters.is_empty() {
                    // Short token set: the letter passes through as itself
                    assert_eq!(cell.token, cell.original.to_string());
                } else {
                    assert!(letters.len() <= 2);
                    assert!(letters.contains(&cell.answer()), "{:?} {:?}", mode, cell);
                }
            }
        }
    }

    #[test]
    fn test_next_solvable_wraps() {
        let puzzle = Puzzle::build("a, b", &CipherKey::new());
        assert_eq!(puzzle.next_solvable(CellId(0), true), Some(CellId(2)));
        assert_eq!(puzzle.next_solvable(CellId(2), true), Some(CellId(0)));
        assert_eq!(puzzle.next_solvable(CellId(0), false), Some(CellId(2)));
    }
}
