use crate::alphabet::ALPHABET;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Letter → token mapping for one puzzle instance.
///
/// Serializes as a flat JSON object (`{"A": "★", ...}`), which is the shape
/// saved records carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CipherKey {
    entries: BTreeMap<char, String>,
}

impl CipherKey {
    /// Create an empty key
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a key from `(letter, token)` pairs; later pairs win
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (char, S)>,
        S: Into<String>,
    {
        let mut key = Self::new();
        for (letter, token) in pairs {
            key.insert(letter, token);
        }
        key
    }

    /// Map `letter` to `token`, returning the previous token
    pub fn insert(&mut self, letter: char, token: impl Into<String>) -> Option<String> {
        self.entries.insert(letter, token.into())
    }

    /// Drop the mapping for `letter`
    pub fn remove(&mut self, letter: char) -> Option<String> {
        self.entries.remove(&letter)
    }

    /// Token for `letter`, if mapped
    pub fn get(&self, letter: char) -> Option<&str> {
        self.entries.get(&letter).map(String::as_str)
    }

    /// Number of mapped letters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(letter, token)` in alphabet order; letters outside the
    /// alphabet (hand-edited keys) come last.
    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> + '_ {
        let known = ALPHABET
            .iter()
            .filter_map(move |&c| self.get(c).map(|t| (c, t)));
        let extra = self
            .entries
            .iter()
            .filter(|(c, _)| !ALPHABET.contains(c))
            .map(|(c, t)| (*c, t.as_str()));
        known.chain(extra)
    }

    /// Every letter encoded as `token`, in alphabet order. Collision keys
    /// return two letters for their shared tokens.
    pub fn letters_for(&self, token: &str) -> Vec<char> {
        self.iter()
            .filter(|(_, t)| *t == token)
            .map(|(c, _)| c)
            .collect()
    }

    /// Letter sitting at coordinate `(row, col)` of a coordinate table.
    ///
    /// Linear scan over the key; tables hold at most 42 cells and keys at
    /// most 27 entries.
    pub fn letter_at(&self, row: char, col: usize) -> Option<char> {
        let coord = format!("{}{}", row, col);
        self.iter().find(|(_, t)| *t == coord).map(|(c, _)| c)
    }

    /// Number of distinct tokens used
    pub fn distinct_tokens(&self) -> usize {
        self.token_groups().len()
    }

    /// Tokens mapped to more than one letter
    pub fn shared_tokens(&self) -> Vec<(&str, Vec<char>)> {
        self.token_groups()
            .into_iter()
            .filter(|(_, letters)| letters.len() > 1)
            .collect()
    }

    fn token_groups(&self) -> BTreeMap<&str, Vec<char>> {
        let mut groups: BTreeMap<&str, Vec<char>> = BTreeMap::new();
        for (letter, token) in self.iter() {
            groups.entry(token).or_default().push(letter);
        }
        groups
    }
}
