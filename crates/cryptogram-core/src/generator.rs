use crate::alphabet::{
    ALPHABET, ALPHABET_LEN, COORDINATE_COLS, COORDINATE_ROWS, CYRILLIC, GREEK, SANDWICH_COLS,
    SANDWICH_ROWS, SYMBOLS,
};
use crate::rng::{shuffle, RandomSource, SimpleRng};
use crate::{CipherKey, CipherMode};
use tracing::debug;

/// Distinct tokens used by a collision key
pub const COLLISION_TOKENS: usize = 25;

/// Cipher key generator
pub struct KeyGenerator<R: RandomSource = SimpleRng> {
    rng: R,
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyGenerator {
    /// Create a generator seeded from the OS
    pub fn new() -> Self {
        Self {
            rng: SimpleRng::new(),
        }
    }

    /// Create a generator with a specific seed for reproducibility
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SimpleRng::with_seed(seed),
        }
    }
}

impl<R: RandomSource> KeyGenerator<R> {
    /// Create a generator driven by a custom random source
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate a fresh key for `mode`. Never fails.
    pub fn generate(&mut self, mode: CipherMode) -> CipherKey {
        let key = match mode {
            CipherMode::Letters => {
                let letters: Vec<String> = ALPHABET.iter().map(|c| c.to_string()).collect();
                self.substitution(letters)
            }
            CipherMode::Greek => self.substitution(owned(&GREEK)),
            CipherMode::Cyrillic => self.substitution(owned(&CYRILLIC)),
            CipherMode::Symbols => self.substitution(owned(&SYMBOLS)),
            CipherMode::SymbolsHard => self.collision(owned(&SYMBOLS)),
            CipherMode::Coordinates => self.coordinates(&COORDINATE_ROWS, COORDINATE_COLS),
            CipherMode::CoordinatesRows => self.coordinates(&SANDWICH_ROWS, SANDWICH_COLS),
        };

        debug!(
            mode = mode.as_str(),
            letters = key.len(),
            tokens = key.distinct_tokens(),
            "generated cipher key"
        );
        key
    }

    fn shuffled_alphabet(&mut self) -> Vec<char> {
        let mut letters = ALPHABET.to_vec();
        shuffle(&mut self.rng, &mut letters);
        letters
    }

    /// Pair shuffled letters with shuffled tokens by index. Letters past the
    /// end of a short token set stay unmapped and display as themselves.
    fn substitution(&mut self, mut tokens: Vec<String>) -> CipherKey {
        let letters = self.shuffled_alphabet();
        shuffle(&mut self.rng, &mut tokens);
        tokens.truncate(ALPHABET_LEN);

        CipherKey::from_pairs(letters.into_iter().zip(tokens))
    }

    /// Assign shuffled letters to `<Row><Col>` slots, row-major. Slots left
    /// over after the last letter are unused.
    fn coordinates(&mut self, rows: &[char], cols: usize) -> CipherKey {
        let letters = self.shuffled_alphabet();
        let slots = rows
            .iter()
            .flat_map(|row| (1..=cols).map(move |col| format!("{}{}", row, col)));

        CipherKey::from_pairs(letters.into_iter().zip(slots))
    }

    /// 23 one-to-one pairs plus two tokens that each stand for two letters
    fn collision(&mut self, mut tokens: Vec<String>) -> CipherKey {
        let letters = self.shuffled_alphabet();
        shuffle(&mut self.rng, &mut tokens);
        tokens.truncate(COLLISION_TOKENS);

        let singles = COLLISION_TOKENS - 2;
        let mut key = CipherKey::new();
        for (i, &letter) in letters.iter().enumerate() {
            let token_idx = if i < singles {
                i
            } else {
                // letters 23,24 share token 23; letters 25,26 share token 24
                singles + (i - singles) / 2
            };
            key.insert(letter, tokens[token_idx].clone());
        }
        key
    }
}

fn owned(set: &[&str]) -> Vec<String> {
    set.iter().map(|s| s.to_string()).collect()
}
