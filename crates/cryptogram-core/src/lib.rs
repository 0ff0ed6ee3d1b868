//! Cryptogram engine
//!
//! Builds substitution-cipher puzzles from free text and runs interactive
//! solving sessions over them:
//!
//! - [`KeyGenerator`] produces a [`CipherKey`] for a [`CipherMode`]
//! - [`Puzzle::build`] lays out `(text, key)` as position-stable cells
//! - [`Session`] holds guesses, broadcasts them by token, gives hints and
//!   detects completion
//!
//! ```
//! use cryptogram_core::{CipherMode, KeyGenerator, Session};
//!
//! let key = KeyGenerator::with_seed(7).generate(CipherMode::Symbols);
//! let mut session = Session::new("HOLA", key, CipherMode::Symbols);
//! while session.hint().is_some() {}
//! assert!(session.is_completed());
//! ```

pub mod alphabet;
mod clock;
mod error;
mod generator;
mod key;
pub mod library;
mod mode;
mod puzzle;
pub mod rng;
mod session;
pub mod text_source;

pub use clock::{Ticker, TICK_PERIOD};
pub use error::{CryptogramError, Result};
pub use generator::{KeyGenerator, COLLISION_TOKENS};
pub use key::CipherKey;
pub use library::{Library, LibraryStore, MemoryStore, SavedCryptogram};
pub use mode::CipherMode;
pub use puzzle::{resolve_token, CellId, Puzzle, PuzzleCell};
pub use rng::{RandomSource, SimpleRng};
pub use session::{GuessOutcome, HintKind, HintReveal, PlayerStats, Session};
pub use text_source::{practice_text, StaticTextSource, TextSource, FALLBACK_TEXT};
