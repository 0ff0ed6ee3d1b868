//! Interactive solving engine.
//!
//! A [`Session`] owns the guesses and player statistics for one puzzle. A
//! guess on any cell is broadcast to every solvable cell showing the same
//! token, completion is re-evaluated after each mutation, and hints fix one
//! whole token group at a time.

use crate::alphabet::{normalize, to_upper};
use crate::clock::Ticker;
use crate::rng::{RandomSource, SimpleRng};
use crate::{CellId, CipherKey, CipherMode, CryptogramError, Puzzle, PuzzleCell, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// Statistics for one solving session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub hints_used: usize,
    pub mistakes: usize,
    pub elapsed_seconds: u64,
    /// Once set it stays set for the rest of the session
    pub completed: bool,
}

/// What a call to [`Session::set_guess`] or [`Session::clear_guess`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuessOutcome {
    /// Cells whose guess changed
    pub changed: usize,
    /// Whether the guess is right for the cell it was entered on
    pub correct: bool,
    /// The puzzle went from incomplete to complete with this call.
    /// Reported at most once per session.
    pub completed_now: bool,
}

/// How a hint was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintKind {
    /// A filled-in but wrong token group was fixed
    Corrected,
    /// An empty token group was revealed
    Revealed,
}

/// Result of a hint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintReveal {
    pub kind: HintKind,
    /// Cell the hint was aimed at
    pub target: CellId,
    /// Cells whose guess was written by the hint
    pub filled: Vec<CellId>,
    pub completed_now: bool,
}

/// One puzzle-solving session
pub struct Session<R: RandomSource = SimpleRng> {
    puzzle: Puzzle,
    key: CipherKey,
    mode: CipherMode,
    tilde_assistant: bool,
    guesses: HashMap<CellId, char>,
    selected: Option<CellId>,
    stats: PlayerStats,
    clock: Option<Ticker>,
    rng: R,
}

impl Session {
    /// Start a session for `text` encoded with `key`
    pub fn new(text: &str, key: CipherKey, mode: CipherMode) -> Self {
        Self::with_rng(text, key, mode, SimpleRng::new())
    }
}

impl<R: RandomSource> Session<R> {
    /// Start a session whose random hint picks come from `rng`
    pub fn with_rng(text: &str, key: CipherKey, mode: CipherMode, rng: R) -> Self {
        let puzzle = Puzzle::build(text, &key);
        info!(
            mode = mode.as_str(),
            cells = puzzle.cells().len(),
            solvable = puzzle.solvable_count(),
            "session started"
        );
        let selected = puzzle.solvable_cells().next().map(|c| c.id);
        Self {
            puzzle,
            key,
            mode,
            tilde_assistant: false,
            guesses: HashMap::new(),
            selected,
            stats: PlayerStats::default(),
            clock: None,
            rng,
        }
    }

    /// Show accent markers over accented cells
    pub fn with_tilde_assistant(mut self, enabled: bool) -> Self {
        self.tilde_assistant = enabled;
        self
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn key(&self) -> &CipherKey {
        &self.key
    }

    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    pub fn tilde_assistant(&self) -> bool {
        self.tilde_assistant
    }

    pub fn stats(&self) -> PlayerStats {
        self.stats
    }

    pub fn is_completed(&self) -> bool {
        self.stats.completed
    }

    /// Current guess for a cell
    pub fn guess(&self, id: CellId) -> Option<char> {
        self.guesses.get(&id).copied()
    }

    /// `Some(true)` when the cell holds its answer, `Some(false)` when it holds
    /// something else, `None` when empty or not solvable
    pub fn is_correct(&self, id: CellId) -> Option<bool> {
        let cell = self.puzzle.cell(id)?;
        self.guess(id).map(|g| g == cell.answer())
    }

    /// Whether the tilde marker should be drawn over `id`
    pub fn shows_accent(&self, id: CellId) -> bool {
        self.tilde_assistant && self.puzzle.cell(id).is_some_and(|c| c.accented)
    }

    pub fn selected(&self) -> Option<CellId> {
        self.selected
    }

    /// Focus a cell. Only solvable cells can be selected.
    pub fn select(&mut self, id: CellId) -> Result<()> {
        self.solvable_cell(id)?;
        self.selected = Some(id);
        Ok(())
    }

    /// Move the selection to the next/previous solvable cell
    pub fn move_selection(&mut self, forward: bool) -> Option<CellId> {
        let from = self.selected.unwrap_or(CellId(0));
        if let Some(next) = self.puzzle.next_solvable(from, forward) {
            self.selected = Some(next);
        }
        self.selected
    }

    /// Number of solvable cells that currently hold a guess
    pub fn filled_count(&self) -> usize {
        self.puzzle
            .solvable_cells()
            .filter(|c| self.guesses.contains_key(&c.id))
            .count()
    }

    /// Write `letter` into every solvable cell that shares the token of `id`.
    ///
    /// In collision keys the group spans two letters, so one of them ends up
    /// wrong; that ambiguity is part of the puzzle. A no-op once completed.
    pub fn set_guess(&mut self, id: CellId, letter: char) -> Result<GuessOutcome> {
        let cell = self.solvable_cell(id)?;
        let answer = cell.answer();
        let letter = normalize(letter);
        let correct = letter == answer;

        if self.stats.completed {
            return Ok(GuessOutcome {
                correct,
                ..GuessOutcome::default()
            });
        }

        let previous = self.guess(id);
        let changed = self.broadcast(id, Some(letter));
        if !correct && previous != Some(letter) {
            self.stats.mistakes += 1;
        }

        let completed_now = self.refresh_completion();
        debug!(cell = %id, %letter, changed, correct, "guess");
        Ok(GuessOutcome {
            changed,
            correct,
            completed_now,
        })
    }

    /// Remove the guess from every cell sharing the token of `id`
    pub fn clear_guess(&mut self, id: CellId) -> Result<GuessOutcome> {
        self.solvable_cell(id)?;
        if self.stats.completed {
            return Ok(GuessOutcome::default());
        }
        let changed = self.broadcast(id, None);
        Ok(GuessOutcome {
            changed,
            ..GuessOutcome::default()
        })
    }

    /// Apply raw text typed into a cell: the last character counts, an empty
    /// string clears the cell
    pub fn input(&mut self, id: CellId, raw: &str) -> Result<GuessOutcome> {
        match raw.chars().last() {
            Some(c) if !c.is_whitespace() => self.set_guess(id, to_upper(c)),
            _ => self.clear_guess(id),
        }
    }

    /// Completion predicate: every solvable cell filled with its answer
    pub fn check_completion(&self) -> bool {
        self.puzzle
            .solvable_cells()
            .all(|c| self.guesses.get(&c.id) == Some(&c.answer()))
    }

    /// Number of token groups that still have an empty or wrong cell
    pub fn unresolved_groups(&self) -> usize {
        self.puzzle
            .token_groups()
            .into_iter()
            .filter(|group| !self.group_solved(group))
            .count()
    }

    /// Tokens whose every cell holds its answer
    pub fn solved_tokens(&self) -> Vec<&str> {
        self.puzzle
            .token_groups()
            .into_iter()
            .filter(|group| self.group_solved(group))
            .filter_map(|group| group.first())
            .filter_map(|&id| self.puzzle.cell(id))
            .map(|cell| cell.token.as_str())
            .collect()
    }

    /// Reveal or fix one token group.
    ///
    /// Wrong groups are fixed first (earliest cell wins). Otherwise the
    /// selected cell is revealed when empty, else a uniformly random empty
    /// cell. Every cell of the group receives its own answer, which keeps
    /// collision groups correct too. Returns `None` without counting a hint
    /// when completed or when nothing is left to reveal.
    pub fn hint(&mut self) -> Option<HintReveal> {
        if self.stats.completed {
            return None;
        }

        let (kind, target) = if let Some(wrong) = self.first_wrong_cell() {
            (HintKind::Corrected, wrong)
        } else {
            let empty: Vec<CellId> = self
                .puzzle
                .solvable_cells()
                .filter(|c| !self.guesses.contains_key(&c.id))
                .map(|c| c.id)
                .collect();
            if empty.is_empty() {
                return None;
            }
            let target = match self.selected {
                Some(sel) if empty.contains(&sel) => sel,
                _ => empty[self.rng.next_usize(empty.len())],
            };
            (HintKind::Revealed, target)
        };

        let group: Vec<CellId> = self.puzzle.group_of(target).to_vec();
        let mut filled = Vec::new();
        for id in group {
            let Some(answer) = self.puzzle.cell(id).map(PuzzleCell::answer) else {
                continue;
            };
            if self.guesses.insert(id, answer) != Some(answer) {
                filled.push(id);
            }
        }

        self.stats.hints_used += 1;
        let completed_now = self.refresh_completion();
        debug!(target = %target, ?kind, filled = filled.len(), "hint");

        Some(HintReveal {
            kind,
            target,
            filled,
            completed_now,
        })
    }

    /// Count one second of play. Does nothing once completed.
    pub fn tick(&mut self) -> bool {
        if self.stats.completed {
            return false;
        }
        self.stats.elapsed_seconds += 1;
        true
    }

    /// Start the background ticker feeding [`Session::pump_clock`]
    pub fn start_clock(&mut self, period: Duration) {
        if self.stats.completed {
            return;
        }
        self.clock = Some(Ticker::spawn(period));
    }

    /// Apply the ticks collected since the last call
    pub fn pump_clock(&mut self) -> u64 {
        let pending = self.clock.as_ref().map_or(0, Ticker::drain);
        (0..pending).filter(|_| self.tick()).count() as u64
    }

    /// Whether a ticker is attached and alive
    pub fn clock_running(&self) -> bool {
        self.clock.as_ref().is_some_and(Ticker::is_running)
    }

    /// Cancel the ticker, if any
    pub fn stop_clock(&mut self) {
        if let Some(mut clock) = self.clock.take() {
            clock.cancel();
        }
    }

    fn solvable_cell(&self, id: CellId) -> Result<&PuzzleCell> {
        let cell = self
            .puzzle
            .cell(id)
            .ok_or(CryptogramError::UnknownCell(id))?;
        if !cell.solvable {
            return Err(CryptogramError::NotSolvable(id));
        }
        Ok(cell)
    }

    fn broadcast(&mut self, id: CellId, letter: Option<char>) -> usize {
        let mut changed = 0;
        for &member in self.puzzle.group_of(id) {
            let previous = match letter {
                Some(l) => self.guesses.insert(member, l),
                None => self.guesses.remove(&member),
            };
            if previous != letter {
                changed += 1;
            }
        }
        changed
    }

    fn first_wrong_cell(&self) -> Option<CellId> {
        self.puzzle
            .solvable_cells()
            .find(|c| self.guesses.get(&c.id).is_some_and(|g| *g != c.answer()))
            .map(|c| c.id)
    }

    fn group_solved(&self, group: &[CellId]) -> bool {
        group.iter().all(|&id| self.is_correct(id) == Some(true))
    }

    /// Latch completion; true only on the incomplete → complete edge
    fn refresh_completion(&mut self) -> bool {
        if self.stats.completed || !self.check_completion() {
            return false;
        }
        self.stats.completed = true;
        self.stop_clock();
        info!(
            hints = self.stats.hints_used,
            mistakes = self.stats.mistakes,
            seconds = self.stats.elapsed_seconds,
            "puzzle completed"
        );
        true
    }
}

impl<R: RandomSource> std::fmt::Debug for Session<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.mode)
            .field("text", &self.puzzle.text())
            .field("filled", &self.filled_count())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyGenerator;

    fn hola() -> Session {
        let key = CipherKey::from_pairs([('H', "3"), ('O', "7"), ('L', "9"), ('A', "1")]);
        Session::with_rng("HOLA", key, CipherMode::Letters, SimpleRng::with_seed(1))
    }

    fn seeded(text: &str, mode: CipherMode, seed: u64) -> Session {
        let key = KeyGenerator::with_seed(seed).generate(mode);
        Session::with_rng(text, key, mode, SimpleRng::with_seed(seed))
    }

    #[test]
    fn test_hola_completion() {
        let mut session = hola();
        let outcome = session.set_guess(CellId(1), 'O').unwrap();
        assert!(outcome.correct);
        assert!(!outcome.completed_now);
        assert!(!session.check_completion());
        assert_eq!(session.unresolved_groups(), 3);

        session.set_guess(CellId(0), 'H').unwrap();
        session.set_guess(CellId(2), 'L').unwrap();
        let outcome = session.set_guess(CellId(3), 'A').unwrap();
        assert!(outcome.completed_now);
        assert!(session.is_completed());
        assert!(session.check_completion());
    }

    #[test]
    fn test_solved_tokens_tracks_groups() {
        let mut session = hola();
        assert!(session.solved_tokens().is_empty());
        session.set_guess(CellId(2), 'L').unwrap();
        assert_eq!(session.solved_tokens(), vec!["9"]);
        session.set_guess(CellId(0), 'X').unwrap();
        assert_eq!(session.solved_tokens(), vec!["9"]);
    }

    #[test]
    fn test_broadcast_to_token_group() {
        let mut session = seeded("la casa blanca", CipherMode::Symbols, 4);
        // LA CASA BLANCA: A at 1, 3, 5, 8, 11
        let outcome = session.set_guess(CellId(1), 'E').unwrap();
        assert_eq!(outcome.changed, 5);
        assert!(!outcome.correct);
        for cell in session.puzzle().cells() {
            let expected = if cell.original == 'A' { Some('E') } else { None };
            assert_eq!(session.guess(cell.id), expected, "{}", cell.id);
        }
    }

    #[test]
    fn test_broadcast_invariant_every_cell() {
        let text = "El murciélago hindú comía feliz cardillo y kiwi";
        for mode in CipherMode::all() {
            let mut session = seeded(text, *mode, 9);
            let cells: Vec<PuzzleCell> = session.puzzle().solvable_cells().cloned().collect();
            for (i, cell) in cells.iter().enumerate() {
                let letter = crate::alphabet::ALPHABET[i % 27];
                session.set_guess(cell.id, letter).unwrap();
                for other in session.puzzle().solvable_cells() {
                    if other.token == cell.token {
                        assert_eq!(session.guess(other.id), Some(letter));
                    }
                }
            }
        }
    }

    #[test]
    fn test_set_guess_idempotent() {
        let mut session = seeded("perro parque", CipherMode::Symbols, 2);
        session.set_guess(CellId(0), 'X').unwrap();
        let stats = session.stats();
        let guesses = session.guesses.clone();

        let again = session.set_guess(CellId(0), 'X').unwrap();
        assert_eq!(again.changed, 0);
        assert_eq!(session.stats(), stats);
        assert_eq!(session.guesses, guesses);
    }

    #[test]
    fn test_mistakes_count_changed_wrong_guesses() {
        let mut session = hola();
        session.set_guess(CellId(0), 'X').unwrap();
        session.set_guess(CellId(0), 'X').unwrap();
        assert_eq!(session.stats().mistakes, 1);
        session.set_guess(CellId(0), 'H').unwrap();
        session.set_guess(CellId(0), 'Y').unwrap();
        assert_eq!(session.stats().mistakes, 2);
    }

    #[test]
    fn test_rejects_unknown_and_unsolvable_cells() {
        let mut session = seeded("sí, 2", CipherMode::Symbols, 1);
        assert_eq!(
            session.set_guess(CellId(99), 'A'),
            Err(CryptogramError::UnknownCell(CellId(99)))
        );
        assert_eq!(
            session.set_guess(CellId(2), 'A'),
            Err(CryptogramError::NotSolvable(CellId(2)))
        );
        assert!(session.select(CellId(3)).is_err());
    }

    #[test]
    fn test_accented_cells_accept_base_letter() {
        let mut session = seeded("ÉL", CipherMode::Symbols, 6);
        session.set_guess(CellId(0), 'e').unwrap();
        assert_eq!(session.guess(CellId(0)), Some('E'));
        let outcome = session.set_guess(CellId(1), 'L').unwrap();
        assert!(outcome.completed_now);

        let mut session = seeded("ÉL", CipherMode::Symbols, 6).with_tilde_assistant(true);
        assert!(session.shows_accent(CellId(0)));
        assert!(!session.shows_accent(CellId(1)));
        session.set_guess(CellId(0), 'É').unwrap();
        assert_eq!(session.is_correct(CellId(0)), Some(true));
    }

    #[test]
    fn test_completion_edge_fires_once() {
        let mut session = hola();
        for (i, c) in "HOL".chars().enumerate() {
            session.set_guess(CellId(i), c).unwrap();
        }
        assert!(session.set_guess(CellId(3), 'A').unwrap().completed_now);

        // Further input is ignored and does not re-trigger
        let after = session.set_guess(CellId(3), 'A').unwrap();
        assert!(!after.completed_now);
        assert_eq!(after.changed, 0);
        assert!(session.set_guess(CellId(3), 'Z').unwrap().changed == 0);
        assert!(session.is_completed());
        assert!(session.hint().is_none());
    }

    #[test]
    fn test_completion_fails_on_mismatch() {
        let mut session = hola();
        for (i, c) in "HOLE".chars().enumerate() {
            session.set_guess(CellId(i), c).unwrap();
        }
        assert!(!session.check_completion());
        assert!(!session.is_completed());
    }

    #[test]
    fn test_clear_guess_clears_group() {
        let mut session = seeded("ana", CipherMode::Symbols, 3);
        session.set_guess(CellId(0), 'A').unwrap();
        assert_eq!(session.filled_count(), 2);
        let outcome = session.input(CellId(2), "").unwrap();
        assert_eq!(outcome.changed, 2);
        assert_eq!(session.filled_count(), 0);
    }

    #[test]
    fn test_input_takes_last_character() {
        let mut session = hola();
        session.input(CellId(0), "xh").unwrap();
        assert_eq!(session.guess(CellId(0)), Some('H'));
    }

    #[test]
    fn test_hint_prefers_wrong_groups() {
        let mut session = hola();
        session.set_guess(CellId(2), 'X').unwrap();
        let hint = session.hint().unwrap();
        assert_eq!(hint.kind, HintKind::Corrected);
        assert_eq!(hint.target, CellId(2));
        assert_eq!(session.guess(CellId(2)), Some('L'));
        assert_eq!(session.stats().hints_used, 1);
    }

    #[test]
    fn test_hint_reveals_selected_empty_cell() {
        let mut session = hola();
        session.select(CellId(3)).unwrap();
        let hint = session.hint().unwrap();
        assert_eq!(hint.kind, HintKind::Revealed);
        assert_eq!(hint.target, CellId(3));
        assert_eq!(hint.filled, vec![CellId(3)]);
    }

    #[test]
    fn test_hint_monotonic_until_complete() {
        let text = "Había una vez un niño que quería ver el mundo";
        for mode in CipherMode::all() {
            let mut session = seeded(text, *mode, 21);
            // Seed a few wrong guesses
            session.set_guess(CellId(0), 'Q').unwrap();
            session.set_guess(CellId(6), 'Z').unwrap();

            let mut hints = 0;
            while !session.is_completed() {
                let before = session.unresolved_groups();
                let reveal = session.hint().expect("incomplete puzzle must yield a hint");
                hints += 1;
                assert!(!reveal.filled.is_empty());
                assert!(session.unresolved_groups() < before, "{:?}", mode);
                assert_eq!(session.stats().hints_used, hints);
            }
            assert_eq!(session.unresolved_groups(), 0);
            assert!(session.hint().is_none());
            assert_eq!(session.stats().hints_used, hints);
        }
    }

    #[test]
    fn test_collision_groups_are_ambiguous_for_guesses() {
        let key = CipherKey::from_pairs([('S', "★"), ('O', "★"), ('L', "☀")]);
        let mut session =
            Session::with_rng("SOL", key, CipherMode::SymbolsHard, SimpleRng::with_seed(0));
        session.set_guess(CellId(0), 'S').unwrap();
        assert_eq!(session.guess(CellId(1)), Some('S'));
        assert_eq!(session.is_correct(CellId(1)), Some(false));

        // A hint resolves the shared token letter by letter
        let hint = session.hint().unwrap();
        assert_eq!(hint.target, CellId(1));
        assert_eq!(session.guess(CellId(0)), Some('S'));
        assert_eq!(session.guess(CellId(1)), Some('O'));
    }

    #[test]
    fn test_tick_stops_after_completion() {
        let mut session = hola();
        assert!(session.tick());
        assert!(session.tick());
        assert_eq!(session.stats().elapsed_seconds, 2);

        while session.hint().is_some() {}
        assert!(session.is_completed());
        assert!(!session.tick());
        assert_eq!(session.stats().elapsed_seconds, 2);
    }

    #[test]
    fn test_clock_cancelled_on_completion() {
        let mut session = hola();
        session.start_clock(Duration::from_millis(5));
        assert!(session.clock_running());

        while session.hint().is_some() {}
        assert!(session.is_completed());
        assert!(!session.clock_running());
        assert!(session.clock.is_none());

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(session.pump_clock(), 0);
    }

    #[test]
    fn test_clock_feeds_elapsed_seconds() {
        let mut session = hola();
        session.start_clock(Duration::from_millis(5));
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while session.stats().elapsed_seconds == 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
            session.pump_clock();
        }
        assert!(session.stats().elapsed_seconds > 0);
        session.stop_clock();
        assert!(!session.clock_running());
    }

    #[test]
    fn test_new_session_starts_clean() {
        let key = KeyGenerator::with_seed(1).generate(CipherMode::Symbols);
        let mut first = Session::new("gato", key.clone(), CipherMode::Symbols);
        first.set_guess(CellId(0), 'X').unwrap();
        first.hint();

        let second = Session::new("gato", key, CipherMode::Symbols);
        assert_eq!(second.stats(), PlayerStats::default());
        assert_eq!(second.filled_count(), 0);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let stats = PlayerStats {
            hints_used: 2,
            mistakes: 1,
            elapsed_seconds: 40,
            completed: true,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(
            json,
            r#"{"hintsUsed":2,"mistakes":1,"elapsedSeconds":40,"completed":true}"#
        );
    }
}
