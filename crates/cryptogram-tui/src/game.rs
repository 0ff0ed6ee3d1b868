use crate::animations::GroupCelebrations;
use cryptogram_core::alphabet::{is_solvable, to_upper};
use cryptogram_core::{
    CellId, CipherKey, CipherMode, GuessOutcome, HintKind, PlayerStats, SavedCryptogram, Session,
    TICK_PERIOD,
};
use tracing::debug;

/// What the last input did, for the message bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveFeedback {
    None,
    Guessed(GuessOutcome),
    Cleared,
    Hint(HintKind),
    NoHint,
    Ignored,
}

/// A cryptogram being played in the terminal
pub struct Game {
    session: Session,
    celebrations: GroupCelebrations,
    /// Set on the completion edge, taken once by the app
    just_completed: bool,
}

impl Game {
    /// Start playing `text` and start the session clock
    pub fn new(text: &str, key: CipherKey, mode: CipherMode, tilde_assistant: bool) -> Self {
        let session = Session::new(text, key, mode).with_tilde_assistant(tilde_assistant);
        Self::from_session(session)
    }

    /// Start playing a library entry
    pub fn from_saved(saved: &SavedCryptogram) -> Self {
        Self::from_session(saved.start_session())
    }

    fn from_session(mut session: Session) -> Self {
        session.start_clock(TICK_PERIOD);
        let mut celebrations = GroupCelebrations::new();
        celebrations.reset(&session.solved_tokens());
        Self {
            session,
            celebrations,
            just_completed: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn celebrations(&self) -> &GroupCelebrations {
        &self.celebrations
    }

    pub fn stats(&self) -> PlayerStats {
        self.session.stats()
    }

    pub fn is_completed(&self) -> bool {
        self.session.is_completed()
    }

    pub fn selected(&self) -> Option<CellId> {
        self.session.selected()
    }

    /// Format the elapsed time as MM:SS
    pub fn elapsed_string(&self) -> String {
        format_elapsed(self.session.stats().elapsed_seconds)
    }

    /// Type `c` into the selected cell, as if appended to what the box
    /// already holds. Anything that is not a Spanish letter is ignored.
    pub fn type_letter(&mut self, c: char) -> MoveFeedback {
        let upper = to_upper(c);
        if !is_solvable(upper) {
            return MoveFeedback::Ignored;
        }
        let Some(id) = self.session.selected() else {
            return MoveFeedback::Ignored;
        };
        let mut raw: String = self.session.guess(id).into_iter().collect();
        raw.push(upper);
        match self.session.input(id, &raw) {
            Ok(outcome) => {
                self.note_completion(outcome.completed_now);
                if !self.session.is_completed() {
                    self.session.move_selection(true);
                }
                MoveFeedback::Guessed(outcome)
            }
            Err(e) => {
                debug!(error = %e, "guess rejected");
                MoveFeedback::Ignored
            }
        }
    }

    /// Clear the token group of the selected cell
    pub fn clear_selected(&mut self) -> MoveFeedback {
        let Some(id) = self.session.selected() else {
            return MoveFeedback::Ignored;
        };
        match self.session.input(id, "") {
            Ok(outcome) if outcome.changed > 0 => MoveFeedback::Cleared,
            Ok(_) => MoveFeedback::None,
            Err(_) => MoveFeedback::Ignored,
        }
    }

    pub fn hint(&mut self) -> MoveFeedback {
        match self.session.hint() {
            Some(reveal) => {
                self.note_completion(reveal.completed_now);
                MoveFeedback::Hint(reveal.kind)
            }
            None => MoveFeedback::NoHint,
        }
    }

    /// Move to the next/previous solvable cell
    pub fn move_cell(&mut self, forward: bool) {
        self.session.move_selection(forward);
    }

    /// Move to the first solvable cell of the next/previous word that has one
    pub fn move_word(&mut self, forward: bool) {
        let starts: Vec<CellId> = self
            .session
            .puzzle()
            .words()
            .filter_map(|word| word.iter().find(|c| c.solvable).map(|c| c.id))
            .collect();
        if starts.is_empty() {
            return;
        }
        let current = self.session.selected().unwrap_or(CellId(0));
        let word = starts.iter().rposition(|&s| s <= current).unwrap_or(0);
        let target = if forward {
            starts[(word + 1) % starts.len()]
        } else if starts[word] < current {
            starts[word]
        } else {
            starts[(word + starts.len() - 1) % starts.len()]
        };
        let _ = self.session.select(target);
    }

    /// Advance the clock and the group celebrations
    pub fn tick(&mut self) {
        self.session.pump_clock();
        let solved = self.session.solved_tokens();
        self.celebrations.update(&solved);
    }

    /// Whether the puzzle was completed since the last call
    pub fn take_completion(&mut self) -> bool {
        std::mem::take(&mut self.just_completed)
    }

    fn note_completion(&mut self, completed_now: bool) {
        if completed_now {
            self.just_completed = true;
        }
    }
}

/// Seconds as MM:SS
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
