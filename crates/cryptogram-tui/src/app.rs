use crate::animations::WinScreen;
use crate::config::Config;
use crate::game::{Game, MoveFeedback};
use crate::practice::{self, PracticeWorker};
use crate::storage;
use crate::theme::Theme;
use crate::worksheet::Exporter;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use cryptogram_core::{
    CipherKey, CipherMode, HintKind, KeyGenerator, Library, Puzzle, SavedCryptogram,
};
use std::time::Duration;
use tracing::{info, warn};

/// Text loaded into the editor on start
pub const INITIAL_TEXT: &str = "EL PERRO JUEGA EN EL PARQUE";

/// Ticks a message stays up (~3 seconds at 100ms)
const MESSAGE_TICKS: u32 = 30;

/// Result of handling a key press
pub enum AppAction {
    Continue,
    Quit,
}

/// Current screen state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    /// Text, mode and key editing
    Editor,
    /// Saved cryptograms
    Library,
    /// Solving a puzzle
    Playing,
    /// Completion celebration
    Win,
}

/// Which editor field receives typed characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorFocus {
    Text,
    Topic,
}

/// The main application state
pub struct App {
    pub screen_state: ScreenState,
    pub focus: EditorFocus,
    /// Message being encoded
    pub text: String,
    /// Topic for practice text generation
    pub topic: String,
    pub mode: CipherMode,
    pub key: CipherKey,
    pub tilde_assistant: bool,
    pub library: Library,
    pub library_selection: usize,
    /// Puzzle being played, dropped when leaving the player
    pub game: Option<Game>,
    pub theme: Theme,
    pub win_screen: WinScreen,
    pub message: Option<String>,
    message_timer: u32,
    /// Local-storage notice shown before the first save
    pub show_storage_warning: bool,
    practice: PracticeWorker,
    exporter: Exporter,
    generator: KeyGenerator,
}

impl App {
    pub fn new(
        library: Library,
        practice: PracticeWorker,
        exporter: Exporter,
        mut generator: KeyGenerator,
    ) -> Self {
        let mode = CipherMode::default();
        let key = generator.generate(mode);
        Self {
            screen_state: ScreenState::Editor,
            focus: EditorFocus::Text,
            text: INITIAL_TEXT.to_string(),
            topic: String::new(),
            mode,
            key,
            tilde_assistant: false,
            library,
            library_selection: 0,
            game: None,
            theme: Theme::dark(),
            win_screen: WinScreen::new(),
            message: None,
            message_timer: 0,
            show_storage_warning: false,
            practice,
            exporter,
            generator,
        }
    }

    /// Wire the app to the backends chosen by `config`
    pub fn from_config(config: &Config, seed: Option<u64>) -> Self {
        let library = Library::open(storage::create_store(config));
        info!(backend = library.backend_name(), items = library.len(), "library opened");
        let practice = PracticeWorker::new(practice::create_source(config));
        let exporter = Exporter::new(&config.export_dir);
        let generator = seed.map_or_else(KeyGenerator::new, KeyGenerator::with_seed);
        Self::new(library, practice, exporter, generator)
    }

    /// Get the tick rate based on current screen
    pub fn get_tick_rate(&self) -> Duration {
        let animating = match self.screen_state {
            ScreenState::Win => true,
            ScreenState::Playing => self
                .game
                .as_ref()
                .is_some_and(|g| g.celebrations().has_active()),
            ScreenState::Editor | ScreenState::Library => false,
        };
        if animating {
            Duration::from_millis(33)
        } else {
            Duration::from_millis(100)
        }
    }

    pub fn is_generating(&self) -> bool {
        self.practice.is_generating()
    }

    pub fn is_exporting(&self) -> bool {
        self.exporter.is_exporting()
    }

    /// Update animations and timers (called every tick)
    pub fn tick(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message = None;
            }
        }

        if let Some(text) = self.practice.poll() {
            self.text = text;
            self.show_message("Texto generado");
        }

        match self.exporter.poll() {
            Some(Ok(path)) => self.show_message(&format!("Hoja guardada en {}", path.display())),
            Some(Err(e)) => self.show_message(&format!("Error al exportar: {}", e)),
            None => {}
        }

        match self.screen_state {
            ScreenState::Playing => {
                if let Some(game) = self.game.as_mut() {
                    game.tick();
                }
                self.check_completion();
            }
            ScreenState::Win => self.win_screen.update(),
            ScreenState::Editor | ScreenState::Library => {}
        }
    }

    /// Show a temporary message
    pub fn show_message(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
        self.message_timer = MESSAGE_TICKS;
    }

    /// Replace the key with a fresh one for `mode`
    pub fn set_mode(&mut self, mode: CipherMode) {
        self.mode = mode;
        self.regenerate_key();
    }

    pub fn regenerate_key(&mut self) {
        self.key = self.generator.generate(self.mode);
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('q') {
            return AppAction::Quit;
        }

        match self.screen_state {
            ScreenState::Editor if self.show_storage_warning => self.handle_warning_key(key),
            ScreenState::Editor => self.handle_editor_key(key),
            ScreenState::Library => self.handle_library_key(key),
            ScreenState::Playing => self.handle_playing_key(key),
            ScreenState::Win => self.handle_win_key(key),
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) -> AppAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('k') => {
                    self.regenerate_key();
                    self.show_message("Nueva clave generada");
                }
                KeyCode::Char('t') => {
                    self.tilde_assistant = !self.tilde_assistant;
                    let state = if self.tilde_assistant { "activadas" } else { "desactivadas" };
                    self.show_message(&format!("Ayudas de tilde {}", state));
                }
                KeyCode::Char('s') => self.request_save(),
                KeyCode::Char('e') => self.export(),
                KeyCode::Char('l') => self.open_library(),
                KeyCode::Char('p') => self.play(),
                _ => {}
            }
            return AppAction::Continue;
        }

        match key.code {
            KeyCode::Esc => return AppAction::Quit,
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    EditorFocus::Text => EditorFocus::Topic,
                    EditorFocus::Topic => EditorFocus::Text,
                };
            }
            KeyCode::Up => self.cycle_mode(false),
            KeyCode::Down => self.cycle_mode(true),
            KeyCode::Enter => match self.focus {
                EditorFocus::Text => self.play(),
                EditorFocus::Topic => self.generate_text(),
            },
            KeyCode::Backspace => {
                self.focused_field().pop();
            }
            KeyCode::Char(c) => self.focused_field().push(c),
            _ => {}
        }
        AppAction::Continue
    }

    fn focused_field(&mut self) -> &mut String {
        match self.focus {
            EditorFocus::Text => &mut self.text,
            EditorFocus::Topic => &mut self.topic,
        }
    }

    fn cycle_mode(&mut self, forward: bool) {
        let modes = CipherMode::selectable();
        let current = modes.iter().position(|m| *m == self.mode).unwrap_or(0);
        let next = if forward {
            (current + 1) % modes.len()
        } else {
            (current + modes.len() - 1) % modes.len()
        };
        self.set_mode(modes[next]);
    }

    fn generate_text(&mut self) {
        if self.practice.request(&self.topic) {
            self.show_message("Generando texto...");
        } else {
            self.show_message("Escribe un tema primero");
        }
    }

    /// Start playing the editor text with the current key
    pub fn play(&mut self) {
        if Puzzle::build(&self.text, &self.key).solvable_count() == 0 {
            self.show_message("El texto no tiene letras");
            return;
        }
        let game = Game::new(&self.text, self.key.clone(), self.mode, self.tilde_assistant);
        self.start_game(game);
    }

    fn start_game(&mut self, game: Game) {
        self.game = Some(game);
        self.screen_state = ScreenState::Playing;
    }

    fn request_save(&mut self) {
        if self.library.needs_warning() {
            self.show_storage_warning = true;
        } else {
            self.save();
        }
    }

    fn handle_warning_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Enter | KeyCode::Char('s') | KeyCode::Char('y') => {
                self.show_storage_warning = false;
                if let Err(e) = self.library.acknowledge_warning() {
                    warn!(error = %e, "storage notice not recorded");
                }
                self.save();
            }
            KeyCode::Esc | KeyCode::Char('n') => {
                self.show_storage_warning = false;
                self.show_message("Guardado cancelado");
            }
            _ => {}
        }
        AppAction::Continue
    }

    fn save(&mut self) {
        if self.text.trim().is_empty() {
            self.show_message("Escribe un texto primero");
            return;
        }
        let item = SavedCryptogram::now(&self.text, self.key.clone(), self.mode, self.tilde_assistant);
        match self.library.add(item) {
            Ok(()) => self.show_message("Guardado en la biblioteca"),
            Err(e) => self.show_message(&format!("No se pudo guardar: {}", e)),
        }
        self.library_selection = 0;
    }

    fn export(&mut self) {
        if self.text.trim().is_empty() {
            self.show_message("Escribe un texto primero");
            return;
        }
        if self.exporter.export(&self.text, &self.key, self.mode) {
            self.show_message("Exportando hoja...");
        } else {
            self.show_message("Ya hay una exportación en curso");
        }
    }

    fn open_library(&mut self) {
        if self.library.is_empty() {
            self.show_message("La biblioteca está vacía");
            return;
        }
        self.library_selection = self.library_selection.min(self.library.len() - 1);
        self.screen_state = ScreenState::Library;
    }

    fn handle_library_key(&mut self, key: KeyEvent) -> AppAction {
        let count = self.library.len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.screen_state = ScreenState::Editor,
            KeyCode::Up | KeyCode::Char('k') => {
                self.library_selection = self.library_selection.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.library_selection + 1 < count {
                    self.library_selection += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(item) = self.library.items().get(self.library_selection).cloned() {
                    self.load_into_editor(&item);
                    self.screen_state = ScreenState::Editor;
                    self.show_message(&format!("Cargado: {}", item.title));
                }
            }
            KeyCode::Char('p') => {
                if let Some(item) = self.library.items().get(self.library_selection).cloned() {
                    self.load_into_editor(&item);
                    self.start_game(Game::from_saved(&item));
                }
            }
            _ => {}
        }
        AppAction::Continue
    }

    fn load_into_editor(&mut self, item: &SavedCryptogram) {
        self.text = item.original_text.clone();
        self.key = item.cipher_key.clone();
        self.mode = item.mode;
        self.tilde_assistant = item.tilde_assistant;
    }

    fn handle_playing_key(&mut self, key: KeyEvent) -> AppAction {
        if key.code == KeyCode::Esc {
            self.leave_game();
            return AppAction::Continue;
        }
        let Some(game) = self.game.as_mut() else {
            self.screen_state = ScreenState::Editor;
            return AppAction::Continue;
        };

        let feedback = match key.code {
            KeyCode::Left | KeyCode::BackTab => {
                game.move_cell(false);
                MoveFeedback::None
            }
            KeyCode::Right | KeyCode::Tab => {
                game.move_cell(true);
                MoveFeedback::None
            }
            KeyCode::Up => {
                game.move_word(false);
                MoveFeedback::None
            }
            KeyCode::Down => {
                game.move_word(true);
                MoveFeedback::None
            }
            KeyCode::Backspace | KeyCode::Delete => game.clear_selected(),
            KeyCode::Char('?') => game.hint(),
            KeyCode::Char(c) => game.type_letter(c),
            _ => MoveFeedback::None,
        };

        match feedback {
            MoveFeedback::Hint(HintKind::Corrected) => self.show_message("Pista: letra corregida"),
            MoveFeedback::Hint(HintKind::Revealed) => self.show_message("Pista: letra revelada"),
            MoveFeedback::NoHint => self.show_message("No quedan letras por revelar"),
            _ => {}
        }
        self.check_completion();
        AppAction::Continue
    }

    /// Switch to the win screen on the completion edge
    fn check_completion(&mut self) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        if !game.take_completion() {
            return;
        }
        let stats = game.stats();
        info!(
            seconds = stats.elapsed_seconds,
            hints = stats.hints_used,
            mistakes = stats.mistakes,
            "puzzle solved"
        );
        let tokens = game
            .session()
            .key()
            .iter()
            .map(|(_, token)| token.to_string())
            .collect();
        self.win_screen.reset(tokens);
        self.screen_state = ScreenState::Win;
    }

    /// Drop the game, which stops its clock
    fn leave_game(&mut self) {
        self.game = None;
        self.screen_state = ScreenState::Editor;
    }

    fn handle_win_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => self.leave_game(),
            KeyCode::Esc | KeyCode::Char('v') => self.screen_state = ScreenState::Playing,
            KeyCode::Char('q') => return AppAction::Quit,
            _ => {}
        }
        AppAction::Continue
    }
}
