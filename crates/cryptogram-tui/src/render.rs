use crate::animations::particles::hue_to_rgb;
use crate::animations::celebrations::GroupCelebrations;
use crate::app::{App, EditorFocus, ScreenState};
use crate::game::Game;
use crate::keypanel::{self, center, display_width, SLOT_WIDTH};
use crate::worksheet::{wrap_words, WORD_GAP};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use cryptogram_core::{CellId, Puzzle, PuzzleCell};
use std::io;

/// Rows used by one line of puzzle words: accent marks, tokens, guesses, gap
const PUZZLE_LINE_HEIGHT: u16 = 4;

pub fn render(stdout: &mut io::Stdout, app: &mut App) -> io::Result<()> {
    let (term_width, term_height) = terminal::size()?;

    execute!(stdout, Hide, SetBackgroundColor(app.theme.bg), Clear(ClearType::All))?;

    match app.screen_state {
        ScreenState::Editor => {
            render_editor(stdout, app, term_width, term_height)?;
            if app.show_storage_warning {
                render_storage_warning(stdout, app, term_width, term_height)?;
            }
        }
        ScreenState::Library => render_library(stdout, app, term_width, term_height)?,
        ScreenState::Playing => render_playing(stdout, app, term_width, term_height)?,
        ScreenState::Win => render_win_screen(stdout, app, term_width, term_height)?,
    }

    if let Some(ref msg) = app.message {
        render_message(stdout, app, msg, term_width)?;
    }

    execute!(stdout, Show)?;
    Ok(())
}

fn render_editor(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let x = 2;
    let width = term_width.saturating_sub(4).max(20) as usize;
    let mut y = 2;

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.accent),
        Print("CREADOR DE CRIPTOGRAMAS"),
        SetForegroundColor(theme.info),
        Print(format!("   biblioteca: {} ({})", app.library.len(), app.library.backend_name()))
    )?;
    y += 2;

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.info),
        Print("Modo:   "),
        SetForegroundColor(theme.key),
        Print(format!("◀ {} ▶", app.mode.display_name())),
        SetForegroundColor(theme.info),
        Print("    Tildes: "),
        SetForegroundColor(if app.tilde_assistant { theme.success } else { theme.empty }),
        Print(if app.tilde_assistant { "sí" } else { "no" })
    )?;
    y += 2;

    let text_label = field_label("Texto", app.focus == EditorFocus::Text);
    execute!(stdout, MoveTo(x, y), SetForegroundColor(theme.info), Print(text_label))?;
    y += 1;
    let mut text_lines = wrap_text(&app.text, width.saturating_sub(2));
    if text_lines.is_empty() {
        text_lines.push(String::new());
    }
    for (i, line) in text_lines.iter().enumerate() {
        let cursor = app.focus == EditorFocus::Text && i + 1 == text_lines.len();
        execute!(
            stdout,
            MoveTo(x + 2, y),
            SetForegroundColor(theme.fg),
            Print(line),
            SetForegroundColor(theme.accent),
            Print(if cursor { "▏" } else { "" })
        )?;
        y += 1;
    }
    y += 1;

    let topic_label = field_label("Tema IA", app.focus == EditorFocus::Topic);
    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.info),
        Print(topic_label),
        MoveTo(x + 2, y + 1),
        SetForegroundColor(theme.fg),
        Print(&app.topic),
        SetForegroundColor(theme.accent),
        Print(if app.focus == EditorFocus::Topic { "▏" } else { "" })
    )?;
    if app.is_generating() {
        execute!(stdout, SetForegroundColor(theme.key), Print("  generando..."))?;
    }
    if app.is_exporting() {
        execute!(stdout, SetForegroundColor(theme.key), Print("  exportando..."))?;
    }
    y += 3;

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.accent),
        Print(keypanel::panel_title(app.mode))
    )?;
    y += 1;
    for line in keypanel::panel_lines(&app.key, app.mode) {
        execute!(stdout, MoveTo(x, y), SetForegroundColor(theme.token), Print(line))?;
        y += 1;
    }
    y += 1;

    // Encoded preview, tokens only
    let puzzle = Puzzle::build(&app.text, &app.key);
    let controls_y = term_height.saturating_sub(4);
    for line in wrap_words(&puzzle, width) {
        if y >= controls_y {
            break;
        }
        let tokens: Vec<String> = line
            .iter()
            .map(|word| word.iter().map(|c| center(&c.token, SLOT_WIDTH)).collect())
            .collect();
        execute!(
            stdout,
            MoveTo(x, y),
            SetForegroundColor(theme.token),
            Print(tokens.join(" ".repeat(WORD_GAP).as_str()))
        )?;
        y += 1;
    }

    render_controls(
        stdout,
        app,
        x,
        controls_y,
        &[
            ("Tab", "Campo"),
            ("↑/↓", "Modo"),
            ("Enter", "Jugar/Generar"),
            ("^K", "Nueva clave"),
            ("^T", "Tildes"),
            ("^S", "Guardar"),
            ("^E", "Exportar"),
            ("^L", "Biblioteca"),
            ("Esc", "Salir"),
        ],
    )
}

fn field_label(name: &str, focused: bool) -> String {
    if focused {
        format!("▸ {}:", name)
    } else {
        format!("  {}:", name)
    }
}

fn render_library(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let x = 2;
    let y = 2;

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.accent),
        Print(format!("MIS CRIPTOGRAMAS ({})", app.library.len()))
    )?;

    let list_height = term_height.saturating_sub(8).max(1) as usize;
    let first = app.library_selection.saturating_sub(list_height - 1);
    let row_width = term_width.saturating_sub(6) as usize;

    for (row, (i, item)) in app
        .library
        .items()
        .iter()
        .enumerate()
        .skip(first)
        .take(list_height)
        .enumerate()
    {
        let selected = i == app.library_selection;
        let tildes = if item.tilde_assistant { " ´" } else { "" };
        let line = format!("{:<24} {}{}", item.title, item.mode.display_name(), tildes);
        let line: String = line.chars().take(row_width).collect();
        execute!(
            stdout,
            MoveTo(x, y + 2 + row as u16),
            SetBackgroundColor(if selected { theme.selected_bg } else { theme.bg }),
            SetForegroundColor(if selected { theme.fg } else { theme.info }),
            Print(if selected { "▸ " } else { "  " }),
            Print(line),
            SetBackgroundColor(theme.bg)
        )?;
    }

    render_controls(
        stdout,
        app,
        x,
        term_height.saturating_sub(3),
        &[
            ("↑/↓", "Elegir"),
            ("Enter/e", "Editar"),
            ("p", "Jugar"),
            ("Esc", "Volver"),
        ],
    )
}

fn render_playing(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let Some(game) = app.game.as_ref() else {
        return Ok(());
    };
    let theme = &app.theme;
    let session = game.session();
    let stats = game.stats();
    let x = 2;
    let mut y = 2;

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.accent),
        Print(session.mode().display_name()),
        SetForegroundColor(theme.info),
        Print(format!(
            "   Tiempo {}   Pistas {}   Errores {}   {}/{}",
            game.elapsed_string(),
            stats.hints_used,
            stats.mistakes,
            session.filled_count(),
            session.puzzle().solvable_count()
        ))
    )?;
    if game.is_completed() {
        execute!(stdout, SetForegroundColor(theme.success), Print("   ¡RESUELTO!"))?;
    }
    y += 2;

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.accent),
        Print(keypanel::instructions(session.mode()))
    )?;
    y += 2;

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.info),
        Print(keypanel::panel_title(session.mode()))
    )?;
    y += 1;
    for line in keypanel::panel_lines(session.key(), session.mode()) {
        execute!(stdout, MoveTo(x, y), SetForegroundColor(theme.token), Print(line))?;
        y += 1;
    }
    y += 1;

    let width = term_width.saturating_sub(4).max(SLOT_WIDTH as u16) as usize;
    let controls_y = term_height.saturating_sub(3);
    let lines = wrap_words(session.puzzle(), width);
    let visible = (controls_y.saturating_sub(y) / PUZZLE_LINE_HEIGHT).max(1) as usize;
    let first = first_visible_line(&lines, session.selected(), visible);
    for line in lines.into_iter().skip(first).take(visible) {
        let mut cx = x;
        for word in line {
            for cell in word {
                render_cell(stdout, app, game, cell, cx, y)?;
                cx += SLOT_WIDTH as u16;
            }
            cx += WORD_GAP as u16;
        }
        y += PUZZLE_LINE_HEIGHT;
    }

    if let Some(msg) = game.celebrations().message() {
        execute!(stdout, MoveTo(x, y), SetForegroundColor(theme.key), Print(msg))?;
    }

    render_controls(
        stdout,
        app,
        x,
        controls_y,
        &[
            ("←/→", "Casilla"),
            ("↑/↓", "Palabra"),
            ("A-Ñ", "Letra"),
            ("Supr", "Borrar"),
            ("?", "Pista"),
            ("Esc", "Editor"),
        ],
    )
}

fn render_cell(
    stdout: &mut io::Stdout,
    app: &App,
    game: &Game,
    cell: &cryptogram_core::PuzzleCell,
    x: u16,
    y: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let session = game.session();

    if !cell.solvable {
        return execute!(
            stdout,
            MoveTo(x, y + 2),
            SetForegroundColor(theme.fg),
            Print(center(&cell.original.to_string(), SLOT_WIDTH))
        );
    }

    if session.shows_accent(cell.id) {
        execute!(
            stdout,
            MoveTo(x, y),
            SetForegroundColor(theme.accent),
            Print(center("´", SLOT_WIDTH))
        )?;
    }

    let intensity = game.celebrations().token_intensity(&cell.token);
    execute!(
        stdout,
        MoveTo(x, y + 1),
        SetForegroundColor(GroupCelebrations::throb_color(theme.token, intensity)),
        Print(center(&cell.token, SLOT_WIDTH))
    )?;

    let selected = session.selected();
    let same_token = selected
        .and_then(|id| session.puzzle().cell(id))
        .is_some_and(|sel| sel.token == cell.token);
    let bg = if selected == Some(cell.id) {
        theme.selected_bg
    } else if same_token {
        theme.highlight_bg
    } else {
        theme.bg
    };
    let (glyph, fg) = match (session.guess(cell.id), session.is_correct(cell.id)) {
        (Some(letter), Some(true)) => (letter, theme.correct),
        (Some(letter), _) => (letter, theme.guess),
        (None, _) => ('_', theme.empty),
    };
    execute!(
        stdout,
        MoveTo(x, y + 2),
        SetBackgroundColor(bg),
        SetForegroundColor(fg),
        Print(format!("[{}]", glyph)),
        SetBackgroundColor(theme.bg)
    )
}

fn render_storage_warning(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let lines = [
        "AVISO DE ALMACENAMIENTO",
        "",
        "Los criptogramas se guardan solo en este equipo.",
        "Si borras la carpeta de datos se perderán.",
        "",
        "Enter: entendido y guardar    Esc: cancelar",
    ];
    let inner = lines.iter().map(|l| display_width(l)).max().unwrap_or(0) + 4;
    let box_x = term_width.saturating_sub(inner as u16 + 2) / 2;
    let box_y = term_height.saturating_sub(lines.len() as u16 + 2) / 2;

    execute!(
        stdout,
        SetBackgroundColor(theme.highlight_bg),
        SetForegroundColor(theme.border),
        MoveTo(box_x, box_y),
        Print(format!("┌{}┐", "─".repeat(inner)))
    )?;
    for (i, line) in lines.iter().enumerate() {
        let color = if i == 0 { theme.key } else { theme.fg };
        execute!(
            stdout,
            MoveTo(box_x, box_y + 1 + i as u16),
            SetForegroundColor(theme.border),
            Print("│"),
            SetForegroundColor(color),
            Print(center(line, inner)),
            SetForegroundColor(theme.border),
            Print("│")
        )?;
    }
    execute!(
        stdout,
        MoveTo(box_x, box_y + 1 + lines.len() as u16),
        Print(format!("└{}┘", "─".repeat(inner))),
        SetBackgroundColor(theme.bg)
    )
}

fn render_win_screen(
    stdout: &mut io::Stdout,
    app: &mut App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    app.win_screen.resize(term_width, term_height);
    let theme = &app.theme;

    for particle in app.win_screen.particles() {
        if particle.is_visible(term_width, term_height) {
            execute!(
                stdout,
                MoveTo(particle.x as u16, particle.y as u16),
                SetForegroundColor(particle.color),
                Print(particle.glyph)
            )?;
        }
    }

    let banner_lines: Vec<&str> = app
        .win_screen
        .banner()
        .lines()
        .filter(|l| !l.is_empty())
        .collect();
    let banner_width = banner_lines.iter().map(|l| l.len()).max().unwrap_or(40) as u16;
    let banner_x = term_width.saturating_sub(banner_width) / 2;
    let banner_y = 3;
    for (i, line) in banner_lines.iter().enumerate() {
        let hue = app.win_screen.banner_hue() + i as f32 * 0.08;
        execute!(
            stdout,
            MoveTo(banner_x, banner_y + i as u16),
            SetForegroundColor(hue_to_rgb(hue)),
            Print(line)
        )?;
    }

    let mut y = banner_y + banner_lines.len() as u16 + 2;
    print_centered(stdout, app.win_screen.current_message(), theme.key, term_width, y)?;
    y += 2;

    if let Some(game) = app.game.as_ref() {
        let stats = game.stats();
        let summary = format!(
            " Tiempo: {} | Pistas: {} | Errores: {} ",
            game.elapsed_string(),
            stats.hints_used,
            stats.mistakes
        );
        execute!(stdout, SetBackgroundColor(Color::Rgb { r: 30, g: 50, b: 30 }))?;
        print_centered(stdout, &summary, Color::White, term_width, y)?;
        execute!(stdout, SetBackgroundColor(theme.bg))?;
        y += 2;

        let max_width = term_width.saturating_sub(8).max(10) as usize;
        for line in wrap_text(&game.session().puzzle().text().to_uppercase(), max_width) {
            print_centered(stdout, &line, theme.fg, term_width, y)?;
            y += 1;
        }
        y += 1;
    }

    print_centered(
        stdout,
        "Enter: volver al editor    Esc: ver el mensaje resuelto",
        theme.info,
        term_width,
        y,
    )
}

fn print_centered(
    stdout: &mut io::Stdout,
    text: &str,
    color: Color,
    term_width: u16,
    y: u16,
) -> io::Result<()> {
    let x = term_width.saturating_sub(display_width(text) as u16) / 2;
    execute!(stdout, MoveTo(x, y), SetForegroundColor(color), Print(text))
}

fn render_controls(
    stdout: &mut io::Stdout,
    app: &App,
    x: u16,
    y: u16,
    controls: &[(&str, &str)],
) -> io::Result<()> {
    let theme = &app.theme;
    execute!(stdout, MoveTo(x, y))?;
    for (key, desc) in controls {
        execute!(
            stdout,
            SetForegroundColor(theme.key),
            Print(key),
            SetForegroundColor(theme.info),
            Print(format!(" {}  ", desc))
        )?;
    }
    Ok(())
}

fn render_message(
    stdout: &mut io::Stdout,
    app: &App,
    msg: &str,
    term_width: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let padded = format!("  {}  ", msg);
    let x = term_width.saturating_sub(display_width(&padded) as u16) / 2;

    execute!(
        stdout,
        MoveTo(x, 0),
        SetForegroundColor(theme.fg),
        SetBackgroundColor(theme.selected_bg),
        Print(&padded),
        SetBackgroundColor(theme.bg)
    )
}

/// First puzzle line to draw so that the line holding `selected` is among
/// the `visible` lines on screen
fn first_visible_line(
    lines: &[Vec<&[PuzzleCell]>],
    selected: Option<CellId>,
    visible: usize,
) -> usize {
    let Some(id) = selected else {
        return 0;
    };
    let row = lines
        .iter()
        .position(|line| line.iter().any(|word| word.iter().any(|c| c.id == id)))
        .unwrap_or(0);
    (row + 1).saturating_sub(visible.max(1))
}

/// Greedy word wrap on display columns
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let len = display_width(&current);
        if len + display_width(word) + 1 > max_width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("uno dos tres", 7), vec!["uno dos", "tres"]);
        assert_eq!(wrap_text("ñandú ñandú", 11), vec!["ñandú ñandú"]);
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn test_scroll_keeps_selected_line_visible() {
        let puzzle = Puzzle::build("uno dos tres cuatro cinco", &cryptogram_core::CipherKey::new());
        // One word per line
        let lines = wrap_words(&puzzle, 4 * SLOT_WIDTH);
        assert_eq!(lines.len(), 5);
        let first_cell_of = |line: usize| lines[line][0][0].id;

        assert_eq!(first_visible_line(&lines, None, 2), 0);
        assert_eq!(first_visible_line(&lines, Some(first_cell_of(1)), 2), 0);
        assert_eq!(first_visible_line(&lines, Some(first_cell_of(4)), 2), 3);
        assert_eq!(first_visible_line(&lines, Some(first_cell_of(4)), 10), 0);
    }

    #[test]
    fn test_field_label_marks_focus() {
        assert_eq!(field_label("Texto", true), "▸ Texto:");
        assert_eq!(field_label("Texto", false), "  Texto:");
    }
}
