//! Printable worksheet export
//!
//! A worksheet is a plain-text page: heading, instructions, the key panel and
//! the encoded message with an empty box under every letter.

use crate::keypanel::{self, center, SLOT_WIDTH};
use crate::practice::ReplyGuard;
use cryptogram_core::{CipherKey, CipherMode, Puzzle, PuzzleCell};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use tracing::{info, warn};

/// Width the worksheet body wraps at
pub const PAGE_WIDTH: usize = 72;

/// Characters of the sanitized text kept in a file name
const FILENAME_CHARS: usize = 20;

/// Columns between two words
pub const WORD_GAP: usize = 2;

/// File-name-safe form of `text`: ASCII letters and digits lowercased,
/// anything else replaced with `_`, at most 20 characters
pub fn sanitize_filename(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .take(FILENAME_CHARS)
        .collect()
}

/// Worksheet file name for `text`
pub fn file_name(text: &str) -> String {
    format!("criptograma_{}.txt", sanitize_filename(text))
}

/// Break the words of `puzzle` into lines at most `max_width` columns wide.
/// A word longer than a line gets a line of its own.
pub fn wrap_words(puzzle: &Puzzle, max_width: usize) -> Vec<Vec<&[PuzzleCell]>> {
    let mut lines: Vec<Vec<&[PuzzleCell]>> = Vec::new();
    let mut current: Vec<&[PuzzleCell]> = Vec::new();
    let mut used = 0;

    for word in puzzle.words() {
        let width = word.len() * SLOT_WIDTH;
        let needed = if current.is_empty() { width } else { used + WORD_GAP + width };
        if needed > max_width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            used = width;
        } else {
            used = needed;
        }
        current.push(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Full worksheet text
pub fn render(text: &str, key: &CipherKey, mode: CipherMode) -> String {
    let puzzle = Puzzle::build(text, key);
    let mut out = Vec::new();

    out.push(format!("{:<48}{:>24}", "CRIPTOGRAMA", "Nombre: ______________"));
    out.push(keypanel::instructions(mode).to_string());
    out.push("=".repeat(PAGE_WIDTH));
    out.push(String::new());
    out.push(center(keypanel::panel_title(mode), PAGE_WIDTH).trim_end().to_string());
    out.push(String::new());
    out.extend(keypanel::panel_lines(key, mode));
    out.push(String::new());
    out.push("-".repeat(PAGE_WIDTH));

    let gap = " ".repeat(WORD_GAP);
    for line in wrap_words(&puzzle, PAGE_WIDTH) {
        let tokens: Vec<String> = line
            .iter()
            .map(|word| word.iter().map(|c| center(&c.token, SLOT_WIDTH)).collect())
            .collect();
        let boxes: Vec<String> = line
            .iter()
            .map(|word| {
                word.iter()
                    .map(|c| {
                        if c.solvable {
                            center("[_]", SLOT_WIDTH)
                        } else {
                            center(&c.original.to_string(), SLOT_WIDTH)
                        }
                    })
                    .collect()
            })
            .collect();
        out.push(String::new());
        out.push(tokens.join(gap.as_str()).trim_end().to_string());
        out.push(boxes.join(gap.as_str()).trim_end().to_string());
    }
    out.push(String::new());

    out.join("\n")
}

/// Writes worksheets on a background thread, one at a time
pub struct Exporter {
    dir: PathBuf,
    tx: Sender<io::Result<PathBuf>>,
    rx: Receiver<io::Result<PathBuf>>,
    exporting: bool,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            dir: dir.into(),
            tx,
            rx,
            exporting: false,
        }
    }

    /// Whether a worksheet is being written
    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    /// Start writing the worksheet for `text`. Refused while another
    /// export is still running.
    pub fn export(&mut self, text: &str, key: &CipherKey, mode: CipherMode) -> bool {
        if self.exporting {
            return false;
        }
        self.exporting = true;

        let dir = self.dir.clone();
        let path = dir.join(file_name(text));
        let sheet = render(text, key, mode);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let interrupted = io::Error::new(io::ErrorKind::Other, "export interrupted");
            let reply = ReplyGuard::new(tx, Err(interrupted));
            let result = fs::create_dir_all(&dir)
                .and_then(|_| fs::write(&path, sheet))
                .map(|_| path);
            reply.send(result);
        });
        true
    }

    /// Result of the running export once it has finished
    pub fn poll(&mut self) -> Option<io::Result<PathBuf>> {
        let result = self.rx.try_recv().ok()?;
        self.exporting = false;
        match &result {
            Ok(path) => info!(path = %path.display(), "worksheet exported"),
            Err(e) => warn!(dir = %self.dir.display(), error = %e, "worksheet export failed"),
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptogram_core::KeyGenerator;
    use std::time::{Duration, Instant};

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("EL PERRO JUEGA EN EL PARQUE"), "el_perro_juega_en_el");
        assert_eq!(sanitize_filename("¡Año 2024!"), "_a_o_2024_");
        assert_eq!(sanitize_filename(""), "");
        assert_eq!(file_name("Hola"), "criptograma_hola.txt");
    }

    #[test]
    fn test_wrap_words_respects_width() {
        let puzzle = Puzzle::build("uno dos tres cuatro", &CipherKey::new());
        // 3 + 3 letters plus the gap fit in 26 columns, "tres" does not
        let lines = wrap_words(&puzzle, 26);
        let sizes: Vec<usize> = lines.iter().map(|l| l.len()).collect();
        assert_eq!(sizes, vec![2, 1, 1]);
    }

    #[test]
    fn test_wrap_keeps_long_word_alone() {
        let puzzle = Puzzle::build("a esternocleidomastoideo b", &CipherKey::new());
        let lines = wrap_words(&puzzle, 20);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1][0].len(), 22);
    }

    #[test]
    fn test_render_contains_panel_and_boxes() {
        let key = KeyGenerator::with_seed(4).generate(CipherMode::Coordinates);
        let sheet = render("Sí, 2 gatos", &key, CipherMode::Coordinates);
        assert!(sheet.starts_with("CRIPTOGRAMA"));
        assert!(sheet.contains("TABLA DE COORDENADAS"));
        assert!(sheet.contains(key.get('S').unwrap()));
        assert!(sheet.contains("[_]"));
        // Punctuation and digits are printed as they are
        assert!(sheet.contains(" ,"));
        assert!(sheet.contains(" 2"));
    }

    fn finish(exporter: &mut Exporter) -> io::Result<PathBuf> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(result) = exporter.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "export did not finish");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_export_writes_file_and_clears_flag() {
        let dir = tempfile::tempdir().unwrap();
        let key = KeyGenerator::with_seed(1).generate(CipherMode::Symbols);
        let mut exporter = Exporter::new(dir.path());

        assert!(exporter.export("Hola mundo", &key, CipherMode::Symbols));
        assert!(exporter.is_exporting());
        let path = finish(&mut exporter).unwrap();
        assert_eq!(path, dir.path().join("criptograma_hola_mundo.txt"));
        assert!(fs::read_to_string(&path).unwrap().contains("CLAVE DE SUSTITUCIÓN"));
        assert!(!exporter.is_exporting());
    }

    #[test]
    fn test_second_export_refused_while_running() {
        let dir = tempfile::tempdir().unwrap();
        let key = KeyGenerator::with_seed(1).generate(CipherMode::Symbols);
        let mut exporter = Exporter::new(dir.path());

        assert!(exporter.export("uno", &key, CipherMode::Symbols));
        assert!(!exporter.export("dos", &key, CipherMode::Symbols));
        finish(&mut exporter).unwrap();
        assert!(!dir.path().join("criptograma_dos.txt").exists());

        assert!(exporter.export("dos", &key, CipherMode::Symbols));
        finish(&mut exporter).unwrap();
    }

    #[test]
    fn test_failed_export_clears_flag() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "x").unwrap();

        let key = KeyGenerator::with_seed(1).generate(CipherMode::Symbols);
        let mut exporter = Exporter::new(&blocker);
        assert!(exporter.export("Hola", &key, CipherMode::Symbols));
        assert!(finish(&mut exporter).is_err());
        assert!(!exporter.is_exporting());
    }
}
