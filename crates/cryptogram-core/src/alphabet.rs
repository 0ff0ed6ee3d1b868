//! Static character sets.
//!
//! The source alphabet is the Spanish one (27 letters, `Ñ` included). Every
//! cipher mode maps these letters onto one of the token sets below.

/// Source alphabet for every cipher mode
pub const ALPHABET: [char; 27] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'Ñ', 'O', 'P', 'Q',
    'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Number of letters a complete key covers
pub const ALPHABET_LEN: usize = ALPHABET.len();

/// Accented vowels and the letter whose token they borrow
pub const ACCENTED: [(char, char); 6] = [
    ('Á', 'A'),
    ('É', 'E'),
    ('Í', 'I'),
    ('Ó', 'O'),
    ('Ú', 'U'),
    ('Ü', 'U'),
];

/// Greek capitals (24, so three letters stay unmapped in GREEK mode)
pub const GREEK: [&str; 24] = [
    "Α", "Β", "Γ", "Δ", "Ε", "Ζ", "Η", "Θ", "Ι", "Κ", "Λ", "Μ", "Ν", "Ξ", "Ο", "Π", "Ρ", "Σ",
    "Τ", "Υ", "Φ", "Χ", "Ψ", "Ω",
];

/// Cyrillic capitals
pub const CYRILLIC: [&str; 33] = [
    "А", "Б", "В", "Г", "Д", "Е", "Ё", "Ж", "З", "И", "Й", "К", "Л", "М", "Н", "О", "П", "Р",
    "С", "Т", "У", "Ф", "Х", "Ц", "Ч", "Ш", "Щ", "Ъ", "Ы", "Ь", "Э", "Ю", "Я",
];

/// Pictographic symbols, chosen to be visually distinct from one another
pub const SYMBOLS: [&str; 48] = [
    "★", "☀", "☂", "☁", "☎", "☮", "☯", "♠", "♣", "♥", "♦", "♪", "⚓", "⚔", "⚛", "⚜", "⚠", "⚡",
    "❄", "✂", "✓", "✕", "✚", "✤", "✦", "✿", "❂", "🌍", "🪐", "🏹", "🗿", "🍄", "🍀", "💎", "🌋",
    "🍎", "🐱", "🚗", "🚀", "🔑", "🔔", "🎁", "🎨", "⚽", "👓", "⌚", "🔋", "💡",
];

/// Row labels of the 3×9 coordinate table
pub const COORDINATE_ROWS: [char; 3] = ['A', 'B', 'D'];

/// Column count of the 3×9 coordinate table
pub const COORDINATE_COLS: usize = 9;

/// Row labels of the 2×14 "sandwich" table (numbers printed between them)
pub const SANDWICH_ROWS: [char; 2] = ['A', 'D'];

/// Column count of the sandwich table
pub const SANDWICH_COLS: usize = 14;

/// Check whether `c` is one of the 27 alphabet letters (uppercase only)
pub fn is_letter(c: char) -> bool {
    ALPHABET.contains(&c)
}

/// Base letter of an accented vowel, if `c` is one (case-insensitive)
pub fn base_letter(c: char) -> Option<char> {
    let upper = to_upper(c);
    ACCENTED
        .iter()
        .find(|(accented, _)| *accented == upper)
        .map(|(_, base)| *base)
}

/// Check whether `c` carries a diacritic the tilde assistant should point out
pub fn is_accented(c: char) -> bool {
    base_letter(c).is_some()
}

/// Check whether `c` belongs to the extended letter class (alphabet plus
/// accented vowels), case-insensitive. Such characters get an input box.
pub fn is_solvable(c: char) -> bool {
    let upper = to_upper(c);
    is_letter(upper) || is_accented(upper)
}

/// The letter a solver has to enter for `c`: accented vowels collapse onto
/// their base letter, everything else is uppercased.
pub fn normalize(c: char) -> char {
    let upper = to_upper(c);
    base_letter(upper).unwrap_or(upper)
}

/// Single-character uppercase. Characters whose uppercase form expands
/// (e.g. `ß`) are kept as they are.
pub fn to_upper(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}
