//! Basic example of using the cryptogram engine

use cryptogram_core::{CellId, CipherKey, CipherMode, KeyGenerator, Puzzle, Session};

fn main() {
    // Generate a key
    println!("Generating a SYMBOLS key...\n");
    let mut generator = KeyGenerator::new();
    let key = generator.generate(CipherMode::Symbols);
    for (letter, token) in key.iter() {
        print!("{}={} ", letter, token);
    }
    println!("\n");

    // Encode a sentence
    let text = "El perro juega en el parque";
    let puzzle = Puzzle::build(text, &key);
    println!("Encoded:");
    for word in puzzle.words() {
        let tokens: Vec<&str> = word.iter().map(|c| c.token.as_str()).collect();
        print!("{}   ", tokens.join(" "));
    }
    println!("\n");
    println!("Solvable cells: {}", puzzle.solvable_count());
    println!("Token groups: {}\n", puzzle.token_groups().len());

    // Solve it with a couple of guesses and hints
    let mut session = Session::new(text, key, CipherMode::Symbols);
    let outcome = session.set_guess(CellId(0), 'E').expect("first cell is a letter");
    println!("Guess E on {}: {} cells filled", CellId(0), outcome.changed);

    while let Some(hint) = session.hint() {
        println!("Hint {:?} on {} filled {} cells", hint.kind, hint.target, hint.filled.len());
    }
    let stats = session.stats();
    println!(
        "\nCompleted: {} (hints {}, mistakes {})",
        stats.completed, stats.hints_used, stats.mistakes
    );

    // Coordinate lookup
    println!("\n--- Coordinate table ---\n");
    let coords = KeyGenerator::with_seed(3).generate(CipherMode::Coordinates);
    for row in ['A', 'B', 'D'] {
        let line: String = (1..=9)
            .map(|col| coords.letter_at(row, col).unwrap_or(' '))
            .collect();
        println!("{} | {}", row, line);
    }

    // Keys are plain JSON objects
    let tiny = CipherKey::from_pairs([('H', "3"), ('O', "7"), ('L', "9"), ('A', "1")]);
    println!("\nHOLA key: {}", serde_json::to_string(&tiny).unwrap_or_default());
}
