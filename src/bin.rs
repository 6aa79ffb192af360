use clap::Parser;
use crossfill::backtracking_search::solve;
use crossfill::puzzle::{render_grid, Grid, Puzzle};
use crossfill::word_list::{WordList, WordListSourceConfig};
use std::fmt::{Debug, Formatter};
use std::fs;
use unicode_normalization::UnicodeNormalization;

/// crossfill: Command-line crossword solving tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the grid structure file, as ASCII with # representing blocks and any other
    /// character representing an open square
    structure_path: String,

    /// Path to a word list file, one word per line
    wordlist_path: String,
}

struct Error(String);

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0) // Print error unquoted
    }
}

fn main() -> Result<(), Error> {
    let args = Args::parse();

    let raw_grid_content = fs::read_to_string(&args.structure_path)
        .map_err(|_| Error(format!("Couldn't read file '{}'", args.structure_path)))?
        .lines()
        .map(|line| line.trim().nfc().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n");

    let grid = Grid::parse(&raw_grid_content).map_err(|e| Error(format!("{e}")))?;

    // Words longer than the grid's widest dimension can never be placed.
    let max_side = grid.width.max(grid.height);

    let word_list = WordList::new(
        vec![WordListSourceConfig::File {
            path: args.wordlist_path.into(),
        }],
        Some(max_side),
    )
    .map_err(|e| Error(format!("{e}")))?;

    if word_list.is_empty() {
        return Err(Error("Word list is empty".into()));
    }

    let puzzle = Puzzle::new(grid, word_list);

    match solve(&puzzle) {
        Some(choices) => println!("{}", render_grid(&puzzle, &choices)),
        None => println!("No solution."),
    }

    Ok(())
}
