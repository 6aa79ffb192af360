//! This module implements the geometry of a crossword puzzle, independent of any fill algorithm:
//! parsing the block structure, deriving variables (maximal fillable runs) and the overlaps
//! between them, and projecting a finished assignment back onto the grid.

use std::collections::HashMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{VariableId, WordId};
use crate::word_list::WordList;

/// Zero-indexed x and y coords for a cell in the grid, where y = 0 in the top row.
pub type GridCoord = (usize, usize);

/// The direction that a variable is facing.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde_derive::Serialize, serde_derive::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    Across,
    Down,
}

/// An error encountered while parsing a grid structure. This is reported before solving begins,
/// and is distinct from the puzzle having no solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    Empty,
    NonRectangular,
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            GridError::Empty => "Grid must have at least one row".to_string(),
            GridError::NonRectangular => "Rows in grid must all be the same length".to_string(),
        };
        write!(f, "{string}")
    }
}

/// The fixed block structure of a grid: for each cell, whether it can hold a letter. Read-only
/// after construction.
#[derive(Debug, Clone)]
pub struct Grid {
    pub width: usize,
    pub height: usize,

    /// A flat array of cells in order of row and then column; `true` means fillable.
    cells: Vec<bool>,
}

impl Grid {
    /// Parse a grid from a template string with `#` representing blocks and any other character
    /// representing a fillable cell. Blank lines are skipped; all remaining lines must have the
    /// same length.
    pub fn parse(template: &str) -> Result<Grid, GridError> {
        let rows: Vec<Vec<bool>> = template
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() {
                    None
                } else {
                    Some(line.chars().map(|c| c != '#').collect())
                }
            })
            .collect();

        if rows.is_empty() {
            return Err(GridError::Empty);
        }
        if rows.iter().any(|row| row.len() != rows[0].len()) {
            return Err(GridError::NonRectangular);
        }

        Ok(Grid {
            width: rows[0].len(),
            height: rows.len(),
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Is the given cell fillable?
    #[must_use]
    pub fn is_fillable(&self, (x, y): GridCoord) -> bool {
        self.cells[y * self.width + x]
    }
}

/// A struct representing an overlap between one variable and another: the other variable's id and
/// the index of the shared cell within the other variable's word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    pub other_var_id: VariableId,
    pub other_var_cell: usize,
}

/// A struct representing the aspects of a variable that are static during solving: its position in
/// the grid and its crossings with other variables.
#[derive(Debug, Clone)]
pub struct Variable {
    pub id: VariableId,
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,

    /// For each cell of this variable, the overlap at that cell, if any. Two variables can share
    /// at most one cell.
    pub overlaps: Vec<Option<Overlap>>,
}

impl Variable {
    /// Generate the coords for each cell of this variable.
    #[must_use]
    pub fn cell_coords(&self) -> Vec<GridCoord> {
        (0..self.length)
            .map(|cell_idx| match self.direction {
                Direction::Across => (self.start_cell.0 + cell_idx, self.start_cell.1),
                Direction::Down => (self.start_cell.0, self.start_cell.1 + cell_idx),
            })
            .collect()
    }

    /// The ids of all variables this one crosses.
    pub fn neighbor_ids(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.overlaps
            .iter()
            .flatten()
            .map(|overlap| overlap.other_var_id)
    }

    /// How many variables does this one cross?
    #[must_use]
    pub fn degree(&self) -> usize {
        self.overlaps.iter().flatten().count()
    }

    /// If this variable crosses the given one, return the index pair (cell index in this
    /// variable's word, cell index in the other's) at which their shared cell falls.
    #[must_use]
    pub fn overlap_with(&self, other_var_id: VariableId) -> Option<(usize, usize)> {
        self.overlaps
            .iter()
            .enumerate()
            .find_map(|(cell_idx, overlap)| match overlap {
                Some(overlap) if overlap.other_var_id == other_var_id => {
                    Some((cell_idx, overlap.other_var_cell))
                }
                _ => None,
            })
    }

    /// Generate a `VariableSpec` identifying this variable.
    #[must_use]
    pub fn spec(&self) -> VariableSpec {
        VariableSpec {
            start_cell: self.start_cell,
            direction: self.direction,
            length: self.length,
        }
    }
}

/// A struct identifying a specific variable in the grid.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct VariableSpec {
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,
}

impl VariableSpec {
    /// Parse a string like "1,2,down,5" into a `VariableSpec` struct.
    pub fn from_key(key: &str) -> Result<VariableSpec, String> {
        let key_parts: Vec<&str> = key.split(',').collect();
        if key_parts.len() != 4 {
            return Err(format!("invalid variable key: {key}"));
        }

        let x: Result<usize, _> = key_parts[0].parse();
        let y: Result<usize, _> = key_parts[1].parse();
        let direction: Option<Direction> = match key_parts[2] {
            "across" => Some(Direction::Across),
            "down" => Some(Direction::Down),
            _ => None,
        };
        let length: Result<usize, _> = key_parts[3].parse();

        if let (Ok(x), Ok(y), Some(direction), Ok(length)) = (x, y, direction, length) {
            Ok(VariableSpec {
                start_cell: (x, y),
                direction,
                length,
            })
        } else {
            Err(format!("invalid variable key: {key:?}"))
        }
    }

    /// Represent this variable as a string like "1,2,down,5".
    #[must_use]
    pub fn to_key(&self) -> String {
        let direction = match self.direction {
            Direction::Across => "across",
            Direction::Down => "down",
        };
        format!(
            "{},{},{},{}",
            self.start_cell.0, self.start_cell.1, direction, self.length,
        )
    }

    /// Does this spec match the given variable?
    #[must_use]
    pub fn matches_variable(&self, variable: &Variable) -> bool {
        self.start_cell == variable.start_cell
            && self.direction == variable.direction
            && self.length == variable.length
    }
}

/// Serialize a `VariableSpec` into a string key.
#[cfg(feature = "serde")]
impl Serialize for VariableSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_key())
    }
}

/// Deserialize a `VariableSpec` from a string key.
#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for VariableSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw_string = String::deserialize(deserializer)?;
        VariableSpec::from_key(&raw_string).map_err(serde::de::Error::custom)
    }
}

/// Derive the variables of a grid: every maximal run of fillable cells of length >= 2, across runs
/// in reading order followed by down runs column by column, with the overlaps between crossing
/// runs linked up. A run of length 1 is not a variable. This is deterministic and is run exactly
/// once per puzzle.
#[must_use]
pub fn generate_variables(grid: &Grid) -> Vec<Variable> {
    let mut runs: Vec<(GridCoord, Direction, Vec<GridCoord>)> = vec![];

    for y in 0..grid.height {
        let mut current_run: Vec<GridCoord> = vec![];
        for x in 0..grid.width {
            if grid.is_fillable((x, y)) {
                current_run.push((x, y));
            } else {
                if current_run.len() > 1 {
                    runs.push((current_run[0], Direction::Across, current_run.clone()));
                }
                current_run.clear();
            }
        }
        if current_run.len() > 1 {
            runs.push((current_run[0], Direction::Across, current_run));
        }
    }

    for x in 0..grid.width {
        let mut current_run: Vec<GridCoord> = vec![];
        for y in 0..grid.height {
            if grid.is_fillable((x, y)) {
                current_run.push((x, y));
            } else {
                if current_run.len() > 1 {
                    runs.push((current_run[0], Direction::Down, current_run.clone()));
                }
                current_run.clear();
            }
        }
        if current_run.len() > 1 {
            runs.push((current_run[0], Direction::Down, current_run));
        }
    }

    // Build a map from cell location to the runs involved, which we can then use to calculate
    // overlaps. Each cell belongs to at most one run per direction, so at most two runs share it.
    let mut runs_by_loc: HashMap<GridCoord, Vec<(VariableId, usize)>> = HashMap::new();

    for (run_idx, (_, _, coords)) in runs.iter().enumerate() {
        for (cell_idx, &loc) in coords.iter().enumerate() {
            runs_by_loc.entry(loc).or_default().push((run_idx, cell_idx));
        }
    }

    runs.iter()
        .enumerate()
        .map(|(run_idx, (start_cell, direction, coords))| {
            let overlaps: Vec<Option<Overlap>> = coords
                .iter()
                .map(|loc| {
                    runs_by_loc[loc]
                        .iter()
                        .find(|&&(other_idx, _)| other_idx != run_idx)
                        .map(|&(other_var_id, other_var_cell)| Overlap {
                            other_var_id,
                            other_var_cell,
                        })
                })
                .collect();

            Variable {
                id: run_idx,
                start_cell: *start_cell,
                direction: *direction,
                length: coords.len(),
                overlaps,
            }
        })
        .collect()
}

/// A struct holding everything needed as input to a solve: the grid structure, the variables
/// derived from it, and the word corpus.
pub struct Puzzle {
    pub word_list: WordList,
    pub grid: Grid,
    pub variables: Vec<Variable>,
}

impl Puzzle {
    /// Build a puzzle from a parsed grid and a word list.
    #[must_use]
    pub fn new(grid: Grid, word_list: WordList) -> Puzzle {
        let variables = generate_variables(&grid);

        Puzzle {
            word_list,
            grid,
            variables,
        }
    }

    /// Build a puzzle from a template string (see `Grid::parse`) and a word list.
    pub fn from_template_string(template: &str, word_list: WordList) -> Result<Puzzle, GridError> {
        Ok(Puzzle::new(Grid::parse(template)?, word_list))
    }
}

/// A struct recording a variable assignment made during a solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub var_id: VariableId,
    pub word_id: WordId,
}

/// Project the given choices onto the grid, producing one character per covered fillable cell and
/// `None` elsewhere. A fillable cell that no variable covers is left blank rather than treated as
/// an error.
#[must_use]
pub fn letter_grid(puzzle: &Puzzle, choices: &[Choice]) -> Vec<Vec<Option<char>>> {
    let mut letters: Vec<Vec<Option<char>>> =
        vec![vec![None; puzzle.grid.width]; puzzle.grid.height];

    for &Choice { var_id, word_id } in choices {
        let variable = &puzzle.variables[var_id];
        let word = &puzzle.word_list.words[variable.length][word_id];

        for (&(x, y), &glyph) in variable.cell_coords().iter().zip(&word.glyphs) {
            letters[y][x] = Some(puzzle.word_list.glyphs[glyph]);
        }
    }

    letters
}

/// Turn the given puzzle and choices into a rendered string, with `#` for blocks and `.` for any
/// fillable cell left uncovered.
#[must_use]
pub fn render_grid(puzzle: &Puzzle, choices: &[Choice]) -> String {
    let letters = letter_grid(puzzle, choices);

    (0..puzzle.grid.height)
        .map(|y| {
            (0..puzzle.grid.width)
                .map(|x| {
                    if puzzle.grid.is_fillable((x, y)) {
                        letters[y][x].unwrap_or('.')
                    } else {
                        '#'
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use crate::puzzle::{
        generate_variables, letter_grid, render_grid, Choice, Direction, Grid, GridError, Puzzle,
        VariableSpec,
    };
    use crate::word_list::tests::memory_word_list;

    #[test]
    fn test_parse_rejects_ragged_rows() {
        let result = Grid::parse(
            "
            ...
            ..
            ",
        );

        assert_eq!(result.unwrap_err(), GridError::NonRectangular);
    }

    #[test]
    fn test_parse_rejects_empty_template() {
        assert_eq!(Grid::parse("\n  \n").unwrap_err(), GridError::Empty);
    }

    #[test]
    fn test_variable_derivation_skips_length_one_runs() {
        // The center cell is blocked, so each middle row/column splits into length-1 runs that
        // must not become variables.
        let grid = Grid::parse(
            "
            ...
            .#.
            ...
            ",
        )
        .unwrap();

        let variables = generate_variables(&grid);

        assert_eq!(variables.len(), 4);
        assert_eq!(
            variables
                .iter()
                .map(|variable| variable.spec().to_key())
                .collect::<Vec<_>>(),
            vec!["0,0,across,3", "0,2,across,3", "0,0,down,3", "2,0,down,3"]
        );
    }

    #[test]
    fn test_overlap_indices() {
        let grid = Grid::parse(
            "
            ...
            .#.
            ...
            ",
        )
        .unwrap();

        let variables = generate_variables(&grid);

        // Top across run crosses the left down run at its first cell and the right down run at
        // its last cell.
        assert_eq!(variables[0].overlap_with(2), Some((0, 0)));
        assert_eq!(variables[0].overlap_with(3), Some((2, 0)));

        // Bottom across run crosses both down runs at their last cells.
        assert_eq!(variables[1].overlap_with(2), Some((0, 2)));
        assert_eq!(variables[1].overlap_with(3), Some((2, 2)));

        // Overlaps are symmetric.
        assert_eq!(variables[2].overlap_with(0), Some((0, 0)));
        assert_eq!(variables[3].overlap_with(1), Some((2, 2)));

        // The two across runs don't touch.
        assert_eq!(variables[0].overlap_with(1), None);

        assert_eq!(variables[0].degree(), 2);
    }

    #[test]
    fn test_variable_spec_key_round_trip() {
        let spec = VariableSpec::from_key("1,2,down,5").unwrap();
        assert_eq!(
            spec,
            VariableSpec {
                start_cell: (1, 2),
                direction: Direction::Down,
                length: 5,
            }
        );
        assert_eq!(spec.to_key(), "1,2,down,5");

        assert!(VariableSpec::from_key("1,2,sideways,5").is_err());
        assert!(VariableSpec::from_key("1,2,down").is_err());
    }

    #[test]
    fn test_letter_grid_leaves_uncovered_cells_blank() {
        // The top-right cell is fillable but part of no run of length >= 2, so no variable covers
        // it; the adapter must leave it blank instead of failing.
        let word_list = memory_word_list(&["at"]);
        let puzzle = Puzzle::from_template_string(
            "
            .#.
            .##
            ",
            word_list,
        )
        .unwrap();

        assert_eq!(puzzle.variables.len(), 1);

        let choices = vec![Choice {
            var_id: 0,
            word_id: 0,
        }];
        let letters = letter_grid(&puzzle, &choices);

        assert_eq!(letters[0][0], Some('a'));
        assert_eq!(letters[1][0], Some('t'));
        assert_eq!(letters[0][2], None);

        assert_eq!(render_grid(&puzzle, &choices), "a#.\nt##");
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use crate::puzzle::{Direction, VariableSpec};

    #[test]
    fn test_variable_spec_serialization() {
        let spec = VariableSpec {
            start_cell: (1, 2),
            direction: Direction::Across,
            length: 5,
        };

        let key = serde_json::to_string(&spec).unwrap();

        assert_eq!(key, "\"1,2,across,5\"");
    }

    #[test]
    fn test_variable_spec_deserialization() {
        let spec: VariableSpec = serde_json::from_str("\"3,4,down,12\"").unwrap();

        assert_eq!(
            spec,
            VariableSpec {
                start_cell: (3, 4),
                direction: Direction::Down,
                length: 12,
            }
        );
    }
}
