//! This module implements the mutable candidate store that constraint propagation and search
//! reason over: for each variable, the list of words still considered possible. Node consistency
//! establishes the store (every candidate has the variable's length, which later pruning preserves
//! since it only ever removes words); arc revision shrinks it. `Clone` gives snapshot semantics,
//! so exploratory pruning can work on an owned copy without disturbing the shared baseline.

use smallvec::{smallvec, SmallVec};

use crate::puzzle::Puzzle;
use crate::types::{VariableId, WordId};
use crate::MAX_GLYPH_COUNT;

/// Occurrence counts indexed by glyph id, describing how many of a variable's remaining options
/// place each glyph at one particular cell. A nonzero count means the glyph still has support.
pub type GlyphCounts = SmallVec<[u32; MAX_GLYPH_COUNT]>;

/// The current candidate words for every variable, in ascending word-id order.
#[derive(Debug, Clone)]
pub struct DomainStore {
    options: Vec<Vec<WordId>>,
}

impl DomainStore {
    /// Build a node-consistent store for the given puzzle: each variable's domain is exactly the
    /// corpus words of matching length. An empty domain here is valid data; the caller decides
    /// what to do about it.
    #[must_use]
    pub fn node_consistent(puzzle: &Puzzle) -> DomainStore {
        DomainStore {
            options: puzzle
                .variables
                .iter()
                .map(|variable| {
                    (0..puzzle.word_list.words_of_length(variable.length).len()).collect()
                })
                .collect(),
        }
    }

    /// The remaining candidate words for a variable.
    #[must_use]
    pub fn options(&self, var_id: VariableId) -> &[WordId] {
        &self.options[var_id]
    }

    /// How many candidates does a variable have left?
    #[must_use]
    pub fn option_count(&self, var_id: VariableId) -> usize {
        self.options[var_id].len()
    }

    /// Has a variable's domain been wiped out? This signals that the puzzle is unsolvable from
    /// the current state.
    #[must_use]
    pub fn is_wiped_out(&self, var_id: VariableId) -> bool {
        self.options[var_id].is_empty()
    }

    /// Count how many of a variable's remaining options place each glyph at the given cell.
    #[must_use]
    pub fn glyph_counts_at_cell(
        &self,
        puzzle: &Puzzle,
        var_id: VariableId,
        cell_idx: usize,
    ) -> GlyphCounts {
        let length = puzzle.variables[var_id].length;
        let mut counts: GlyphCounts = smallvec![0; puzzle.word_list.glyphs.len()];

        for &word_id in &self.options[var_id] {
            counts[puzzle.word_list.words[length][word_id].glyphs[cell_idx]] += 1;
        }

        counts
    }

    /// Make `x` arc-consistent with `y`: remove every candidate of `x` whose glyph at the shared
    /// cell has no support among `y`'s candidates. Returns whether anything was removed. This
    /// consults only the two variables' domains plus their overlap, and never adds candidates.
    pub fn revise(&mut self, puzzle: &Puzzle, x: VariableId, y: VariableId) -> bool {
        let Some((x_cell, y_cell)) = puzzle.variables[x].overlap_with(y) else {
            return false;
        };

        let support = self.glyph_counts_at_cell(puzzle, y, y_cell);
        let x_length = puzzle.variables[x].length;
        let word_list = &puzzle.word_list;

        let count_before = self.options[x].len();
        self.options[x]
            .retain(|&word_id| support[word_list.words[x_length][word_id].glyphs[x_cell]] > 0);

        self.options[x].len() != count_before
    }
}
