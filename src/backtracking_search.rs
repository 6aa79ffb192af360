//! This module implements puzzle solving using a backtracking search over the domains left behind
//! by constraint propagation. Variables are ordered by minimum remaining values with a
//! maximum-degree tie-break, candidate words by least-constraining value, and every tie falls back
//! to creation order so the search is fully deterministic.
//!
//! Arc consistency is established once, globally, before the search starts; inside the search we
//! only re-validate the partial assignment incrementally (word uniqueness plus agreement with
//! already-assigned crossings), rather than re-running propagation at every node.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::arc_consistency::establish_arc_consistency;
use crate::domain::{DomainStore, GlyphCounts};
use crate::puzzle::{Choice, Puzzle};
use crate::types::{VariableId, WordId};

/// A struct tracking stats about the solving process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// How many search nodes did we expand? This stays at zero when propagation alone proves the
    /// puzzle unsolvable.
    pub states: usize,

    /// How many tentative assignments did we undo?
    pub backtracks: usize,

    pub total_time: Duration,
}

/// A struct representing the results of a successful solve.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub choices: Vec<Choice>,
}

/// A struct representing a failed solve: the puzzle has no solution, whether that was detected by
/// propagation or by exhausting the search space.
#[derive(Debug)]
pub struct FillFailure {
    pub statistics: Statistics,
}

/// The live state of one solve attempt. The partial assignment is owned exclusively by the active
/// recursion; the domain store is the read-only baseline produced by arc consistency.
struct Searcher<'a> {
    puzzle: &'a Puzzle,
    domains: &'a DomainStore,
    assigned: Vec<Option<WordId>>,
    statistics: Statistics,
}

impl Searcher<'_> {
    /// Pick the unassigned variable with the fewest remaining domain values, breaking ties by the
    /// most crossings and then by lowest id. Returns `None` when the assignment is complete.
    fn select_unassigned_variable(&self) -> Option<VariableId> {
        self.puzzle
            .variables
            .iter()
            .filter(|variable| self.assigned[variable.id].is_none())
            .min_by_key(|variable| {
                (
                    self.domains.option_count(variable.id),
                    Reverse(variable.degree()),
                    variable.id,
                )
            })
            .map(|variable| variable.id)
    }

    /// Order a variable's candidates least-constraining first: ascending by the number of
    /// candidates they would eliminate from currently-unassigned crossing variables. Ties keep
    /// ascending word-id order, since the underlying domain is sorted and the sort is stable.
    fn order_domain_values(&self, var_id: VariableId) -> Vec<WordId> {
        let variable = &self.puzzle.variables[var_id];

        // For each unassigned crossing, how many of its options put each glyph in the shared cell.
        let crossing_supports: Vec<(usize, GlyphCounts, usize)> = variable
            .overlaps
            .iter()
            .enumerate()
            .filter_map(|(cell_idx, overlap)| {
                let overlap = overlap.as_ref()?;
                if self.assigned[overlap.other_var_id].is_some() {
                    return None;
                }

                Some((
                    cell_idx,
                    self.domains.glyph_counts_at_cell(
                        self.puzzle,
                        overlap.other_var_id,
                        overlap.other_var_cell,
                    ),
                    self.domains.option_count(overlap.other_var_id),
                ))
            })
            .collect();

        let words = &self.puzzle.word_list.words[variable.length];
        let mut ordered = self.domains.options(var_id).to_vec();

        ordered.sort_by_cached_key(|&word_id| {
            let glyphs = &words[word_id].glyphs;

            crossing_supports
                .iter()
                .map(|&(cell_idx, ref counts, option_count)| {
                    option_count - counts[glyphs[cell_idx]] as usize
                })
                .sum::<usize>()
        });

        ordered
    }

    /// Would assigning this word keep the partial assignment consistent? The word must be unused
    /// anywhere else in the grid, and must agree with every already-assigned crossing variable at
    /// the shared cell. Length consistency holds by construction of the domain store.
    fn is_consistent_choice(&self, var_id: VariableId, word_id: WordId) -> bool {
        let variable = &self.puzzle.variables[var_id];

        // Uniqueness is global, not just between crossings. Two words can only be equal if their
        // lengths match, so comparing ids within the length bucket is enough.
        let duplicate = self.puzzle.variables.iter().any(|other| {
            other.id != var_id
                && other.length == variable.length
                && self.assigned[other.id] == Some(word_id)
        });
        if duplicate {
            return false;
        }

        let word = &self.puzzle.word_list.words[variable.length][word_id];

        variable
            .overlaps
            .iter()
            .enumerate()
            .all(|(cell_idx, overlap)| {
                let Some(overlap) = overlap else { return true };
                let Some(other_word_id) = self.assigned[overlap.other_var_id] else {
                    return true;
                };

                let other_length = self.puzzle.variables[overlap.other_var_id].length;
                let other_word = &self.puzzle.word_list.words[other_length][other_word_id];

                word.glyphs[cell_idx] == other_word.glyphs[overlap.other_var_cell]
            })
    }

    /// Recursively extend the partial assignment, returning whether a complete consistent
    /// assignment was reached. Each tentative choice is undone before trying the next, so sibling
    /// branches never observe each other's state; the first success propagates straight up.
    fn backtrack(&mut self) -> bool {
        let Some(var_id) = self.select_unassigned_variable() else {
            return true;
        };

        self.statistics.states += 1;

        for word_id in self.order_domain_values(var_id) {
            if !self.is_consistent_choice(var_id, word_id) {
                continue;
            }

            self.assigned[var_id] = Some(word_id);
            if self.backtrack() {
                return true;
            }

            self.assigned[var_id] = None;
            self.statistics.backtracks += 1;
        }

        false
    }
}

/// Search for a valid fill for the given puzzle: node consistency, then one global
/// arc-consistency pass (whose failure short-circuits the search entirely), then backtracking.
pub fn find_fill(puzzle: &Puzzle) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();
    let mut statistics = Statistics::default();

    let mut domains = DomainStore::node_consistent(puzzle);

    let wiped_out = (0..puzzle.variables.len()).any(|var_id| domains.is_wiped_out(var_id));
    if wiped_out || !establish_arc_consistency(puzzle, &mut domains) {
        statistics.total_time = start.elapsed();
        return Err(FillFailure { statistics });
    }

    let mut searcher = Searcher {
        puzzle,
        domains: &domains,
        assigned: vec![None; puzzle.variables.len()],
        statistics,
    };

    let solved = searcher.backtrack();
    searcher.statistics.total_time = start.elapsed();

    if solved {
        let choices = searcher
            .assigned
            .iter()
            .enumerate()
            .filter_map(|(var_id, word_id)| word_id.map(|word_id| Choice { var_id, word_id }))
            .collect();

        Ok(FillSuccess {
            statistics: searcher.statistics,
            choices,
        })
    } else {
        Err(FillFailure {
            statistics: searcher.statistics,
        })
    }
}

/// Solve the puzzle, reporting either a complete assignment or "no solution".
#[must_use]
pub fn solve(puzzle: &Puzzle) -> Option<Vec<Choice>> {
    find_fill(puzzle).ok().map(|success| success.choices)
}

/// Check a set of choices against the full consistency contract: one word per variable, matching
/// lengths, pairwise-distinct words, and agreement at every overlap. Anything the solver returns
/// passes this; it's exposed so callers can re-validate assignments they've stored or edited.
#[must_use]
pub fn validate_choices(puzzle: &Puzzle, choices: &[Choice]) -> bool {
    if choices.len() != puzzle.variables.len() {
        return false;
    }

    let mut assigned: Vec<Option<WordId>> = vec![None; puzzle.variables.len()];
    let mut used_words: HashSet<(usize, WordId)> = HashSet::new();

    for choice in choices {
        let Some(variable) = puzzle.variables.get(choice.var_id) else {
            return false;
        };
        if assigned[choice.var_id].is_some() {
            return false;
        }
        if choice.word_id >= puzzle.word_list.words_of_length(variable.length).len() {
            return false;
        }
        if !used_words.insert((variable.length, choice.word_id)) {
            return false;
        }

        assigned[choice.var_id] = Some(choice.word_id);
    }

    puzzle.variables.iter().all(|variable| {
        let Some(word_id) = assigned[variable.id] else {
            return false;
        };
        let word = &puzzle.word_list.words[variable.length][word_id];

        variable
            .overlaps
            .iter()
            .enumerate()
            .all(|(cell_idx, overlap)| {
                let Some(overlap) = overlap else { return true };
                let Some(other_word_id) = assigned[overlap.other_var_id] else {
                    return false;
                };

                let other_length = puzzle.variables[overlap.other_var_id].length;
                let other_word = &puzzle.word_list.words[other_length][other_word_id];

                word.glyphs[cell_idx] == other_word.glyphs[overlap.other_var_cell]
            })
    })
}
