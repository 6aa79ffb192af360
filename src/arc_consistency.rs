//! This module implements the classical AC-3 algorithm over a puzzle's crossing constraints. A
//! domain store is arc-consistent when every remaining candidate for every variable has at least
//! one compatible candidate in each crossing variable's domain.
//!
//! The propagation runs over an explicit worklist of directed arcs rather than recursing into
//! itself, which keeps the termination argument simple: each arc we re-enqueue corresponds to a
//! strict shrink of some domain, and domains are bounded below by the empty set.

use std::collections::VecDeque;

use crate::domain::DomainStore;
use crate::puzzle::Puzzle;
use crate::types::VariableId;

/// Prune the given store to a fixed point of pairwise consistency. Returns `false` as soon as any
/// revision wipes out a domain, which proves the puzzle unsolvable from this state; on `true`, the
/// store is arc-consistent for every crossing pair, not just the initially-queued arcs.
pub fn establish_arc_consistency(puzzle: &Puzzle, domains: &mut DomainStore) -> bool {
    // Seed the queue with every directed arc. Both orientations are needed, since revising (x, y)
    // says nothing about whether y's candidates are supported by x.
    let mut queue: VecDeque<(VariableId, VariableId)> = puzzle
        .variables
        .iter()
        .flat_map(|variable| {
            variable
                .neighbor_ids()
                .map(move |other_var_id| (variable.id, other_var_id))
        })
        .collect();

    while let Some((x, y)) = queue.pop_front() {
        if domains.revise(puzzle, x, y) {
            if domains.is_wiped_out(x) {
                return false;
            }

            // x's domain shrank, so candidates in other crossing variables may have lost their
            // support from x: re-check the arcs pointing *at* x. The arc from y doesn't need to be
            // re-queued, since the candidates we just removed had no support in y to begin with.
            for z in puzzle.variables[x].neighbor_ids() {
                if z != y {
                    queue.push_back((z, x));
                }
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use crate::arc_consistency::establish_arc_consistency;
    use crate::domain::DomainStore;
    use crate::puzzle::Puzzle;
    use crate::word_list::tests::memory_word_list;

    fn crossing_pair_puzzle(words: &[&str]) -> Puzzle {
        Puzzle::from_template_string(
            "
            ...
            #.#
            #.#
            ",
            memory_word_list(words),
        )
        .unwrap()
    }

    /// Every remaining candidate must have support at every crossing.
    fn assert_arc_consistent(puzzle: &Puzzle, domains: &DomainStore) {
        for variable in &puzzle.variables {
            for &word_id in domains.options(variable.id) {
                let word = &puzzle.word_list.words[variable.length][word_id];

                for (cell_idx, overlap) in variable.overlaps.iter().enumerate() {
                    let Some(overlap) = overlap else { continue };

                    let supported = domains.options(overlap.other_var_id).iter().any(|&other_id| {
                        let other_length = puzzle.variables[overlap.other_var_id].length;
                        let other_word = &puzzle.word_list.words[other_length][other_id];
                        other_word.glyphs[overlap.other_var_cell] == word.glyphs[cell_idx]
                    });

                    assert!(
                        supported,
                        "candidate {:?} for variable {} has no support at cell {}",
                        word.normalized_string, variable.id, cell_idx
                    );
                }
            }
        }
    }

    #[test]
    fn test_prunes_to_mutual_support() {
        let puzzle = crossing_pair_puzzle(&["cat", "dog", "art"]);
        let mut domains = DomainStore::node_consistent(&puzzle);

        assert!(establish_arc_consistency(&puzzle, &mut domains));
        assert_arc_consistent(&puzzle, &domains);

        // Only cat (across) and art (down) survive: 'a' at across cell 1 / down cell 0.
        assert_eq!(domains.option_count(0), 1);
        assert_eq!(domains.option_count(1), 1);
        assert_eq!(
            puzzle.word_list.words[3][domains.options(0)[0]].normalized_string,
            "cat"
        );
        assert_eq!(
            puzzle.word_list.words[3][domains.options(1)[0]].normalized_string,
            "art"
        );
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let puzzle = crossing_pair_puzzle(&["cat", "dog", "art", "oar", "tar"]);
        let mut domains = DomainStore::node_consistent(&puzzle);

        assert!(establish_arc_consistency(&puzzle, &mut domains));
        let counts_after_first: Vec<usize> = (0..puzzle.variables.len())
            .map(|var_id| domains.option_count(var_id))
            .collect();

        assert!(establish_arc_consistency(&puzzle, &mut domains));
        let counts_after_second: Vec<usize> = (0..puzzle.variables.len())
            .map(|var_id| domains.option_count(var_id))
            .collect();

        assert_eq!(counts_after_first, counts_after_second);
    }

    #[test]
    fn test_detects_domain_wipeout() {
        // No word's middle letter matches any word's first letter, so the crossing can't be
        // satisfied no matter what.
        let puzzle = crossing_pair_puzzle(&["cat", "dog"]);
        let mut domains = DomainStore::node_consistent(&puzzle);

        assert!(!establish_arc_consistency(&puzzle, &mut domains));
    }

    #[test]
    fn test_wider_grid_keeps_all_supported_options() {
        // A 3x3 ring: two across and two down variables crossing at the corners.
        let puzzle = Puzzle::from_template_string(
            "
            ...
            .#.
            ...
            ",
            memory_word_list(&["cat", "car", "tar", "ran", "rat", "nap"]),
        )
        .unwrap();
        let mut domains = DomainStore::node_consistent(&puzzle);

        assert!(establish_arc_consistency(&puzzle, &mut domains));
        assert_arc_consistent(&puzzle, &domains);

        for var_id in 0..puzzle.variables.len() {
            assert!(domains.option_count(var_id) > 0);
        }
    }
}
