//! Integration tests for the crossfill solver.
//!
//! These tests verify the complete pipeline from structure parsing through
//! constraint propagation and search to result validation, using small grids
//! whose solution sets can be worked out by hand.

use std::rc::Rc;

use crossfill::assignment::Assignment;
use crossfill::puzzle::Puzzle;
use crossfill::solver::{self, SolveStatus, Solver};
use crossfill::word_list::WordList;

/// Check the four solution invariants against the puzzle: completeness,
/// length correctness, pairwise-distinct words, agreement at every crossing.
fn assert_valid_solution(puzzle: &Puzzle, assignment: &Assignment) {
    assert!(assignment.is_complete());
    assert_eq!(assignment.var_count(), puzzle.variables().len());

    let words: Vec<&Rc<str>> = (0..puzzle.variables().len())
        .map(|id| assignment.get(id).expect("complete assignment"))
        .collect();

    for (id, word) in words.iter().enumerate() {
        assert_eq!(
            word.chars().count(),
            puzzle.variable(id).length,
            "wrong length in slot {}",
            puzzle.variable(id)
        );
    }

    for x in 0..words.len() {
        for y in (x + 1)..words.len() {
            assert_ne!(words[x], words[y], "slots {x} and {y} reuse a word");
            if let Some((i, j)) = puzzle.overlap(x, y) {
                assert_eq!(
                    words[x].chars().nth(i),
                    words[y].chars().nth(j),
                    "slots {x} and {y} disagree at their crossing"
                );
            }
        }
    }
}

#[cfg(test)]
mod scenarios {
    use super::*;

    #[test]
    fn test_forced_pair_is_found() {
        // One across and one down slot crossing at (across[1], down[0]).
        // Only CAT/ART agree on the shared letter, so the fill is forced.
        let puzzle = Puzzle::parse("___\n#_#\n#_#").unwrap();
        let solution = solver::solve(&puzzle, &["CAT", "ART", "DOG"]).unwrap().unwrap();

        assert_valid_solution(&puzzle, &solution);
        assert_eq!(solution.get(0).map(|w| w.as_ref()), Some("CAT"));
        assert_eq!(solution.get(1).map(|w| w.as_ref()), Some("ART"));
    }

    #[test]
    fn test_no_word_of_required_length_skips_search() {
        // Every slot needs three letters; the vocabulary has none, so node
        // consistency alone settles the matter and the search never runs.
        let puzzle = Puzzle::parse("___\n#_#\n#_#").unwrap();
        let result = Solver::new(&puzzle, &["FOUR", "FIVER", "AB"]).solve().unwrap();

        assert_eq!(result.status, SolveStatus::Unsatisfiable);
        assert!(result.assignment.is_none());
        assert_eq!(result.stats.nodes_expanded, 0);
        assert_eq!(result.stats.branches_explored, 0);
    }

    #[test]
    fn test_disconnected_slots_still_get_distinct_words() {
        let puzzle = Puzzle::parse("___\n###\n___").unwrap();
        let solution = solver::solve(&puzzle, &["CAT", "DOG"]).unwrap().unwrap();

        assert_valid_solution(&puzzle, &solution);
        assert_ne!(solution.get(0), solution.get(1));
    }

    #[test]
    fn test_disconnected_slots_fail_when_only_one_word_fits() {
        // Two slots, one candidate: the no-reuse rule alone makes this
        // unsatisfiable even though the slots never cross.
        let puzzle = Puzzle::parse("___\n###\n___").unwrap();
        let solution = solver::solve(&puzzle, &["CAT"]).unwrap();

        assert!(solution.is_none());
    }

    #[test]
    fn test_unsatisfiable_grid_explores_branches() {
        // Four mutually crossing slots and four words that cannot tile the
        // square: the search has to actually try and reject branches.
        let puzzle = Puzzle::parse("__\n__").unwrap();
        let result = Solver::new(&puzzle, &["AA", "BB", "AB", "BA"]).solve().unwrap();

        assert_eq!(result.status, SolveStatus::Unsatisfiable);
        assert!(result.assignment.is_none());
        assert!(result.stats.branches_explored > 0);
        assert!(result.stats.backtracks > 0);
    }
}

#[cfg(test)]
mod invariants {
    use super::*;

    #[test]
    fn test_full_square_solution_satisfies_invariants() {
        // A 3×3 word square: rows CAT/ORE/WED, columns COW/ARE/TED (or the
        // transposed fill; both are valid).
        let puzzle = Puzzle::parse("___\n___\n___").unwrap();
        let vocabulary = ["CAT", "ORE", "WED", "COW", "ARE", "TED", "ZZZ"];
        let solution = solver::solve(&puzzle, &vocabulary).unwrap().unwrap();

        assert_valid_solution(&puzzle, &solution);
    }

    #[test]
    fn test_ac3_is_monotone_and_idempotent() {
        let puzzle = Puzzle::parse("___\n___\n___").unwrap();
        let vocabulary = ["CAT", "ORE", "WED", "COW", "ARE", "TED", "ZZZ"];
        let mut solver = Solver::new(&puzzle, &vocabulary);
        solver.enforce_node_consistency();

        let before: Vec<usize> =
            (0..puzzle.variables().len()).map(|id| solver.domains().size(id)).collect();
        assert!(solver.ac3(None).unwrap());
        let after: Vec<usize> =
            (0..puzzle.variables().len()).map(|id| solver.domains().size(id)).collect();
        assert!(after.iter().zip(&before).all(|(a, b)| a <= b));

        assert!(solver.ac3(None).unwrap());
        let again: Vec<usize> =
            (0..puzzle.variables().len()).map(|id| solver.domains().size(id)).collect();
        assert_eq!(again, after);
    }

    #[test]
    fn test_ac3_failure_means_no_solution() {
        // No across word's middle letter matches any down word's first
        // letter, so propagation proves emptiness before any search.
        let puzzle = Puzzle::parse("___\n#_#\n#_#").unwrap();
        let vocabulary = ["ABC", "DEF"];

        let mut propagation = Solver::new(&puzzle, &vocabulary);
        propagation.enforce_node_consistency();
        assert!(!propagation.ac3(None).unwrap());

        let result = Solver::new(&puzzle, &vocabulary).solve().unwrap();
        assert_eq!(result.status, SolveStatus::Unsatisfiable);
        assert_eq!(result.stats.nodes_expanded, 0);
    }
}

#[cfg(test)]
mod limits {
    use super::*;

    #[test]
    fn test_node_budget_stops_the_search() {
        let puzzle = Puzzle::parse("__\n__").unwrap();
        let result = Solver::new(&puzzle, &["AA", "BB", "AB", "BA"])
            .with_node_limit(1)
            .solve()
            .unwrap();

        assert_eq!(result.status, SolveStatus::OutOfBudget);
        assert!(result.assignment.is_none());
    }

    #[test]
    fn test_generous_budget_does_not_change_the_answer() {
        let puzzle = Puzzle::parse("___\n#_#\n#_#").unwrap();
        let result = Solver::new(&puzzle, &["CAT", "ART", "DOG"])
            .with_node_limit(10_000)
            .solve()
            .unwrap();

        assert_eq!(result.status, SolveStatus::Solved);
        assert_valid_solution(&puzzle, &result.assignment.unwrap());
    }
}

#[cfg(test)]
mod word_list_io {
    use super::*;

    #[test]
    fn test_fixture_loads_with_score_filter() {
        let word_list = WordList::load_from_path("tests/fixtures/small_word_list.txt", 40).unwrap();

        // JUNK scores below the cutoff; the bare DOG line has no score and
        // is kept.
        assert!(word_list.words.iter().all(|w| w != "JUNK"));
        assert!(word_list.words.contains(&"DOG".to_string()));
        assert!(word_list.words.contains(&"CAT".to_string()));
    }

    #[test]
    fn test_fixture_vocabulary_fills_a_grid() {
        let word_list = WordList::load_from_path("tests/fixtures/small_word_list.txt", 40).unwrap();
        let puzzle = Puzzle::parse("___\n___\n___").unwrap();

        let solution = solver::solve(&puzzle, &word_list.as_refs()).unwrap().unwrap();
        assert_valid_solution(&puzzle, &solution);
    }
}
