//! The backtracking CSP solver that fills a puzzle from a vocabulary.
//!
//! Solving runs three stages over one shared domain store: node consistency
//! (length filtering), global arc consistency (AC-3), then depth-first
//! backtracking search with minimum-remaining-values/degree variable
//! selection, least-constraining-value ordering, and AC-3 re-run on a
//! restricted arc set after every tentative assignment. Domain pruning done
//! inside a search branch is rewound through the domain store's trail when
//! the branch is abandoned, so sibling branches start from clean domains.
//!
//! An unsolvable puzzle is an outcome ([`SolveStatus::Unsatisfiable`]),
//! never an error.
//!
//! # Error Handling
//!
//! The solver uses [`SolverError`] with two variants:
//!
//! - S001: `OverlapOutOfBounds` (A crossing index fell outside a candidate word)
//! - S002: `UnknownVariable` (An arc referenced a slot id outside the puzzle)
//!
//! Each error has a `code()`, optional `help()`, and `display_detailed()`
//! method. Both variants indicate malformed input or a caller bug; empty
//! domains and exhausted searches are reported through [`SolveStatus`].
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```
//! use crossfill::puzzle::Puzzle;
//! use crossfill::solver;
//!
//! let puzzle = Puzzle::parse("___\n#_#\n#_#")?;
//! let solution = solver::solve(&puzzle, &["CAT", "ART", "DOG"])?
//!     .expect("this grid has a fill");
//!
//! assert!(solution.is_complete());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Checking Solve Status
//!
//! ```
//! use crossfill::puzzle::Puzzle;
//! use crossfill::solver::{SolveStatus, Solver};
//!
//! let puzzle = Puzzle::parse("___\n#_#\n#_#")?;
//! let result = Solver::new(&puzzle, &["XYZ", "QQQ"]).solve()?;
//!
//! assert_eq!(result.status, SolveStatus::Unsatisfiable);
//! assert!(result.assignment.is_none());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use log::{debug, info};

use crate::assignment::Assignment;
use crate::domains::Domains;
use crate::errors::format_error_with_code_and_help;
use crate::puzzle::{Puzzle, VarId};
use crate::variable::Variable;

/// Status of a finished solver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveStatus {
    /// A complete, constraint-satisfying assignment was found.
    Solved,

    /// Every branch of the search was explored and rejected, or consistency
    /// propagation emptied a domain before the search began.
    Unsatisfiable,

    /// The node budget ran out before the search finished.
    OutOfBudget,
}

/// Counters describing how much work a run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Search steps taken: one per variable selection.
    pub nodes_expanded: u64,
    /// Candidate words tentatively placed in a slot.
    pub branches_explored: u64,
    /// Dead ends: selections whose every candidate was rejected.
    pub backtracks: u64,
    /// Words removed from domains by arc-consistency revision.
    pub words_pruned: u64,
}

/// Outcome of [`Solver::solve`]: the assignment (if any) plus run metadata.
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// The completed assignment, present exactly when `status` is
    /// [`SolveStatus::Solved`].
    pub assignment: Option<Assignment>,
    pub status: SolveStatus,
    pub stats: SearchStats,
}

/// Unified error type for the solver pipeline.
///
/// Unsatisfiable puzzles are not errors; these variants only fire on
/// malformed input (length-inconsistent domains fed to revision) or caller
/// bugs (arcs naming slots the puzzle does not have).
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// A crossing index fell outside a candidate word. Can only happen when
    /// a domain holds a word shorter than its slot, i.e. when revision runs
    /// against domains that were never made node-consistent.
    #[error("overlap index {index} out of bounds for word \"{word}\" in slot {variable}")]
    OverlapOutOfBounds { variable: Variable, word: String, index: usize },

    /// A caller-supplied arc referenced a slot id outside the puzzle.
    #[error("unknown slot id {id} (puzzle has {count} slots)")]
    UnknownVariable { id: VarId, count: usize },
}

impl SolverError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::OverlapOutOfBounds { .. } => "S001",
            SolverError::UnknownVariable { .. } => "S002",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            SolverError::OverlapOutOfBounds { .. } => {
                Some("Run enforce_node_consistency() before arc revision, or fix the vocabulary")
            }
            SolverError::UnknownVariable { .. } => {
                Some("Arc endpoints must be indices into Puzzle::variables()")
            }
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        format_error_with_code_and_help(&self.to_string(), self.code(), self.help())
    }
}

/// Character `index` of `word`, or the fail-fast error for a crossing that
/// points past the word's end.
fn char_at(variable: &Variable, word: &str, index: usize) -> Result<char, SolverError> {
    word.chars().nth(index).ok_or_else(|| SolverError::OverlapOutOfBounds {
        variable: *variable,
        word: word.to_string(),
        index,
    })
}

/// Fill `puzzle` from `vocabulary` in one call.
///
/// Runs node consistency, global arc consistency, and backtracking search;
/// returns the complete assignment, or `None` when the puzzle admits no
/// fill.
///
/// # Errors
///
/// Returns [`SolverError`] only for malformed input; see the module docs.
pub fn solve(puzzle: &Puzzle, vocabulary: &[&str]) -> Result<Option<Assignment>, SolverError> {
    Ok(Solver::new(puzzle, vocabulary).solve()?.assignment)
}

/// A backtracking solver owning the domain store for one run.
///
/// The intermediate stages (`enforce_node_consistency`, `ac3`, `consistent`,
/// the ordering heuristics, `backtrack`) are exposed individually so they
/// can be tested and composed; [`Solver::solve`] chains them in the standard
/// order.
pub struct Solver<'p> {
    puzzle: &'p Puzzle,
    domains: Domains,
    stats: SearchStats,
    node_limit: Option<u64>,
    exhausted_budget: bool,
}

impl<'p> Solver<'p> {
    /// A fresh solver whose domains each hold the full vocabulary.
    /// Duplicate vocabulary entries collapse; each word is interned into an
    /// `Rc<str>` shared by domains, orderings, and assignments.
    pub fn new(puzzle: &'p Puzzle, vocabulary: &[&str]) -> Solver<'p> {
        let vocabulary: HashSet<Rc<str>> = vocabulary.iter().map(|&word| Rc::from(word)).collect();
        Solver {
            puzzle,
            domains: Domains::new(puzzle.variables().len(), vocabulary),
            stats: SearchStats::default(),
            node_limit: None,
            exhausted_budget: false,
        }
    }

    /// Cap the number of search steps; exhausting the cap finishes the run
    /// with [`SolveStatus::OutOfBudget`] instead of searching to the end.
    #[must_use]
    pub fn with_node_limit(mut self, limit: u64) -> Solver<'p> {
        self.node_limit = Some(limit);
        self
    }

    /// Read-only view of the current domains.
    pub fn domains(&self) -> &Domains {
        &self.domains
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Remove every candidate whose length differs from its slot's length.
    /// Idempotent; may legitimately empty a domain, which later stages
    /// detect.
    pub fn enforce_node_consistency(&mut self) {
        for id in 0..self.puzzle.variables().len() {
            let length = self.puzzle.variable(id).length;
            self.domains.retain(id, |word| word.chars().count() == length);
        }
    }

    /// Make `x` arc-consistent with `y`: drop every candidate of `x` that
    /// agrees with no remaining candidate of `y` at their shared cell.
    /// Returns whether anything was removed. Non-crossing pairs are always
    /// consistent. An empty `y` domain dooms every candidate of `x`, which
    /// is correct: no legal completion exists on that branch.
    fn revise(&mut self, x: VarId, y: VarId) -> Result<bool, SolverError> {
        let Some((xi, yj)) = self.puzzle.overlap(x, y) else {
            return Ok(false);
        };

        // Letters y can still put on the shared cell.
        let mut supported = HashSet::new();
        for word in self.domains.candidates(y) {
            supported.insert(char_at(self.puzzle.variable(y), word, yj)?);
        }

        let mut doomed = Vec::new();
        for word in self.domains.candidates(x) {
            if !supported.contains(&char_at(self.puzzle.variable(x), word, xi)?) {
                doomed.push(Rc::clone(word));
            }
        }
        for word in &doomed {
            self.domains.remove(x, word);
            self.stats.words_pruned += 1;
        }
        Ok(!doomed.is_empty())
    }

    /// Propagate pairwise constraints to a fixed point (AC-3).
    ///
    /// Starts from `arcs` when supplied, otherwise from every directed arc
    /// in the puzzle. Whenever revising `(x, y)` changes x's domain, the
    /// arcs `(z, x)` for x's other neighbors are re-enqueued, since the
    /// pruning may have invalidated their values. Returns `Ok(false)` as
    /// soon as a domain empties, `Ok(true)` at a non-empty fixed point.
    ///
    /// # Errors
    ///
    /// [`SolverError::UnknownVariable`] if a supplied arc names a slot id
    /// the puzzle does not have; [`SolverError::OverlapOutOfBounds`] from
    /// revision against length-inconsistent domains.
    pub fn ac3(&mut self, arcs: Option<Vec<(VarId, VarId)>>) -> Result<bool, SolverError> {
        let count = self.puzzle.variables().len();
        let mut queue: VecDeque<(VarId, VarId)> = match arcs {
            Some(list) => {
                for &(x, y) in &list {
                    if x >= count {
                        return Err(SolverError::UnknownVariable { id: x, count });
                    }
                    if y >= count {
                        return Err(SolverError::UnknownVariable { id: y, count });
                    }
                }
                list.into()
            }
            None => self.puzzle.arcs().collect(),
        };

        while let Some((x, y)) = queue.pop_front() {
            if self.revise(x, y)? {
                if self.domains.size(x) == 0 {
                    debug!("arc consistency emptied the domain of slot {}", self.puzzle.variable(x));
                    return Ok(false);
                }
                for &z in self.puzzle.neighbors(x) {
                    if z != y {
                        queue.push_back((z, x));
                    }
                }
            }
        }
        Ok(true)
    }

    /// Read-only check that a (possibly partial) assignment violates no
    /// constraint: pairwise-distinct words, length-correct words, agreement
    /// at every assigned crossing. Never touches the domain store; domain
    /// pruning belongs exclusively to the search's inference step.
    pub fn consistent(&self, assignment: &Assignment) -> Result<bool, SolverError> {
        let mut seen: HashSet<&Rc<str>> = HashSet::new();
        for (id, word) in assignment.iter() {
            if !seen.insert(word) {
                return Ok(false);
            }

            let variable = self.puzzle.variable(id);
            if word.chars().count() != variable.length {
                return Ok(false);
            }

            for &other in self.puzzle.neighbors(id) {
                // Each assigned crossing is checked once, from its lower id.
                if other < id {
                    continue;
                }
                let Some(other_word) = assignment.get(other) else {
                    continue;
                };
                let Some((i, j)) = self.puzzle.overlap(id, other) else {
                    continue;
                };
                if char_at(variable, word, i)?
                    != char_at(self.puzzle.variable(other), other_word, j)?
                {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Remaining candidates for `var`, least-constraining first: ascending
    /// by the number of words the choice would eliminate from the domains
    /// of `var`'s unassigned neighbors (disagreement at the shared cell).
    /// Equal counts fall back to lexicographic order so runs are
    /// deterministic.
    pub fn order_domain_values(
        &self,
        var: VarId,
        assignment: &Assignment,
    ) -> Result<Vec<Rc<str>>, SolverError> {
        struct CrossTally {
            // Index of the shared cell within var's word.
            at: usize,
            // How many neighbor words put each letter on the shared cell.
            letters: HashMap<char, usize>,
            total: usize,
        }

        let mut tallies = Vec::new();
        for &neighbor in self.puzzle.neighbors(var) {
            if assignment.contains(neighbor) {
                continue;
            }
            let Some((at, neighbor_at)) = self.puzzle.overlap(var, neighbor) else {
                continue;
            };
            let mut letters: HashMap<char, usize> = HashMap::new();
            for word in self.domains.candidates(neighbor) {
                let c = char_at(self.puzzle.variable(neighbor), word, neighbor_at)?;
                *letters.entry(c).or_insert(0) += 1;
            }
            tallies.push(CrossTally { at, letters, total: self.domains.size(neighbor) });
        }

        let mut ordered: Vec<(usize, Rc<str>)> = Vec::with_capacity(self.domains.size(var));
        for word in self.domains.candidates(var) {
            let mut eliminated = 0;
            for tally in &tallies {
                let c = char_at(self.puzzle.variable(var), word, tally.at)?;
                eliminated += tally.total - tally.letters.get(&c).copied().unwrap_or(0);
            }
            ordered.push((eliminated, Rc::clone(word)));
        }
        ordered.sort_unstable_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        Ok(ordered.into_iter().map(|(_, word)| word).collect())
    }

    /// The unassigned slot with the fewest remaining candidates; ties go to
    /// the slot crossing the most others, then to the lowest id. `None`
    /// when every slot is assigned.
    pub fn select_unassigned_variable(&self, assignment: &Assignment) -> Option<VarId> {
        (0..self.puzzle.variables().len())
            .filter(|&id| !assignment.contains(id))
            .min_by_key(|&id| {
                (self.domains.size(id), std::cmp::Reverse(self.puzzle.neighbors(id).len()), id)
            })
    }

    /// Depth-first search over partial assignments.
    ///
    /// Extends `assignment` one slot at a time, running restricted arc
    /// consistency after each tentative choice and rewinding the domain
    /// trail whenever a branch dies, so `assignment` and the domains are
    /// exactly as passed whenever this returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Propagates [`SolverError`] from the consistency and inference steps.
    pub fn backtrack(
        &mut self,
        assignment: &mut Assignment,
    ) -> Result<Option<Assignment>, SolverError> {
        if assignment.is_complete() {
            return Ok(Some(assignment.clone()));
        }
        if self.node_limit.is_some_and(|limit| self.stats.nodes_expanded >= limit) {
            self.exhausted_budget = true;
            return Ok(None);
        }
        self.stats.nodes_expanded += 1;

        let Some(var) = self.select_unassigned_variable(assignment) else {
            return Ok(None);
        };

        for word in self.order_domain_values(var, assignment)? {
            self.stats.branches_explored += 1;
            assignment.set(var, Rc::clone(&word));

            if self.consistent(assignment)? {
                let mark = self.domains.mark();
                // Inference: commit the choice to the domain store, then
                // propagate it into the crossing slots.
                self.domains.assign(var, &word);
                let arcs: Vec<(VarId, VarId)> =
                    self.puzzle.neighbors(var).iter().map(|&z| (z, var)).collect();
                if self.ac3(Some(arcs))? {
                    if let Some(solution) = self.backtrack(assignment)? {
                        return Ok(Some(solution));
                    }
                }
                self.domains.undo_to(mark);

                if self.exhausted_budget {
                    assignment.unset(var);
                    return Ok(None);
                }
            }

            assignment.unset(var);
        }

        self.stats.backtracks += 1;
        Ok(None)
    }

    /// Run the full pipeline: node consistency, global arc consistency,
    /// then backtracking search.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError`] only for malformed input; see the module
    /// docs. Unsatisfiable puzzles and exhausted budgets are statuses.
    pub fn solve(mut self) -> Result<SolveResult, SolverError> {
        let count = self.puzzle.variables().len();
        debug!("solving a puzzle with {count} slots");

        self.enforce_node_consistency();
        if let Some(id) = (0..count).find(|&id| self.domains.size(id) == 0) {
            info!(
                "no candidate of length {} for slot {}; unsatisfiable without search",
                self.puzzle.variable(id).length,
                self.puzzle.variable(id)
            );
            return Ok(SolveResult {
                assignment: None,
                status: SolveStatus::Unsatisfiable,
                stats: self.stats,
            });
        }

        if !self.ac3(None)? {
            return Ok(SolveResult {
                assignment: None,
                status: SolveStatus::Unsatisfiable,
                stats: self.stats,
            });
        }

        let mut assignment = Assignment::new(count);
        let solution = self.backtrack(&mut assignment)?;
        let status = match (&solution, self.exhausted_budget) {
            (Some(_), _) => SolveStatus::Solved,
            (None, true) => SolveStatus::OutOfBudget,
            (None, false) => SolveStatus::Unsatisfiable,
        };
        info!(
            "search finished {:?}: {} nodes, {} branches, {} backtracks, {} words pruned",
            status,
            self.stats.nodes_expanded,
            self.stats.branches_explored,
            self.stats.backtracks,
            self.stats.words_pruned
        );

        Ok(SolveResult { assignment: solution, status, stats: self.stats })
    }
}
