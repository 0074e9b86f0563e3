//! Grid skeleton model: the fillable slots and the overlaps between them.
//!
//! A [`Puzzle`] is built once from structure text and is read-only
//! thereafter. Structure text is one line per row; `'_'` marks an open
//! (fillable) cell and any other character is a block. Rows shorter than the
//! widest row are padded with blocks, so ragged text is accepted.
//!
//! Slot extraction follows crossword convention: every maximal run of open
//! cells of length ≥ 2, scanning rows for across slots and then columns for
//! down slots. Because slots only run across or down, two distinct slots
//! share at most one cell; each shared cell becomes one entry of the overlap
//! map, recorded for both orderings of the pair.

use std::collections::HashMap;

use crate::errors::PuzzleError;
use crate::variable::{Direction, Variable};

/// Character marking an open (fillable) cell in structure text.
pub const OPEN_CELL: char = '_';

/// Index of a [`Variable`] within [`Puzzle::variables`]; the key type used
/// by domains and assignments.
pub type VarId = usize;

/// A parsed grid skeleton: geometry, slots, and the precomputed overlap map.
#[derive(Debug, Clone)]
pub struct Puzzle {
    height: usize,
    width: usize,
    /// Row-major openness mask.
    open: Vec<bool>,
    variables: Vec<Variable>,
    /// `(x, y) -> (i, j)`: character `i` of x's word and character `j` of
    /// y's word occupy the same cell. Present for both orderings of every
    /// crossing pair; an absent key means the slots do not cross.
    overlaps: HashMap<(VarId, VarId), (usize, usize)>,
    neighbors: Vec<Vec<VarId>>,
}

impl Puzzle {
    /// Parse structure text into a puzzle.
    ///
    /// Leading and trailing blank lines are ignored so raw-string literals
    /// read naturally in callers and tests.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::EmptyStructure`] if no grid rows remain.
    pub fn parse(structure: &str) -> Result<Puzzle, PuzzleError> {
        let all: Vec<&str> = structure.lines().collect();
        let start = all.iter().position(|line| !line.trim().is_empty());
        let end = all.iter().rposition(|line| !line.trim().is_empty());
        let lines: &[&str] = match (start, end) {
            (Some(start), Some(end)) => &all[start..=end],
            _ => &[],
        };

        if lines.is_empty() {
            return Err(PuzzleError::EmptyStructure);
        }
        let height = lines.len();
        let width = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
        if width == 0 {
            return Err(PuzzleError::EmptyStructure);
        }

        let mut open = vec![false; height * width];
        for (row, line) in lines.iter().enumerate() {
            // Cells past the end of a short row stay blocked.
            for (col, ch) in line.chars().enumerate() {
                open[row * width + col] = ch == OPEN_CELL;
            }
        }

        let variables = find_slots(&open, height, width);
        let (overlaps, neighbors) = cross_references(&variables);

        Ok(Puzzle { height, width, open, variables, overlaps, neighbors })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether the cell at (row, col) is open. Out-of-range cells are closed.
    pub fn is_open(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width && self.open[row * self.width + col]
    }

    /// All slots, across first (row-major) then down (column-major). A
    /// slot's position in this slice is its [`VarId`].
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// The slot with the given id.
    ///
    /// # Panics
    /// Panics if `id` is out of range; slot ids only come from this puzzle.
    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id]
    }

    /// The shared-cell indices for a pair of slots: `Some((i, j))` when
    /// character `i` of x's word must equal character `j` of y's word,
    /// `None` when the slots do not cross.
    pub fn overlap(&self, x: VarId, y: VarId) -> Option<(usize, usize)> {
        self.overlaps.get(&(x, y)).copied()
    }

    /// Ids of every slot crossing `id`, in ascending order.
    pub fn neighbors(&self, id: VarId) -> &[VarId] {
        &self.neighbors[id]
    }

    /// Every directed arc `(x, y)` between crossing slots, both directions.
    pub fn arcs(&self) -> impl Iterator<Item = (VarId, VarId)> + '_ {
        (0..self.variables.len())
            .flat_map(move |x| self.neighbors[x].iter().map(move |&y| (x, y)))
    }
}

/// Maximal runs of open cells, length ≥ 2: across slots first, then down.
fn find_slots(open: &[bool], height: usize, width: usize) -> Vec<Variable> {
    let mut result = Vec::new();

    for row in 0..height {
        let mut run_start = None;
        for col in 0..=width {
            let is_open = col < width && open[row * width + col];
            match (run_start, is_open) {
                (None, true) => run_start = Some(col),
                (Some(start), false) => {
                    if col - start >= 2 {
                        result.push(Variable {
                            row,
                            col: start,
                            direction: Direction::Across,
                            length: col - start,
                        });
                    }
                    run_start = None;
                }
                _ => {}
            }
        }
    }

    for col in 0..width {
        let mut run_start = None;
        for row in 0..=height {
            let is_open = row < height && open[row * width + col];
            match (run_start, is_open) {
                (None, true) => run_start = Some(row),
                (Some(start), false) => {
                    if row - start >= 2 {
                        result.push(Variable {
                            row: start,
                            col,
                            direction: Direction::Down,
                            length: row - start,
                        });
                    }
                    run_start = None;
                }
                _ => {}
            }
        }
    }

    result
}

/// Overlap map and neighbor lists derived from shared cells.
fn cross_references(
    variables: &[Variable],
) -> (HashMap<(VarId, VarId), (usize, usize)>, Vec<Vec<VarId>>) {
    let mut cell_owners: HashMap<(usize, usize), Vec<(VarId, usize)>> = HashMap::new();
    for (id, variable) in variables.iter().enumerate() {
        for (k, cell) in variable.cells().enumerate() {
            cell_owners.entry(cell).or_default().push((id, k));
        }
    }

    let mut overlaps = HashMap::new();
    let mut neighbors = vec![Vec::new(); variables.len()];
    for owners in cell_owners.values() {
        for (a, &(x, i)) in owners.iter().enumerate() {
            for &(y, j) in owners.iter().skip(a + 1) {
                overlaps.insert((x, y), (i, j));
                overlaps.insert((y, x), (j, i));
                neighbors[x].push(y);
                neighbors[y].push(x);
            }
        }
    }
    for list in &mut neighbors {
        list.sort_unstable();
    }

    (overlaps, neighbors)
}
