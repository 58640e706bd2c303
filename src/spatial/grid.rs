//! Wave grid of superposed cells
//!
//! Every cell holds the set of patterns still able to occupy it. Weights and adjacency are not
//! copied into the cells: both views are read through the shared [`PatternModel`] using the same
//! candidate set, so a cell's weight keys and adjacency keys can never disagree.
//! The grid also owns the collapsed set, the coordinates already fixed by the collapse loop.

use crate::algorithm::bitset::PatternSet;
use crate::analysis::patterns::{PatternId, PatternModel};
use crate::io::configuration::MAX_GRID_DIMENSION;
use crate::io::error::{Result, invalid_parameter};
use ndarray::Array2;

/// Neighbour offsets as `(row, col)` deltas: below, above, left, right
///
/// Propagation visits neighbours in this order.
pub const NEIGHBOUR_OFFSETS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, -1), (0, 1)];

/// One grid position and its surviving candidate patterns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    position: [usize; 2],
    candidates: PatternSet,
}

impl Cell {
    /// Create a cell in full superposition over every pattern of the model
    pub fn new(position: [usize; 2], model: &PatternModel) -> Self {
        Self {
            position,
            candidates: PatternSet::all(model.pattern_count()),
        }
    }

    /// Grid position as `[row, col]`
    pub const fn position(&self) -> [usize; 2] {
        self.position
    }

    /// Surviving candidate patterns
    pub const fn candidates(&self) -> &PatternSet {
        &self.candidates
    }

    /// Number of surviving candidates
    pub fn candidate_count(&self) -> usize {
        self.candidates.count()
    }

    /// Whether no candidate survives
    pub fn is_contradicted(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Surviving candidates paired with their exemplar weights
    pub fn candidate_weights<'a>(
        &'a self,
        model: &'a PatternModel,
    ) -> impl Iterator<Item = (PatternId, f64)> + 'a {
        self.candidates
            .iter()
            .map(move |pattern| (pattern, model.weight(pattern)))
    }

    /// Surviving candidates paired with their adjacency sets
    pub fn candidate_adjacency<'a>(
        &'a self,
        model: &'a PatternModel,
    ) -> impl Iterator<Item = (PatternId, &'a PatternSet)> + 'a {
        self.candidates
            .iter()
            .filter_map(move |pattern| model.adjacency(pattern).map(|set| (pattern, set)))
    }

    /// Drop every candidate not in `allowed`
    ///
    /// Returns whether the candidate set shrank. Never adds candidates.
    pub fn restrict(&mut self, allowed: &PatternSet) -> bool {
        self.candidates.intersect_with(allowed)
    }

    /// Surviving candidate with the largest weight, ties to the lowest id
    pub fn best_guess(&self, model: &PatternModel) -> Option<PatternId> {
        self.candidate_weights(model)
            .fold(None, |best: Option<(PatternId, f64)>, (pattern, weight)| {
                match best {
                    Some((_, best_weight)) if best_weight >= weight => best,
                    _ => Some((pattern, weight)),
                }
            })
            .map(|(pattern, _)| pattern)
    }
}

/// Best-guess pattern per cell, `None` where no candidate survives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    /// Pattern ids indexed by `[row, col]`
    pub cells: Array2<Option<PatternId>>,
}

impl Projection {
    /// Grid dimensions (rows, cols)
    pub fn dimensions(&self) -> (usize, usize) {
        self.cells.dim()
    }

    /// Best-guess pattern at a position
    pub fn get(&self, position: [usize; 2]) -> Option<PatternId> {
        self.cells.get(position).copied().flatten()
    }

    /// Whether any cell has no candidate
    pub fn has_contradiction(&self) -> bool {
        self.cells.iter().any(Option::is_none)
    }
}

/// Fixed-size grid of cells with the collapsed set
#[derive(Debug, Clone)]
pub struct WaveGrid {
    cells: Array2<Cell>,
    collapsed: Array2<bool>,
    collapsed_count: usize,
}

impl WaveGrid {
    /// Create a grid with every cell in full superposition
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Either dimension is zero or exceeds `MAX_GRID_DIMENSION`
    /// - The model has no patterns
    pub fn new(rows: usize, cols: usize, model: &PatternModel) -> Result<Self> {
        for (parameter, value) in [("rows", rows), ("cols", cols)] {
            if value == 0 || value > MAX_GRID_DIMENSION {
                return Err(invalid_parameter(
                    parameter,
                    &value,
                    &format!("must be between 1 and {MAX_GRID_DIMENSION}"),
                ));
            }
        }
        if model.pattern_count() == 0 {
            return Err(invalid_parameter(
                "model",
                &0,
                &"pattern model has no patterns",
            ));
        }

        let cells = Array2::from_shape_fn((rows, cols), |(row, col)| Cell::new([row, col], model));

        Ok(Self {
            cells,
            collapsed: Array2::from_elem((rows, cols), false),
            collapsed_count: 0,
        })
    }

    /// Get the number of rows in the grid
    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    /// Get the number of columns in the grid
    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    /// Grid dimensions (rows, cols)
    pub fn dimensions(&self) -> (usize, usize) {
        self.cells.dim()
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Cell at a position
    pub fn cell(&self, position: [usize; 2]) -> Option<&Cell> {
        self.cells.get(position)
    }

    /// Mutable cell at a position
    pub fn cell_mut(&mut self, position: [usize; 2]) -> Option<&mut Cell> {
        self.cells.get_mut(position)
    }

    /// Iterate cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Whether a position is in the collapsed set
    pub fn is_collapsed(&self, position: [usize; 2]) -> bool {
        self.collapsed.get(position).copied().unwrap_or(false)
    }

    /// Add a position to the collapsed set
    pub fn mark_collapsed(&mut self, position: [usize; 2]) {
        if let Some(flag) = self.collapsed.get_mut(position).filter(|flag| !**flag) {
            *flag = true;
            self.collapsed_count += 1;
        }
    }

    /// Number of collapsed positions
    pub const fn collapsed_count(&self) -> usize {
        self.collapsed_count
    }

    /// Whether every cell is collapsed
    pub fn is_fully_collapsed(&self) -> bool {
        self.collapsed_count == self.cell_count()
    }

    /// First cell in row-major order with no surviving candidate
    pub fn first_contradiction(&self) -> Option<[usize; 2]> {
        self.cells
            .iter()
            .find(|cell| cell.is_contradicted())
            .map(Cell::position)
    }

    /// Position one step from `position` along `offset`, if inside the grid
    pub fn offset(&self, position: [usize; 2], offset: (isize, isize)) -> Option<[usize; 2]> {
        let row = position[0].checked_add_signed(offset.0)?;
        let col = position[1].checked_add_signed(offset.1)?;
        (row < self.rows() && col < self.cols()).then_some([row, col])
    }

    /// In-bounds 4-neighbours in propagation order; edges do not wrap
    pub fn neighbours(&self, position: [usize; 2]) -> impl Iterator<Item = [usize; 2]> + '_ {
        NEIGHBOUR_OFFSETS
            .into_iter()
            .filter_map(move |offset| self.offset(position, offset))
    }

    /// Best-guess pattern of every cell
    pub fn project(&self, model: &PatternModel) -> Projection {
        Projection {
            cells: self.cells.map(|cell| cell.best_guess(model)),
        }
    }
}
