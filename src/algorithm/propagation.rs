use crate::{
    algorithm::bitset::PatternSet,
    analysis::patterns::PatternModel,
    io::error::{AlgorithmError, Result},
    spatial::{WaveGrid, grid::NEIGHBOUR_OFFSETS},
};
use ndarray::Array2;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Strategy used to carry constraints away from a changed cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropagationMode {
    /// Worklist propagation to a fixpoint; a cell is revisited whenever it shrinks again
    #[default]
    Fixpoint,
    /// Depth-first pass visiting each cell at most once
    SinglePass,
}

impl FromStr for PropagationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fixpoint" => Ok(Self::Fixpoint),
            "single-pass" => Ok(Self::SinglePass),
            other => Err(format!(
                "unknown propagation mode '{other}' (expected 'fixpoint' or 'single-pass')"
            )),
        }
    }
}

impl fmt::Display for PropagationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixpoint => write!(f, "fixpoint"),
            Self::SinglePass => write!(f, "single-pass"),
        }
    }
}

/// Cells reached during one propagation pass
///
/// Owned by the caller of a pass and handed to the propagator; a fresh set is used per pass.
#[derive(Debug, Clone)]
pub struct VisitedSet {
    visited: Array2<bool>,
    count: usize,
}

impl VisitedSet {
    /// Create an empty visited set for a grid of the given dimensions
    pub fn new(dimensions: (usize, usize)) -> Self {
        Self {
            visited: Array2::from_elem(dimensions, false),
            count: 0,
        }
    }

    /// Record a position; returns `false` if it was already present
    pub fn insert(&mut self, position: [usize; 2]) -> bool {
        match self.visited.get_mut(position) {
            Some(flag) if !*flag => {
                *flag = true;
                self.count += 1;
                true
            }
            _ => false,
        }
    }

    /// Whether a position was visited
    pub fn contains(&self, position: [usize; 2]) -> bool {
        self.visited.get(position).copied().unwrap_or(false)
    }

    /// Number of visited positions
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Whether nothing was visited
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Summary of one propagation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationReport {
    /// Number of cell restrictions that removed at least one candidate
    pub narrowed: usize,
    /// Deepest traversal depth reached (single-pass only)
    pub max_depth: usize,
    /// Cell emptied by this pass; the pass stops there
    pub contradiction: Option<[usize; 2]>,
}

/// Restricts neighbouring cells after a cell is collapsed or narrowed
#[derive(Debug, Clone, Copy)]
pub struct Propagator {
    mode: PropagationMode,
    max_depth: usize,
}

impl Propagator {
    /// Create a propagator
    ///
    /// `max_depth` bounds the single-pass traversal depth and is ignored in fixpoint mode.
    pub const fn new(mode: PropagationMode, max_depth: usize) -> Self {
        Self { mode, max_depth }
    }

    /// Configured strategy
    pub const fn mode(&self) -> PropagationMode {
        self.mode
    }

    /// Carry `allowed` from `origin` to its neighbours and onward
    ///
    /// Collapsed cells are never touched and candidate sets only shrink.
    ///
    /// # Errors
    ///
    /// Returns `RecursionLimitExceeded` if a single-pass traversal goes deeper than the
    /// configured ceiling
    pub fn propagate(
        &self,
        grid: &mut WaveGrid,
        model: &PatternModel,
        origin: [usize; 2],
        allowed: PatternSet,
        visited: &mut VisitedSet,
    ) -> Result<PropagationReport> {
        match self.mode {
            PropagationMode::Fixpoint => Ok(propagate_fixpoint(
                grid, model, origin, &allowed, visited,
            )),
            PropagationMode::SinglePass => {
                propagate_single_pass(grid, model, origin, allowed, visited, self.max_depth)
            }
        }
    }
}

/// Pending traversal state of one cell in the single-pass walk
struct Frame {
    position: [usize; 2],
    allowed: PatternSet,
    next_direction: usize,
}

/// Depth-first pass with at most one visit per cell
///
/// An explicit frame stack reproduces recursive order: each restricted neighbour is fully
/// explored before its siblings. The constraint handed onward is the union of the adjacency
/// of whatever survives in the restricted cell, so later constraints in the same pass are not
/// re-applied to cells already visited.
fn propagate_single_pass(
    grid: &mut WaveGrid,
    model: &PatternModel,
    origin: [usize; 2],
    allowed: PatternSet,
    visited: &mut VisitedSet,
    max_depth: usize,
) -> Result<PropagationReport> {
    let mut report = PropagationReport::default();
    let mut stack = vec![Frame {
        position: origin,
        allowed,
        next_direction: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        let Some(&offset) = NEIGHBOUR_OFFSETS.get(frame.next_direction) else {
            stack.pop();
            continue;
        };
        frame.next_direction += 1;

        let Some(neighbour) = grid.offset(frame.position, offset) else {
            continue;
        };
        if visited.contains(neighbour) || grid.is_collapsed(neighbour) {
            continue;
        }
        visited.insert(neighbour);

        let Some(cell) = grid.cell_mut(neighbour) else {
            continue;
        };
        if cell.restrict(&frame.allowed) {
            report.narrowed += 1;
        }
        if cell.is_contradicted() {
            report.contradiction = Some(neighbour);
            return Ok(report);
        }
        let onward = model.allowed_neighbours(cell.candidates());

        let depth = stack.len();
        if depth > max_depth {
            return Err(AlgorithmError::RecursionLimitExceeded {
                position: neighbour,
                depth,
                limit: max_depth,
            });
        }
        report.max_depth = report.max_depth.max(depth);

        stack.push(Frame {
            position: neighbour,
            allowed: onward,
            next_direction: 0,
        });
    }

    Ok(report)
}

/// Worklist propagation until no candidate set changes
///
/// Every cell that shrinks is queued, and when processed restricts its uncollapsed
/// neighbours by the union of its surviving adjacency. A cell already processed is queued
/// again if a later restriction shrinks it further.
fn propagate_fixpoint(
    grid: &mut WaveGrid,
    model: &PatternModel,
    origin: [usize; 2],
    allowed: &PatternSet,
    visited: &mut VisitedSet,
) -> PropagationReport {
    let mut report = PropagationReport::default();
    let mut queue = VecDeque::new();
    let mut queued = Array2::from_elem(grid.dimensions(), false);

    if let Some(contradiction) = restrict_neighbours(
        grid,
        origin,
        allowed,
        visited,
        &mut report,
        &mut queue,
        &mut queued,
    ) {
        report.contradiction = Some(contradiction);
        return report;
    }

    while let Some(position) = queue.pop_front() {
        if let Some(flag) = queued.get_mut(position) {
            *flag = false;
        }

        let Some(cell) = grid.cell(position) else {
            continue;
        };
        let onward = model.allowed_neighbours(cell.candidates());

        if let Some(contradiction) = restrict_neighbours(
            grid,
            position,
            &onward,
            visited,
            &mut report,
            &mut queue,
            &mut queued,
        ) {
            report.contradiction = Some(contradiction);
            return report;
        }
    }

    report
}

/// Restrict the uncollapsed neighbours of `position`, queueing each one that shrinks
///
/// Returns the first neighbour left without candidates.
fn restrict_neighbours(
    grid: &mut WaveGrid,
    position: [usize; 2],
    allowed: &PatternSet,
    visited: &mut VisitedSet,
    report: &mut PropagationReport,
    queue: &mut VecDeque<[usize; 2]>,
    queued: &mut Array2<bool>,
) -> Option<[usize; 2]> {
    let neighbours: Vec<[usize; 2]> = grid.neighbours(position).collect();

    for neighbour in neighbours {
        if grid.is_collapsed(neighbour) {
            continue;
        }
        visited.insert(neighbour);

        let Some(cell) = grid.cell_mut(neighbour) else {
            continue;
        };
        if !cell.restrict(allowed) {
            continue;
        }
        report.narrowed += 1;

        if cell.is_contradicted() {
            return Some(neighbour);
        }

        if let Some(flag) = queued.get_mut(neighbour).filter(|flag| !**flag) {
            *flag = true;
            queue.push_back(neighbour);
        }
    }

    None
}
