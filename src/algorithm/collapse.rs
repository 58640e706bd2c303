use crate::{
    algorithm::bitset::PatternSet,
    analysis::patterns::{PatternId, PatternModel},
    io::error::{AlgorithmError, Result, computation_error},
    spatial::WaveGrid,
};
use rand::{Rng, distr::Distribution, distr::weighted::WeightedIndex};

/// Pattern chosen for a collapsed cell and the constraint it places on its neighbours
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapseResult {
    /// Chosen pattern
    pub pattern: PatternId,
    /// Adjacency set of the chosen pattern, the seed constraint for propagation
    pub allowed: PatternSet,
}

/// Fix a cell to one pattern sampled by exemplar weight
///
/// Samples among the surviving candidates with probability proportional to their weights,
/// restricts the cell to the chosen pattern and adds it to the collapsed set.
///
/// # Errors
///
/// Returns an error if:
/// - The position is outside the grid
/// - The cell has no surviving candidate (`Contradiction`)
/// - The surviving weights cannot form a distribution
pub fn collapse_cell<R: Rng + ?Sized>(
    grid: &mut WaveGrid,
    model: &PatternModel,
    position: [usize; 2],
    rng: &mut R,
) -> Result<CollapseResult> {
    let cell = grid.cell(position).ok_or_else(|| AlgorithmError::InvalidParameter {
        parameter: "position",
        value: format!("{position:?}"),
        reason: "outside the wave grid".to_string(),
    })?;

    let (patterns, weights): (Vec<PatternId>, Vec<f64>) = cell.candidate_weights(model).unzip();
    if patterns.is_empty() {
        return Err(AlgorithmError::Contradiction {
            position,
            iteration: 0,
        });
    }

    let distribution =
        WeightedIndex::new(&weights).map_err(|e| computation_error("weighted sampling", &e))?;
    let pattern = patterns
        .get(distribution.sample(rng))
        .copied()
        .ok_or_else(|| computation_error("weighted sampling", &"sample index out of range"))?;

    fix_cell(grid, model, position, pattern)
}

/// Restrict a cell to `pattern` and add it to the collapsed set
///
/// Used for sampled collapses and for pinned cells.
///
/// # Errors
///
/// Returns an error if:
/// - The position is outside the grid
/// - The pattern id is unknown
/// - The cell no longer allows `pattern` (`Contradiction`); the cell is left untouched
pub fn fix_cell(
    grid: &mut WaveGrid,
    model: &PatternModel,
    position: [usize; 2],
    pattern: PatternId,
) -> Result<CollapseResult> {
    let allowed = model
        .adjacency(pattern)
        .cloned()
        .ok_or(AlgorithmError::InvalidPatternIndex {
            index: pattern,
            pattern_count: model.pattern_count(),
        })?;

    let cell = grid
        .cell_mut(position)
        .ok_or_else(|| AlgorithmError::InvalidParameter {
            parameter: "position",
            value: format!("{position:?}"),
            reason: "outside the wave grid".to_string(),
        })?;

    if !cell.candidates().contains(pattern) {
        return Err(AlgorithmError::Contradiction {
            position,
            iteration: 0,
        });
    }

    cell.restrict(&PatternSet::singleton(model.pattern_count(), pattern));
    grid.mark_collapsed(position);

    Ok(CollapseResult { pattern, allowed })
}
