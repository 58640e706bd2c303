use crate::{
    analysis::patterns::PatternModel,
    io::error::{AlgorithmError, Result},
    math::probability::shannon_entropy,
    spatial::WaveGrid,
};

/// Why the collapse loop stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Every cell is collapsed
    Success,
    /// An uncollapsed cell has no candidate left
    Contradiction {
        /// First contradicted cell in row-major order
        position: [usize; 2],
    },
}

/// Outcome of one selection scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    /// Collapse this cell next
    Collapse {
        /// Cell with minimum entropy
        position: [usize; 2],
        /// Its entropy
        entropy: f64,
    },
    /// No cell is eligible
    Terminate(Termination),
}

/// Shannon entropy of a cell's surviving weights
///
/// # Errors
///
/// Returns `DegenerateEntropy` if the cell has no surviving weight, and `InvalidParameter`
/// if the position is outside the grid
pub fn cell_entropy(grid: &WaveGrid, model: &PatternModel, position: [usize; 2]) -> Result<f64> {
    let cell = grid.cell(position).ok_or_else(|| AlgorithmError::InvalidParameter {
        parameter: "position",
        value: format!("{position:?}"),
        reason: "outside the wave grid".to_string(),
    })?;

    shannon_entropy(cell.candidate_weights(model).map(|(_, weight)| weight))
        .ok_or(AlgorithmError::DegenerateEntropy { position })
}

/// Pick the uncollapsed cell with minimum entropy, or report termination
///
/// Cells are scanned in row-major order and the first minimum wins ties. Any cell without
/// candidates, collapsed or not, ends the scan as a contradiction before its entropy is taken.
pub fn select_min_entropy(grid: &WaveGrid, model: &PatternModel) -> Selection {
    let mut best: Option<([usize; 2], f64)> = None;

    for cell in grid.cells() {
        let position = cell.position();
        if grid.is_collapsed(position) {
            if cell.is_contradicted() {
                return Selection::Terminate(Termination::Contradiction { position });
            }
            continue;
        }

        let entropy = match cell_entropy(grid, model, position) {
            Ok(entropy) => entropy,
            Err(AlgorithmError::DegenerateEntropy { position }) => {
                return Selection::Terminate(Termination::Contradiction { position });
            }
            Err(_) => continue,
        };

        if best.is_none_or(|(_, min)| entropy < min) {
            best = Some((position, entropy));
        }
    }

    match best {
        Some((position, entropy)) => Selection::Collapse { position, entropy },
        None => grid.first_contradiction().map_or(
            Selection::Terminate(Termination::Success),
            |position| Selection::Terminate(Termination::Contradiction { position }),
        ),
    }
}
