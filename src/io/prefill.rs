//! Prefill image parsing into pinned cell placements

use crate::analysis::patterns::{PatternId, PatternModel};
use crate::io::error::{AlgorithmError, Result};
use image::RgbaImage;
use std::path::Path;

/// Single pinned cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefillPlacement {
    /// Grid position as `[row, col]`
    pub position: [usize; 2],
    /// Pattern the cell is pinned to
    pub pattern: PatternId,
}

/// Cells pinned before the collapse loop starts
#[derive(Debug, Clone, Default)]
pub struct PrefillData {
    placements: Vec<PrefillPlacement>,
}

impl PrefillData {
    /// Parse a prefill PNG into placements
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The PNG file cannot be loaded
    /// - No pixel of the prefill image can be pinned
    pub fn from_png(
        path: &Path,
        model: &PatternModel,
        grid_dimensions: (usize, usize),
    ) -> Result<Self> {
        let img = image::open(path).map_err(|e| AlgorithmError::ImageLoad {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_rgba_image(&img.to_rgba8(), model, grid_dimensions)
    }

    /// Collect placements from a decoded image
    ///
    /// Pixel `(x, y)` pins cell `[y, x]` when it is opaque, lies inside the grid and its RGB
    /// color is a learned pattern. Every other pixel leaves its cell free.
    ///
    /// # Errors
    ///
    /// Returns an error if no pixel can be pinned
    pub fn from_rgba_image(
        img: &RgbaImage,
        model: &PatternModel,
        grid_dimensions: (usize, usize),
    ) -> Result<Self> {
        let (rows, cols) = grid_dimensions;

        let placements: Vec<PrefillPlacement> = img
            .enumerate_pixels()
            .filter(|(x, y, pixel)| {
                pixel[3] > 0 && (*y as usize) < rows && (*x as usize) < cols
            })
            .filter_map(|(x, y, pixel)| {
                model
                    .pattern_of([pixel[0], pixel[1], pixel[2]])
                    .map(|pattern| PrefillPlacement {
                        position: [y as usize, x as usize],
                        pattern,
                    })
            })
            .collect();

        if placements.is_empty() {
            return Err(AlgorithmError::InvalidSourceData {
                reason: "Prefill image contains no colors from source palette inside the grid"
                    .to_string(),
            });
        }

        Ok(Self { placements })
    }

    /// Placements in row-major order
    pub fn placements(&self) -> &[PrefillPlacement] {
        &self.placements
    }

    /// Number of placements
    pub const fn len(&self) -> usize {
        self.placements.len()
    }

    /// Whether there are no placements
    pub const fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}
