//! Color pattern learning from exemplar images

use crate::algorithm::bitset::PatternSet;
use crate::io::error::{AlgorithmError, Result};
use crate::spatial::grid::NEIGHBOUR_OFFSETS;
use image::RgbImage;
use ndarray::Array2;
use std::collections::BTreeSet;
use std::path::Path;

/// Dense index of a learned pattern
pub type PatternId = usize;

/// RGB color of a pattern
pub type Color = [u8; 3];

/// Pattern weights and adjacency learned from an exemplar
///
/// Each distinct exemplar color is one pattern. Weights are normalized pixel frequencies and
/// adjacency records which patterns were seen directly next to each other in any of the four
/// grid directions. Built once, then shared read-only by every cell of a wave grid.
#[derive(Debug, Clone)]
pub struct PatternModel {
    colors: Vec<Color>,
    weights: Vec<f64>,
    adjacency: Vec<PatternSet>,
}

impl PatternModel {
    /// Load an exemplar PNG and learn its patterns
    ///
    /// Any alpha channel is read and discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file at the given path cannot be opened or decoded
    /// - The image has no pixels
    pub fn from_png_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let img = image::open(&path_buf).map_err(|e| AlgorithmError::ImageLoad {
            path: path_buf,
            source: e,
        })?;

        Self::from_rgb_image(&img.to_rgb8())
    }

    /// Learn patterns from a decoded RGB image
    ///
    /// # Errors
    ///
    /// Returns an error if the image has no pixels
    pub fn from_rgb_image(img: &RgbImage) -> Result<Self> {
        let (width, height) = (img.width() as usize, img.height() as usize);
        let mut colors = Array2::from_elem((height, width), [0u8; 3]);

        for (x, y, pixel) in img.enumerate_pixels() {
            if let Some(color) = colors.get_mut((y as usize, x as usize)) {
                *color = pixel.0;
            }
        }

        Self::from_color_grid(&colors)
    }

    /// Learn patterns from a grid of colors indexed by `(row, col)`
    ///
    /// Every pixel adds `1 / (width * height)` to its color's weight and records the colors of
    /// its in-bounds 4-neighbours in that color's adjacency set. Edges do not wrap.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid has no cells
    pub fn from_color_grid(grid: &Array2<Color>) -> Result<Self> {
        if grid.is_empty() {
            return Err(AlgorithmError::InvalidSourceData {
                reason: "Exemplar image has no pixels".to_string(),
            });
        }

        // Sorted palette keeps pattern ids reproducible across runs
        let colors: Vec<Color> = grid
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let pattern_count = colors.len();

        let source_data = grid.mapv(|color| colors.binary_search(&color).unwrap_or_default());

        let mut counts = vec![0usize; pattern_count];
        let mut adjacency = vec![PatternSet::new(pattern_count); pattern_count];
        let (rows, cols) = source_data.dim();

        for ((row, col), &pattern) in source_data.indexed_iter() {
            if let Some(count) = counts.get_mut(pattern) {
                *count += 1;
            }

            for (dr, dc) in NEIGHBOUR_OFFSETS {
                let neighbour = row
                    .checked_add_signed(dr)
                    .zip(col.checked_add_signed(dc))
                    .filter(|&(r, c)| r < rows && c < cols)
                    .and_then(|pos| source_data.get(pos));

                if let (Some(&neighbour), Some(set)) = (neighbour, adjacency.get_mut(pattern)) {
                    set.insert(neighbour);
                }
            }
        }

        let total = source_data.len() as f64;
        let weights = counts.iter().map(|&count| count as f64 / total).collect();

        Ok(Self {
            colors,
            weights,
            adjacency,
        })
    }

    /// Number of distinct patterns
    pub const fn pattern_count(&self) -> usize {
        self.colors.len()
    }

    /// Pattern colors indexed by pattern id
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Color of a pattern
    pub fn color(&self, pattern: PatternId) -> Option<Color> {
        self.colors.get(pattern).copied()
    }

    /// Pattern id of a color, if the exemplar contains it
    pub fn pattern_of(&self, color: Color) -> Option<PatternId> {
        self.colors.binary_search(&color).ok()
    }

    /// Normalized frequency of a pattern, zero for unknown ids
    pub fn weight(&self, pattern: PatternId) -> f64 {
        self.weights.get(pattern).copied().unwrap_or(0.0)
    }

    /// Normalized frequencies indexed by pattern id
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Patterns observed directly next to `pattern`
    pub fn adjacency(&self, pattern: PatternId) -> Option<&PatternSet> {
        self.adjacency.get(pattern)
    }

    /// Union of the adjacency sets of every pattern in `candidates`
    ///
    /// This is the constraint a cell imposes on its neighbours.
    pub fn allowed_neighbours(&self, candidates: &PatternSet) -> PatternSet {
        let mut allowed = PatternSet::new(self.pattern_count());
        for pattern in candidates.iter() {
            if let Some(adjacent) = self.adjacency.get(pattern) {
                allowed.union_with(adjacent);
            }
        }
        allowed
    }
}
