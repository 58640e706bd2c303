//! PNG rendering of grid projections with transparency for contradicted cells

use crate::algorithm::executor::ProjectionSink;
use crate::analysis::patterns::PatternModel;
use crate::io::error::{AlgorithmError, Result};
use crate::spatial::Projection;
use image::{ImageBuffer, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

/// Render a projection as one pixel per cell
///
/// Cells without a surviving candidate are fully transparent.
///
/// # Errors
///
/// Returns an error if a projected pattern id is out of bounds for the model palette
pub fn render_projection(projection: &Projection, model: &PatternModel) -> Result<RgbaImage> {
    let (rows, cols) = projection.dimensions();
    let mut img = ImageBuffer::new(cols as u32, rows as u32);

    for ((row, col), &pattern) in projection.cells.indexed_iter() {
        let color = match pattern {
            Some(pattern) => {
                let [r, g, b] = model.color(pattern).ok_or(AlgorithmError::InvalidPatternIndex {
                    index: pattern,
                    pattern_count: model.pattern_count(),
                })?;
                Rgba([r, g, b, u8::MAX])
            }
            None => Rgba([0, 0, 0, 0]),
        };

        img.put_pixel(col as u32, row as u32, color);
    }

    Ok(img)
}

/// Export a projection as a PNG image
///
/// # Errors
///
/// Returns an error if:
/// - A projected pattern id is out of bounds for the model palette
/// - The parent directory cannot be created
/// - The image cannot be saved to the specified path
pub fn export_projection_as_png(
    projection: &Projection,
    model: &PatternModel,
    output_path: &Path,
) -> Result<()> {
    let img = render_projection(projection, model)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| AlgorithmError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    img.save(output_path)
        .map_err(|e| AlgorithmError::ImageExport {
            path: output_path.into(),
            source: e,
        })?;

    Ok(())
}

/// Projection sink that rewrites one PNG every `interval` iterations
///
/// An interrupted run leaves the latest in-progress snapshot on disk.
#[derive(Debug, Clone)]
pub struct PngSnapshotWriter {
    path: PathBuf,
    interval: usize,
    written: usize,
}

impl PngSnapshotWriter {
    /// Create a writer targeting `path`; an interval of zero is treated as one
    pub fn new(path: impl Into<PathBuf>, interval: usize) -> Self {
        Self {
            path: path.into(),
            interval: interval.max(1),
            written: 0,
        }
    }

    /// Output path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of snapshots written so far
    pub const fn written(&self) -> usize {
        self.written
    }
}

impl ProjectionSink for PngSnapshotWriter {
    fn project(
        &mut self,
        projection: &Projection,
        model: &PatternModel,
        iteration: usize,
    ) -> Result<()> {
        if iteration % self.interval != 0 {
            return Ok(());
        }

        export_projection_as_png(projection, model, &self.path)?;
        self.written += 1;
        Ok(())
    }
}
