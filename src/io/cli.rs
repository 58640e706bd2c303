//! Command-line interface for batch synthesis from PNG exemplars

use crate::algorithm::executor::{AlgorithmConfig, RunOutcome, WaveCollapse};
use crate::algorithm::propagation::PropagationMode;
use crate::analysis::patterns::PatternModel;
use crate::io::configuration::{
    DEFAULT_MAX_PROPAGATION_DEPTH, DEFAULT_SEED, DEFAULT_SNAPSHOT_INTERVAL, DEFAULT_WIDTH,
    OUTPUT_SUFFIX, PREFILL_SUFFIX,
};
use crate::io::error::{AlgorithmError, Result, path_error};
use crate::io::image::{PngSnapshotWriter, export_projection_as_png};
use crate::io::prefill::PrefillData;
use crate::io::progress::ProgressManager;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "pixelwave")]
#[command(
    author,
    version,
    about = "Synthesize images from exemplar color adjacency with wave function collapse"
)]
/// Command-line arguments for the synthesis tool
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Exemplar PNG file or directory of exemplars to process
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Output width in cells
    #[arg(short = 'w', long, default_value_t = DEFAULT_WIDTH)]
    pub width: usize,

    /// Output height in cells (defaults to the width)
    #[arg(short = 'H', long)]
    pub height: Option<usize>,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Maximum driver iterations before stopping (defaults to one per cell)
    #[arg(short, long)]
    pub iterations: Option<usize>,

    /// Propagation strategy: fixpoint or single-pass
    #[arg(long, default_value_t = PropagationMode::Fixpoint)]
    pub propagation: PropagationMode,

    /// Maximum depth of single-pass propagation
    #[arg(long, default_value_t = DEFAULT_MAX_PROPAGATION_DEPTH)]
    pub max_depth: usize,

    /// Rewrite the output image every N iterations
    #[arg(short = 'e', long, default_value_t = DEFAULT_SNAPSHOT_INTERVAL)]
    pub snapshot_every: usize,

    /// Pin cells from a prefill image if available (looks for <input>_pre.png)
    #[arg(short, long)]
    pub prefill: bool,

    /// Process files even if output exists
    #[arg(short, long)]
    pub no_skip: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Log selection, collapse and propagation details
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Check if existing output files should be skipped
    pub const fn skip_existing(&self) -> bool {
        !self.no_skip
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Output grid dimensions as (rows, cols)
    pub const fn grid_dimensions(&self) -> (usize, usize) {
        let rows = match self.height {
            Some(height) => height,
            None => self.width,
        };
        (rows, self.width)
    }

    /// Algorithm configuration derived from the arguments
    pub const fn algorithm_config(&self) -> AlgorithmConfig {
        let (rows, cols) = self.grid_dimensions();
        AlgorithmConfig {
            seed: self.seed,
            propagation: self.propagation,
            max_propagation_depth: self.max_depth,
            max_iterations: self.iterations,
            ..AlgorithmConfig::new(rows, cols)
        }
    }
}

/// Orchestrates batch processing of PNG files with progress tracking
pub struct FileProcessor {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl FileProcessor {
    /// Create a new file processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Process files according to CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if target validation or file processing fails, including a
    /// contradiction during synthesis
    pub fn process(&mut self) -> Result<()> {
        let files = self.collect_files()?;

        if files.is_empty() {
            return Ok(());
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(files.len());
        }

        for (index, file) in files.iter().enumerate() {
            self.process_file(file, index)?;
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.finish();
        }

        Ok(())
    }

    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        if self.cli.target.is_file() {
            if is_png(&self.cli.target) {
                if self.should_process_file(&self.cli.target) {
                    Ok(vec![self.cli.target.clone()])
                } else {
                    Ok(vec![])
                }
            } else {
                Err(path_error("Target file must be a PNG image"))
            }
        } else if self.cli.target.is_dir() {
            let mut files = Vec::new();
            for entry in std::fs::read_dir(&self.cli.target)? {
                let path = entry?.path();
                if is_png(&path) && !is_generated(&path) && self.should_process_file(&path) {
                    files.push(path);
                }
            }
            files.sort();
            Ok(files)
        } else {
            Err(path_error("Target must be a PNG file or directory"))
        }
    }

    fn should_process_file(&self, input_path: &Path) -> bool {
        if !self.cli.skip_existing() {
            return true;
        }

        let output_path = self.get_output_path(input_path);
        if output_path.exists() {
            info!(input = %input_path.display(), "skipping, output exists");
            false
        } else {
            true
        }
    }

    fn process_file(&mut self, input_path: &Path, index: usize) -> Result<()> {
        let output_path = self.get_output_path(input_path);

        let model = PatternModel::from_png_file(input_path)?;
        info!(
            input = %input_path.display(),
            patterns = model.pattern_count(),
            "learned exemplar patterns"
        );

        // Dimensions are validated here, before the cell count is taken
        let mut executor = WaveCollapse::new(model, self.cli.algorithm_config())?;

        if let Some(ref mut pm) = self.progress_manager {
            pm.start_file(index, input_path, executor.grid().cell_count());
        }

        if self.cli.prefill {
            let prefill_path = Self::get_prefill_path(input_path);
            if prefill_path.exists() {
                let prefill = PrefillData::from_png(
                    &prefill_path,
                    executor.model(),
                    executor.grid().dimensions(),
                )?;
                let pinned = executor.apply_prefill(&prefill)?;
                info!(pinned, "applied prefill");
            } else {
                warn!(
                    prefill = %prefill_path.display(),
                    "no prefill found, continuing without prefill"
                );
            }
        }

        let mut writer = PngSnapshotWriter::new(&output_path, self.cli.snapshot_every);

        loop {
            if let Some(ref mut pm) = self.progress_manager {
                pm.update_cells(index, executor.grid().collapsed_count());
            }

            if !executor.execute_iteration(&mut writer)? {
                break;
            }
        }

        let outcome = executor.outcome();
        let status = match outcome {
            Some(RunOutcome::Contradicted { .. }) => "✗",
            Some(RunOutcome::Exhausted { .. }) => "…",
            _ => "✓",
        };

        if let Some(ref mut pm) = self.progress_manager {
            pm.update_cells(index, executor.grid().collapsed_count());
            pm.complete_file(index, status);
            if let Some((collapsed, total)) = pm.file_state(index) {
                info!(
                    input = %input_path.display(),
                    collapsed,
                    total,
                    "finished file"
                );
            }
        }

        match outcome {
            Some(RunOutcome::Contradicted {
                position,
                iterations,
            }) => {
                if let Some(last_valid) = executor.last_valid_projection() {
                    export_projection_as_png(last_valid, executor.model(), &output_path)?;
                }
                Err(AlgorithmError::Contradiction {
                    position,
                    iteration: iterations,
                })
            }
            Some(RunOutcome::Exhausted { iterations }) => {
                warn!(
                    iterations,
                    output = %output_path.display(),
                    "iteration budget spent, output is partial"
                );
                export_projection_as_png(&executor.projection(), executor.model(), &output_path)
            }
            _ => export_projection_as_png(&executor.projection(), executor.model(), &output_path),
        }
    }

    fn get_prefill_path(input_path: &Path) -> PathBuf {
        let stem = input_path.file_stem().unwrap_or_default();
        let prefill_name = format!("{}{PREFILL_SUFFIX}.png", stem.to_string_lossy());

        if let Some(parent) = input_path.parent() {
            parent.join(prefill_name)
        } else {
            PathBuf::from(prefill_name)
        }
    }

    /// Output path for an exemplar: `<stem>_wavefunc_<width>x<height>.png` beside the input
    pub fn get_output_path(&self, input_path: &Path) -> PathBuf {
        let (rows, cols) = self.cli.grid_dimensions();
        let stem = input_path.file_stem().unwrap_or_default();
        let output_name = format!("{}{OUTPUT_SUFFIX}_{cols}x{rows}.png", stem.to_string_lossy());

        if let Some(parent) = input_path.parent() {
            parent.join(output_name)
        } else {
            PathBuf::from(output_name)
        }
    }
}

fn is_png(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("png")
}

// Outputs and prefill images sit beside the exemplars
fn is_generated(path: &Path) -> bool {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    stem.ends_with(PREFILL_SUFFIX) || stem.contains(OUTPUT_SUFFIX)
}
