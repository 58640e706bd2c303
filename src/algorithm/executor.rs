use crate::{
    algorithm::bitset::PatternSet,
    algorithm::collapse::{collapse_cell, fix_cell},
    algorithm::propagation::{PropagationMode, Propagator, VisitedSet},
    algorithm::selection::{Selection, Termination, select_min_entropy},
    analysis::patterns::{PatternId, PatternModel},
    io::configuration::{DEFAULT_MAX_PROPAGATION_DEPTH, DEFAULT_SEED},
    io::error::{
        AlgorithmError, ErrorContext, Result, WithContext, computation_error, invalid_parameter,
    },
    io::prefill::PrefillData,
    spatial::{Projection, WaveGrid},
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, warn};

/// Parameters of one synthesis run
#[derive(Clone, Copy, Debug)]
pub struct AlgorithmConfig {
    /// Output grid rows
    pub rows: usize,
    /// Output grid columns
    pub cols: usize,
    /// Seed of the default random source
    pub seed: u64,
    /// Propagation strategy
    pub propagation: PropagationMode,
    /// Ceiling on single-pass propagation depth
    pub max_propagation_depth: usize,
    /// Driver iteration budget; `None` means one iteration per cell
    pub max_iterations: Option<usize>,
}

impl AlgorithmConfig {
    /// Configuration for a `rows` x `cols` grid with default settings
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            seed: DEFAULT_SEED,
            propagation: PropagationMode::Fixpoint,
            max_propagation_depth: DEFAULT_MAX_PROPAGATION_DEPTH,
            max_iterations: None,
        }
    }
}

/// Driver state machine
#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
    /// Looking for the next cell to collapse
    Selecting,
    /// About to collapse a selected cell
    Collapsing {
        /// Selected cell
        position: [usize; 2],
        /// Its entropy at selection time
        entropy: f64,
    },
    /// About to propagate from a collapsed cell
    Propagating {
        /// Collapsed cell
        position: [usize; 2],
        /// Adjacency of the chosen pattern
        allowed: PatternSet,
    },
    /// About to hand the current best guess to the projection sink
    Projecting,
    /// Every cell collapsed
    Succeeded,
    /// A cell ran out of candidates
    Contradicted {
        /// First contradicted cell
        position: [usize; 2],
    },
    /// Iteration budget spent before termination
    Exhausted,
}

impl RunState {
    /// Whether the run has ended
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Contradicted { .. } | Self::Exhausted
        )
    }
}

/// How a finished run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every cell collapsed
    Succeeded {
        /// Completed driver iterations
        iterations: usize,
    },
    /// A cell ran out of candidates
    Contradicted {
        /// First contradicted cell
        position: [usize; 2],
        /// Completed driver iterations
        iterations: usize,
    },
    /// Iteration budget spent
    Exhausted {
        /// Completed driver iterations
        iterations: usize,
    },
}

/// One sampled collapse, in order of occurrence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollapseRecord {
    /// Driver iteration of the collapse
    pub iteration: usize,
    /// Collapsed cell
    pub position: [usize; 2],
    /// Chosen pattern
    pub pattern: PatternId,
    /// Entropy of the cell when selected
    pub entropy: f64,
}

/// Receives the grid's best guess once per driver iteration
pub trait ProjectionSink {
    /// Accept the projection produced at the end of `iteration`
    ///
    /// # Errors
    ///
    /// Returns an error if the projection cannot be recorded
    fn project(
        &mut self,
        projection: &Projection,
        model: &PatternModel,
        iteration: usize,
    ) -> Result<()>;
}

/// Sink that discards every projection
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProjectionSink for NullSink {
    fn project(&mut self, _: &Projection, _: &PatternModel, _: usize) -> Result<()> {
        Ok(())
    }
}

impl ProjectionSink for Vec<Projection> {
    fn project(&mut self, projection: &Projection, _: &PatternModel, _: usize) -> Result<()> {
        self.push(projection.clone());
        Ok(())
    }
}

/// Wave function collapse run over a fixed-size grid
///
/// Owns the learned model, the wave grid and the random source, and advances through
/// `Selecting → Collapsing → Propagating → Projecting` until the grid is fully collapsed,
/// a contradiction appears, or the iteration budget is spent.
pub struct WaveCollapse<R = StdRng> {
    model: PatternModel,
    grid: WaveGrid,
    propagator: Propagator,
    rng: R,
    state: RunState,
    iteration: usize,
    max_iterations: usize,
    history: Vec<CollapseRecord>,
    last_valid: Option<Projection>,
}

impl WaveCollapse<StdRng> {
    /// Create a run seeded from `config.seed`
    ///
    /// # Errors
    ///
    /// Returns an error if the grid dimensions or propagation depth are invalid
    pub fn new(model: PatternModel, config: AlgorithmConfig) -> Result<Self> {
        Self::with_rng(model, config, StdRng::seed_from_u64(config.seed))
    }
}

impl<R: Rng> WaveCollapse<R> {
    /// Create a run drawing its collapse choices from `rng`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The grid dimensions are zero or too large
    /// - The model has no patterns
    /// - The propagation depth ceiling is zero
    pub fn with_rng(model: PatternModel, config: AlgorithmConfig, rng: R) -> Result<Self> {
        if config.max_propagation_depth == 0 {
            return Err(invalid_parameter(
                "max_propagation_depth",
                &config.max_propagation_depth,
                &"must be positive",
            ));
        }

        let grid = WaveGrid::new(config.rows, config.cols, &model)?;
        let max_iterations = config.max_iterations.unwrap_or_else(|| grid.cell_count());

        Ok(Self {
            model,
            grid,
            propagator: Propagator::new(config.propagation, config.max_propagation_depth),
            rng,
            state: RunState::Selecting,
            iteration: 0,
            max_iterations,
            history: Vec::new(),
            last_valid: None,
        })
    }

    /// Fix a cell to `pattern` before or between iterations and propagate from it
    ///
    /// Pinning a pattern the cell no longer allows empties the cell and ends the run as a
    /// contradiction at that cell. This includes re-pinning a collapsed cell to another pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is outside the grid, the pattern is unknown, or
    /// propagation exceeds its depth ceiling
    pub fn pin(&mut self, position: [usize; 2], pattern: PatternId) -> Result<()> {
        match fix_cell(&mut self.grid, &self.model, position, pattern) {
            Ok(result) => {
                let mut visited = VisitedSet::new(self.grid.dimensions());
                let report = self
                    .propagator
                    .propagate(
                        &mut self.grid,
                        &self.model,
                        position,
                        result.allowed,
                        &mut visited,
                    )
                    .with_iteration(self.iteration)?;
                if let Some([row, col]) = report.contradiction {
                    warn!(row, col, "pinned cell leaves a neighbour without candidates");
                }
                Ok(())
            }
            Err(AlgorithmError::Contradiction { .. }) => {
                warn!(
                    row = position[0],
                    col = position[1],
                    pattern,
                    "pinned pattern is no longer allowed"
                );
                let empty = PatternSet::new(self.model.pattern_count());
                if let Some(cell) = self.grid.cell_mut(position) {
                    cell.restrict(&empty);
                }
                if !self.state.is_terminal() {
                    self.state = RunState::Contradicted { position };
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Pin every placement of a prefill image
    ///
    /// Returns the number of placements applied.
    ///
    /// # Errors
    ///
    /// Returns an error if any placement cannot be pinned
    pub fn apply_prefill(&mut self, prefill: &PrefillData) -> Result<usize> {
        for placement in prefill.placements() {
            self.pin(placement.position, placement.pattern)?;
        }
        Ok(prefill.placements().len())
    }

    /// Advance the state machine by one transition
    ///
    /// Terminal states are absorbing. A failed transition leaves the state unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if collapse, propagation or the sink fails
    pub fn step<S: ProjectionSink + ?Sized>(&mut self, sink: &mut S) -> Result<&RunState> {
        let state = self.state.clone();
        self.state = self.transition(state, sink)?;
        Ok(&self.state)
    }

    fn transition<S: ProjectionSink + ?Sized>(
        &mut self,
        state: RunState,
        sink: &mut S,
    ) -> Result<RunState> {
        Ok(match state {
            RunState::Selecting => self.select(),
            RunState::Collapsing { position, entropy } => {
                let result = collapse_cell(&mut self.grid, &self.model, position, &mut self.rng)
                    .with_context(ErrorContext {
                        iteration: Some(self.iteration),
                        position: Some(position),
                    })?;
                debug!(
                    row = position[0],
                    col = position[1],
                    pattern = result.pattern,
                    "collapsed cell"
                );
                self.history.push(CollapseRecord {
                    iteration: self.iteration,
                    position,
                    pattern: result.pattern,
                    entropy,
                });
                RunState::Propagating {
                    position,
                    allowed: result.allowed,
                }
            }
            RunState::Propagating { position, allowed } => {
                let mut visited = VisitedSet::new(self.grid.dimensions());
                let report = self
                    .propagator
                    .propagate(&mut self.grid, &self.model, position, allowed, &mut visited)
                    .with_iteration(self.iteration)?;
                debug!(
                    visited = visited.len(),
                    narrowed = report.narrowed,
                    "propagated constraints"
                );
                if let Some([row, col]) = report.contradiction {
                    warn!(
                        row,
                        col,
                        iteration = self.iteration,
                        "propagation left a cell without candidates"
                    );
                }
                RunState::Projecting
            }
            RunState::Projecting => {
                let projection = self.grid.project(&self.model);
                sink.project(&projection, &self.model, self.iteration)?;
                if !projection.has_contradiction() {
                    self.last_valid = Some(projection);
                }
                self.iteration += 1;
                RunState::Selecting
            }
            terminal => terminal,
        })
    }

    fn select(&self) -> RunState {
        match select_min_entropy(&self.grid, &self.model) {
            Selection::Terminate(Termination::Success) => RunState::Succeeded,
            Selection::Terminate(Termination::Contradiction { position }) => {
                warn!(
                    row = position[0],
                    col = position[1],
                    iteration = self.iteration,
                    "contradiction, stopping"
                );
                RunState::Contradicted { position }
            }
            Selection::Collapse { .. } if self.iteration >= self.max_iterations => {
                warn!(
                    iterations = self.iteration,
                    collapsed = self.grid.collapsed_count(),
                    "iteration budget spent"
                );
                RunState::Exhausted
            }
            Selection::Collapse { position, entropy } => {
                debug!(
                    row = position[0],
                    col = position[1],
                    entropy,
                    "selected minimum entropy cell"
                );
                RunState::Collapsing { position, entropy }
            }
        }
    }

    /// Run one full select, collapse, propagate, project cycle
    ///
    /// Returns whether the run can continue.
    ///
    /// # Errors
    ///
    /// Returns an error if any transition fails
    pub fn execute_iteration<S: ProjectionSink + ?Sized>(&mut self, sink: &mut S) -> Result<bool> {
        loop {
            let state = self.step(sink)?;
            if state.is_terminal() {
                return Ok(false);
            }
            if *state == RunState::Selecting {
                return Ok(true);
            }
        }
    }

    /// Iterate until the run ends
    ///
    /// # Errors
    ///
    /// Returns an error if any transition fails
    pub fn run<S: ProjectionSink + ?Sized>(&mut self, sink: &mut S) -> Result<RunOutcome> {
        while self.execute_iteration(sink)? {}

        self.outcome()
            .ok_or_else(|| computation_error("run", &"driver stopped outside a terminal state"))
    }

    /// Outcome of the run once it reached a terminal state
    pub fn outcome(&self) -> Option<RunOutcome> {
        let iterations = self.iteration;
        match self.state {
            RunState::Succeeded => Some(RunOutcome::Succeeded { iterations }),
            RunState::Contradicted { position } => Some(RunOutcome::Contradicted {
                position,
                iterations,
            }),
            RunState::Exhausted => Some(RunOutcome::Exhausted { iterations }),
            _ => None,
        }
    }

    /// Current state
    pub const fn state(&self) -> &RunState {
        &self.state
    }

    /// Wave grid
    pub const fn grid(&self) -> &WaveGrid {
        &self.grid
    }

    /// Learned pattern model
    pub const fn model(&self) -> &PatternModel {
        &self.model
    }

    /// Completed driver iterations
    pub const fn iteration(&self) -> usize {
        self.iteration
    }

    /// Iteration budget
    pub const fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Sampled collapses in order
    pub fn history(&self) -> &[CollapseRecord] {
        &self.history
    }

    /// Latest projection that held no contradicted cell
    pub const fn last_valid_projection(&self) -> Option<&Projection> {
        self.last_valid.as_ref()
    }

    /// Best guess of the current grid
    pub fn projection(&self) -> Projection {
        self.grid.project(&self.model)
    }
}
