//! Algorithm constants and runtime configuration defaults

// Safety limit to prevent excessive memory allocation
/// Maximum allowed grid dimension
pub const MAX_GRID_DIMENSION: usize = 10_000;

/// Default output grid width in cells
pub const DEFAULT_WIDTH: usize = 20;

/// Default ceiling on single-pass propagation depth
pub const DEFAULT_MAX_PROPAGATION_DEPTH: usize = 10_000;

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;

// Default values for configurable parameters
/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

/// Default number of driver iterations between output snapshots
pub const DEFAULT_SNAPSHOT_INTERVAL: usize = 1;

// Output settings
/// Marker inserted between the input stem and the output dimensions
pub const OUTPUT_SUFFIX: &str = "_wavefunc";
/// Suffix of the optional prefill image next to an input
pub const PREFILL_SUFFIX: &str = "_pre";
