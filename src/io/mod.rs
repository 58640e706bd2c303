//! Command line, configuration, image export and error handling

/// Command-line interface and batch file processing
pub mod cli;
/// Algorithm constants and runtime configuration defaults
pub mod configuration;
/// Error types and context management
pub mod error;
/// PNG rendering and export of grid projections
pub mod image;
/// Pinned cells read from a prefill image
pub mod prefill;
/// Progress display for batch processing
pub mod progress;
