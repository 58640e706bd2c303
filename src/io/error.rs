//! Error types and context management for algorithm operations

use std::fmt;
use std::path::PathBuf;

/// Main error type for all algorithm operations
#[derive(Debug)]
pub enum AlgorithmError {
    /// Failed to load an image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Source data doesn't meet algorithm requirements
    InvalidSourceData {
        /// Description of what's wrong with the source data
        reason: String,
    },

    /// Algorithm parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Pattern index exceeds the learned pattern set
    InvalidPatternIndex {
        /// The invalid pattern index
        index: usize,
        /// Number of learned patterns
        pattern_count: usize,
    },

    /// A cell has no surviving candidate
    ///
    /// The configuration is unsatisfiable from this point on; there is no backtracking.
    Contradiction {
        /// Contradicted cell as `[row, col]`
        position: [usize; 2],
        /// Driver iteration when the contradiction was detected
        iteration: usize,
    },

    /// Entropy of a cell with no surviving weight was requested
    ///
    /// The selector classifies this as a contradiction instead of evaluating it.
    DegenerateEntropy {
        /// Cell as `[row, col]`
        position: [usize; 2],
    },

    /// Single-pass propagation went deeper than the configured ceiling
    RecursionLimitExceeded {
        /// Cell about to be descended into
        position: [usize; 2],
        /// Depth that would have been reached
        depth: usize,
        /// Configured ceiling
        limit: usize,
    },

    /// Failed to save a generated image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Numerical computation produced invalid result
    Computation {
        /// Name of the computation that failed
        operation: &'static str,
        /// Description of the failure
        reason: String,
    },
}

impl fmt::Display for AlgorithmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::InvalidSourceData { reason } => {
                write!(f, "Invalid source data: {reason}")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::InvalidPatternIndex {
                index,
                pattern_count,
            } => {
                write!(
                    f,
                    "Pattern index {index} is out of bounds ({pattern_count} patterns)"
                )
            }
            Self::Contradiction {
                position,
                iteration,
            } => {
                write!(
                    f,
                    "Contradiction at cell ({}, {}) in iteration {iteration}: no candidate pattern remains",
                    position[0], position[1]
                )
            }
            Self::DegenerateEntropy { position } => {
                write!(
                    f,
                    "Entropy undefined at cell ({}, {}): no surviving weight",
                    position[0], position[1]
                )
            }
            Self::RecursionLimitExceeded {
                position,
                depth,
                limit,
            } => {
                write!(
                    f,
                    "Propagation depth {depth} exceeds limit {limit} at cell ({}, {})",
                    position[0], position[1]
                )
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::Computation { operation, reason } => {
                write!(f, "Computation error in {operation}: {reason}")
            }
        }
    }
}

impl std::error::Error for AlgorithmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for algorithm results
pub type Result<T> = std::result::Result<T, AlgorithmError>;

/// Additional context to enrich error messages
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Current driver iteration
    pub iteration: Option<usize>,
    /// Grid position where the error occurred
    pub position: Option<[usize; 2]>,
}

/// Enriches error messages with algorithm state information
pub trait WithContext<T> {
    /// Add error context to a Result
    ///
    /// # Errors
    ///
    /// Propagates the original error with additional context applied
    fn with_context(self, context: ErrorContext) -> Result<T>;

    /// Add just the iteration context
    ///
    /// # Errors
    ///
    /// Propagates the original error with the iteration applied
    fn with_iteration(self, iteration: usize) -> Result<T>;
}

impl<T, E> WithContext<T> for std::result::Result<T, E>
where
    E: Into<AlgorithmError>,
{
    fn with_context(self, context: ErrorContext) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            // Only positional variants benefit from the context
            match &mut error {
                AlgorithmError::Contradiction {
                    position,
                    iteration,
                } => {
                    if let Some(iter) = context.iteration {
                        *iteration = iter;
                    }
                    if let Some(pos) = context.position {
                        *position = pos;
                    }
                }
                AlgorithmError::DegenerateEntropy { position }
                | AlgorithmError::RecursionLimitExceeded { position, .. } => {
                    if let Some(pos) = context.position {
                        *position = pos;
                    }
                }
                _ => {}
            }
            error
        })
    }

    fn with_iteration(self, iteration: usize) -> Result<T> {
        self.with_context(ErrorContext {
            iteration: Some(iteration),
            ..Default::default()
        })
    }
}

impl From<image::ImageError> for AlgorithmError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for AlgorithmError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> AlgorithmError {
    AlgorithmError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a computation error
pub fn computation_error(operation: &'static str, reason: &impl ToString) -> AlgorithmError {
    AlgorithmError::Computation {
        operation,
        reason: reason.to_string(),
    }
}

/// Create an error for an unusable input or output path
pub fn path_error(msg: &str) -> AlgorithmError {
    AlgorithmError::InvalidParameter {
        parameter: "path",
        value: String::new(),
        reason: msg.to_string(),
    }
}
