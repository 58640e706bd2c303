//! Wave function collapse synthesis of pixel images from exemplar color adjacency
//!
//! Every distinct color of an exemplar image becomes a pattern. The exemplar teaches how often each
//! pattern occurs and which patterns may touch, and an output grid of superposed cells is resolved
//! one minimum-entropy cell at a time while constraints propagate to the neighbours.

#![forbid(unsafe_code)]

/// Collapse loop: entropy selection, collapse, propagation and the driving state machine
pub mod algorithm;
/// Pattern learning from exemplar images
pub mod analysis;
/// Input/output operations and error handling
pub mod io;
/// Entropy of weight distributions
pub mod math;
/// Wave grid of superposed cells
pub mod spatial;

pub use io::error::{AlgorithmError, Result};
