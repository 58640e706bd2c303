//! Mathematical utilities for the algorithm

/// Entropy of weight distributions
pub mod probability;
