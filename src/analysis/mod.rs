//! Analysis of exemplar images

/// Color pattern weights and adjacency learned from an exemplar
pub mod patterns;
