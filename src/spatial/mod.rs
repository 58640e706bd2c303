//! Spatial data structures
//!
//! This module contains the wave grid: cells holding surviving candidate patterns,
//! the collapsed set, neighbour iteration and best-guess projection.

/// Wave grid and cell state
pub mod grid;

pub use grid::{Cell, Projection, WaveGrid};
