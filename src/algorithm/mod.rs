/// Fixed-capacity pattern sets for candidates and adjacency
pub mod bitset;
/// Weighted collapse of a single cell
pub mod collapse;
/// Driver state machine and projection sinks
pub mod executor;
/// Constraint propagation after a cell is fixed or narrowed
pub mod propagation;
/// Minimum-entropy cell selection and termination detection
pub mod selection;
