//! Greedy word wrapping against measured font metrics.

/// Line breaking and wrapped drawing.
pub mod wrap;
