//! Error types for the lattice engine
//!
//! Geometry errors are non-fatal: the engine logs them through `tracing` and hands
//! them back so the caller can decide what to do with the measurement. Layout
//! mismatches abort the offending call.

use crate::lattice::Site;
use thiserror::Error;

/// Errors reported by lattice operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LatticeError {
    /// Link direction outside `[0, 4)`
    #[error("invalid link direction {direction}, expected 0..4")]
    InvalidDirection {
        /// The offending direction component
        direction: isize,
    },

    /// Line endpoints do not differ in exactly one coordinate
    #[error("start {start:?} and finish {finish:?} do not form a straight line")]
    NotCollinear {
        /// First endpoint
        start: Site,
        /// Second endpoint
        finish: Site,
    },

    /// A path step does not move by exactly one site along its recorded direction
    #[error("path contains non-consecutive link variables at step {step}")]
    NonConsecutivePath {
        /// Index of the first offending step
        step: usize,
    },

    /// Wilson loop corners must differ in time and in exactly one spatial coordinate
    #[error(
        "corners {corner1:?} and {corner2:?} do not form a rectangle with two spatial and two temporal sides"
    )]
    MalformedLoop {
        /// First corner
        corner1: Site,
        /// Opposite corner
        corner2: Site,
    },

    /// Operands defined over incompatible layouts
    #[error("layout mismatch: expected {expected}, found {found}")]
    LayoutMismatch {
        /// Layout required by the receiver
        expected: String,
        /// Layout supplied by the caller
        found: String,
    },

    /// Block edge does not tile the lattice into a parity-colourable grid
    #[error("block size {block_size} cannot decompose lattice of extents {extents:?}")]
    InvalidBlockSize {
        /// Requested block edge length
        block_size: usize,
        /// Lattice extents (t, x, y, z)
        extents: [usize; 4],
    },

    /// Rejected configuration or call parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Iterative solve stopped before reaching tolerance
    #[error("solver did not converge after {iterations} iterations (relative residual {residual:e})")]
    SolverNotConverged {
        /// Iterations performed
        iterations: usize,
        /// Relative residual at exit
        residual: f64,
    },
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, LatticeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_coordinates() {
        let err = LatticeError::NotCollinear {
            start: [0, 0, 0, 0],
            finish: [1, 1, 0, 0],
        };
        let message = err.to_string();
        assert!(message.contains("[0, 0, 0, 0]"));
        assert!(message.contains("[1, 1, 0, 0]"));
    }

    #[test]
    fn test_block_size_message() {
        let err = LatticeError::InvalidBlockSize {
            block_size: 3,
            extents: [8, 8, 8, 8],
        };
        assert!(err.to_string().contains("block size 3"));
    }
}
