//! Lattice QCD Simulation Core Library
//!
//! Monte Carlo generation of quenched SU(3) gauge configurations on a periodic 4D
//! lattice, with the gluonic observables and the Wilson-fermion propagator measured
//! on them.
//!
//! ## Overview
//!
//! - [`Lattice`] owns the gauge field, the chosen action and every random stream
//! - Metropolis and pseudo-heatbath link updates, sequential or domain-decomposed
//!   (parity-coloured blocks updated in parallel with rayon)
//! - Wilson, rectangle-improved and twisted-rectangle actions
//! - Plaquettes, rectangles, Wilson loops with stout-smeared spatial links, Polyakov loops
//! - Sparse Wilson Dirac operator and BiCGSTAB point-source propagators
//!
//! ```no_run
//! use qcd_sim_core::{Lattice, LatticeConfig};
//!
//! let config = LatticeConfig::default().with_edge_length(8).with_beta(5.5);
//! let mut lattice = Lattice::new(config)?;
//! lattice.thermalize()?;
//! println!("plaquette {}", lattice.compute_average_plaquette());
//! # Ok::<(), qcd_sim_core::LatticeError>(())
//! ```

// Group and spinor algebra
pub mod algebra;

// Field storage and the lattice aggregate
pub mod config;
pub mod error;
pub mod lattice;

// Physics
pub mod action;
pub mod dirac;
pub mod observables;
pub mod smearing;
pub mod update;

// Re-export the main entry points
pub use config::{ActionKind, LatticeConfig, UpdateMethod};
pub use error::{LatticeError, Result};
pub use lattice::{GaugeField, Lattice, LinkIndex, Links, LinksMut, Shape, Site};

// Re-export algebra and measurement types
pub use algebra::{ColourMatrix, SpinMatrix};
pub use dirac::{DiracOperator, SolveReport, SolverParams, SpinorField};
pub use observables::path::{Hop, PathStep};
pub use update::UpdateStats;
