//! Wilson fermions on the current gauge field
//!
//! [`Lattice::dirac_operator`] assembles the sparse Wilson Dirac matrix over the
//! 12·V component space; [`Lattice::propagator`] solves `D ψ = δ` for a point source
//! with BiCGSTAB.

mod bicgstab;
mod operator;
mod sparse;

pub use bicgstab::{bicgstab, SolveReport, SolverParams, SpinorField};
pub use operator::{component_index, point_source, DiracOperator, SITE_DOF};
pub use sparse::CsrMatrix;

use crate::algebra::{N_COLOURS, N_SPINS};
use crate::error::{LatticeError, Result};
use crate::lattice::{Lattice, Site};
use tracing::{info, warn};

impl Lattice {
    /// Wilson Dirac operator for bare mass `mass` at the configured spacing
    pub fn dirac_operator(&self, mass: f64) -> DiracOperator {
        DiracOperator::new(&self.field, mass, self.config.spacing)
    }

    /// Quark propagator from a point source, with the default solver settings
    ///
    /// # Errors
    ///
    /// See [`Lattice::propagator_with`].
    pub fn propagator(
        &self,
        mass: f64,
        site: &Site,
        spin: usize,
        colour: usize,
    ) -> Result<SpinorField> {
        self.propagator_with(mass, site, spin, colour, &SolverParams::default())
            .map(|(solution, _)| solution)
    }

    /// Quark propagator from a point source, returning the solver report too
    ///
    /// # Errors
    ///
    /// [`LatticeError::InvalidParameter`] for a spin outside `[0, 4)` or a colour
    /// outside `[0, 3)`; [`LatticeError::SolverNotConverged`] if BiCGSTAB stops short
    /// of the tolerance.
    pub fn propagator_with(
        &self,
        mass: f64,
        site: &Site,
        spin: usize,
        colour: usize,
        params: &SolverParams,
    ) -> Result<(SpinorField, SolveReport)> {
        if spin >= N_SPINS || colour >= N_COLOURS {
            warn!(spin, colour, "propagator source index out of range");
            return Err(LatticeError::InvalidParameter(format!(
                "source spin {spin} / colour {colour} out of range"
            )));
        }

        let operator = self.dirac_operator(mass);
        let source = point_source(self.field.shape(), site, spin, colour);
        let (solution, report) = bicgstab(|x| operator.matrix().spmv(x), &source, params)?;
        info!(
            mass,
            ?site,
            spin,
            colour,
            iterations = report.iterations,
            residual = report.residual,
            "Propagator solved"
        );
        Ok((solution, report))
    }
}
