//! BiCGSTAB for non-Hermitian systems
//!
//! Unpreconditioned van der Vorst iteration, stopping on the relative residual
//! `||r|| / ||b||`.

use crate::error::{LatticeError, Result};
use nalgebra::{Complex, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Fermion vector: 12 complex components per site
pub type SpinorField = DVector<Complex<f64>>;

/// Inner products below this magnitude count as a breakdown
const BREAKDOWN: f64 = 1e-300;

/// Stopping criteria
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverParams {
    /// Target relative residual
    pub tolerance: f64,
    /// Iteration cap
    pub max_iterations: usize,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 1000,
        }
    }
}

/// Outcome of a converged solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport {
    /// Iterations performed
    pub iterations: usize,
    /// Relative residual of the returned iterate
    pub residual: f64,
}

/// Solve `A x = b` where `apply` computes `A v`
///
/// # Errors
///
/// [`LatticeError::SolverNotConverged`] if the residual is still above tolerance after
/// `max_iterations`, or the iteration breaks down first.
pub fn bicgstab<F>(
    apply: F,
    b: &SpinorField,
    params: &SolverParams,
) -> Result<(SpinorField, SolveReport)>
where
    F: Fn(&SpinorField) -> SpinorField,
{
    let zero = Complex::new(0.0, 0.0);
    let b_norm = b.norm();
    let mut x = SpinorField::from_element(b.len(), zero);
    if b_norm == 0.0 {
        return Ok((
            x,
            SolveReport {
                iterations: 0,
                residual: 0.0,
            },
        ));
    }

    let mut r = b.clone();
    let r_hat = b.clone();
    let mut p = SpinorField::from_element(b.len(), zero);
    let mut v = SpinorField::from_element(b.len(), zero);
    let one = Complex::new(1.0, 0.0);
    let (mut rho, mut alpha, mut omega) = (one, one, one);
    let mut residual = 1.0;

    for iteration in 1..=params.max_iterations {
        let rho_next = r_hat.dotc(&r);
        if rho_next.norm() < BREAKDOWN {
            warn!(iteration, residual, "BiCGSTAB breakdown: rho vanished");
            return Err(LatticeError::SolverNotConverged {
                iterations: iteration,
                residual,
            });
        }
        let beta = (rho_next / rho) * (alpha / omega);
        p = &r + (&p - &v * omega) * beta;
        v = apply(&p);

        let r_hat_v = r_hat.dotc(&v);
        if r_hat_v.norm() < BREAKDOWN {
            warn!(iteration, residual, "BiCGSTAB breakdown: <r_hat, v> vanished");
            return Err(LatticeError::SolverNotConverged {
                iterations: iteration,
                residual,
            });
        }
        alpha = rho_next / r_hat_v;
        let s = &r - &v * alpha;

        residual = s.norm() / b_norm;
        if residual < params.tolerance {
            x += &p * alpha;
            return Ok(converged(x, iteration, residual));
        }

        let t = apply(&s);
        let t_norm_sqr = t.norm_squared();
        omega = if t_norm_sqr > 0.0 {
            t.dotc(&s) / t_norm_sqr
        } else {
            zero
        };
        x += &p * alpha + &s * omega;
        r = &s - &t * omega;
        rho = rho_next;

        residual = r.norm() / b_norm;
        if residual < params.tolerance {
            return Ok(converged(x, iteration, residual));
        }
        if omega.norm() < BREAKDOWN {
            warn!(iteration, residual, "BiCGSTAB breakdown: omega vanished");
            return Err(LatticeError::SolverNotConverged {
                iterations: iteration,
                residual,
            });
        }
    }

    warn!(
        iterations = params.max_iterations,
        residual,
        tolerance = params.tolerance,
        "BiCGSTAB did not converge"
    );
    Err(LatticeError::SolverNotConverged {
        iterations: params.max_iterations,
        residual,
    })
}

fn converged(x: SpinorField, iterations: usize, residual: f64) -> (SpinorField, SolveReport) {
    debug!(iterations, residual, "BiCGSTAB converged");
    (
        x,
        SolveReport {
            iterations,
            residual,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    fn c(re: f64, im: f64) -> Complex<f64> {
        Complex::new(re, im)
    }

    fn system() -> (DMatrix<Complex<f64>>, SpinorField) {
        // diagonally dominant, non-Hermitian
        let a = DMatrix::from_fn(6, 6, |i, j| {
            if i == j {
                c(4.0 + i as f64, 0.5)
            } else {
                c(0.3 * (i as f64 - j as f64), 0.1 * (i + j) as f64 / 6.0)
            }
        });
        let b = SpinorField::from_fn(6, |i, _| c(1.0, -(i as f64)));
        (a, b)
    }

    #[test]
    fn test_solves_small_system() {
        let (a, b) = system();
        let (x, report) = bicgstab(|v| &a * v, &b, &SolverParams::default()).unwrap();
        assert!(report.residual < 1e-10);
        assert!(report.iterations <= 30);
        assert!((&a * &x - &b).norm() / b.norm() < 1e-9);
    }

    #[test]
    fn test_zero_source_gives_zero() {
        let (a, _) = system();
        let b = SpinorField::from_element(6, c(0.0, 0.0));
        let (x, report) = bicgstab(|v| &a * v, &b, &SolverParams::default()).unwrap();
        assert_eq!(report.iterations, 0);
        assert_eq!(x.norm(), 0.0);
    }

    #[test]
    fn test_reports_non_convergence() {
        let (a, b) = system();
        let params = SolverParams {
            tolerance: 1e-14,
            max_iterations: 1,
        };
        assert!(matches!(
            bicgstab(|v| &a * v, &b, &params),
            Err(LatticeError::SolverNotConverged { iterations: 1, .. })
        ));
    }
}
