//! Wilson Dirac operator
//!
//! `D = (m + 4/a) − 1/(2a) Σ_μ [(1 − γ_μ) U_μ(x) δ_{x+μ,y} + (1 + γ_μ) U_μ(x−μ)† δ_{x−μ,y}]`
//!
//! Components are ordered colour fastest, then spin, then site:
//! `index = colour + 3 (spin + 4 site_index)`.

use super::bicgstab::SpinorField;
use super::sparse::CsrMatrix;
use crate::algebra::gamma::{direction_gammas, gamma5};
use crate::algebra::{real, ColourMatrix, SpinMatrix, N_COLOURS, N_SPINS};
use crate::error::{LatticeError, Result};
use crate::lattice::{shifted, GaugeField, Links, Shape, Site, N_DIMS};
use nalgebra::Complex;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Complex components per site
pub const SITE_DOF: usize = N_SPINS * N_COLOURS;

/// Position of one component in a fermion vector
#[inline]
pub fn component_index(site_index: usize, spin: usize, colour: usize) -> usize {
    colour + N_COLOURS * (spin + N_SPINS * site_index)
}

/// Assembled Wilson Dirac matrix for one gauge field
#[derive(Debug, Clone)]
pub struct DiracOperator {
    shape: Shape,
    mass: f64,
    spacing: f64,
    matrix: CsrMatrix,
}

impl DiracOperator {
    /// Assemble the operator for `field` with bare mass `mass` and spacing `spacing`
    ///
    /// Rows are built in parallel, one site (12 rows) per task. Only the site itself
    /// and its eight neighbours contribute; on extent-2 lattices the forward and
    /// backward neighbour coincide and their entries are summed.
    pub fn new(field: &GaugeField, mass: f64, spacing: f64) -> Self {
        let shape = field.shape();
        let dim = shape.volume() * SITE_DOF;
        let gammas = direction_gammas();
        let identity = SpinMatrix::identity();
        let forward: Vec<SpinMatrix> = gammas.iter().map(|g| identity - g).collect();
        let backward: Vec<SpinMatrix> = gammas.iter().map(|g| identity + g).collect();
        let diagonal = real(mass + 4.0 / spacing);
        let hopping = real(-0.5 / spacing);

        let rows: Vec<FxHashMap<usize, Complex<f64>>> = (0..shape.volume())
            .into_par_iter()
            .flat_map_iter(|index| {
                let site = shape.site_coords(index);
                let mut rows = vec![FxHashMap::default(); SITE_DOF];
                for (offset, row) in rows.iter_mut().enumerate() {
                    row.insert(index * SITE_DOF + offset, diagonal);
                }
                for mu in 0..N_DIMS {
                    let up = shifted(&site, mu, 1);
                    let down = shifted(&site, mu, -1);
                    add_hop(
                        &mut rows,
                        shape.site_index(&up),
                        &(forward[mu] * hopping),
                        &field.link(&site, mu),
                    );
                    add_hop(
                        &mut rows,
                        shape.site_index(&down),
                        &(backward[mu] * hopping),
                        &field.link(&down, mu).adjoint(),
                    );
                }
                rows
            })
            .collect();

        let matrix = CsrMatrix::from_rows(dim, rows);
        debug!(
            shape = %shape,
            dim,
            nnz = matrix.nnz(),
            mass,
            "Dirac operator assembled"
        );
        Self {
            shape,
            mass,
            spacing,
            matrix,
        }
    }

    /// Lattice the operator acts on
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Bare quark mass
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Lattice spacing
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Dimension of the fermion space, 12 per site
    pub fn dim(&self) -> usize {
        self.matrix.n_rows()
    }

    /// Underlying sparse matrix
    pub fn matrix(&self) -> &CsrMatrix {
        &self.matrix
    }

    /// `D x`
    ///
    /// # Errors
    ///
    /// [`LatticeError::LayoutMismatch`] if `x` does not have [`DiracOperator::dim`] entries.
    pub fn apply(&self, x: &SpinorField) -> Result<SpinorField> {
        self.check_len(x)?;
        Ok(self.matrix.spmv(x))
    }

    /// `γ5 x`, acting on the spin index of every site and colour
    ///
    /// # Errors
    ///
    /// [`LatticeError::LayoutMismatch`] if `x` does not have [`DiracOperator::dim`] entries.
    pub fn gamma5_apply(&self, x: &SpinorField) -> Result<SpinorField> {
        self.check_len(x)?;
        let g5 = gamma5();
        Ok(SpinorField::from_fn(x.len(), |index, _| {
            let colour = index % N_COLOURS;
            let spin = (index / N_COLOURS) % N_SPINS;
            let site = index / SITE_DOF;
            (0..N_SPINS)
                .map(|s| g5[(spin, s)] * x[component_index(site, s, colour)])
                .sum()
        }))
    }

    fn check_len(&self, x: &SpinorField) -> Result<()> {
        if x.len() == self.dim() {
            Ok(())
        } else {
            Err(LatticeError::LayoutMismatch {
                expected: format!("{} components on {}", self.dim(), self.shape),
                found: format!("{} components", x.len()),
            })
        }
    }
}

/// Add the block `spin ⊗ colour` coupling this site's rows to `neighbour`
fn add_hop(
    rows: &mut [FxHashMap<usize, Complex<f64>>],
    neighbour: usize,
    spin: &SpinMatrix,
    colour: &ColourMatrix,
) {
    for alpha in 0..N_SPINS {
        for beta in 0..N_SPINS {
            let s = spin[(alpha, beta)];
            if s.norm_sqr() == 0.0 {
                continue;
            }
            for a in 0..N_COLOURS {
                let row = &mut rows[a + N_COLOURS * alpha];
                for b in 0..N_COLOURS {
                    *row.entry(component_index(neighbour, beta, b))
                        .or_insert(Complex::new(0.0, 0.0)) += s * colour[(a, b)];
                }
            }
        }
    }
}

/// Unit source at one (site, spin, colour)
pub fn point_source(shape: Shape, site: &Site, spin: usize, colour: usize) -> SpinorField {
    let mut source = SpinorField::zeros(shape.volume() * SITE_DOF);
    source[component_index(shape.site_index(site), spin, colour)] = real(1.0);
    source
}
