//! Gluonic observables
//!
//! The free functions in [`path`] and [`loops`] work on anything implementing
//! [`Links`](crate::lattice::Links). The methods added to [`Lattice`] here validate
//! their arguments, handle smearing for the Wilson loops and average over the lattice
//! with rayon.

pub mod loops;
pub mod path;

use crate::algebra::ColourMatrix;
use crate::error::{LatticeError, Result};
use crate::lattice::{check_direction, GaugeField, Lattice, Site, TIME};
use crate::smearing::SmearedSlices;
use loops::{
    check_loop_corners, opposite_corner, plaquette, polyakov_loop, rectangle, twisted_rectangle,
    wilson_loop, PLANES,
};
use nalgebra::Complex;
use path::PathStep;
use rayon::prelude::*;
use tracing::warn;

impl Lattice {
    /// Product of links along a straight line; see [`path::compute_line`]
    ///
    /// # Errors
    ///
    /// `LatticeError::NotCollinear` unless the endpoints differ in exactly one coordinate.
    pub fn compute_line(&self, start: &Site, finish: &Site) -> Result<ColourMatrix> {
        path::compute_line(&self.field, start, finish)
    }

    /// Product of links along a connected path; see [`path::compute_path`]
    ///
    /// # Errors
    ///
    /// `LatticeError::NonConsecutivePath` or `LatticeError::InvalidDirection` for a
    /// broken path.
    pub fn compute_path(&self, path: &[PathStep]) -> Result<ColourMatrix> {
        path::compute_path(&self.field, path)
    }

    /// Plaquette in the (mu, nu) plane at `site`
    ///
    /// # Errors
    ///
    /// `LatticeError::InvalidDirection` for a direction outside `[0, 4)` or for
    /// `nu == mu`, which spans no plane.
    pub fn compute_plaquette(&self, site: &Site, mu: usize, nu: usize) -> Result<f64> {
        check_plane(mu, nu)?;
        Ok(plaquette(&self.field, site, mu, nu))
    }

    /// 2×1 rectangle, long side along mu
    ///
    /// # Errors
    ///
    /// `LatticeError::InvalidDirection` for a direction outside `[0, 4)` or for
    /// `nu == mu`, which spans no plane.
    pub fn compute_rectangle(&self, site: &Site, mu: usize, nu: usize) -> Result<f64> {
        check_plane(mu, nu)?;
        Ok(rectangle(&self.field, site, mu, nu))
    }

    /// Twisted rectangle, long side along mu
    ///
    /// # Errors
    ///
    /// `LatticeError::InvalidDirection` for a direction outside `[0, 4)` or for
    /// `nu == mu`, which spans no plane.
    pub fn compute_twisted_rectangle(&self, site: &Site, mu: usize, nu: usize) -> Result<f64> {
        check_plane(mu, nu)?;
        Ok(twisted_rectangle(&self.field, site, mu, nu))
    }

    /// Wilson loop between two corners, smearing the two time slices first
    ///
    /// The slices of both corners are smeared `n_smears` times and restored before
    /// returning, whatever the outcome.
    ///
    /// # Errors
    ///
    /// `LatticeError::MalformedLoop` unless the corners differ in time and in exactly
    /// one spatial coordinate. Nothing is smeared in that case.
    pub fn compute_wilson_loop(
        &mut self,
        corner1: &Site,
        corner2: &Site,
        n_smears: usize,
    ) -> Result<f64> {
        check_loop_corners(corner1, corner2)?;
        let shape = self.field.shape();
        let slices = [shape.wrap(corner1)[TIME], shape.wrap(corner2)[TIME]];
        let smeared = SmearedSlices::new(&mut self.field, &slices, n_smears, self.config.rho);
        wilson_loop(&*smeared, corner1, corner2)
    }

    /// `r × t` Wilson loop from `corner`, extending along spatial `dimension`
    ///
    /// # Errors
    ///
    /// `LatticeError::InvalidDirection` if `dimension` is not a direction, and
    /// `LatticeError::MalformedLoop` if it is the time direction or `r` or `t` is zero.
    pub fn compute_wilson_loop_rt(
        &mut self,
        corner: &Site,
        r: isize,
        t: isize,
        dimension: usize,
        n_smears: usize,
    ) -> Result<f64> {
        check_direction(dimension as isize)?;
        let opposite = opposite_corner(corner, r, t, dimension);
        self.compute_wilson_loop(corner, &opposite, n_smears)
    }

    /// Plaquette averaged over every site and the six planes
    pub fn compute_average_plaquette(&self) -> f64 {
        average_over_planes(&self.field, plaquette)
    }

    /// Rectangle averaged over every site and the six planes, long side along mu > nu
    pub fn compute_average_rectangle(&self) -> f64 {
        average_over_planes(&self.field, rectangle)
    }

    /// Twisted rectangle averaged over every site and the six planes
    pub fn compute_average_twisted_rectangle(&self) -> f64 {
        average_over_planes(&self.field, twisted_rectangle)
    }

    /// `r × t` Wilson loop averaged over every site and the three spatial directions
    ///
    /// Every time slice is smeared `n_smears` times for the measurement; the field is
    /// restored afterwards.
    ///
    /// # Errors
    ///
    /// `LatticeError::MalformedLoop` if `r` or `t` is zero.
    pub fn compute_average_wilson_loop(
        &mut self,
        r: isize,
        t: isize,
        n_smears: usize,
    ) -> Result<f64> {
        let origin: Site = [0; 4];
        check_loop_corners(&origin, &opposite_corner(&origin, r, t, 1))?;

        let shape = self.field.shape();
        let slices: Vec<usize> = (0..shape.extent(TIME)).collect();
        let smeared = SmearedSlices::new(&mut self.field, &slices, n_smears, self.config.rho);
        let field: &GaugeField = &smeared;

        let total = (0..shape.volume())
            .into_par_iter()
            .map(|index| {
                let corner = shape.site_coords(index);
                (1..4)
                    .map(|dimension| {
                        wilson_loop(field, &corner, &opposite_corner(&corner, r, t, dimension))
                    })
                    .sum::<Result<f64>>()
            })
            .sum::<Result<f64>>()?;
        Ok(total / (3 * shape.volume()) as f64)
    }

    /// Polyakov loop through the spatial site `(x, y, z)`
    pub fn compute_polyakov_loop(&self, spatial: &[isize; 3]) -> Complex<f64> {
        polyakov_loop(&self.field, spatial)
    }

    /// Polyakov loop averaged over the spatial volume
    pub fn compute_average_polyakov_loop(&self) -> Complex<f64> {
        let shape = self.field.shape();
        let field = &self.field;
        let total: Complex<f64> = (0..shape.spatial_volume())
            .into_par_iter()
            .map(|index| {
                // indices below the spatial volume lie on the t = 0 slice
                let [_, x, y, z] = shape.site_coords(index);
                polyakov_loop(field, &[x, y, z])
            })
            .sum();
        total / shape.spatial_volume() as f64
    }
}

fn check_plane(mu: usize, nu: usize) -> Result<()> {
    check_direction(mu as isize)?;
    check_direction(nu as isize)?;
    if mu == nu {
        warn!(mu, nu, "loop directions do not span a plane");
        return Err(LatticeError::InvalidDirection {
            direction: nu as isize,
        });
    }
    Ok(())
}

/// Mean of `observable` over all sites and the six (mu > nu) planes
fn average_over_planes<F>(field: &GaugeField, observable: F) -> f64
where
    F: Fn(&GaugeField, &Site, usize, usize) -> f64 + Sync,
{
    let shape = field.shape();
    let total: f64 = (0..shape.volume())
        .into_par_iter()
        .map(|index| {
            let site = shape.site_coords(index);
            PLANES
                .iter()
                .map(|&(mu, nu)| observable(field, &site, mu, nu))
                .sum::<f64>()
        })
        .sum();
    total / (PLANES.len() * shape.volume()) as f64
}
