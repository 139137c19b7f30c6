//! Stout smearing of spatial links
//!
//! One iteration replaces every spatial link on a time slice by `exp(iQ) U`, where
//! `Q` is the Hermitian traceless part of `ρ C U†` and `C` is the sum of the spatial
//! staples around the link. Time-like links are never touched.
//!
//! Each iteration reads the field as it stood at the start of the iteration and then
//! overwrites whole slices, so the result does not depend on the order in which links
//! are visited.

use crate::algebra::su3::hermitian_traceless;
use crate::algebra::{real, ColourMatrix, I};
use crate::lattice::{GaugeField, Lattice, Links, Site, N_DIMS, TIME};
use crate::observables::path::{walk, Hop};
use rayon::prelude::*;
use std::ops::Deref;
use tracing::debug;

/// Smear the spatial links of `slices` in place, `n_iterations` times
///
/// Slice indices must already be wrapped into `[0, T)`. Slices are processed in
/// parallel; all of them read from the same frozen field within an iteration.
pub fn smear_time_slices(field: &mut GaugeField, slices: &[usize], n_iterations: usize, rho: f64) {
    for _ in 0..n_iterations {
        let smeared: Vec<(usize, Vec<ColourMatrix>)> = {
            let frozen = &*field;
            slices
                .par_iter()
                .map(|&time| (time, smeared_slice(frozen, time, rho)))
                .collect()
        };
        for (time, links) in smeared {
            field.time_slice_mut(time).copy_from_slice(&links);
        }
    }
}

/// New links of one time slice, in the slice's storage order
fn smeared_slice(field: &GaugeField, time: usize, rho: f64) -> Vec<ColourMatrix> {
    let shape = field.shape();
    let offset = time * shape.spatial_volume();
    (0..shape.spatial_volume())
        .flat_map(|index| {
            let site = shape.site_coords(offset + index);
            (0..N_DIMS).map(move |mu| {
                if mu == TIME {
                    field.link(&site, mu)
                } else {
                    stout_link(field, &site, mu, rho)
                }
            })
        })
        .collect()
}

/// `exp(iQ) U_mu(site)` for a spatial direction `mu`
fn stout_link<L: Links + ?Sized>(links: &L, site: &Site, mu: usize, rho: f64) -> ColourMatrix {
    let link = links.link(site, mu);
    let staples = (1..N_DIMS)
        .filter(|&nu| nu != mu)
        .fold(ColourMatrix::zeros(), |sum, nu| {
            sum + walk(links, site, &[Hop::up(nu), Hop::up(mu), Hop::down(nu)])
                + walk(links, site, &[Hop::down(nu), Hop::up(mu), Hop::up(nu)])
        });
    let omega = staples * real(rho) * link.adjoint();
    let q = hermitian_traceless(&omega);
    (q * I).exp() * link
}

/// Field with some time slices smeared, restored when dropped
///
/// Restoration also happens on early return or unwinding, so a measurement can never
/// leave smeared links behind.
pub(crate) struct SmearedSlices<'a> {
    field: &'a mut GaugeField,
    saved: Vec<(usize, Vec<ColourMatrix>)>,
}

impl<'a> SmearedSlices<'a> {
    pub(crate) fn new(
        field: &'a mut GaugeField,
        slices: &[usize],
        n_iterations: usize,
        rho: f64,
    ) -> Self {
        let mut slices = slices.to_vec();
        slices.sort_unstable();
        slices.dedup();

        let saved = if n_iterations == 0 {
            Vec::new()
        } else {
            let saved = slices
                .iter()
                .map(|&time| (time, field.time_slice(time).to_vec()))
                .collect();
            smear_time_slices(field, &slices, n_iterations, rho);
            saved
        };
        Self { field, saved }
    }
}

impl Deref for SmearedSlices<'_> {
    type Target = GaugeField;

    fn deref(&self) -> &GaugeField {
        self.field
    }
}

impl Drop for SmearedSlices<'_> {
    fn drop(&mut self) {
        for (time, links) in self.saved.drain(..) {
            self.field.time_slice_mut(time).copy_from_slice(&links);
        }
    }
}

impl Lattice {
    /// Smear the spatial links of one time slice in place
    ///
    /// `time` wraps periodically; the weight is the configured `rho`.
    pub fn smear(&mut self, time: isize, n_iterations: usize) {
        let slice = self.field.shape().wrap(&[time, 0, 0, 0])[TIME];
        debug!(slice, n_iterations, rho = self.config.rho, "Smearing time slice");
        smear_time_slices(&mut self.field, &[slice], n_iterations, self.config.rho);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::su3::is_special_unitary;
    use crate::config::LatticeConfig;
    use crate::lattice::Shape;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn random_field() -> GaugeField {
        let mut rng = StdRng::seed_from_u64(40);
        GaugeField::random(Shape::new(4, 4), &mut rng, 1.0)
    }

    #[test]
    fn test_identity_field_is_fixed_point() {
        let mut field = GaugeField::identity(Shape::new(4, 4));
        smear_time_slices(&mut field, &[0, 1, 2, 3], 3, 0.3);
        assert!(field
            .as_slice()
            .iter()
            .all(|u| (u - ColourMatrix::identity()).norm() < 1e-12));
    }

    #[test]
    fn test_only_spatial_links_of_the_slice_change() {
        let original = random_field();
        let mut field = original.clone();
        smear_time_slices(&mut field, &[2], 1, 0.3);

        let shape = field.shape();
        for site in shape.sites() {
            for mu in 0..N_DIMS {
                let changed = (field.link(&site, mu) - original.link(&site, mu)).norm() > 1e-12;
                assert_eq!(changed, site[TIME] == 2 && mu != TIME, "{site:?} {mu}");
            }
        }
    }

    #[test]
    fn test_smeared_links_stay_in_group() {
        let mut field = random_field();
        smear_time_slices(&mut field, &[0, 3], 4, 0.3);
        assert!(field
            .as_slice()
            .iter()
            .all(|u| is_special_unitary(u, 1e-10)));
    }

    #[test]
    fn test_zero_weight_is_identity_map() {
        let original = random_field();
        let mut field = original.clone();
        smear_time_slices(&mut field, &[1], 2, 0.0);
        for (a, b) in field.as_slice().iter().zip(original.as_slice()) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let original = random_field();
        let mut field = original.clone();
        {
            let smeared = SmearedSlices::new(&mut field, &[1, 1, 3], 2, 0.3);
            assert_ne!(*smeared, original);
        }
        assert_eq!(field, original);
    }

    #[test]
    fn test_lattice_smear_wraps_time() {
        let config = LatticeConfig::default().with_edge_length(4).with_seed(6);
        let mut lattice = Lattice::new(config).unwrap();
        let before = lattice.field().clone();
        lattice.smear(-1, 1);
        assert_eq!(lattice.field().time_slice(0), before.time_slice(0));
        assert_ne!(lattice.field().time_slice(3), before.time_slice(3));
    }
}
