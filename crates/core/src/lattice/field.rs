//! Gauge field storage
//!
//! Links live in one flat `Vec` indexed by `site_index * 4 + direction`, with the
//! site index laid out t-slowest. `Shape` is the single place where coordinates are
//! wrapped onto the periodic torus.

use crate::algebra::su3::random_su3;
use crate::algebra::{wrap, ColourMatrix};
use crate::error::{LatticeError, Result};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Number of space-time dimensions
pub const N_DIMS: usize = 4;

/// Direction index of the time axis
pub const TIME: usize = 0;

/// Lattice site as (t, x, y, z); coordinates may lie outside the extents
pub type Site = [isize; N_DIMS];

/// Step `amount` sites along `direction`
#[inline]
pub fn shifted(site: &Site, direction: usize, amount: isize) -> Site {
    let mut out = *site;
    out[direction] += amount;
    out
}

/// Extents of a periodic 4D lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    extents: [usize; N_DIMS],
}

impl Shape {
    /// Lattice with `temporal` time slices of `spatial`³ sites
    pub const fn new(temporal: usize, spatial: usize) -> Self {
        Self {
            extents: [temporal, spatial, spatial, spatial],
        }
    }

    /// Lattice with explicit extents in (t, x, y, z) order
    pub const fn from_extents(extents: [usize; N_DIMS]) -> Self {
        Self { extents }
    }

    /// Extents in (t, x, y, z) order
    pub const fn extents(&self) -> [usize; N_DIMS] {
        self.extents
    }

    /// Extent along one direction
    pub const fn extent(&self, direction: usize) -> usize {
        self.extents[direction]
    }

    /// Number of sites
    pub fn volume(&self) -> usize {
        self.extents.iter().product()
    }

    /// Number of sites in one time slice
    pub fn spatial_volume(&self) -> usize {
        self.extents[1..].iter().product()
    }

    /// Number of links (4 per site)
    pub fn n_links(&self) -> usize {
        self.volume() * N_DIMS
    }

    /// Wrap a site onto the torus
    #[inline]
    pub fn wrap(&self, site: &Site) -> [usize; N_DIMS] {
        std::array::from_fn(|d| wrap(site[d], self.extents[d]))
    }

    /// Linear site index, t slowest and z fastest
    #[inline]
    pub fn site_index(&self, site: &Site) -> usize {
        let w = self.wrap(site);
        ((w[0] * self.extents[1] + w[1]) * self.extents[2] + w[2]) * self.extents[3] + w[3]
    }

    /// Inverse of [`Shape::site_index`]
    pub fn site_coords(&self, mut index: usize) -> Site {
        let mut site = [0; N_DIMS];
        for d in (0..N_DIMS).rev() {
            site[d] = (index % self.extents[d]) as isize;
            index /= self.extents[d];
        }
        site
    }

    /// Linear link index
    ///
    /// `direction` must lie in `[0, 4)`.
    #[inline]
    pub fn link_index(&self, site: &Site, direction: usize) -> usize {
        debug_assert!(direction < N_DIMS, "direction {direction} out of range");
        self.site_index(site) * N_DIMS + direction
    }

    /// All sites in linear index order
    pub fn sites(&self) -> impl Iterator<Item = Site> {
        let shape = *self;
        (0..shape.volume()).map(move |index| shape.site_coords(index))
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [t, x, y, z] = self.extents;
        write!(f, "{t}x{x}x{y}x{z}")
    }
}

/// Read access to link variables
///
/// Implemented by the full field and by the block views of the domain-decomposed
/// sweep, so loops and actions are written once for both.
pub trait Links {
    /// Lattice geometry
    fn shape(&self) -> Shape;

    /// Link `U_direction(site)` with periodic wraparound
    fn link(&self, site: &Site, direction: usize) -> ColourMatrix;
}

/// Write access to link variables
pub trait LinksMut: Links {
    /// Overwrite `U_direction(site)`
    fn set_link(&mut self, site: &Site, direction: usize, value: ColourMatrix);
}

/// Complete set of links on a periodic lattice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeField {
    shape: Shape,
    links: Vec<ColourMatrix>,
}

impl GaugeField {
    /// Field with every link equal to `value`
    pub fn filled(shape: Shape, value: ColourMatrix) -> Self {
        Self {
            shape,
            links: vec![value; shape.n_links()],
        }
    }

    /// Unit field (cold start)
    pub fn identity(shape: Shape) -> Self {
        Self::filled(shape, ColourMatrix::identity())
    }

    /// Field with every link drawn independently from [`random_su3`] (hot start)
    pub fn random<R: Rng + ?Sized>(shape: Shape, rng: &mut R, epsilon: f64) -> Self {
        let links = (0..shape.n_links())
            .map(|_| random_su3(rng, epsilon))
            .collect();
        Self { shape, links }
    }

    /// Wrap existing link data
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::LayoutMismatch`] if `links` does not hold exactly
    /// four matrices per site of `shape`.
    pub fn from_links(shape: Shape, links: Vec<ColourMatrix>) -> Result<Self> {
        if links.len() != shape.n_links() {
            return Err(LatticeError::LayoutMismatch {
                expected: format!("{} links", shape.n_links()),
                found: format!("{} links", links.len()),
            });
        }
        Ok(Self { shape, links })
    }

    /// Lattice geometry
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// All links in link-index order
    pub fn as_slice(&self) -> &[ColourMatrix] {
        &self.links
    }

    /// Mutable view of all links
    pub fn as_mut_slice(&mut self) -> &mut [ColourMatrix] {
        &mut self.links
    }

    /// Links of one time slice, `spatial_volume * 4` entries
    pub fn time_slice(&self, time: usize) -> &[ColourMatrix] {
        let len = self.shape.spatial_volume() * N_DIMS;
        &self.links[time * len..(time + 1) * len]
    }

    /// Mutable links of one time slice
    pub fn time_slice_mut(&mut self, time: usize) -> &mut [ColourMatrix] {
        let len = self.shape.spatial_volume() * N_DIMS;
        &mut self.links[time * len..(time + 1) * len]
    }

    /// Apply `f` to every link in place
    pub fn map_in_place(&mut self, f: impl Fn(&ColourMatrix) -> ColourMatrix + Sync + Send) {
        self.links.par_iter_mut().for_each(|link| *link = f(link));
    }
}

impl Links for GaugeField {
    fn shape(&self) -> Shape {
        self.shape
    }

    #[inline]
    fn link(&self, site: &Site, direction: usize) -> ColourMatrix {
        self.links[self.shape.link_index(site, direction)]
    }
}

impl LinksMut for GaugeField {
    #[inline]
    fn set_link(&mut self, site: &Site, direction: usize, value: ColourMatrix) {
        let index = self.shape.link_index(site, direction);
        self.links[index] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::real;

    #[test]
    fn test_site_index_roundtrip() {
        let shape = Shape::from_extents([3, 4, 5, 2]);
        for index in 0..shape.volume() {
            assert_eq!(shape.site_index(&shape.site_coords(index)), index);
        }
    }

    #[test]
    fn test_time_is_slowest() {
        let shape = Shape::new(4, 3);
        assert_eq!(shape.site_index(&[1, 0, 0, 0]), shape.spatial_volume());
        assert_eq!(shape.site_index(&[0, 0, 0, 1]), 1);
    }

    #[test]
    fn test_periodic_addressing() {
        let shape = Shape::new(4, 4);
        let mut field = GaugeField::identity(shape);
        let value = ColourMatrix::identity() * real(0.5);
        field.set_link(&[0, 0, 0, 0], 2, value);

        assert_eq!(field.link(&[4, -4, 8, 4], 2), value);
        assert_eq!(field.link(&[-4, 0, 0, 0], 2), value);
        assert_eq!(field.link(&[0, 0, 0, 0], 1), ColourMatrix::identity());
    }

    #[test]
    fn test_from_links_checks_length() {
        let shape = Shape::new(2, 2);
        let result = GaugeField::from_links(shape, vec![ColourMatrix::identity(); 3]);
        assert!(matches!(result, Err(LatticeError::LayoutMismatch { .. })));
    }

    #[test]
    fn test_time_slice_is_contiguous() {
        let shape = Shape::new(3, 2);
        let mut field = GaugeField::identity(shape);
        let value = ColourMatrix::identity() * real(2.0);
        field.time_slice_mut(1).fill(value);

        assert_eq!(field.link(&[1, 1, 0, 1], 3), value);
        assert_eq!(field.link(&[0, 1, 1, 1], 3), ColourMatrix::identity());
        assert_eq!(field.link(&[2, 0, 0, 0], 0), ColourMatrix::identity());
    }
}
