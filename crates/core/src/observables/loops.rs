//! Closed Wilson loops
//!
//! Every loop is returned as `Re Tr(product) / 3`.

use super::path::{compute_line, walk, Hop};
use crate::algebra::{colour_trace, ColourMatrix, N_COLOURS};
use crate::error::{LatticeError, Result};
use crate::lattice::{Links, Site, N_DIMS, TIME};
use nalgebra::Complex;
use tracing::warn;

/// The six planes (mu, nu) with mu > nu
pub const PLANES: [(usize, usize); 6] = [(1, 0), (2, 0), (3, 0), (2, 1), (3, 1), (3, 2)];

/// 1×1 loop `U_mu(x) U_nu(x+mu) U_mu(x+nu)† U_nu(x)†`
pub fn plaquette<L: Links + ?Sized>(links: &L, site: &Site, mu: usize, nu: usize) -> f64 {
    colour_trace(&walk(
        links,
        site,
        &[Hop::up(mu), Hop::up(nu), Hop::down(mu), Hop::down(nu)],
    ))
}

/// 2×1 loop, two links along mu and one along nu
pub fn rectangle<L: Links + ?Sized>(links: &L, site: &Site, mu: usize, nu: usize) -> f64 {
    colour_trace(&walk(
        links,
        site,
        &[
            Hop::up(mu),
            Hop::up(mu),
            Hop::up(nu),
            Hop::down(mu),
            Hop::down(mu),
            Hop::down(nu),
        ],
    ))
}

/// Eight-link twisted rectangle
///
/// Goes round the plaquette at `x + mu` inside the 2×1 circuit:
/// `U_mu(x) U_nu(x+mu) U_mu(x+mu+nu) U_nu(x+2mu)† U_mu(x+mu)† U_nu(x+mu) U_mu(x+nu)† U_nu(x)†`.
pub fn twisted_rectangle<L: Links + ?Sized>(links: &L, site: &Site, mu: usize, nu: usize) -> f64 {
    colour_trace(&walk(
        links,
        site,
        &[
            Hop::up(mu),
            Hop::up(nu),
            Hop::up(mu),
            Hop::down(nu),
            Hop::down(mu),
            Hop::up(nu),
            Hop::down(mu),
            Hop::down(nu),
        ],
    ))
}

/// Check that two corners span a time × space rectangle
///
/// # Errors
///
/// [`LatticeError::MalformedLoop`] unless the corners differ in time and in exactly
/// one spatial coordinate.
pub fn check_loop_corners(corner1: &Site, corner2: &Site) -> Result<usize> {
    let spatial: Vec<usize> = (1..N_DIMS)
        .filter(|&d| corner1[d] != corner2[d])
        .collect();
    match spatial.as_slice() {
        &[dimension] if corner1[TIME] != corner2[TIME] => Ok(dimension),
        _ => {
            warn!(
                ?corner1,
                ?corner2,
                "corner points do not form a rectangle with two spatial and two temporal sides"
            );
            Err(LatticeError::MalformedLoop {
                corner1: *corner1,
                corner2: *corner2,
            })
        }
    }
}

/// Rectangular loop with opposite corners `corner1` and `corner2`
///
/// Runs corner1 → (t2, x1) → corner2 → (t1, x2) → corner1.
///
/// # Errors
///
/// [`LatticeError::MalformedLoop`] for corners that do not span a time × space plane.
pub fn wilson_loop<L: Links + ?Sized>(links: &L, corner1: &Site, corner2: &Site) -> Result<f64> {
    check_loop_corners(corner1, corner2)?;

    let mut corner3 = *corner1;
    corner3[TIME] = corner2[TIME];
    let mut corner4 = *corner2;
    corner4[TIME] = corner1[TIME];

    let product: ColourMatrix = compute_line(links, corner1, &corner3)?
        * compute_line(links, &corner3, corner2)?
        * compute_line(links, corner2, &corner4)?
        * compute_line(links, &corner4, corner1)?;
    Ok(colour_trace(&product))
}

/// Opposite corner of an `r × t` loop extending along `dimension`
pub fn opposite_corner(corner: &Site, r: isize, t: isize, dimension: usize) -> Site {
    let mut out = *corner;
    out[dimension] += r;
    out[TIME] += t;
    out
}

/// Polyakov loop `Tr Π_t U_0(t, x) / 3` at spatial site `x`
pub fn polyakov_loop<L: Links + ?Sized>(links: &L, spatial: &[isize; 3]) -> Complex<f64> {
    let extent = links.shape().extent(TIME);
    let start = [0, spatial[0], spatial[1], spatial[2]];
    let hops = vec![Hop::up(TIME); extent];
    walk(links, &start, &hops).trace() / N_COLOURS as f64
}
