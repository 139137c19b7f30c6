//! Tree-level rectangle-improved action
//!
//! `S = 5/3 S_W + β/(12 u0⁶) Σ R`, where `R` runs over the 2×1 rectangles.

use super::wilson::{plaquette_staple_sum, plaquette_sum};
use super::{orthogonal, LocalAction};
use crate::algebra::{real, ColourMatrix};
use crate::lattice::{shifted, Links, Site};
use crate::observables::loops::rectangle;
use crate::observables::path::{walk, Hop};

/// Rectangle-improved action
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleAction {
    beta: f64,
    u0: f64,
}

impl RectangleAction {
    /// Action with coupling `beta` and tadpole factor `u0`
    pub const fn new(beta: f64, u0: f64) -> Self {
        Self { beta, u0 }
    }

    fn plaquette_coefficient(&self) -> f64 {
        5.0 * self.beta / (3.0 * self.u0.powi(4))
    }

    fn rectangle_coefficient(&self) -> f64 {
        self.beta / (12.0 * self.u0.powi(6))
    }
}

/// Sum of the six rectangles in the (mu, nu) plane that contain `U_mu(x)`
fn rectangle_sum<L: Links + ?Sized>(links: &L, site: &Site, mu: usize, nu: usize) -> f64 {
    let below = shifted(site, nu, -1);
    rectangle(links, site, mu, nu)
        + rectangle(links, &shifted(site, mu, -1), mu, nu)
        + rectangle(links, &below, mu, nu)
        + rectangle(links, &shifted(&below, mu, -1), mu, nu)
        + rectangle(links, site, nu, mu)
        + rectangle(links, &shifted(site, nu, -2), nu, mu)
}

/// Rectangle staples around `U_mu(x)`, all starting at `x + mu`
fn rectangle_staple_sum<L: Links + ?Sized>(links: &L, site: &Site, mu: usize) -> ColourMatrix {
    let start = shifted(site, mu, 1);
    let mut sum = ColourMatrix::zeros();
    for nu in orthogonal(mu) {
        for up in [true, false] {
            let side = Hop::along(nu, up);
            let back = side.reversed();
            // link first in a 2mu x nu rectangle
            sum += walk(
                links,
                &start,
                &[Hop::up(mu), side, Hop::down(mu), Hop::down(mu), back],
            );
            // link second in a 2mu x nu rectangle
            sum += walk(
                links,
                &start,
                &[side, Hop::down(mu), Hop::down(mu), back, Hop::up(mu)],
            );
            // link on the short side of a mu x 2nu rectangle
            sum += walk(links, &start, &[side, side, Hop::down(mu), back, back]);
        }
    }
    sum
}

impl LocalAction for RectangleAction {
    fn local_action<L: Links + ?Sized>(&self, links: &L, site: &Site, direction: usize) -> f64 {
        let rectangles: f64 = orthogonal(direction)
            .map(|nu| rectangle_sum(links, site, direction, nu))
            .sum();
        -self.plaquette_coefficient() * plaquette_sum(links, site, direction)
            + self.rectangle_coefficient() * rectangles
    }

    fn staples<L: Links + ?Sized>(
        &self,
        links: &L,
        site: &Site,
        direction: usize,
    ) -> Option<ColourMatrix> {
        let plaquettes = plaquette_staple_sum(links, site, direction);
        let rectangles = rectangle_staple_sum(links, site, direction);
        Some(
            plaquettes * real(self.plaquette_coefficient())
                - rectangles * real(self.rectangle_coefficient()),
        )
    }
}
