//! Twisted-rectangle improved action
//!
//! `S = S_W − β/(12 u0⁸) Σ T`. A twisted rectangle visits some links twice, so the
//! action is not linear in a single link and there is no staple.

use super::wilson::plaquette_sum;
use super::{orthogonal, LocalAction};
use crate::lattice::{shifted, Links, Site};
use crate::observables::loops::twisted_rectangle;

/// Twisted-rectangle improved action
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwistedRectangleAction {
    beta: f64,
    u0: f64,
}

impl TwistedRectangleAction {
    /// Action with coupling `beta` and tadpole factor `u0`
    pub const fn new(beta: f64, u0: f64) -> Self {
        Self { beta, u0 }
    }
}

/// The seven twisted rectangles of the (mu, nu) plane attached to `U_mu(x)`
fn twisted_sum<L: Links + ?Sized>(links: &L, site: &Site, mu: usize, nu: usize) -> f64 {
    let below = shifted(site, nu, -1);
    twisted_rectangle(links, site, mu, nu)
        + twisted_rectangle(links, &shifted(site, mu, -1), mu, nu)
        + twisted_rectangle(links, &below, mu, nu)
        + twisted_rectangle(links, &shifted(&below, mu, -1), mu, nu)
        + twisted_rectangle(links, site, nu, mu)
        + twisted_rectangle(links, &below, nu, mu)
        + twisted_rectangle(links, &shifted(site, nu, -2), nu, mu)
}

impl LocalAction for TwistedRectangleAction {
    fn local_action<L: Links + ?Sized>(&self, links: &L, site: &Site, direction: usize) -> f64 {
        let wilson = -self.beta / self.u0.powi(4) * plaquette_sum(links, site, direction);
        let twisted: f64 = orthogonal(direction)
            .map(|nu| twisted_sum(links, site, direction, nu))
            .sum();
        wilson - self.beta / (12.0 * self.u0.powi(8)) * twisted
    }
}
