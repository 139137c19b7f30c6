//! Wilson plaquette action

use super::{orthogonal, LocalAction};
use crate::algebra::{real, ColourMatrix};
use crate::lattice::{shifted, Links, Site};
use crate::observables::loops::plaquette;
use crate::observables::path::{walk, Hop};

/// Wilson action, `−β/u0⁴ Σ P`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WilsonAction {
    beta: f64,
    u0: f64,
}

impl WilsonAction {
    /// Action with coupling `beta` and tadpole factor `u0`
    pub const fn new(beta: f64, u0: f64) -> Self {
        Self { beta, u0 }
    }

    /// Plaquette coefficient `β/u0⁴`
    pub fn coefficient(&self) -> f64 {
        self.beta / self.u0.powi(4)
    }
}

/// Sum of the six plaquette staples around `U_mu(x)`
///
/// Closes `U_mu(x) · staple` into the plaquettes at `x` and `x − nu` for every
/// orthogonal `nu`.
pub(crate) fn plaquette_staple_sum<L: Links + ?Sized>(
    links: &L,
    site: &Site,
    mu: usize,
) -> ColourMatrix {
    let start = shifted(site, mu, 1);
    let mut sum = ColourMatrix::zeros();
    for nu in orthogonal(mu) {
        for up in [true, false] {
            sum += walk(
                links,
                &start,
                &[Hop::along(nu, up), Hop::down(mu), Hop::along(nu, !up)],
            );
        }
    }
    sum
}

/// Sum of the plaquettes containing `U_mu(x)`
pub(crate) fn plaquette_sum<L: Links + ?Sized>(links: &L, site: &Site, mu: usize) -> f64 {
    orthogonal(mu)
        .map(|nu| plaquette(links, site, mu, nu) + plaquette(links, &shifted(site, nu, -1), mu, nu))
        .sum()
}

impl LocalAction for WilsonAction {
    fn local_action<L: Links + ?Sized>(&self, links: &L, site: &Site, direction: usize) -> f64 {
        -self.coefficient() * plaquette_sum(links, site, direction)
    }

    fn staples<L: Links + ?Sized>(
        &self,
        links: &L,
        site: &Site,
        direction: usize,
    ) -> Option<ColourMatrix> {
        Some(plaquette_staple_sum(links, site, direction) * real(self.coefficient()))
    }
}
