//! Cabibbo-Marinari pseudo-heatbath
//!
//! The link is updated by successive SU(2) rotations in the (0,1), (0,2) and (1,2)
//! subgroups. For `W = U A` with staple sum `A`, each rotation `R` is drawn from
//! `exp(Re Tr(R W) / 3)` restricted to the subgroup, using Creutz's sampler for the
//! quaternion scalar component.

use crate::action::LocalAction;
use crate::algebra::su3::{embed_su2, su2_projection, Quaternion, SU2_SUBGROUPS};
use crate::lattice::{LinksMut, Site};
use rand::Rng;
use std::f64::consts::PI;

/// Give up on a subgroup after this many rejected samples
const MAX_ATTEMPTS: usize = 1000;

/// Below this projection norm the subgroup weight is treated as flat
const FLAT_WEIGHT: f64 = 1e-12;

/// Heatbath update of `U_direction(site)`; returns whether any subgroup rotated
///
/// Leaves the link untouched when the action has no staple.
pub(crate) fn heatbath_step<L, A, R>(
    links: &mut L,
    action: &A,
    site: &Site,
    direction: usize,
    rng: &mut R,
) -> bool
where
    L: LinksMut + ?Sized,
    A: LocalAction,
    R: Rng + ?Sized,
{
    let Some(staple) = action.staples(&*links, site, direction) else {
        return false;
    };
    let mut link = links.link(site, direction);
    let mut rotated = false;

    for subgroup in SU2_SUBGROUPS {
        let a = su2_projection(&(link * staple), subgroup);
        let k = a.iter().map(|x| x * x).sum::<f64>().sqrt();
        let (v, alpha) = if k > FLAT_WEIGHT {
            (a.map(|x| x / k), 2.0 * k / 3.0)
        } else {
            ([1.0, 0.0, 0.0, 0.0], 0.0)
        };
        let Some(x) = sample_su2(rng, alpha) else {
            continue;
        };
        let r = embed_su2(x, subgroup) * embed_su2(v, subgroup).adjoint();
        link = r * link;
        rotated = true;
    }

    links.set_link(site, direction, link);
    rotated
}

/// Draw an SU(2) element with density `exp(alpha · x0)` under the Haar measure
///
/// Returns `None` if Creutz's accept/reject loop does not succeed within
/// [`MAX_ATTEMPTS`].
pub(crate) fn sample_su2<R: Rng + ?Sized>(rng: &mut R, alpha: f64) -> Option<Quaternion> {
    let x0 = (0..MAX_ATTEMPTS).find_map(|_| {
        let u: f64 = rng.random();
        let x0 = if alpha > FLAT_WEIGHT {
            let floor = (-2.0 * alpha).exp();
            1.0 + (floor + (1.0 - floor) * (1.0 - u)).ln() / alpha
        } else {
            2.0 * u - 1.0
        };
        let accept = (1.0 - x0 * x0).max(0.0).sqrt();
        (rng.random::<f64>() < accept).then_some(x0)
    })?;

    let radius = (1.0 - x0 * x0).max(0.0).sqrt();
    let cos_theta = 2.0 * rng.random::<f64>() - 1.0;
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = 2.0 * PI * rng.random::<f64>();
    Some([
        x0,
        radius * sin_theta * phi.cos(),
        radius * sin_theta * phi.sin(),
        radius * cos_theta,
    ])
}
