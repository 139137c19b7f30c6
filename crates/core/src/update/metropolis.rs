//! Metropolis link update
//!
//! Proposals are left multiplications by a matrix drawn from a fixed pool that holds
//! every drawn matrix together with its inverse, so a move and its reversal are
//! equally likely.

use crate::action::LocalAction;
use crate::algebra::su3::random_su3;
use crate::algebra::ColourMatrix;
use crate::lattice::{LinksMut, Site};
use rand::Rng;

/// Symmetric set of SU(3) proposal matrices
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalPool {
    matrices: Vec<ColourMatrix>,
}

impl ProposalPool {
    /// Draw `n_draws` random matrices of spread `epsilon`, storing each with its adjoint
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, n_draws: usize, epsilon: f64) -> Self {
        let mut matrices = Vec::with_capacity(2 * n_draws);
        for _ in 0..n_draws {
            let m = random_su3(rng, epsilon);
            matrices.push(m);
            matrices.push(m.adjoint());
        }
        Self { matrices }
    }

    /// Number of stored matrices (twice the number of draws)
    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    /// Whether the pool holds no matrices
    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    /// All stored matrices
    pub fn as_slice(&self) -> &[ColourMatrix] {
        &self.matrices
    }

    /// Uniformly chosen proposal
    ///
    /// The pool must not be empty.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> &ColourMatrix {
        &self.matrices[rng.random_range(0..self.matrices.len())]
    }
}

/// One Metropolis step on `U_direction(site)`; returns whether the move was accepted
///
/// Snapshots the link, applies the proposal in place, and restores the snapshot on
/// rejection.
pub(crate) fn metropolis_step<L, A, R>(
    links: &mut L,
    action: &A,
    proposals: &ProposalPool,
    site: &Site,
    direction: usize,
    rng: &mut R,
) -> bool
where
    L: LinksMut + ?Sized,
    A: LocalAction,
    R: Rng + ?Sized,
{
    let old_link = links.link(site, direction);
    let old_action = action.local_action(&*links, site, direction);

    links.set_link(site, direction, proposals.draw(rng) * old_link);
    let delta = action.local_action(&*links, site, direction) - old_action;

    if delta <= 0.0 || rng.random::<f64>() < (-delta).exp() {
        true
    } else {
        links.set_link(site, direction, old_link);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::GaugeAction;
    use crate::algebra::su3::is_special_unitary;
    use crate::config::ActionKind;
    use crate::lattice::{GaugeField, Links, Shape};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_pool_is_closed_under_inversion() {
        let mut rng = StdRng::seed_from_u64(8);
        let pool = ProposalPool::generate(&mut rng, 20, 0.24);
        assert_eq!(pool.len(), 40);
        for pair in pool.as_slice().chunks(2) {
            assert!((pair[0] * pair[1] - ColourMatrix::identity()).norm() < 1e-12);
            assert!(is_special_unitary(&pair[0], 1e-12));
        }
    }

    #[test]
    fn test_rejected_move_restores_link_exactly() {
        let mut rng = StdRng::seed_from_u64(2);
        let shape = Shape::new(2, 2);
        let mut field = GaugeField::identity(shape);
        // Proposals far from the identity at huge beta are always rejected
        let pool = ProposalPool::generate(&mut rng, 5, 2.0);
        let action = GaugeAction::new(ActionKind::Wilson, 1.0e6, 1.0);

        let before = field.clone();
        let mut accepted = 0;
        for _ in 0..20 {
            if metropolis_step(&mut field, &action, &pool, &[0, 0, 0, 0], 1, &mut rng) {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 0);
        assert_eq!(field, before);
    }

    #[test]
    fn test_zero_beta_accepts_everything() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut field = GaugeField::identity(Shape::new(2, 2));
        let pool = ProposalPool::generate(&mut rng, 10, 0.5);
        let action = GaugeAction::new(ActionKind::Wilson, 0.0, 1.0);
        for _ in 0..10 {
            assert!(metropolis_step(&mut field, &action, &pool, &[1, 0, 1, 0], 2, &mut rng));
        }
        assert!(is_special_unitary(&field.link(&[1, 0, 1, 0], 2), 1e-10));
    }
}
