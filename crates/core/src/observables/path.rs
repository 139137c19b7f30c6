//! Path products over the link field
//!
//! A path is walked hop by hop. A forward hop multiplies by `U_mu(x)` and moves to
//! `x + mu`; a backward hop moves to `x - mu` first and multiplies by `U_mu(x - mu)†`.

use crate::algebra::ColourMatrix;
use crate::error::{LatticeError, Result};
use crate::lattice::{shifted, Links, Site, N_DIMS};
use tracing::warn;

/// One unit step along a lattice axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hop {
    /// Axis of the step
    pub direction: usize,
    /// `true` for +direction, `false` for -direction
    pub forward: bool,
}

impl Hop {
    /// Step along +direction
    pub const fn up(direction: usize) -> Self {
        Self {
            direction,
            forward: true,
        }
    }

    /// Step along -direction
    pub const fn down(direction: usize) -> Self {
        Self {
            direction,
            forward: false,
        }
    }

    /// Step along direction, forward or backward
    pub const fn along(direction: usize, forward: bool) -> Self {
        Self { direction, forward }
    }

    /// The same step walked the other way
    pub const fn reversed(self) -> Self {
        Self {
            direction: self.direction,
            forward: !self.forward,
        }
    }
}

/// Ordered link product along `hops` starting from `start`
///
/// Hop directions must lie in `[0, 4)`.
pub fn walk<L: Links + ?Sized>(links: &L, start: &Site, hops: &[Hop]) -> ColourMatrix {
    let mut site = *start;
    let mut product = ColourMatrix::identity();
    for hop in hops {
        if hop.forward {
            product *= links.link(&site, hop.direction);
            site[hop.direction] += 1;
        } else {
            site[hop.direction] -= 1;
            product *= links.link(&site, hop.direction).adjoint();
        }
    }
    product
}

/// A point on an explicit path together with the axis of the link leaving it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    /// Current site
    pub site: Site,
    /// Axis along which the next site lies
    pub direction: usize,
}

/// Product of links along an explicit sequence of sites
///
/// Each consecutive pair must differ by exactly ±1 along the direction recorded on
/// the first of the two, and nowhere else. The direction of the final step is unused.
///
/// # Errors
///
/// [`LatticeError::InvalidDirection`] for a direction outside `[0, 4)`,
/// [`LatticeError::NonConsecutivePath`] for a step that does not move to a neighbour.
pub fn compute_path<L: Links + ?Sized>(links: &L, path: &[PathStep]) -> Result<ColourMatrix> {
    let mut hops = Vec::with_capacity(path.len().saturating_sub(1));
    for (step, pair) in path.windows(2).enumerate() {
        let (current, next) = (&pair[0], &pair[1]);
        let direction = current.direction;
        if direction >= N_DIMS {
            warn!(direction, step, "path step has an invalid direction");
            return Err(LatticeError::InvalidDirection {
                direction: direction as isize,
            });
        }
        let difference = next.site[direction] - current.site[direction];
        let stays_on_axis = (0..N_DIMS)
            .filter(|&d| d != direction)
            .all(|d| next.site[d] == current.site[d]);
        if difference.abs() != 1 || !stays_on_axis {
            warn!(
                step,
                from = ?current.site,
                to = ?next.site,
                direction,
                "path contains non-consecutive link variables"
            );
            return Err(LatticeError::NonConsecutivePath { step });
        }
        hops.push(Hop::along(direction, difference == 1));
    }
    Ok(match path.first() {
        Some(first) => walk(links, &first.site, &hops),
        None => ColourMatrix::identity(),
    })
}

/// Product of links along the straight line from `start` to `finish`
///
/// # Errors
///
/// [`LatticeError::NotCollinear`] unless the endpoints differ in exactly one coordinate.
pub fn compute_line<L: Links + ?Sized>(
    links: &L,
    start: &Site,
    finish: &Site,
) -> Result<ColourMatrix> {
    let differing: Vec<usize> = (0..N_DIMS).filter(|&d| start[d] != finish[d]).collect();
    let &[direction] = differing.as_slice() else {
        warn!(?start, ?finish, "start and end points do not form a straight line");
        return Err(LatticeError::NotCollinear {
            start: *start,
            finish: *finish,
        });
    };
    let length = finish[direction] - start[direction];
    let hop = Hop::along(direction, length > 0);
    let hops = vec![hop; length.unsigned_abs()];
    Ok(walk(links, start, &hops))
}

/// Site reached after walking `hops` from `start`
pub fn endpoint(start: &Site, hops: &[Hop]) -> Site {
    hops.iter().fold(*start, |site, hop| {
        shifted(&site, hop.direction, if hop.forward { 1 } else { -1 })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::real;
    use crate::lattice::{GaugeField, LinksMut, Shape};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn random_field() -> GaugeField {
        let mut rng = StdRng::seed_from_u64(11);
        GaugeField::random(Shape::new(4, 4), &mut rng, 1.0)
    }

    #[test]
    fn test_backward_hop_uses_adjoint() {
        let field = random_field();
        let site = [1, 2, 3, 0];
        let back = walk(&field, &site, &[Hop::down(2)]);
        let expected = field.link(&[1, 2, 2, 0], 2).adjoint();
        assert!((back - expected).norm() < 1e-14);
    }

    #[test]
    fn test_closed_walk_retraced_is_identity() {
        let field = random_field();
        let hops = [Hop::up(0), Hop::up(3), Hop::down(1), Hop::up(3)];
        let reverse: Vec<Hop> = hops.iter().rev().copied().map(Hop::reversed).collect();
        let end = endpoint(&[0, 0, 0, 0], &hops);
        let product = walk(&field, &[0, 0, 0, 0], &hops) * walk(&field, &end, &reverse);
        assert!((product - ColourMatrix::identity()).norm() < 1e-12);
    }

    #[test]
    fn test_line_matches_path() {
        let field = random_field();
        let line = compute_line(&field, &[0, 1, 0, 0], &[0, 1, 0, 3]).unwrap();
        let path: Vec<PathStep> = (0..=3)
            .map(|z| PathStep {
                site: [0, 1, 0, z],
                direction: 3,
            })
            .collect();
        let explicit = compute_path(&field, &path).unwrap();
        assert!((line - explicit).norm() < 1e-14);
    }

    #[test]
    fn test_line_wraps_around() {
        let shape = Shape::new(4, 4);
        let mut field = GaugeField::identity(shape);
        let half = ColourMatrix::identity() * real(0.5);
        field.set_link(&[0, 0, 0, 3], 3, half);
        let line = compute_line(&field, &[0, 0, 0, 2], &[0, 0, 0, 5]).unwrap();
        assert!((line - half).norm() < 1e-15);
    }

    #[test]
    fn test_not_collinear() {
        let field = random_field();
        let err = compute_line(&field, &[0, 0, 0, 0], &[1, 1, 0, 0]).unwrap_err();
        assert!(matches!(err, LatticeError::NotCollinear { .. }));
        assert!(compute_line(&field, &[0, 0, 0, 0], &[0, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_non_consecutive_path() {
        let field = random_field();
        let path = [
            PathStep {
                site: [0, 0, 0, 0],
                direction: 1,
            },
            PathStep {
                site: [0, 1, 0, 0],
                direction: 1,
            },
            PathStep {
                site: [0, 3, 0, 0],
                direction: 1,
            },
        ];
        assert_eq!(
            compute_path(&field, &path),
            Err(LatticeError::NonConsecutivePath { step: 1 })
        );

        let sideways = [
            PathStep {
                site: [0, 0, 0, 0],
                direction: 1,
            },
            PathStep {
                site: [0, 1, 1, 0],
                direction: 1,
            },
        ];
        assert!(compute_path(&field, &sideways).is_err());
    }
}
