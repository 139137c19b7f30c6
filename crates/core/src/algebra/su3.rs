//! SU(3) group operations
//!
//! Random group elements near the identity, projection back onto the group after
//! numerical drift, and the SU(2) subgroup embedding used by the heatbath.

use super::{real, ColourMatrix, I};
use nalgebra::Complex;
use rand::Rng;
use std::f64::consts::PI;

/// Index pairs of the three SU(2) subgroups (Cabibbo-Marinari)
pub const SU2_SUBGROUPS: [(usize, usize); 3] = [(0, 1), (0, 2), (1, 2)];

/// Unit quaternion (a0, a1, a2, a3) parametrizing an SU(2) element
pub type Quaternion = [f64; 4];

/// Draw a random SU(3) matrix whose distance from the identity scales with `epsilon`
///
/// Builds a complex matrix with entries inside the unit disc, scales it by `epsilon`,
/// makes it traceless, takes the anti-Hermitian part and exponentiates.
///
/// # Arguments
///
/// * `rng` - Random source
/// * `epsilon` - Spread; 0 gives the identity
pub fn random_su3<R: Rng + ?Sized>(rng: &mut R, epsilon: f64) -> ColourMatrix {
    let mut a = ColourMatrix::from_fn(|_, _| {
        let radius: f64 = rng.random();
        let phase: f64 = rng.random();
        Complex::from_polar(radius, 2.0 * PI * phase)
    });
    a *= real(epsilon);
    a[(2, 2)] = -(a[(0, 0)] + a[(1, 1)]);
    let b = (a - a.adjoint()) * real(0.5);
    b.exp()
}

/// Project a near-unitary matrix back onto SU(3)
///
/// Normalizes row 0, orthogonalizes and normalizes row 1, then sets row 2 to the
/// conjugate cross product of the first two, which fixes det = 1.
pub fn reunitarize(u: &ColourMatrix) -> ColourMatrix {
    let mut out = *u;

    let n0 = row_norm(&out, 0);
    if n0 > f64::EPSILON {
        for j in 0..3 {
            out[(0, j)] /= n0;
        }
    }

    let dot01: Complex<f64> = (0..3).map(|j| out[(0, j)].conj() * out[(1, j)]).sum();
    for j in 0..3 {
        let projected = out[(0, j)] * dot01;
        out[(1, j)] -= projected;
    }
    let n1 = row_norm(&out, 1);
    if n1 > f64::EPSILON {
        for j in 0..3 {
            out[(1, j)] /= n1;
        }
    }

    out[(2, 0)] = (out[(0, 1)] * out[(1, 2)] - out[(0, 2)] * out[(1, 1)]).conj();
    out[(2, 1)] = (out[(0, 2)] * out[(1, 0)] - out[(0, 0)] * out[(1, 2)]).conj();
    out[(2, 2)] = (out[(0, 0)] * out[(1, 1)] - out[(0, 1)] * out[(1, 0)]).conj();
    out
}

fn row_norm(m: &ColourMatrix, row: usize) -> f64 {
    (0..3).map(|j| m[(row, j)].norm_sqr()).sum::<f64>().sqrt()
}

/// Check `U U† = 1` and `det U = 1` to within `tolerance`
pub fn is_special_unitary(u: &ColourMatrix, tolerance: f64) -> bool {
    let unitarity = (u * u.adjoint() - ColourMatrix::identity()).norm();
    let det = u.determinant();
    unitarity < tolerance && (det - real(1.0)).norm() < tolerance
}

/// Project the `(i, j)` 2×2 block of `m` onto the SU(2) direction
///
/// Returns the (unnormalized) quaternion `a` such that the block equals
/// `embed_su2(a)` plus a part orthogonal to SU(2) under `Re Tr`.
pub fn su2_projection(m: &ColourMatrix, (i, j): (usize, usize)) -> Quaternion {
    let (mii, mij, mji, mjj) = (m[(i, i)], m[(i, j)], m[(j, i)], m[(j, j)]);
    [
        0.5 * (mii.re + mjj.re),
        0.5 * (mij.im + mji.im),
        0.5 * (mij.re - mji.re),
        0.5 * (mii.im - mjj.im),
    ]
}

/// Embed an SU(2) quaternion into SU(3) on the `(i, j)` subgroup
pub fn embed_su2(a: Quaternion, (i, j): (usize, usize)) -> ColourMatrix {
    let mut out = ColourMatrix::identity();
    out[(i, i)] = Complex::new(a[0], a[3]);
    out[(i, j)] = Complex::new(a[2], a[1]);
    out[(j, i)] = Complex::new(-a[2], a[1]);
    out[(j, j)] = Complex::new(a[0], -a[3]);
    out
}

/// Hermitian conjugate of a unit quaternion (the group inverse)
pub const fn quaternion_conj(a: Quaternion) -> Quaternion {
    [a[0], -a[1], -a[2], -a[3]]
}

/// Traceless anti-Hermitian projection scaled by `i`, giving a Hermitian generator
///
/// For `Ω` returns `Q = (i/2)(Ω† − Ω) − (i/6) Tr(Ω† − Ω)·1`.
pub fn hermitian_traceless(omega: &ColourMatrix) -> ColourMatrix {
    let diff = omega.adjoint() - omega;
    let trace = diff.trace();
    diff * (I * 0.5) - ColourMatrix::identity() * (I * trace / 6.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_su3_is_special_unitary() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let u = random_su3(&mut rng, 0.24);
            assert!(is_special_unitary(&u, 1e-12));
        }
    }

    #[test]
    fn test_zero_spread_is_identity() {
        let mut rng = StdRng::seed_from_u64(1);
        let u = random_su3(&mut rng, 0.0);
        assert!((u - ColourMatrix::identity()).norm() < 1e-14);
    }

    #[test]
    fn test_reunitarize_fixes_drift() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut u = random_su3(&mut rng, 1.0);
        u[(0, 0)] += Complex::new(0.1, 0.0);
        u[(1, 2)] -= Complex::new(0.0, 0.05);
        assert!(!is_special_unitary(&u, 1e-6));

        let fixed = reunitarize(&u);
        assert!(is_special_unitary(&fixed, 1e-12));
    }

    #[test]
    fn test_reunitarize_keeps_group_elements() {
        let mut rng = StdRng::seed_from_u64(5);
        let u = random_su3(&mut rng, 0.8);
        assert!((reunitarize(&u) - u).norm() < 1e-12);
    }

    #[test]
    fn test_su2_embedding_is_special_unitary() {
        let norm = (0.3f64 * 0.3 + 0.4 * 0.4 + 0.5 * 0.5 + 0.1 * 0.1).sqrt();
        let a = [0.3 / norm, 0.4 / norm, 0.5 / norm, 0.1 / norm];
        for subgroup in SU2_SUBGROUPS {
            let r = embed_su2(a, subgroup);
            assert!(is_special_unitary(&r, 1e-12));
            let inverse = embed_su2(quaternion_conj(a), subgroup);
            assert!((r * inverse - ColourMatrix::identity()).norm() < 1e-12);
        }
    }

    #[test]
    fn test_projection_recovers_embedded_quaternion() {
        let norm = (0.6f64 * 0.6 + 0.2 * 0.2 + 0.7 * 0.7 + 0.3 * 0.3).sqrt();
        let a = [0.6 / norm, -0.2 / norm, 0.7 / norm, 0.3 / norm];
        for subgroup in SU2_SUBGROUPS {
            let projected = su2_projection(&embed_su2(a, subgroup), subgroup);
            for k in 0..4 {
                assert!((projected[k] - a[k]).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn test_hermitian_traceless_generator() {
        let mut rng = StdRng::seed_from_u64(3);
        let omega = random_su3(&mut rng, 0.7) * real(1.3);
        let q = hermitian_traceless(&omega);
        assert!((q - q.adjoint()).norm() < 1e-13);
        assert!(q.trace().norm() < 1e-13);
        assert!(is_special_unitary(&(q * I).exp(), 1e-12));
    }
}
