//! Euclidean gamma matrices in the Dirac basis
//!
//! Lattice direction 0 is time and carries γ4; spatial directions 1..3 carry γ1..γ3.
//! All five matrices are Hermitian, square to one, and γ5 = γ1γ2γ3γ4 = diag(1, 1, −1, −1).

use super::{real, SpinMatrix, I};
use nalgebra::Complex;

const ZERO: Complex<f64> = Complex::new(0.0, 0.0);
const ONE: Complex<f64> = Complex::new(1.0, 0.0);

/// γ1
pub fn gamma1() -> SpinMatrix {
    SpinMatrix::new(
        ZERO, ZERO, ZERO, -I, //
        ZERO, ZERO, -I, ZERO, //
        ZERO, I, ZERO, ZERO, //
        I, ZERO, ZERO, ZERO,
    )
}

/// γ2
pub fn gamma2() -> SpinMatrix {
    SpinMatrix::new(
        ZERO, ZERO, ZERO, -ONE, //
        ZERO, ZERO, ONE, ZERO, //
        ZERO, ONE, ZERO, ZERO, //
        -ONE, ZERO, ZERO, ZERO,
    )
}

/// γ3
pub fn gamma3() -> SpinMatrix {
    SpinMatrix::new(
        ZERO, ZERO, -I, ZERO, //
        ZERO, ZERO, ZERO, I, //
        I, ZERO, ZERO, ZERO, //
        ZERO, -I, ZERO, ZERO,
    )
}

/// γ4 (time)
pub fn gamma4() -> SpinMatrix {
    SpinMatrix::new(
        ZERO, ZERO, ONE, ZERO, //
        ZERO, ZERO, ZERO, ONE, //
        ONE, ZERO, ZERO, ZERO, //
        ZERO, ONE, ZERO, ZERO,
    )
}

/// γ5
pub fn gamma5() -> SpinMatrix {
    SpinMatrix::from_diagonal(&nalgebra::Vector4::new(
        real(1.0),
        real(1.0),
        real(-1.0),
        real(-1.0),
    ))
}

/// Gamma matrix attached to each lattice direction, indexed by direction
pub fn direction_gammas() -> [SpinMatrix; 4] {
    [gamma4(), gamma1(), gamma2(), gamma3()]
}
