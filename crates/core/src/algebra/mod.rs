//! Group and spinor algebra
//!
//! Colour matrices are `nalgebra` 3×3 complex matrices, spin matrices 4×4. Everything
//! here is a pure function of its inputs; random draws take the caller's generator.

pub mod gamma;
pub mod su3;

use nalgebra::{Complex, Matrix3, Matrix4};

/// SU(3) link variable (3×3 complex)
pub type ColourMatrix = Matrix3<Complex<f64>>;

/// Dirac-space matrix (4×4 complex)
pub type SpinMatrix = Matrix4<Complex<f64>>;

/// Number of colours
pub const N_COLOURS: usize = 3;

/// Number of spin components
pub const N_SPINS: usize = 4;

/// Imaginary unit
pub const I: Complex<f64> = Complex::new(0.0, 1.0);

/// Real number as a complex scalar
#[inline]
pub const fn real(x: f64) -> Complex<f64> {
    Complex::new(x, 0.0)
}

/// Normalized real trace, `Re Tr(m) / 3`
#[inline]
pub fn colour_trace(m: &ColourMatrix) -> f64 {
    m.trace().re / N_COLOURS as f64
}

/// Reduce a coordinate onto `[0, extent)` with periodic wraparound
#[inline]
pub fn wrap(coordinate: isize, extent: usize) -> usize {
    coordinate.rem_euclid(extent as isize) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_negative_and_overflowing() {
        assert_eq!(wrap(-1, 8), 7);
        assert_eq!(wrap(-9, 8), 7);
        assert_eq!(wrap(8, 8), 0);
        assert_eq!(wrap(13, 4), 1);
    }

    #[test]
    fn test_colour_trace_identity() {
        assert!((colour_trace(&ColourMatrix::identity()) - 1.0).abs() < 1e-15);
        let scaled = ColourMatrix::identity() * real(0.5);
        assert!((colour_trace(&scaled) - 0.5).abs() < 1e-15);
    }
}
