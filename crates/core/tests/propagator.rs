//! Integration tests for the Wilson Dirac operator on thermalized fields

use qcd_sim_core::dirac::point_source;
use qcd_sim_core::{Lattice, LatticeConfig, LatticeError, SolverParams, SpinorField};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn thermalized() -> Lattice {
    init_tracing();
    let config = LatticeConfig::default()
        .with_edge_length(4)
        .with_n_correlations(1)
        .with_block_size(2)
        .with_spacing(1.0)
        .with_seed(77);
    let mut lattice = Lattice::new(config).unwrap();
    lattice.thermalize().unwrap();
    lattice
}

#[test]
fn test_propagator_satisfies_dirac_equation() {
    let lattice = thermalized();
    let mass = 0.4;
    let site = [2, 1, 0, 3];
    let params = SolverParams {
        tolerance: 1e-10,
        max_iterations: 2000,
    };

    for (spin, colour) in [(0, 0), (3, 2)] {
        let (psi, report) = lattice
            .propagator_with(mass, &site, spin, colour, &params)
            .unwrap();
        assert!(report.residual < 1e-10);

        let operator = lattice.dirac_operator(mass);
        let source = point_source(lattice.shape(), &site, spin, colour);
        let residual = (operator.apply(&psi).unwrap() - &source).norm();
        assert!(residual < 1e-8, "residual {residual}");
    }
}

#[test]
fn test_gamma5_hermiticity_on_thermalized_field() {
    let lattice = thermalized();
    let operator = lattice.dirac_operator(0.1);
    let x = SpinorField::from_fn(operator.dim(), |i, _| {
        nalgebra::Complex::new((i as f64 * 0.37).sin(), (i as f64 * 0.11).cos())
    });
    let y = SpinorField::from_fn(operator.dim(), |i, _| {
        nalgebra::Complex::new((i as f64 * 0.23).cos(), -(i as f64 * 0.05).sin())
    });

    let g5_d_g5_x = operator
        .gamma5_apply(&operator.apply(&operator.gamma5_apply(&x).unwrap()).unwrap())
        .unwrap();
    let lhs = y.dotc(&g5_d_g5_x);
    let rhs = operator.apply(&y).unwrap().dotc(&x);
    assert!((lhs - rhs).norm() < 1e-9 * lhs.norm().max(1.0));
}

#[test]
fn test_wrong_length_vector_is_a_layout_mismatch() {
    let lattice = thermalized();
    let operator = lattice.dirac_operator(0.1);
    let short = SpinorField::zeros(operator.dim() - 12);
    assert!(matches!(
        operator.apply(&short),
        Err(LatticeError::LayoutMismatch { .. })
    ));
}
