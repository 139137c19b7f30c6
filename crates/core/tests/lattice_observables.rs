//! Integration tests for the observable and action engines through the public API
//!
//! Uniform fields `c·1` give closed forms for every loop and action, which pins down
//! the loop shapes and coefficients independently of the implementation.

use approx::assert_relative_eq;
use qcd_sim_core::algebra::real;
use qcd_sim_core::{
    ActionKind, ColourMatrix, GaugeField, Lattice, LatticeConfig, LatticeError, PathStep, Shape,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const BETA: f64 = 5.5;

fn config(action: ActionKind) -> LatticeConfig {
    init_tracing();
    LatticeConfig::default()
        .with_edge_length(4)
        .with_beta(BETA)
        .with_action(action)
        .with_seed(101)
}

fn uniform(action: ActionKind, c: f64) -> Lattice {
    let field = GaugeField::filled(Shape::new(4, 4), ColourMatrix::identity() * real(c));
    Lattice::with_field(config(action), field).unwrap()
}

#[test]
fn test_uniform_field_loops_match_powers_of_c() {
    let c: f64 = 0.87;
    let lattice = uniform(ActionKind::Wilson, c);

    for site in [[0, 0, 0, 0], [3, 1, 2, 0], [-1, 5, -7, 2]] {
        for (mu, nu) in [(1, 0), (3, 2), (0, 2)] {
            assert_relative_eq!(
                lattice.compute_plaquette(&site, mu, nu).unwrap(),
                c.powi(4),
                epsilon = 1e-13
            );
            assert_relative_eq!(
                lattice.compute_rectangle(&site, mu, nu).unwrap(),
                c.powi(6),
                epsilon = 1e-13
            );
            assert_relative_eq!(
                lattice.compute_twisted_rectangle(&site, mu, nu).unwrap(),
                c.powi(8),
                epsilon = 1e-13
            );
        }
    }

    assert_relative_eq!(lattice.compute_average_plaquette(), c.powi(4), epsilon = 1e-13);
    assert_relative_eq!(lattice.compute_average_rectangle(), c.powi(6), epsilon = 1e-13);
    assert_relative_eq!(
        lattice.compute_average_twisted_rectangle(),
        c.powi(8),
        epsilon = 1e-13
    );
}

#[test]
fn test_uniform_field_actions_match_closed_forms() {
    let c: f64 = 0.9;
    let link = [1, 2, 3, 0, 2];
    let wilson = -BETA * 6.0 * c.powi(4);

    let lattice = uniform(ActionKind::Wilson, c);
    assert_relative_eq!(lattice.local_action(link).unwrap(), wilson, epsilon = 1e-12);

    let lattice = uniform(ActionKind::Rectangle, c);
    let expected = 5.0 / 3.0 * wilson + BETA * 18.0 / 12.0 * c.powi(6);
    assert_relative_eq!(lattice.local_action(link).unwrap(), expected, epsilon = 1e-12);

    let lattice = uniform(ActionKind::TwistedRectangle, c);
    let expected = wilson - BETA * 21.0 / 12.0 * c.powi(8);
    assert_relative_eq!(lattice.local_action(link).unwrap(), expected, epsilon = 1e-12);
}

#[test]
fn test_staples_reproduce_local_action_on_random_field() {
    for action in [ActionKind::Wilson, ActionKind::Rectangle] {
        let lattice = Lattice::new(config(action).with_epsilon(1.0)).unwrap();
        for link in [[0, 0, 0, 0, 0], [1, 3, 2, 0, 1], [3, 3, 3, 3, 3]] {
            let u = lattice.get_link(link).unwrap();
            let staples = lattice.staples(link).unwrap().unwrap();
            let from_staples = -(u * staples).trace().re / 3.0;
            assert_relative_eq!(
                lattice.local_action(link).unwrap(),
                from_staples,
                epsilon = 1e-10
            );
        }
    }

    let twisted = Lattice::new(config(ActionKind::TwistedRectangle)).unwrap();
    assert_eq!(twisted.staples([0, 0, 0, 0, 1]).unwrap(), None);
}

#[test]
fn test_line_round_trip_is_identity() {
    let lattice = Lattice::new(config(ActionKind::Wilson).with_epsilon(1.0)).unwrap();
    let pairs = [
        ([0, 0, 0, 0], [3, 0, 0, 0]),
        ([1, 2, 0, 3], [1, -2, 0, 3]),
        ([2, 2, 2, 2], [2, 2, 2, 9]),
    ];
    for (a, b) in pairs {
        let there = lattice.compute_line(&a, &b).unwrap();
        let back = lattice.compute_line(&b, &a).unwrap();
        assert!((there * back - ColourMatrix::identity()).norm() < 1e-12);
    }
}

#[test]
fn test_explicit_path_matches_plaquette() {
    let lattice = Lattice::new(config(ActionKind::Wilson).with_epsilon(1.0)).unwrap();
    let steps = [
        PathStep {
            site: [0, 0, 0, 0],
            direction: 1,
        },
        PathStep {
            site: [0, 1, 0, 0],
            direction: 2,
        },
        PathStep {
            site: [0, 1, 1, 0],
            direction: 1,
        },
        PathStep {
            site: [0, 0, 1, 0],
            direction: 2,
        },
        PathStep {
            site: [0, 0, 0, 0],
            direction: 0,
        },
    ];
    let product = lattice.compute_path(&steps).unwrap();
    assert_relative_eq!(
        product.trace().re / 3.0,
        lattice.compute_plaquette(&[0, 0, 0, 0], 1, 2).unwrap(),
        epsilon = 1e-12
    );
}

#[test]
fn test_invalid_geometry_is_reported_and_field_untouched() {
    let mut lattice = Lattice::new(config(ActionKind::Wilson)).unwrap();
    let before = lattice.field().clone();

    assert!(matches!(
        lattice.compute_line(&[0, 0, 0, 0], &[1, 1, 0, 0]),
        Err(LatticeError::NotCollinear { .. })
    ));
    let broken = [
        PathStep {
            site: [0, 0, 0, 0],
            direction: 1,
        },
        PathStep {
            site: [0, 2, 0, 0],
            direction: 1,
        },
    ];
    assert_eq!(
        lattice.compute_path(&broken),
        Err(LatticeError::NonConsecutivePath { step: 0 })
    );
    assert!(matches!(
        lattice.compute_wilson_loop(&[0, 0, 0, 0], &[1, 2, 3, 0], 5),
        Err(LatticeError::MalformedLoop { .. })
    ));
    assert!(matches!(
        lattice.get_link([0, 0, 0, 0, 4]),
        Err(LatticeError::InvalidDirection { direction: 4 })
    ));

    assert_eq!(lattice.field(), &before);
}

#[test]
fn test_smeared_wilson_loops_leave_the_field_unchanged() {
    let mut lattice = Lattice::new(config(ActionKind::Wilson).with_epsilon(0.5)).unwrap();
    let before = lattice.field().clone();

    let single = lattice.compute_wilson_loop(&[0, 0, 0, 0], &[-2, 0, 0, 2], 4).unwrap();
    let average = lattice.compute_average_wilson_loop(2, 2, 4).unwrap();

    assert!(single.abs() <= 1.0);
    assert!(average.abs() <= 1.0);
    assert_eq!(lattice.field(), &before);
}

#[test]
fn test_polyakov_loop_of_cold_start_is_one() {
    let lattice = Lattice::cold(config(ActionKind::Wilson).with_temporal_extent(8)).unwrap();
    let value = lattice.compute_average_polyakov_loop();
    assert_relative_eq!(value.re, 1.0, epsilon = 1e-14);
    assert_relative_eq!(value.im, 0.0, epsilon = 1e-14);
    assert_relative_eq!(
        lattice.compute_polyakov_loop(&[1, 2, 3]).re,
        1.0,
        epsilon = 1e-14
    );
}
