//! Tests for pair contacts and the controlled particle

use ballpit_core::integrator::step;
use ballpit_core::tests::test_helpers::{approx_eq_f32, pair_overlap, resting_ensemble, vec3_approx_eq};
use ballpit_core::{FrameTime, SimulationConfig};
use glam::Vec3;

const FRAME: FrameTime = FrameTime {
    delta: 1.0 / 60.0,
    elapsed: 0.0,
};

#[test]
fn test_overlapping_pair_separates_monotonically() {
    let config = SimulationConfig::default();
    let mut ensemble = resting_ensemble(
        &[Vec3::new(-0.25, 0.0, 0.0), Vec3::new(0.25, 0.0, 0.0)],
        &[0.5, 0.5],
    );

    let mut overlaps = vec![pair_overlap(&ensemble, 0, 1)];
    for _ in 0..5 {
        step(&mut ensemble, &config, FRAME);
        overlaps.push(pair_overlap(&ensemble, 0, 1));
    }

    for pair in overlaps.windows(2) {
        if pair[0] > 0.0 {
            assert!(pair[1] < pair[0], "overlap grew: {:?}", overlaps);
        }
    }
    assert!(*overlaps.last().unwrap() <= 0.0, "still overlapping: {:?}", overlaps);
}

#[test]
fn test_pair_correction_is_symmetric() {
    let config = SimulationConfig::default();
    let mut ensemble = resting_ensemble(
        &[Vec3::new(0.0, -0.4, 0.0), Vec3::new(0.0, 0.4, 0.0)],
        &[0.5, 0.5],
    );

    step(&mut ensemble, &config, FRAME);

    // Half the 0.2 overlap goes to each particle, velocities scale by max(speed, 1)
    let p = ensemble.positions();
    let v = ensemble.velocities();
    assert!(vec3_approx_eq(p[0], Vec3::new(0.0, -0.5, 0.0), 1e-5));
    assert!(vec3_approx_eq(p[1], Vec3::new(0.0, 0.5, 0.0), 1e-5));
    assert!(approx_eq_f32(v[0].y, -0.1, 1e-5));
    assert!(approx_eq_f32(v[1].y, 0.1, 1e-5));
}

#[test]
fn test_controlled_particle_converges_geometrically() {
    let config = SimulationConfig {
        count: 1,
        control_sphere0: true,
        ..SimulationConfig::default()
    };
    let mut ensemble = resting_ensemble(&[Vec3::ZERO], &[1.0]);
    let center = Vec3::new(4.0, -3.0, 0.0);
    ensemble.set_center(center);

    let mut previous = ensemble.positions()[0].distance(center);
    for _ in 0..20 {
        step(&mut ensemble, &config, FRAME);
        let distance = ensemble.positions()[0].distance(center);
        assert!(approx_eq_f32(distance, previous * 0.9, 1e-4));
        assert_eq!(ensemble.velocities()[0], Vec3::ZERO);
        previous = distance;
    }

    for _ in 0..200 {
        step(&mut ensemble, &config, FRAME);
    }
    assert!(ensemble.positions()[0].distance(center) < 1e-4);
}

#[test]
fn test_controlled_particle_pushes_free_particle_only() {
    let config = SimulationConfig {
        count: 2,
        control_sphere0: true,
        ..SimulationConfig::default()
    };
    let mut ensemble = resting_ensemble(&[Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)], &[1.0, 1.0]);

    step(&mut ensemble, &config, FRAME);

    let p = ensemble.positions();
    let v = ensemble.velocities();
    assert_eq!(p[0], Vec3::ZERO);
    // Full overlap of 1.0 is applied to the free particle, velocity scale max(speed, 2)
    assert!(vec3_approx_eq(p[1], Vec3::new(2.0, 0.0, 0.0), 1e-5));
    assert!(vec3_approx_eq(v[1], Vec3::new(2.0, 0.0, 0.0), 1e-5));
}

#[test]
fn test_free_mode_moves_particle_zero() {
    let config = SimulationConfig {
        gravity: 1.0,
        ..SimulationConfig::default()
    };
    let mut ensemble = resting_ensemble(&[Vec3::ZERO], &[1.0]);
    ensemble.set_center(Vec3::new(3.0, 0.0, 0.0));

    step(&mut ensemble, &config, FRAME);

    // Falls instead of easing toward the center
    assert!(ensemble.positions()[0].y < 0.0);
    assert_eq!(ensemble.positions()[0].x, 0.0);
}

#[test]
fn test_coincident_particles_do_not_produce_nan() {
    let config = SimulationConfig::default();
    let mut ensemble = resting_ensemble(&[Vec3::ZERO, Vec3::ZERO], &[0.5, 0.5]);

    for _ in 0..10 {
        step(&mut ensemble, &config, FRAME);
    }

    for p in ensemble.positions() {
        assert!(p.is_finite());
    }
}
