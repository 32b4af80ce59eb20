//! Tests for ensemble allocation, placement and radii

use ballpit_core::{Ensemble, EnsembleError, SimulationConfig};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_new_ensemble_layout() {
    let config = SimulationConfig {
        count: 50,
        size0: 1.5,
        min_size: 0.3,
        max_size: 0.8,
        ..SimulationConfig::default()
    };
    let ensemble = Ensemble::new(&config, &mut StdRng::seed_from_u64(3));

    assert_eq!(ensemble.count(), 50);
    assert_eq!(ensemble.positions().len(), 50);
    assert_eq!(ensemble.velocities().len(), 50);
    assert_eq!(ensemble.radii().len(), 50);

    assert_eq!(ensemble.center(), Vec3::ZERO);
    assert_eq!(ensemble.positions()[0], ensemble.center());
    assert!(ensemble.velocities().iter().all(|v| *v == Vec3::ZERO));

    for p in &ensemble.positions()[1..] {
        assert!(p.x.abs() <= config.max_x);
        assert!(p.y.abs() <= config.max_y);
        assert!(p.z.abs() <= config.max_z);
    }

    assert_eq!(ensemble.radii()[0], 1.5);
    for r in &ensemble.radii()[1..] {
        assert!((config.min_size..=config.max_size).contains(r));
    }
}

#[test]
fn test_same_seed_same_ensemble() {
    let config = SimulationConfig::default();
    let a = Ensemble::new(&config, &mut StdRng::seed_from_u64(11));
    let b = Ensemble::new(&config, &mut StdRng::seed_from_u64(11));
    let c = Ensemble::new(&config, &mut StdRng::seed_from_u64(12));

    assert_eq!(a, b);
    assert_ne!(a.positions(), c.positions());
}

#[test]
fn test_fixed_size_range_is_allowed() {
    let config = SimulationConfig {
        count: 5,
        min_size: 0.7,
        max_size: 0.7,
        max_z: 0.0,
        ..SimulationConfig::default()
    };
    let ensemble = Ensemble::new(&config, &mut StdRng::seed_from_u64(0));

    assert!(ensemble.radii()[1..].iter().all(|r| *r == 0.7));
    assert!(ensemble.positions().iter().all(|p| p.z == 0.0));
}

#[test]
fn test_zero_count_is_empty() {
    let config = SimulationConfig::default().with_count(0);
    let ensemble = Ensemble::new(&config, &mut StdRng::seed_from_u64(0));

    assert!(ensemble.is_empty());
    assert!(ensemble.positions().is_empty());
    assert!(ensemble.radii().is_empty());
}

#[test]
fn test_from_parts_checks_lengths() {
    let result = Ensemble::from_parts(vec![Vec3::ZERO; 2], vec![Vec3::ZERO; 3], vec![1.0; 2]);
    assert_eq!(
        result.unwrap_err(),
        EnsembleError::LengthMismatch {
            positions: 2,
            velocities: 3,
            radii: 2
        }
    );
}

#[test]
fn test_from_parts_checks_radii() {
    let result = Ensemble::from_parts(vec![Vec3::ZERO; 3], vec![Vec3::ZERO; 3], vec![1.0, 0.0, 2.0]);
    assert_eq!(
        result.unwrap_err(),
        EnsembleError::NonPositiveRadius {
            index: 1,
            radius: 0.0
        }
    );
}

#[test]
fn test_count_tracks_array_length() {
    let ensemble = Ensemble::from_parts(vec![Vec3::ONE; 4], vec![Vec3::ZERO; 4], vec![0.5; 4]).unwrap();
    assert_eq!(ensemble.count(), 4);
    assert_eq!(ensemble.count(), ensemble.positions().len());
    assert!(!ensemble.is_empty());

    let empty = Ensemble::from_parts(Vec::new(), Vec::new(), Vec::new()).unwrap();
    assert_eq!(empty.count(), 0);
    assert!(empty.is_empty());
}
