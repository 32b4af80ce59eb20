use crate::config::SimulationConfig;
use glam::Vec3;
use rand::Rng;
use thiserror::Error;

/// Error building an ensemble from explicit state
#[derive(Debug, Error, PartialEq)]
pub enum EnsembleError {
    #[error("per-particle arrays differ in length: {positions} positions, {velocities} velocities, {radii} radii")]
    LengthMismatch {
        positions: usize,
        velocities: usize,
        radii: usize,
    },
    #[error("particle {index} has non-positive radius {radius}")]
    NonPositiveRadius { index: usize, radius: f32 },
}

/// Per-particle state for a fixed-size ensemble.
///
/// Index 0 is the controlled particle whenever control mode is on. The three
/// arrays always have the same length; changing the count means building a
/// new ensemble.
#[derive(Debug, Clone, PartialEq)]
pub struct Ensemble {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    radii: Vec<f32>,
    /// Target of the controlled particle. Owned here, written by the interaction layer.
    center: Vec3,
}

impl Ensemble {
    /// Allocate, scatter and size a new ensemble
    pub fn new<R: Rng>(config: &SimulationConfig, rng: &mut R) -> Self {
        let count = config.count;
        let mut ensemble = Self {
            positions: vec![Vec3::ZERO; count],
            velocities: vec![Vec3::ZERO; count],
            radii: vec![1.0; count],
            center: Vec3::ZERO,
        };
        ensemble.initialize(config, rng);
        ensemble.assign_radii(config, rng);
        ensemble
    }

    /// Build an ensemble from explicit state, checking the array invariants
    pub fn from_parts(
        positions: Vec<Vec3>,
        velocities: Vec<Vec3>,
        radii: Vec<f32>,
    ) -> Result<Self, EnsembleError> {
        if positions.len() != velocities.len() || positions.len() != radii.len() {
            return Err(EnsembleError::LengthMismatch {
                positions: positions.len(),
                velocities: velocities.len(),
                radii: radii.len(),
            });
        }
        let bad_radius = radii
            .iter()
            .enumerate()
            .find(|(_, r)| !r.is_finite() || **r <= 0.0);
        if let Some((index, &radius)) = bad_radius {
            return Err(EnsembleError::NonPositiveRadius { index, radius });
        }

        Ok(Self {
            positions,
            velocities,
            radii,
            center: Vec3::ZERO,
        })
    }

    /// Reset the center to the origin, put particle 0 on it and scatter the
    /// rest uniformly inside the bounding box. Velocities start at zero.
    pub fn initialize<R: Rng>(&mut self, config: &SimulationConfig, rng: &mut R) {
        self.center = Vec3::ZERO;
        self.velocities.fill(Vec3::ZERO);
        if let Some(first) = self.positions.first_mut() {
            *first = self.center;
        }
        for pos in self.positions.iter_mut().skip(1) {
            *pos = Vec3::new(
                spread(rng, config.max_x),
                spread(rng, config.max_y),
                spread(rng, config.max_z),
            );
        }
    }

    /// Radius 0 is `size0`, the rest are uniform in `[minSize, maxSize]`
    pub fn assign_radii<R: Rng>(&mut self, config: &SimulationConfig, rng: &mut R) {
        if let Some(first) = self.radii.first_mut() {
            *first = config.size0;
        }
        for radius in self.radii.iter_mut().skip(1) {
            *radius = rng.gen_range(config.min_size..=config.max_size);
        }
    }

    pub fn count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn radii(&self) -> &[f32] {
        &self.radii
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }

    /// Mutable views for the stepper. Radii stay read-only.
    pub(crate) fn state_mut(&mut self) -> (&mut [Vec3], &mut [Vec3], &[f32]) {
        (&mut self.positions, &mut self.velocities, &self.radii)
    }
}

/// Uniform in `[-half, half]`
fn spread<R: Rng>(rng: &mut R, half: f32) -> f32 {
    rng.gen_range(-half..=half)
}
