use crate::config::{ConfigError, SimulationConfig};
use crate::driver::FrameTime;
use crate::ensemble::Ensemble;
use crate::integrator::step;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

/// Aggregate measurements over the final state
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SimulationStats {
    pub centroid: Vec3,
    /// Lowest point of any particle surface
    pub lowest: f32,
    pub mean_speed: f32,
    /// Deepest remaining interpenetration between two particles
    pub max_overlap: f32,
}

/// Final state of a headless run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    pub frames: u32,
    pub elapsed: f32,
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
    pub radii: Vec<f32>,
    pub stats: SimulationStats,
}

/// Build a seeded ensemble and step it `frames` times with a fixed delta
pub fn run_headless(
    config: &SimulationConfig,
    frames: u32,
    dt: f32,
    seed: u64,
) -> Result<SimulationResult, ConfigError> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut ensemble = Ensemble::new(config, &mut rng);

    let mut elapsed = 0.0;
    for _ in 0..frames {
        elapsed += dt;
        step(&mut ensemble, config, FrameTime { delta: dt, elapsed });
    }

    Ok(SimulationResult {
        frames,
        elapsed,
        positions: ensemble.positions().to_vec(),
        velocities: ensemble.velocities().to_vec(),
        radii: ensemble.radii().to_vec(),
        stats: measure(&ensemble),
    })
}

/// Summarise an ensemble. Empty ensembles measure as zero.
pub fn measure(ensemble: &Ensemble) -> SimulationStats {
    let positions = ensemble.positions();
    let radii = ensemble.radii();
    if positions.is_empty() {
        return SimulationStats {
            centroid: Vec3::ZERO,
            lowest: 0.0,
            mean_speed: 0.0,
            max_overlap: 0.0,
        };
    }

    let n = positions.len() as f32;
    let centroid = positions.iter().copied().sum::<Vec3>() / n;
    let lowest = positions
        .iter()
        .zip(radii)
        .map(|(p, r)| p.y - r)
        .fold(f32::INFINITY, f32::min);
    let mean_speed = ensemble.velocities().iter().map(|v| v.length()).sum::<f32>() / n;

    let mut max_overlap = 0.0_f32;
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let overlap = radii[i] + radii[j] - positions[i].distance(positions[j]);
            max_overlap = max_overlap.max(overlap);
        }
    }

    SimulationStats {
        centroid,
        lowest,
        mean_speed,
        max_overlap,
    }
}
