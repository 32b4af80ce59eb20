use crate::config::SimulationConfig;
use crate::driver::FrameTime;
use crate::ensemble::Ensemble;
use glam::Vec3;

/// Fraction of the remaining distance the controlled particle covers per frame
pub const CONTROL_EASING: f32 = 0.1;

/// Advance the ensemble by one frame.
///
/// Order: controlled particle, gravity/friction integration, then per
/// particle its pair contacts, its contact with particle 0 and its walls.
/// A particle is never touched again once its walls have been applied, so
/// every free particle ends the step contained.
pub fn step(ensemble: &mut Ensemble, config: &SimulationConfig, time: FrameTime) {
    let start = update_controlled(ensemble, config);
    integrate(ensemble, config, time, start);
    resolve_contacts(ensemble, config, start);
}

/// Ease particle 0 toward the center and pin its velocity. Returns the first
/// free particle index.
pub fn update_controlled(ensemble: &mut Ensemble, config: &SimulationConfig) -> usize {
    if !config.control_sphere0 || ensemble.is_empty() {
        return 0;
    }
    let center = ensemble.center();
    let (positions, velocities, _) = ensemble.state_mut();
    positions[0] = positions[0].lerp(center, CONTROL_EASING);
    velocities[0] = Vec3::ZERO;
    1
}

/// Semi-implicit Euler with radius-scaled gravity, friction and a speed cap
pub fn integrate(ensemble: &mut Ensemble, config: &SimulationConfig, time: FrameTime, start: usize) {
    let (positions, velocities, radii) = ensemble.state_mut();
    for i in start..positions.len() {
        let mut vel = velocities[i];
        // Larger particles fall faster
        vel.y -= time.delta * config.gravity * radii[i];
        vel *= config.friction;
        vel = vel.clamp_length_max(config.max_velocity);
        positions[i] += vel;
        velocities[i] = vel;
    }
}

/// Single-pass pair resolution followed by walls. Dense overlaps are left to
/// settle over later frames.
pub fn resolve_contacts(ensemble: &mut Ensemble, config: &SimulationConfig, start: usize) {
    let (positions, velocities, radii) = ensemble.state_mut();
    let count = positions.len();
    let controlled = config.control_sphere0 && start == 1;
    let anchor = if controlled { Some((positions[0], radii[0])) } else { None };

    for i in start..count {
        let mut pos1 = positions[i];
        let mut vel1 = velocities[i];
        let radius1 = radii[i];

        for j in (i + 1)..count {
            let mut pos2 = positions[j];
            let mut vel2 = velocities[j];
            let diff = pos2 - pos1;
            let distance = diff.length();
            let sum_radius = radius1 + radii[j];

            if distance < sum_radius {
                let overlap = sum_radius - distance;
                let correction = diff.normalize_or_zero() * (0.5 * overlap);
                let vel_correction1 = correction * vel1.length().max(1.0);
                let vel_correction2 = correction * vel2.length().max(1.0);

                pos1 -= correction;
                vel1 -= vel_correction1;
                positions[i] = pos1;
                velocities[i] = vel1;

                pos2 += correction;
                vel2 += vel_correction2;
                positions[j] = pos2;
                velocities[j] = vel2;
            }
        }

        if let Some((anchor_pos, anchor_radius)) = anchor {
            let diff = anchor_pos - pos1;
            let distance = diff.length();
            let sum_radius = radius1 + anchor_radius;

            if distance < sum_radius {
                let overlap = sum_radius - distance;
                let correction = diff.normalize_or_zero() * overlap;
                pos1 -= correction;
                vel1 -= correction * vel1.length().max(2.0);
            }
        }

        contain(&mut pos1, &mut vel1, radius1, config);

        positions[i] = pos1;
        velocities[i] = vel1;
    }
}

/// Clamp one particle into the bounding volume and reflect its velocity
fn contain(pos: &mut Vec3, vel: &mut Vec3, radius: f32, config: &SimulationConfig) {
    if pos.x.abs() + radius > config.max_x {
        pos.x = sign(pos.x) * (config.max_x - radius);
        vel.x = -vel.x * config.wall_bounce;
    }

    if config.gravity == 0.0 {
        if pos.y.abs() + radius > config.max_y {
            pos.y = sign(pos.y) * (config.max_y - radius);
            vel.y = -vel.y * config.wall_bounce;
        }
    } else if pos.y - radius < -config.max_y {
        // Floor only: particles may be thrown arbitrarily high
        pos.y = -config.max_y + radius;
        vel.y = -vel.y * config.wall_bounce;
    }

    // The trigger uses the larger extent so the biggest particle is not clipped
    let max_boundary = config.max_z.max(config.max_size);
    if pos.z.abs() + radius > max_boundary {
        pos.z = sign(pos.z) * (config.max_z - radius);
        vel.z = -vel.z * config.wall_bounce;
    }
}

/// Sign that maps zero to zero, unlike `f32::signum`
fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}
