//! Random particle generation for populating initial scenes.
//!
//! The random source is always supplied by the caller so that scenes can be
//! reproduced from a seed.

use crate::particle::Particle;
use glam::Vec3;
use rand::Rng;

pub const POSITION_RANGE: f32 = 1.0;
pub const VELOCITY_RANGE: f32 = 0.01;
pub const MIN_MASS: f32 = 0.1;
pub const MAX_MASS: f32 = 1.0;

/// One particle in the z = 0 plane: x, y in `[-1, 1]`, velocity x, y in
/// `[-0.01, 0.01]`, mass in `[0.1, 1.0]`, black.
pub fn random_particle<R: Rng>(rng: &mut R) -> Particle {
    let position = Vec3::new(
        rng.random_range(-POSITION_RANGE..=POSITION_RANGE),
        rng.random_range(-POSITION_RANGE..=POSITION_RANGE),
        0.0,
    );
    let velocity = Vec3::new(
        rng.random_range(-VELOCITY_RANGE..=VELOCITY_RANGE),
        rng.random_range(-VELOCITY_RANGE..=VELOCITY_RANGE),
        0.0,
    );
    let mass = rng.random_range(MIN_MASS..=MAX_MASS);

    Particle::from_valid_parts(position, velocity, mass, Vec3::ZERO)
}

pub fn random_particles<R: Rng>(count: usize, rng: &mut R) -> Vec<Particle> {
    (0..count).map(|_| random_particle(rng)).collect()
}
