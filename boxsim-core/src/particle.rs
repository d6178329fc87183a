use crate::error::{Error, Result};
use glam::Vec3;

/// A point particle with kinematic state.
///
/// Mass and color are fixed once constructed; position and velocity are
/// rewritten by collision response and integration.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    position: Vec3,
    velocity: Vec3,
    mass: f32,
    color: Vec3,
}

impl Particle {
    /// Create a particle after validating its invariants.
    ///
    /// Errors with `Error::InvalidParticle` if `mass` is not finite and
    /// strictly positive, if position or velocity has a non-finite component,
    /// or if a color component lies outside `[0, 1]`.
    pub fn new(position: Vec3, velocity: Vec3, mass: f32, color: Vec3) -> Result<Self> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidParticle(format!(
                "mass must be finite and > 0, got {}",
                mass
            )));
        }
        if !position.is_finite() {
            return Err(Error::InvalidParticle("position must be finite".into()));
        }
        if !velocity.is_finite() {
            return Err(Error::InvalidParticle("velocity must be finite".into()));
        }
        if !color.is_finite() || color.min_element() < 0.0 || color.max_element() > 1.0 {
            return Err(Error::InvalidParticle(
                "color components must lie in [0, 1]".into(),
            ));
        }
        Ok(Self {
            position,
            velocity,
            mass,
            color,
        })
    }

    /// Build from inputs the caller has already constrained to valid ranges.
    pub(crate) fn from_valid_parts(position: Vec3, velocity: Vec3, mass: f32, color: Vec3) -> Self {
        debug_assert!(mass.is_finite() && mass > 0.0);
        Self {
            position,
            velocity,
            mass,
            color,
        }
    }

    /// Advance position by `velocity * dt` (first-order Euler).
    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn color(&self) -> Vec3 {
        self.color
    }

    #[inline]
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    #[inline]
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    /// Magnitude of the velocity.
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn momentum(&self) -> Vec3 {
        self.velocity * self.mass
    }

    /// 1/2 m |v|^2
    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity.length_squared()
    }
}
