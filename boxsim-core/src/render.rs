use crate::particle::Particle;
use glam::Vec3;

/// Drawable attributes of one particle, as handed to a [`Renderer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRecord {
    pub position: Vec3,
    pub speed: f32,
    pub mass: f32,
    pub color: Vec3,
}

impl From<&Particle> for DrawRecord {
    fn from(p: &Particle) -> Self {
        Self {
            position: p.position(),
            speed: p.speed(),
            mass: p.mass(),
            color: p.color(),
        }
    }
}

/// Sink for drawable particle state. Implementations own all window and
/// GPU interaction; the simulation never looks inside.
pub trait Renderer {
    fn draw(&mut self, records: &[DrawRecord]);
}

/// Collects records in draw order. Used by headless runs and tests.
impl Renderer for Vec<DrawRecord> {
    fn draw(&mut self, records: &[DrawRecord]) {
        self.extend_from_slice(records);
    }
}
