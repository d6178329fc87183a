use crate::collision::{CollisionResolver, PassStats, ResolutionMode};
use crate::error::{Error, Result};
use crate::particle::Particle;
use crate::render::{DrawRecord, Renderer};
use crate::spawn;
use glam::Vec3;
use rand::Rng;

pub const DEFAULT_RADIUS: f32 = 0.05;
pub const DEFAULT_BOUNDARY: f32 = 1.2;
pub const DEFAULT_SUBSTEPS: u32 = 5;

/// Upper bound on the number of particles a scene may spawn.
pub const MAX_PARTICLES: usize = 1_000_000;

/// How far each pass integrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeScaling {
    /// Every pass integrates the full `dt`; one `simulate(dt)` call advances
    /// `substeps * dt` of simulated time.
    #[default]
    FullStepPerPass,
    /// Every pass integrates `dt / substeps`; one call advances exactly `dt`.
    SplitStep,
}

/// What happens when a coordinate leaves `[-boundary, boundary]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryMode {
    /// Flip the velocity component only. The particle may stay outside for a
    /// few passes and be reflected again.
    #[default]
    Reflect,
    /// Flip the velocity component and clamp the coordinate onto the wall.
    Clamp,
}

/// Fixed parameters of a simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    /// Particle radius; pairs closer than twice this are in contact.
    pub radius: f32,
    /// Half-extent of the cubic domain.
    pub boundary: f32,
    /// Collision + integration passes per `simulate` call.
    pub substeps: u32,
    pub time_scaling: TimeScaling,
    pub boundary_mode: BoundaryMode,
    pub resolution: ResolutionMode,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            boundary: DEFAULT_BOUNDARY,
            substeps: DEFAULT_SUBSTEPS,
            time_scaling: TimeScaling::default(),
            boundary_mode: BoundaryMode::default(),
            resolution: ResolutionMode::default(),
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Error::InvalidParams(format!(
                "radius must be finite and > 0, got {}",
                self.radius
            )));
        }
        if !self.boundary.is_finite() || self.boundary <= 0.0 {
            return Err(Error::InvalidParams(format!(
                "boundary must be finite and > 0, got {}",
                self.boundary
            )));
        }
        if self.substeps == 0 {
            return Err(Error::InvalidParams("substeps must be >= 1".into()));
        }
        Ok(())
    }

    /// Time integrated by each pass of a `simulate(dt)` call.
    pub fn pass_dt(&self, dt: f32) -> f32 {
        match self.time_scaling {
            TimeScaling::FullStepPerPass => dt,
            TimeScaling::SplitStep => dt / self.substeps as f32,
        }
    }
}

/// Owns the particles and advances them through time.
#[derive(Debug, Clone)]
pub struct Simulation {
    particles: Vec<Particle>,
    params: SimulationParams,
    resolver: CollisionResolver,
    elapsed: f64,
}

impl Simulation {
    pub fn new(params: SimulationParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            particles: Vec::new(),
            params,
            resolver: CollisionResolver::new(params.radius).with_mode(params.resolution),
            elapsed: 0.0,
        })
    }

    /// Append a particle. Collection order is spawn order and is never changed.
    pub fn add_particle(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Append `count` particles drawn from the random spawn distribution.
    pub fn add_random_particles<R: Rng>(&mut self, count: usize, rng: &mut R) {
        self.particles.reserve(count.min(MAX_PARTICLES));
        for _ in 0..count {
            self.particles.push(spawn::random_particle(rng));
        }
    }

    /// Advance by `substeps` passes of collision resolution, boundary
    /// reflection and integration. See [`TimeScaling`] for how much simulated
    /// time that covers.
    pub fn simulate(&mut self, dt: f32) -> PassStats {
        let pass_dt = self.params.pass_dt(dt);
        let mut totals = PassStats::default();

        for _ in 0..self.params.substeps {
            let stats = self.resolver.resolve(&mut self.particles);
            totals.contacts += stats.contacts;
            totals.resolved += stats.resolved;
            totals.degenerate += stats.degenerate;

            for particle in &mut self.particles {
                apply_boundary(particle, self.params.boundary, self.params.boundary_mode);
                particle.integrate(pass_dt);
            }
            self.elapsed += f64::from(pass_dt);
        }

        totals
    }

    /// Hand every particle's drawable state to `renderer`, in collection order.
    pub fn render<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        renderer.draw(&self.draw_records());
    }

    pub fn draw_records(&self) -> Vec<DrawRecord> {
        self.particles.iter().map(DrawRecord::from).collect()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Simulated time advanced so far.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn total_momentum(&self) -> Vec3 {
        self.particles.iter().map(Particle::momentum).sum()
    }

    pub fn kinetic_energy(&self) -> f32 {
        self.particles.iter().map(Particle::kinetic_energy).sum()
    }
}

/// Per-axis reflective containment.
fn apply_boundary(particle: &mut Particle, boundary: f32, mode: BoundaryMode) {
    let mut position = particle.position();
    let mut velocity = particle.velocity();
    let mut touched = false;

    for axis in 0..3 {
        if position[axis].abs() > boundary {
            velocity[axis] = -velocity[axis];
            if mode == BoundaryMode::Clamp {
                position[axis] = position[axis].clamp(-boundary, boundary);
            }
            touched = true;
        }
    }

    if touched {
        particle.set_velocity(velocity);
        particle.set_position(position);
    }
}
