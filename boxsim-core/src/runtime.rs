use crate::analyzer::analyze_scene;
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::particle::Particle;
use crate::render::DrawRecord;
use crate::scene::{parse_scene, Scene, SpawnDecl};
use crate::simulation::{Simulation, MAX_PARTICLES};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{rng, Rng, SeedableRng};

/// A simulation plus the frame schedule from its scene.
#[derive(Debug, Clone)]
pub struct SimulationContext {
    pub simulation: Simulation,
    pub dt: f32,
    pub current_frame: u32,
    pub max_frames: u32,
}

/// Final state of a headless scene run
#[derive(Debug, Clone)]
pub struct SceneResult {
    pub frames: u32,
    pub elapsed: f64,
    pub particles: Vec<DrawRecord>,
    pub total_momentum: Vec3,
    pub kinetic_energy: f32,
}

/// Parse, analyze and run a scene to completion
pub fn run_scene(source: &str) -> Result<SceneResult> {
    let (mut ctx, _diagnostics) = build_simulation_context_from_source(source)?;
    while !step_simulation(&mut ctx) {}
    Ok(scene_result(&ctx))
}

/// Build a simulation from a parsed scene, spawning particles in file order.
pub fn build_simulation(scene: &Scene) -> Result<Simulation> {
    let mut simulation = Simulation::new(scene.params())?;
    if scene.particle_count() > MAX_PARTICLES {
        return Err(Error::InvalidParams(format!(
            "scene spawns more than {} particles",
            MAX_PARTICLES
        )));
    }

    for spawn in &scene.spawns {
        match spawn {
            SpawnDecl::Particle(decl) => {
                let particle = Particle::new(decl.position, decl.velocity, decl.mass, decl.color)?;
                simulation.add_particle(particle);
            }
            SpawnDecl::Random(decl) => {
                let seed = decl.seed.unwrap_or_else(|| rng().random());
                log::debug!("spawning {} random particles with seed {}", decl.count, seed);
                let mut spawn_rng = StdRng::seed_from_u64(seed);
                simulation.add_random_particles(decl.count, &mut spawn_rng);
            }
        }
    }

    Ok(simulation)
}

pub fn build_simulation_context(scene: &Scene) -> Result<SimulationContext> {
    Ok(SimulationContext {
        simulation: build_simulation(scene)?,
        dt: scene.simulate.dt,
        current_frame: 0,
        max_frames: scene.simulate.frames,
    })
}

/// Parse and analyze `source`, then build a context ready to step.
///
/// Analyzer errors abort the build; warnings are logged and returned.
pub fn build_simulation_context_from_source(
    source: &str,
) -> Result<(SimulationContext, Diagnostics)> {
    let scene = parse_scene(source)?;
    let diagnostics = analyze_scene(&scene);

    if diagnostics.has_errors() {
        let messages: Vec<String> = diagnostics.errors().map(|d| d.message.clone()).collect();
        return Err(Error::Analysis(messages.join("; ")));
    }
    for warning in diagnostics.warnings() {
        log::warn!("{}", warning.message);
    }

    let ctx = build_simulation_context(&scene)?;
    log::debug!(
        "built simulation: {} particles, dt = {}, {} frames",
        ctx.simulation.len(),
        ctx.dt,
        ctx.max_frames
    );
    Ok((ctx, diagnostics))
}

/// Advance one frame. Returns `true` once every frame has run.
pub fn step_simulation(ctx: &mut SimulationContext) -> bool {
    if ctx.current_frame >= ctx.max_frames {
        return true;
    }
    ctx.simulation.simulate(ctx.dt);
    ctx.current_frame += 1;
    ctx.current_frame >= ctx.max_frames
}

pub fn scene_result(ctx: &SimulationContext) -> SceneResult {
    SceneResult {
        frames: ctx.current_frame,
        elapsed: ctx.simulation.elapsed(),
        particles: ctx.simulation.draw_records(),
        total_momentum: ctx.simulation.total_momentum(),
        kinetic_energy: ctx.simulation.kinetic_energy(),
    }
}
