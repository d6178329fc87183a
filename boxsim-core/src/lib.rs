pub mod analyzer;
pub mod collision;
pub mod diagnostics;
pub mod error;
pub mod particle;
pub mod render;
pub mod runtime;
pub mod scene;
pub mod simulation;
pub mod spawn;

pub use analyzer::analyze_scene;
pub use collision::{CollisionResolver, PassStats, ResolutionMode};
pub use diagnostics::{Diagnostic, DiagnosticSeverity, Diagnostics, Span};
pub use error::{Error, Result};
pub use particle::Particle;
pub use render::{DrawRecord, Renderer};
pub use runtime::{
    build_simulation, build_simulation_context, build_simulation_context_from_source,
    run_scene, scene_result, step_simulation, SceneResult, SimulationContext,
};
pub use scene::{parse_scene, ParseError, Scene};
pub use simulation::{
    BoundaryMode, Simulation, SimulationParams, TimeScaling, MAX_PARTICLES,
};
