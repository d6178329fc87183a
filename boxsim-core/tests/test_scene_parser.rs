//! Parser tests for scene files

use boxsim_core::scene::SpawnDecl;
use boxsim_core::{parse_scene, BoundaryMode, ResolutionMode, TimeScaling};
use glam::Vec3;

#[test]
fn test_minimal_scene_uses_defaults() {
    let scene = parse_scene("simulate dt = 0.01 frames = 100").unwrap();
    assert_eq!(scene.domain.radius, 0.05);
    assert_eq!(scene.domain.boundary, 1.2);
    assert_eq!(scene.domain.substeps, 5);
    assert_eq!(scene.policy.time_scaling, TimeScaling::FullStepPerPass);
    assert_eq!(scene.policy.boundary_mode, BoundaryMode::Reflect);
    assert_eq!(scene.policy.resolution, ResolutionMode::Sequential);
    assert!(scene.spawns.is_empty());
    assert_eq!(scene.simulate.dt, 0.01);
    assert_eq!(scene.simulate.frames, 100);
}

#[test]
fn test_full_particle_declaration() {
    let source = "particle at (-0.5, 1.0, 0.0) velocity (0.009, 0.0, 0.0) mass 1.0 color (0.1, 0.2, 0.3)\nsimulate dt = 0.01 frames = 1";
    let scene = parse_scene(source).unwrap();

    let particles: Vec<_> = scene.particles().collect();
    assert_eq!(particles.len(), 1);
    assert_eq!(particles[0].position, Vec3::new(-0.5, 1.0, 0.0));
    assert_eq!(particles[0].velocity, Vec3::new(0.009, 0.0, 0.0));
    assert_eq!(particles[0].mass, 1.0);
    assert_eq!(particles[0].color, Vec3::new(0.1, 0.2, 0.3));
}

#[test]
fn test_particle_optional_clauses_default() {
    let scene = parse_scene("particle at (1.0, 2.0, 3.0) mass 0.5\nsimulate dt = 0.01 frames = 1").unwrap();
    let p = scene.particles().next().unwrap();
    assert_eq!(p.velocity, Vec3::ZERO);
    assert_eq!(p.color, Vec3::ZERO);
}

#[test]
fn test_particle_clauses_any_order() {
    let scene = parse_scene(
        "particle mass 2.0 color (1.0, 1.0, 1.0) at (0.0, 0.1, 0.2) velocity (1.0, 0.0, 0.0)\nsimulate dt = 0.01 frames = 1",
    )
    .unwrap();
    let p = scene.particles().next().unwrap();
    assert_eq!(p.mass, 2.0);
    assert_eq!(p.position, Vec3::new(0.0, 0.1, 0.2));
}

#[test]
fn test_particle_zero_mass_parses() {
    // Mass validity is the analyzer's job
    let scene = parse_scene("particle at (0.0, 0.0, 0.0) mass 0.0\nsimulate dt = 0.01 frames = 1").unwrap();
    assert_eq!(scene.particles().next().unwrap().mass, 0.0);
}

#[test]
fn test_spawns_keep_file_order() {
    let source = r#"
particle at (0.0, 0.0, 0.0) mass 1.0
random 3 seed 9
particle at (0.5, 0.0, 0.0) mass 1.0
random 2
simulate dt = 0.01 frames = 1
"#;
    let scene = parse_scene(source).unwrap();
    assert_eq!(scene.spawns.len(), 4);
    assert!(matches!(scene.spawns[0], SpawnDecl::Particle(_)));
    assert!(matches!(&scene.spawns[1], SpawnDecl::Random(r) if r.count == 3 && r.seed == Some(9)));
    assert!(matches!(scene.spawns[2], SpawnDecl::Particle(_)));
    assert!(matches!(&scene.spawns[3], SpawnDecl::Random(r) if r.count == 2 && r.seed.is_none()));
    assert_eq!(scene.particle_count(), 7);
}

#[test]
fn test_domain_and_policy() {
    let source = r#"
# custom box
domain boundary = 2.0 substeps = 3
policy resolution = accumulated time = split boundary = clamp
simulate dt = 0.02 frames = 5
"#;
    let scene = parse_scene(source).unwrap();
    assert_eq!(scene.domain.radius, 0.05);
    assert_eq!(scene.domain.boundary, 2.0);
    assert_eq!(scene.domain.substeps, 3);
    assert_eq!(scene.policy.time_scaling, TimeScaling::SplitStep);
    assert_eq!(scene.policy.boundary_mode, BoundaryMode::Clamp);
    assert_eq!(scene.policy.resolution, ResolutionMode::Accumulated);

    let params = scene.params();
    assert_eq!(params.boundary, 2.0);
    assert_eq!(params.substeps, 3);
    assert_eq!(params.resolution, ResolutionMode::Accumulated);
}

#[test]
fn test_missing_simulate() {
    let result = parse_scene("particle at (1.0, 2.0, 0.0) mass 3.0");
    let err = result.unwrap_err();
    assert!(err.to_string().contains("simulate"));
}

#[test]
fn test_duplicate_simulate() {
    let result = parse_scene("simulate dt = 0.01 frames = 1\nsimulate dt = 0.02 frames = 1");
    assert!(result.is_err());
}

#[test]
fn test_two_component_vector_rejected() {
    let result = parse_scene("particle at (1.0, 2.0) mass 1.0\nsimulate dt = 0.01 frames = 1");
    assert!(result.is_err());
}

#[test]
fn test_missing_mass_rejected() {
    let err = parse_scene("particle at (1.0, 2.0, 0.0)\nsimulate dt = 0.01 frames = 1").unwrap_err();
    assert!(err.to_string().contains("mass"));
}

#[test]
fn test_unknown_policy_value_rejected() {
    let err = parse_scene("policy time = half\nsimulate dt = 0.01 frames = 1").unwrap_err();
    assert!(err.to_string().contains("half"));
}

#[test]
fn test_invalid_number_rejected() {
    assert!(parse_scene("simulate dt = fast frames = 1").is_err());
    assert!(parse_scene("simulate dt = 0.01 frames = -1").is_err());
    assert!(parse_scene("random many\nsimulate dt = 0.01 frames = 1").is_err());
}

#[test]
fn test_error_span_points_at_line() {
    let source = "domain radius = 0.05\nwobble 3\nsimulate dt = 0.01 frames = 1";
    let err = parse_scene(source).unwrap_err();
    let span = err.span().expect("span");
    assert_eq!(span.line_in(source), 1);
    assert_eq!(&source[span.start..span.end], "wobble 3\n");
}
