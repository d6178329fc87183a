//! Collision response on isolated pairs

use boxsim_core::collision::{CollisionResolver, FALLBACK_NORMAL};
use boxsim_core::tests::test_helpers::{
    approx_eq_f32, massive_particle, unit_particle, vec3_approx_eq,
};
use boxsim_core::Particle;
use glam::Vec3;

const RADIUS: f32 = 0.05;

fn head_on_pair() -> Vec<Particle> {
    vec![
        unit_particle(Vec3::new(-0.04, 0.0, 0.0), Vec3::new(0.01, 0.0, 0.0)),
        unit_particle(Vec3::new(0.04, 0.0, 0.0), Vec3::new(-0.01, 0.0, 0.0)),
    ]
}

fn oblique_pair() -> Vec<Particle> {
    vec![
        massive_particle(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.5, 0.0), 2.0),
        massive_particle(Vec3::new(0.06, 0.03, 0.0), Vec3::new(-1.0, 0.2, 0.1), 0.5),
    ]
}

#[test]
fn test_head_on_equal_masses_swap_velocities() {
    let resolver = CollisionResolver::new(RADIUS);
    let mut particles = head_on_pair();

    let stats = resolver.resolve(&mut particles);
    assert_eq!(stats.resolved, 1);

    // Velocities exchange along the normal
    assert!(vec3_approx_eq(particles[0].velocity(), Vec3::new(-0.01, 0.0, 0.0), 1e-6));
    assert!(vec3_approx_eq(particles[1].velocity(), Vec3::new(0.01, 0.0, 0.0), 1e-6));

    // overlap = 0.1 - 0.08, each pushed by half of it
    assert!(vec3_approx_eq(particles[0].position(), Vec3::new(-0.05, 0.0, 0.0), 1e-6));
    assert!(vec3_approx_eq(particles[1].position(), Vec3::new(0.05, 0.0, 0.0), 1e-6));
}

#[test]
fn test_momentum_conserved() {
    let resolver = CollisionResolver::new(RADIUS);
    let mut particles = oblique_pair();
    let before: Vec3 = particles.iter().map(Particle::momentum).sum();

    let stats = resolver.resolve(&mut particles);
    assert_eq!(stats.resolved, 1, "pair should be approaching");

    let after: Vec3 = particles.iter().map(Particle::momentum).sum();
    assert!(vec3_approx_eq(before, after, 1e-5), "{:?} != {:?}", before, after);
}

#[test]
fn test_kinetic_energy_conserved() {
    let resolver = CollisionResolver::new(RADIUS);
    let mut particles = oblique_pair();
    let before: f32 = particles.iter().map(Particle::kinetic_energy).sum();

    resolver.resolve(&mut particles);

    let after: f32 = particles.iter().map(Particle::kinetic_energy).sum();
    assert!(approx_eq_f32(before, after, 1e-4));
}

#[test]
fn test_tangential_velocity_untouched() {
    let resolver = CollisionResolver::new(RADIUS);
    let mut particles = oblique_pair();
    let normal = (particles[0].position() - particles[1].position()).normalize();
    let tangential = |v: Vec3| v - normal * v.dot(normal);
    let before = [
        tangential(particles[0].velocity()),
        tangential(particles[1].velocity()),
    ];

    resolver.resolve(&mut particles);

    assert!(vec3_approx_eq(tangential(particles[0].velocity()), before[0], 1e-5));
    assert!(vec3_approx_eq(tangential(particles[1].velocity()), before[1], 1e-5));
}

#[test]
fn test_heavier_particle_deflects_less() {
    let resolver = CollisionResolver::new(RADIUS);
    let mut particles = vec![
        massive_particle(Vec3::new(-0.04, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 9.0),
        massive_particle(Vec3::new(0.04, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0), 1.0),
    ];

    resolver.resolve(&mut particles);

    // 1-D elastic: v1' = (m1 - m2)/M v1 + 2 m2/M v2, v2' = 2 m1/M v1 + (m2 - m1)/M v2
    assert!(approx_eq_f32(particles[0].velocity().x, 0.6, 1e-5));
    assert!(approx_eq_f32(particles[1].velocity().x, 2.6, 1e-5));
}

#[test]
fn test_separating_pair_untouched() {
    let resolver = CollisionResolver::new(RADIUS);
    let mut particles = vec![
        unit_particle(Vec3::new(-0.04, 0.0, 0.0), Vec3::new(-0.01, 0.0, 0.0)),
        unit_particle(Vec3::new(0.04, 0.0, 0.0), Vec3::new(0.01, 0.0, 0.0)),
    ];
    let before = particles.clone();

    let stats = resolver.resolve(&mut particles);

    assert_eq!(stats.contacts, 1);
    assert_eq!(stats.resolved, 0);
    assert_eq!(particles, before);
}

#[test]
fn test_resting_overlap_untouched() {
    // approach == 0: overlapping but moving together
    let resolver = CollisionResolver::new(RADIUS);
    let mut particles = vec![
        unit_particle(Vec3::new(-0.01, 0.0, 0.0), Vec3::new(0.3, 0.1, 0.0)),
        unit_particle(Vec3::new(0.01, 0.0, 0.0), Vec3::new(0.3, 0.1, 0.0)),
    ];
    let before = particles.clone();

    resolver.resolve(&mut particles);

    assert_eq!(particles, before);
}

#[test]
fn test_penetration_reduced() {
    let resolver = CollisionResolver::new(RADIUS);
    let mut particles = oblique_pair();
    let before = particles[0].position().distance(particles[1].position());

    resolver.resolve(&mut particles);

    let after = particles[0].position().distance(particles[1].position());
    assert!(after > before, "distance should grow: {} -> {}", before, after);
    assert!(approx_eq_f32(after, 2.0 * RADIUS, 1e-5));
}

#[test]
fn test_no_overlap_is_idempotent() {
    let resolver = CollisionResolver::new(RADIUS);
    let mut particles = vec![
        unit_particle(Vec3::new(-0.5, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
        unit_particle(Vec3::new(0.5, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)),
        unit_particle(Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.0, -1.0, 0.0)),
        unit_particle(Vec3::new(0.0, 0.0, 0.11), Vec3::new(0.0, 0.0, -1.0)),
    ];
    let before = particles.clone();

    for _ in 0..3 {
        let stats = resolver.resolve(&mut particles);
        assert_eq!(stats.contacts, 0);
    }

    assert_eq!(particles, before);
}

#[test]
fn test_touching_exactly_is_not_contact() {
    let resolver = CollisionResolver::new(0.5);
    let mut particles = vec![
        unit_particle(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
        unit_particle(Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)),
    ];
    let before = particles.clone();

    let stats = resolver.resolve(&mut particles);

    assert_eq!(stats.contacts, 0);
    assert_eq!(particles, before);
}

#[test]
fn test_coincident_approaching_pair_stays_finite() {
    let resolver = CollisionResolver::new(RADIUS);
    let mut particles = vec![
        unit_particle(Vec3::new(0.2, 0.2, 0.0), Vec3::new(-1.0, 0.0, 0.0)),
        unit_particle(Vec3::new(0.2, 0.2, 0.0), Vec3::new(1.0, 0.0, 0.0)),
    ];

    let stats = resolver.resolve(&mut particles);

    assert_eq!(stats.degenerate, 1);
    assert_eq!(stats.resolved, 1);
    for p in &particles {
        assert!(p.position().is_finite());
        assert!(p.velocity().is_finite());
    }
    // Pushed apart along the fallback normal by the full contact distance
    let separation = particles[0].position() - particles[1].position();
    assert!(vec3_approx_eq(separation, FALLBACK_NORMAL * 2.0 * RADIUS, 1e-6));
    assert!(vec3_approx_eq(particles[0].velocity(), Vec3::new(1.0, 0.0, 0.0), 1e-6));
    assert!(vec3_approx_eq(particles[1].velocity(), Vec3::new(-1.0, 0.0, 0.0), 1e-6));
}

#[test]
fn test_coincident_resting_pair_untouched() {
    let resolver = CollisionResolver::new(RADIUS);
    let mut particles = vec![
        unit_particle(Vec3::ZERO, Vec3::new(0.0, 0.5, 0.0)),
        unit_particle(Vec3::ZERO, Vec3::new(0.0, 0.5, 0.0)),
    ];
    let before = particles.clone();

    let stats = resolver.resolve(&mut particles);

    assert_eq!(stats.degenerate, 1);
    assert_eq!(stats.resolved, 0);
    assert_eq!(particles, before);
}
