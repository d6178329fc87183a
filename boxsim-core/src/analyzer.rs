//! Static analysis for scenes
//!
//! Catches invalid values and likely-unintended setups before a scene is
//! turned into a simulation.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::scene::{ParticleDecl, Scene};
use crate::simulation::MAX_PARTICLES;
use crate::spawn::{POSITION_RANGE, VELOCITY_RANGE};

/// Analyze a scene and return diagnostics
pub fn analyze_scene(scene: &Scene) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    let domain = &scene.domain;

    if !domain.radius.is_finite() || domain.radius <= 0.0 {
        diagnostics.push(Diagnostic::error(
            format!("radius must be > 0, got {}", domain.radius),
            None,
        ));
    }
    if !domain.boundary.is_finite() || domain.boundary <= 0.0 {
        diagnostics.push(Diagnostic::error(
            format!("boundary must be > 0, got {}", domain.boundary),
            None,
        ));
    }
    if domain.substeps == 0 {
        diagnostics.push(Diagnostic::error("substeps must be at least 1", None));
    }

    let simulate = &scene.simulate;
    if !simulate.dt.is_finite() || simulate.dt <= 0.0 {
        diagnostics.push(Diagnostic::error(
            format!("dt must be > 0, got {}", simulate.dt),
            simulate.span,
        ));
    }

    let count = scene.particle_count();
    if count == 0 {
        diagnostics.push(Diagnostic::warning("scene spawns no particles", None));
    } else if count > MAX_PARTICLES {
        let span = scene.randoms().find_map(|r| r.span);
        diagnostics.push(Diagnostic::error(
            format!(
                "scene spawns {} particles, at most {} are allowed",
                count, MAX_PARTICLES
            ),
            span,
        ));
    }

    let params = scene.params();
    let pass_dt = params.pass_dt(simulate.dt);
    let contact_distance = 2.0 * domain.radius;

    let particles: Vec<&ParticleDecl> = scene.particles().collect();
    for (idx, p) in particles.iter().enumerate() {
        check_particle(idx, p, &mut diagnostics);

        if p.position.abs().max_element() > domain.boundary {
            diagnostics.push(Diagnostic::warning(
                format!(
                    "particle {} starts outside the boundary {}",
                    idx, domain.boundary
                ),
                p.span,
            ));
        }

        let step = p.velocity.length() * pass_dt;
        if step > contact_distance {
            diagnostics.push(Diagnostic::warning(
                format!(
                    "particle {} moves {} per pass, more than the contact distance {}; collisions may be missed",
                    idx, step, contact_distance
                ),
                p.span,
            ));
        }
    }

    for (i, a) in particles.iter().enumerate() {
        for (j, b) in particles.iter().enumerate().skip(i + 1) {
            if a.position.distance(b.position) < contact_distance {
                diagnostics.push(Diagnostic::warning(
                    format!("particles {} and {} start overlapping", i, j),
                    b.span,
                ));
            }
        }
    }

    for random in scene.randoms() {
        if POSITION_RANGE > domain.boundary {
            diagnostics.push(Diagnostic::warning(
                format!(
                    "random particles spawn in [-{}, {}], wider than the boundary {}",
                    POSITION_RANGE, POSITION_RANGE, domain.boundary
                ),
                random.span,
            ));
        }
        let max_speed = VELOCITY_RANGE * std::f32::consts::SQRT_2;
        if max_speed * pass_dt > contact_distance {
            diagnostics.push(Diagnostic::warning(
                "random particles may move more than the contact distance per pass",
                random.span,
            ));
        }
    }

    diagnostics
}

fn check_particle(idx: usize, p: &ParticleDecl, diagnostics: &mut Diagnostics) {
    if !p.mass.is_finite() || p.mass <= 0.0 {
        diagnostics.push(Diagnostic::error(
            format!("particle {} has mass {}, mass must be > 0", idx, p.mass),
            p.span,
        ));
    }
    if !p.position.is_finite() || !p.velocity.is_finite() {
        diagnostics.push(Diagnostic::error(
            format!("particle {} has a non-finite position or velocity", idx),
            p.span,
        ));
    }
    if !p.color.is_finite() || p.color.min_element() < 0.0 || p.color.max_element() > 1.0 {
        diagnostics.push(Diagnostic::error(
            format!("particle {} color components must lie in [0, 1]", idx),
            p.span,
        ));
    }
}
