//! Pairwise overlap detection and impulse-based collision response.
//!
//! One call to [`CollisionResolver::resolve`] is one pass: every unordered
//! pair `(i, j)` with `i < j` is visited exactly once in collection order.
//! A pair is resolved only when it overlaps (`distance < 2r`) and is
//! approaching along the contact normal. Resolution pushes the two particles
//! apart by half the overlap each and applies a 1-D elastic impulse along the
//! normal; the tangential velocity is left alone.

use crate::particle::Particle;
use glam::Vec3;

/// Separations at or below this are treated as coincident.
pub const DEGENERATE_DISTANCE: f32 = 1e-6;

/// Normal used for coincident particles, where `d / |d|` is undefined.
///
/// A coincident pair whose relative velocity has no `x` component never
/// counts as approaching along this normal, so it is left unresolved and the
/// particles pass through each other.
pub const FALLBACK_NORMAL: Vec3 = Vec3::X;

/// How corrections from one pass are written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionMode {
    /// Single buffer: each pair's correction is applied immediately, so later
    /// pairs in the pass observe earlier updates. Results depend on
    /// collection order.
    #[default]
    Sequential,
    /// Every pair is evaluated against the state at the start of the pass and
    /// all corrections are applied once at the end. Each pair's correction is
    /// scaled by `1 / max(k_i, k_j)`, where `k` counts the resolved contacts
    /// of a particle in this pass, so momentum is conserved and kinetic
    /// energy never increases. Results do not depend on collection order.
    Accumulated,
}

/// Counters for one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Pairs closer than `2r`.
    pub contacts: usize,
    /// Contacts that were approaching and got resolved.
    pub resolved: usize,
    /// Contacts with coincident positions that used the fallback normal.
    pub degenerate: usize,
}

/// Geometry of an overlapping pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit vector from `j` toward `i`.
    pub normal: Vec3,
    pub distance: f32,
    /// `dot(v_i - v_j, normal)`; negative when approaching.
    pub approach: f32,
    pub degenerate: bool,
}

/// Corrections for a resolved pair. `i` moves by `+shift`, `j` by `-shift`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairResponse {
    pub shift: Vec3,
    pub dv_i: Vec3,
    pub dv_j: Vec3,
}

impl PairResponse {
    fn apply(&self, a: &mut Particle, b: &mut Particle) {
        a.set_position(a.position() + self.shift);
        b.set_position(b.position() - self.shift);
        a.set_velocity(a.velocity() + self.dv_i);
        b.set_velocity(b.velocity() + self.dv_j);
    }
}

/// Resolves overlaps between all particle pairs for one pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResolver {
    radius: f32,
    mode: ResolutionMode,
}

impl CollisionResolver {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            mode: ResolutionMode::Sequential,
        }
    }

    pub fn with_mode(mut self, mode: ResolutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn mode(&self) -> ResolutionMode {
        self.mode
    }

    /// Contact threshold, `2r`.
    pub fn contact_distance(&self) -> f32 {
        2.0 * self.radius
    }

    /// Run one resolution pass over `particles`.
    pub fn resolve(&self, particles: &mut [Particle]) -> PassStats {
        let stats = match self.mode {
            ResolutionMode::Sequential => self.resolve_sequential(particles),
            ResolutionMode::Accumulated => self.resolve_accumulated(particles),
        };
        if stats.contacts > 0 {
            log::trace!(
                "collision pass: {} contacts, {} resolved, {} degenerate",
                stats.contacts,
                stats.resolved,
                stats.degenerate
            );
        }
        stats
    }

    fn resolve_sequential(&self, particles: &mut [Particle]) -> PassStats {
        let mut stats = PassStats::default();
        let n = particles.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (head, tail) = particles.split_at_mut(j);
                let a = &mut head[i];
                let b = &mut tail[0];
                if let Some(response) = self.evaluate(i, j, a, b, &mut stats) {
                    response.apply(a, b);
                }
            }
        }
        stats
    }

    fn resolve_accumulated(&self, particles: &mut [Particle]) -> PassStats {
        let mut stats = PassStats::default();
        let n = particles.len();
        let mut resolved = Vec::new();
        let mut contacts = vec![0u32; n];

        for i in 0..n {
            for j in (i + 1)..n {
                if let Some(response) =
                    self.evaluate(i, j, &particles[i], &particles[j], &mut stats)
                {
                    contacts[i] += 1;
                    contacts[j] += 1;
                    resolved.push((i, j, response));
                }
            }
        }

        if resolved.is_empty() {
            return stats;
        }

        let mut dpos = vec![Vec3::ZERO; n];
        let mut dvel = vec![Vec3::ZERO; n];
        for (i, j, response) in resolved {
            let weight = 1.0 / contacts[i].max(contacts[j]) as f32;
            dpos[i] += response.shift * weight;
            dpos[j] -= response.shift * weight;
            dvel[i] += response.dv_i * weight;
            dvel[j] += response.dv_j * weight;
        }

        for (p, (dp, dv)) in particles.iter_mut().zip(dpos.iter().zip(&dvel)) {
            p.set_position(p.position() + *dp);
            p.set_velocity(p.velocity() + *dv);
        }
        stats
    }

    fn evaluate(
        &self,
        i: usize,
        j: usize,
        a: &Particle,
        b: &Particle,
        stats: &mut PassStats,
    ) -> Option<PairResponse> {
        let contact = self.contact(a, b)?;
        stats.contacts += 1;
        if contact.degenerate {
            stats.degenerate += 1;
            log::debug!(
                "particles {} and {} coincide, using fallback normal {:?}",
                i,
                j,
                FALLBACK_NORMAL
            );
        }
        let response = self.response(&contact, a.mass(), b.mass())?;
        stats.resolved += 1;
        Some(response)
    }

    /// Contact geometry for a pair, or `None` if they do not overlap.
    pub fn contact(&self, a: &Particle, b: &Particle) -> Option<Contact> {
        let d = a.position() - b.position();
        let distance = d.length();
        if !(distance < self.contact_distance()) {
            return None;
        }

        let (normal, distance, degenerate) = if distance <= DEGENERATE_DISTANCE {
            (FALLBACK_NORMAL, 0.0, true)
        } else {
            (d / distance, distance, false)
        };
        let approach = (a.velocity() - b.velocity()).dot(normal);

        Some(Contact {
            normal,
            distance,
            approach,
            degenerate,
        })
    }

    /// Positional correction and impulse for a contact, or `None` if the pair
    /// is not approaching.
    pub fn response(&self, contact: &Contact, mass_i: f32, mass_j: f32) -> Option<PairResponse> {
        if contact.approach >= 0.0 {
            return None;
        }

        let overlap = self.contact_distance() - contact.distance;
        let total_mass = mass_i + mass_j;
        let impulse_i = 2.0 * mass_j / total_mass * contact.approach;
        let impulse_j = 2.0 * mass_i / total_mass * contact.approach;

        Some(PairResponse {
            shift: contact.normal * (overlap / 2.0),
            dv_i: -contact.normal * impulse_i,
            dv_j: contact.normal * impulse_j,
        })
    }
}
