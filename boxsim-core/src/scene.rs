//! Scene description files.
//!
//! A scene is a line-oriented text file. Blank lines and lines starting with
//! `#` are ignored; every other line starts with a keyword:
//!
//! ```text
//! domain radius = 0.05 boundary = 1.2 substeps = 5
//! policy time = full boundary = reflect resolution = sequential
//! particle at (-0.5, 1.0, 0.0) velocity (0.009, 0.0, 0.0) mass 1.0 color (0.0, 0.0, 0.0)
//! random 15 seed 42
//! simulate dt = 0.01 frames = 1000
//! ```
//!
//! `simulate` is required. `domain` and `policy` may appear once each and
//! any of their keys may be omitted. `particle` and `random` lines spawn
//! particles in the order they are written.

use crate::collision::ResolutionMode;
use crate::diagnostics::Span;
use crate::simulation::{
    BoundaryMode, SimulationParams, TimeScaling, DEFAULT_BOUNDARY, DEFAULT_RADIUS,
    DEFAULT_SUBSTEPS,
};
use glam::Vec3;
use thiserror::Error;

/// Parse error with optional span information
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{message}")]
    SyntaxError {
        message: String,
        span: Option<Span>,
    },
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Option<Span>) -> Self {
        Self::SyntaxError {
            message: message.into(),
            span,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::SyntaxError {
            message: message.into(),
            span: None,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::SyntaxError { span, .. } => *span,
        }
    }
}

/// `domain` line. Keys left out keep the simulation defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainDecl {
    pub radius: f32,
    pub boundary: f32,
    pub substeps: u32,
}

impl Default for DomainDecl {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            boundary: DEFAULT_BOUNDARY,
            substeps: DEFAULT_SUBSTEPS,
        }
    }
}

/// `policy` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PolicyDecl {
    pub time_scaling: TimeScaling,
    pub boundary_mode: BoundaryMode,
    pub resolution: ResolutionMode,
}

/// `particle at (x, y, z) [velocity (x, y, z)] mass m [color (r, g, b)]`
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleDecl {
    pub position: Vec3,
    pub velocity: Vec3,
    pub mass: f32,
    pub color: Vec3,
    pub span: Option<Span>,
}

/// `random N [seed S]`
#[derive(Debug, Clone, PartialEq)]
pub struct RandomDecl {
    pub count: usize,
    pub seed: Option<u64>,
    pub span: Option<Span>,
}

/// A line that adds particles.
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnDecl {
    Particle(ParticleDecl),
    Random(RandomDecl),
}

/// `simulate dt = x frames = n`
#[derive(Debug, Clone, PartialEq)]
pub struct SimulateDecl {
    pub dt: f32,
    pub frames: u32,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub domain: DomainDecl,
    pub policy: PolicyDecl,
    pub spawns: Vec<SpawnDecl>,
    pub simulate: SimulateDecl,
}

impl Scene {
    pub fn params(&self) -> SimulationParams {
        SimulationParams {
            radius: self.domain.radius,
            boundary: self.domain.boundary,
            substeps: self.domain.substeps,
            time_scaling: self.policy.time_scaling,
            boundary_mode: self.policy.boundary_mode,
            resolution: self.policy.resolution,
        }
    }

    pub fn particles(&self) -> impl Iterator<Item = &ParticleDecl> {
        self.spawns.iter().filter_map(|s| match s {
            SpawnDecl::Particle(p) => Some(p),
            SpawnDecl::Random(_) => None,
        })
    }

    pub fn randoms(&self) -> impl Iterator<Item = &RandomDecl> {
        self.spawns.iter().filter_map(|s| match s {
            SpawnDecl::Random(r) => Some(r),
            SpawnDecl::Particle(_) => None,
        })
    }

    /// Number of particles the scene spawns.
    pub fn particle_count(&self) -> usize {
        self.spawns
            .iter()
            .map(|s| match s {
                SpawnDecl::Particle(_) => 1,
                SpawnDecl::Random(r) => r.count,
            })
            .fold(0usize, usize::saturating_add)
    }
}

/// Helper to track byte offsets while parsing
struct ParseContext {
    line_offsets: Vec<usize>, // Byte offset of start of each line
    len: usize,
}

impl ParseContext {
    fn new(source: &str) -> Self {
        let mut line_offsets = vec![0];
        let mut offset = 0;
        for ch in source.chars() {
            offset += ch.len_utf8();
            if ch == '\n' {
                line_offsets.push(offset);
            }
        }
        Self {
            line_offsets,
            len: source.len(),
        }
    }

    /// Span of the whole line, including its newline.
    fn full_line_span(&self, line: usize) -> Span {
        let start = self.line_offsets.get(line).copied().unwrap_or(self.len);
        let end = self.line_offsets.get(line + 1).copied().unwrap_or(self.len);
        Span::new(start, end)
    }
}

/// Parse a scene from source text
pub fn parse_scene(source: &str) -> Result<Scene, ParseError> {
    let ctx = ParseContext::new(source);
    let mut domain = None;
    let mut policy = None;
    let mut spawns = Vec::new();
    let mut simulate = None;

    for (i, raw) in source.lines().enumerate() {
        let line = raw.trim();
        let span = Some(ctx.full_line_span(i));

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let keyword = line.split_whitespace().next().unwrap_or("");
        match keyword {
            "domain" => {
                if domain.is_some() {
                    return Err(ParseError::new("Duplicate 'domain' declaration", span));
                }
                domain = Some(parse_domain(line, span)?);
            }
            "policy" => {
                if policy.is_some() {
                    return Err(ParseError::new("Duplicate 'policy' declaration", span));
                }
                policy = Some(parse_policy(line, span)?);
            }
            "particle" => spawns.push(SpawnDecl::Particle(parse_particle(line, span)?)),
            "random" => spawns.push(SpawnDecl::Random(parse_random(line, span)?)),
            "simulate" => {
                if simulate.is_some() {
                    return Err(ParseError::new("Duplicate 'simulate' declaration", span));
                }
                simulate = Some(parse_simulate(line, span)?);
            }
            other => {
                return Err(ParseError::new(format!("Unexpected token: {}", other), span));
            }
        }
    }

    let simulate =
        simulate.ok_or_else(|| ParseError::message("Missing 'simulate' declaration"))?;

    Ok(Scene {
        domain: domain.unwrap_or_default(),
        policy: policy.unwrap_or_default(),
        spawns,
        simulate,
    })
}

/// Parse `domain radius = r boundary = b substeps = s`
fn parse_domain(line: &str, span: Option<Span>) -> Result<DomainDecl, ParseError> {
    let rest = strip_keyword(line, "domain", span)?;
    let mut decl = DomainDecl::default();

    for (key, value) in parse_assignments(rest, line, span)? {
        match key {
            "radius" => decl.radius = parse_f32(value, span)?,
            "boundary" => decl.boundary = parse_f32(value, span)?,
            "substeps" => decl.substeps = parse_u32(value, span)?,
            _ => {
                return Err(ParseError::new(
                    format!("Unknown domain key '{}': {}", key, line),
                    span,
                ));
            }
        }
    }

    Ok(decl)
}

/// Parse `policy time = full|split boundary = reflect|clamp resolution = sequential|accumulated`
fn parse_policy(line: &str, span: Option<Span>) -> Result<PolicyDecl, ParseError> {
    let rest = strip_keyword(line, "policy", span)?;
    let mut decl = PolicyDecl::default();

    for (key, value) in parse_assignments(rest, line, span)? {
        match (key, value) {
            ("time", "full") => decl.time_scaling = TimeScaling::FullStepPerPass,
            ("time", "split") => decl.time_scaling = TimeScaling::SplitStep,
            ("boundary", "reflect") => decl.boundary_mode = BoundaryMode::Reflect,
            ("boundary", "clamp") => decl.boundary_mode = BoundaryMode::Clamp,
            ("resolution", "sequential") => decl.resolution = ResolutionMode::Sequential,
            ("resolution", "accumulated") => decl.resolution = ResolutionMode::Accumulated,
            ("time", _) | ("boundary", _) | ("resolution", _) => {
                return Err(ParseError::new(
                    format!("Unknown value '{}' for policy '{}'", value, key),
                    span,
                ));
            }
            _ => {
                return Err(ParseError::new(
                    format!("Unknown policy key '{}': {}", key, line),
                    span,
                ));
            }
        }
    }

    Ok(decl)
}

/// Parse a particle declaration. Clauses may come in any order after `particle`.
fn parse_particle(line: &str, span: Option<Span>) -> Result<ParticleDecl, ParseError> {
    let mut rest = strip_keyword(line, "particle", span)?;
    let mut position = None;
    let mut velocity = None;
    let mut mass = None;
    let mut color = None;

    while !rest.is_empty() {
        let (clause, after) = take_token(rest);
        rest = match clause {
            "at" | "velocity" | "color" => {
                let (value, remaining) = take_vec3(after, line, span)?;
                let slot = match clause {
                    "at" => &mut position,
                    "velocity" => &mut velocity,
                    _ => &mut color,
                };
                if slot.replace(value).is_some() {
                    return Err(ParseError::new(
                        format!("Duplicate '{}' in particle declaration: {}", clause, line),
                        span,
                    ));
                }
                remaining
            }
            "mass" => {
                let (token, remaining) = take_token(after);
                if token.is_empty() {
                    return Err(ParseError::new(
                        format!("Expected value after 'mass': {}", line),
                        span,
                    ));
                }
                if mass.replace(parse_f32(token, span)?).is_some() {
                    return Err(ParseError::new(
                        format!("Duplicate 'mass' in particle declaration: {}", line),
                        span,
                    ));
                }
                remaining
            }
            other => {
                return Err(ParseError::new(
                    format!("Unexpected '{}' in particle declaration: {}", other, line),
                    span,
                ));
            }
        };
    }

    let position = position.ok_or_else(|| {
        ParseError::new(format!("Expected 'at' in particle declaration: {}", line), span)
    })?;
    let mass = mass.ok_or_else(|| {
        ParseError::new(format!("Expected 'mass' in particle declaration: {}", line), span)
    })?;

    Ok(ParticleDecl {
        position,
        velocity: velocity.unwrap_or(Vec3::ZERO),
        mass,
        color: color.unwrap_or(Vec3::ZERO),
        span,
    })
}

/// Parse `random N` or `random N seed S`
fn parse_random(line: &str, span: Option<Span>) -> Result<RandomDecl, ParseError> {
    let rest = strip_keyword(line, "random", span)?;
    let tokens: Vec<&str> = rest.split_whitespace().collect();

    let (count, seed) = match tokens.as_slice() {
        [count] => (*count, None),
        [count, "seed", seed] => (*count, Some(*seed)),
        _ => {
            return Err(ParseError::new(
                format!("Expected 'random <count> [seed <seed>]': {}", line),
                span,
            ));
        }
    };

    let count = count.parse::<usize>().map_err(|_| {
        ParseError::new(format!("Invalid particle count '{}'", count), span)
    })?;
    let seed = seed
        .map(|s| {
            s.parse::<u64>()
                .map_err(|_| ParseError::new(format!("Invalid seed '{}'", s), span))
        })
        .transpose()?;

    Ok(RandomDecl { count, seed, span })
}

/// Parse `simulate dt = x frames = n`
fn parse_simulate(line: &str, span: Option<Span>) -> Result<SimulateDecl, ParseError> {
    let rest = strip_keyword(line, "simulate", span)?;
    let mut dt = None;
    let mut frames = None;

    for (key, value) in parse_assignments(rest, line, span)? {
        match key {
            "dt" => dt = Some(parse_f32(value, span)?),
            "frames" => frames = Some(parse_u32(value, span)?),
            _ => {
                return Err(ParseError::new(
                    format!("Unknown simulate key '{}': {}", key, line),
                    span,
                ));
            }
        }
    }

    let dt = dt
        .ok_or_else(|| ParseError::new(format!("Expected 'dt =' in simulate: {}", line), span))?;
    let frames = frames.ok_or_else(|| {
        ParseError::new(format!("Expected 'frames =' in simulate: {}", line), span)
    })?;

    Ok(SimulateDecl { dt, frames, span })
}

// ============================================================================
// Lexical helpers
// ============================================================================

fn strip_keyword<'a>(line: &'a str, keyword: &str, span: Option<Span>) -> Result<&'a str, ParseError> {
    line.strip_prefix(keyword)
        .map(str::trim)
        .ok_or_else(|| ParseError::new(format!("Expected '{}' keyword", keyword), span))
}

/// Split off the first whitespace-delimited token.
fn take_token(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], text[end..].trim_start()),
        None => (text, ""),
    }
}

/// Parse a leading `(x, y, z)` and return the remaining text.
fn take_vec3<'a>(text: &'a str, line: &str, span: Option<Span>) -> Result<(Vec3, &'a str), ParseError> {
    let text = text.trim_start();
    let inner = text.strip_prefix('(').ok_or_else(|| {
        ParseError::new(format!("Expected '(' in vector: {}", line), span)
    })?;
    let close = inner.find(')').ok_or_else(|| {
        ParseError::new(format!("Expected ')' in vector: {}", line), span)
    })?;

    let coords: Vec<&str> = inner[..close].split(',').map(|s| s.trim()).collect();
    if coords.len() != 3 {
        return Err(ParseError::new(
            format!("Expected three components in vector: {}", line),
            span,
        ));
    }

    let value = Vec3::new(
        parse_f32(coords[0], span)?,
        parse_f32(coords[1], span)?,
        parse_f32(coords[2], span)?,
    );
    Ok((value, inner[close + 1..].trim_start()))
}

/// Parse `key = value key = value ...`
fn parse_assignments<'a>(
    text: &'a str,
    line: &str,
    span: Option<Span>,
) -> Result<Vec<(&'a str, &'a str)>, ParseError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() % 3 != 0 {
        return Err(ParseError::new(
            format!("Expected 'key = value' pairs: {}", line),
            span,
        ));
    }

    tokens
        .chunks(3)
        .map(|chunk| match chunk {
            [key, "=", value] => Ok((*key, *value)),
            _ => Err(ParseError::new(
                format!("Expected 'key = value' pairs: {}", line),
                span,
            )),
        })
        .collect()
}

fn parse_f32(text: &str, span: Option<Span>) -> Result<f32, ParseError> {
    text.parse::<f32>()
        .map_err(|_| ParseError::new(format!("Invalid number '{}'", text), span))
}

fn parse_u32(text: &str, span: Option<Span>) -> Result<u32, ParseError> {
    text.parse::<u32>()
        .map_err(|_| ParseError::new(format!("Invalid integer '{}'", text), span))
}
