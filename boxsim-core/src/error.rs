use crate::scene::ParseError;
use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the simulation core.
#[derive(Debug, Error)]
pub enum Error {
    /// Particle construction input violated an invariant (mass, color, finiteness).
    #[error("invalid particle: {0}")]
    InvalidParticle(String),

    /// Simulation parameters out of range.
    #[error("invalid simulation parameters: {0}")]
    InvalidParams(String),

    /// Scene file could not be parsed.
    #[error(transparent)]
    Scene(#[from] ParseError),

    /// Scene parsed but failed static analysis.
    #[error("scene analysis failed: {0}")]
    Analysis(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
