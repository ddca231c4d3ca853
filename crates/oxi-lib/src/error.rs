use thiserror::Error;

/// Errors raised while constructing a processor or estimator.
///
/// Steady-state sample processing never fails; insufficient data shows up as
/// a missing reading instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("acquisition frequency must be greater than zero, got {0} Hz")]
    InvalidFrequency(u32),
    #[error("invalid processor configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
