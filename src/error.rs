use matlib::GeneratorError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HarnessError {
    #[error("cannot run a goodness-of-fit test on an empty sample")]
    EmptySample,

    #[error("significance level {alpha} must lie strictly between 0 and 1")]
    InvalidAlpha { alpha: f64 },

    #[error("chi-square test needs at least 2 bins, got {bins}")]
    InvalidBins { bins: usize },

    #[error("acceptance rate needs at least one trial")]
    NoTrials,

    #[error(transparent)]
    Generator(#[from] GeneratorError),
}
