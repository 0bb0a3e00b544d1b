use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Failures raised while configuring or drawing from a generator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("word size w={w} is outside [2, 64]")]
    InvalidWordSize { w: u32 },

    #[error("state size n={n} must be at least 2")]
    InvalidStateSize { n: usize },

    #[error("twist offset m={m} must lie in [1, {n})")]
    InvalidTwistOffset { m: usize, n: usize },

    #[error("separation bit r={r} must lie in [0, {w})")]
    InvalidSeparationBit { r: u32, w: u32 },

    #[error("shift {name}={value} must lie in [0, {w})")]
    InvalidShift { name: &'static str, value: u32, w: u32 },

    #[error("constant {name}={value:#x} does not fit in {w} bits")]
    MaskOutOfRange { name: &'static str, value: u64, w: u32 },

    #[error("LCG modulus {modulus} must be at least 2")]
    InvalidModulus { modulus: u64 },

    #[error("LCG {name}={value} must be below the modulus {modulus}")]
    CoefficientOutOfRange { name: &'static str, value: u64, modulus: u64 },

    #[error("generator has not been seeded")]
    Uninitialized,
}
