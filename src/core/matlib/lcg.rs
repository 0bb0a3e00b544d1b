use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, GeneratorError};
use crate::source::UniformSource;

/// Mantissa width of `f64`, including the implicit bit
const F64_DIGITS: u32 = 53;

/// Constants of a linear congruential generator `x <- (a*x + c) mod m`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LcgParams {
    pub modulus: u64,
    pub multiplier: u64,
    pub increment: u64,
}

impl LcgParams {
    /// Numerical Recipes constants over the Mersenne prime 2^31 - 1
    pub const fn numerical_recipes() -> Self {
        Self {
            modulus: (1 << 31) - 1,
            multiplier: 1_664_525,
            increment: 1_013_904_223,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.modulus < 2 {
            return Err(GeneratorError::InvalidModulus { modulus: self.modulus });
        }
        for (name, value) in [("multiplier", self.multiplier), ("increment", self.increment)] {
            if value >= self.modulus {
                return Err(GeneratorError::CoefficientOutOfRange {
                    name,
                    value,
                    modulus: self.modulus,
                });
            }
        }
        Ok(())
    }
}

impl Default for LcgParams {
    fn default() -> Self {
        Self::numerical_recipes()
    }
}

impl fmt::Display for LcgParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m={} a={} c={}", self.modulus, self.multiplier, self.increment)
    }
}

/// Linear congruential generator, the baseline the twister is compared against
#[derive(Debug, Clone)]
pub struct Lcg {
    params: LcgParams,
    state: u64,
}

impl Lcg {
    pub fn new(params: LcgParams, seed: u64) -> Result<Self> {
        params.validate()?;
        debug!(seed, modulus = params.modulus, "seeded lcg");
        Ok(Self {
            params,
            state: seed % params.modulus,
        })
    }

    /// Advance and return the new state in `[0, m)`
    pub fn next_raw(&mut self) -> u64 {
        let p = self.params;
        let next = (u128::from(p.multiplier) * u128::from(self.state) + u128::from(p.increment))
            % u128::from(p.modulus);
        self.state = next as u64;
        self.state
    }

    /// Advance and return `x / m`, always in `[0, 1)`.
    ///
    /// Moduli wider than 53 bits drop the low bits of both `x` and `m - 1`
    /// first, otherwise the quotient could round up to exactly 1.0.
    pub fn next_uniform(&mut self) -> f64 {
        let x = self.next_raw();
        let top = self.params.modulus - 1;
        let shift = (u64::BITS - top.leading_zeros()).saturating_sub(F64_DIGITS);
        (x >> shift) as f64 / ((top >> shift) + 1) as f64
    }

    pub fn params(&self) -> &LcgParams {
        &self.params
    }
}

impl UniformSource for Lcg {
    fn next_uniform(&mut self) -> Result<f64> {
        Ok(Lcg::next_uniform(self))
    }
}
