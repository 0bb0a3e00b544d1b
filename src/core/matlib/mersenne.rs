//! Mersenne Twister with every constant exposed as a parameter.
//!
//! Words are held in `u64` regardless of `w`. Every arithmetic step wraps at
//! 64 bits and is then masked to `w` bits; because `w <= 64`, this is the same
//! as reducing modulo `2^w`, so sequences match an unbounded-integer
//! implementation bit for bit.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Result, GeneratorError};
use crate::source::UniformSource;

/// Mantissa width of `f64`, including the implicit bit
const F64_DIGITS: u32 = 53;

/// Constants of a Mersenne Twister variant.
///
/// `Default` gives the canonical 32-bit MT19937 constants, and every field is
/// optional when deserializing so a configuration only has to name the
/// constants it changes. The word constants `a`, `d`, `b`, `c` and `f` also
/// accept strings (`"0xB502_6F5A_A966_19E9"` or decimal), since TOML integers
/// stop at `i64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwisterParams {
    /// Word width in bits
    pub w: u32,
    /// Number of words in the state vector
    pub n: usize,
    /// Twist offset
    pub m: usize,
    /// Number of bits in the lower mask
    pub r: u32,
    /// Twist matrix coefficient
    #[serde(deserialize_with = "deserialize_word")]
    pub a: u64,
    pub u: u32,
    #[serde(deserialize_with = "deserialize_word")]
    pub d: u64,
    pub s: u32,
    #[serde(deserialize_with = "deserialize_word")]
    pub b: u64,
    pub t: u32,
    #[serde(deserialize_with = "deserialize_word")]
    pub c: u64,
    pub l: u32,
    /// Seeding multiplier
    #[serde(deserialize_with = "deserialize_word")]
    pub f: u64,
}

fn deserialize_word<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Word {
        Int(u64),
        Text(String),
    }

    match Word::deserialize(deserializer)? {
        Word::Int(value) => Ok(value),
        Word::Text(text) => parse_word(&text).map_err(serde::de::Error::custom),
    }
}

/// Parse `0x`-prefixed hex or decimal, `_` separators allowed
fn parse_word(text: &str) -> std::result::Result<u64, String> {
    let digits: String = text.trim().chars().filter(|&ch| ch != '_').collect();
    let parsed = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => digits.parse(),
    };
    parsed.map_err(|e| format!("invalid word constant {text:?}: {e}"))
}

impl TwisterParams {
    /// The standard 32-bit generator (MT19937)
    pub const fn mt19937() -> Self {
        Self {
            w: 32,
            n: 624,
            m: 397,
            r: 31,
            a: 0x9908_B0DF,
            u: 11,
            d: 0xFFFF_FFFF,
            s: 7,
            b: 0x9D2C_5680,
            t: 15,
            c: 0xEFC6_0000,
            l: 18,
            f: 1_812_433_253,
        }
    }

    /// Check every range constraint on the constants.
    pub fn validate(&self) -> Result<()> {
        let w = self.w;
        if !(2..=64).contains(&w) {
            return Err(GeneratorError::InvalidWordSize { w });
        }
        if self.n < 2 {
            return Err(GeneratorError::InvalidStateSize { n: self.n });
        }
        if self.m == 0 || self.m >= self.n {
            return Err(GeneratorError::InvalidTwistOffset { m: self.m, n: self.n });
        }
        if self.r >= w {
            return Err(GeneratorError::InvalidSeparationBit { r: self.r, w });
        }

        for (name, value) in [("u", self.u), ("s", self.s), ("t", self.t), ("l", self.l)] {
            if value >= w {
                return Err(GeneratorError::InvalidShift { name, value, w });
            }
        }

        let mask = self.word_mask();
        for (name, value) in [("a", self.a), ("d", self.d), ("b", self.b), ("c", self.c)] {
            if value & !mask != 0 {
                return Err(GeneratorError::MaskOutOfRange { name, value, w });
            }
        }

        Ok(())
    }

    /// `2^w - 1`
    pub fn word_mask(&self) -> u64 {
        if self.w >= 64 {
            u64::MAX
        } else {
            (1u64 << self.w) - 1
        }
    }
}

impl Default for TwisterParams {
    fn default() -> Self {
        Self::mt19937()
    }
}

impl fmt::Display for TwisterParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "w={} n={} m={} r={} a={:#x} u={} d={:#x} s={} b={:#x} t={} c={:#x} l={} f={}",
            self.w, self.n, self.m, self.r, self.a, self.u, self.d, self.s, self.b, self.t, self.c,
            self.l, self.f
        )
    }
}

/// Seed derived from the wall clock (whole seconds since the Unix epoch).
///
/// Only for interactive runs; anything that must be reproducible passes an
/// explicit seed instead.
pub fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// Parameterized Mersenne Twister generator.
///
/// One instance owns its state exclusively. Extraction mutates the state in
/// place, so sharing an instance between threads needs outside locking;
/// separate instances are fully independent.
#[derive(Debug, Clone)]
pub struct MersenneTwister {
    params: TwisterParams,
    mask: u64,
    upper_mask: u64,
    lower_mask: u64,
    state: Vec<u64>,
    /// Next word to temper. `n` means exhausted, `n + 1` means never seeded.
    index: usize,
    twists: u64,
}

impl MersenneTwister {
    /// Build a generator and seed it.
    pub fn new(params: TwisterParams, seed: u64) -> Result<Self> {
        let mut generator = Self::unseeded(params)?;
        generator.seed(seed);
        Ok(generator)
    }

    /// Canonical MT19937 with the given seed
    pub fn mt19937(seed: u64) -> Self {
        let params = TwisterParams::mt19937();
        let mut generator = Self::with_valid_params(params);
        generator.seed(seed);
        generator
    }

    /// Build a generator that refuses to produce output until [`seed`] is called.
    ///
    /// [`seed`]: MersenneTwister::seed
    pub fn unseeded(params: TwisterParams) -> Result<Self> {
        params.validate()?;
        Ok(Self::with_valid_params(params))
    }

    /// Seed from the wall clock. See [`clock_seed`].
    pub fn time_seeded(params: TwisterParams) -> Result<Self> {
        Self::new(params, clock_seed())
    }

    fn with_valid_params(params: TwisterParams) -> Self {
        let mask = params.word_mask();
        let lower_mask = (1u64 << params.r) - 1;
        Self {
            params,
            mask,
            upper_mask: mask & !lower_mask,
            lower_mask,
            state: vec![0; params.n],
            index: params.n + 1,
            twists: 0,
        }
    }

    /// Reinitialize the state from `value`, reduced modulo `2^w`.
    ///
    /// Reseeding with the same value restarts the exact same sequence.
    pub fn seed(&mut self, value: u64) {
        let n = self.state.len();
        let shift = self.params.w - 2;
        let f = self.params.f;

        self.state[0] = value & self.mask;
        for i in 1..n {
            let prev = self.state[i - 1];
            let temp = prev ^ (prev >> shift);
            self.state[i] = f.wrapping_mul(temp).wrapping_add(i as u64) & self.mask;
        }

        self.index = n;
        self.twists = 0;
        debug!(seed = value, w = self.params.w, n, "seeded mersenne twister");
    }

    /// Regenerate the whole state vector.
    ///
    /// The update runs in place for `i = 0..n`: word `i` reads its successor
    /// and word `(i + m) mod n`, which for wrapped indices were already
    /// rewritten earlier in the same pass. That ordering defines the output
    /// sequence and must not change.
    fn twist(&mut self) -> Result<()> {
        let n = self.state.len();
        if self.index > n {
            return Err(GeneratorError::Uninitialized);
        }

        let m = self.params.m;
        let a = self.params.a;
        for i in 0..n {
            let x = (self.state[i] & self.upper_mask) | (self.state[(i + 1) % n] & self.lower_mask);
            let mut x_a = x >> 1;
            if x & 1 == 1 {
                x_a ^= a;
            }
            self.state[i] = self.state[(i + m) % n] ^ x_a;
        }

        self.index = 0;
        self.twists += 1;
        trace!(twists = self.twists, "twisted state vector");
        Ok(())
    }

    /// Next raw word in `[0, 2^w)`.
    pub fn extract(&mut self) -> Result<u64> {
        let n = self.state.len();
        if self.index > n {
            return Err(GeneratorError::Uninitialized);
        }
        if self.index == n {
            self.twist()?;
        }

        let p = self.params;
        let mut y = self.state[self.index];
        y ^= (y >> p.u) & p.d;
        y ^= (y << p.s) & p.b;
        y ^= (y << p.t) & p.c;
        y ^= y >> p.l;

        self.index += 1;
        Ok(y & self.mask)
    }

    /// Next variate in `[0, 1)`: `extract() / 2^w`.
    ///
    /// Words wider than 53 bits lose their low bits first, otherwise the
    /// quotient could round up to exactly 1.0.
    pub fn next_uniform(&mut self) -> Result<f64> {
        let y = self.extract()?;
        let w = self.params.w;
        if w > F64_DIGITS {
            Ok((y >> (w - F64_DIGITS)) as f64 / 2f64.powi(F64_DIGITS as i32))
        } else {
            Ok(y as f64 / 2f64.powi(w as i32))
        }
    }

    pub fn is_seeded(&self) -> bool {
        self.index <= self.state.len()
    }

    pub fn params(&self) -> &TwisterParams {
        &self.params
    }

    /// Number of state regenerations since the last seed
    pub fn twist_count(&self) -> u64 {
        self.twists
    }

    /// Concatenate extracted words and keep the top `bits` bits (`bits <= 64`).
    fn next_bits(&mut self, bits: u32) -> Result<u64> {
        let w = self.params.w;
        let mut acc: u128 = 0;
        let mut have = 0;
        while have < bits {
            acc = (acc << w) | u128::from(self.extract()?);
            have += w;
        }
        Ok((acc >> (have - bits)) as u64)
    }
}

impl UniformSource for MersenneTwister {
    fn next_uniform(&mut self) -> Result<f64> {
        MersenneTwister::next_uniform(self)
    }
}

/// Lets the generator drive anything in the `rand` ecosystem.
///
/// # Panics
///
/// The infallible methods panic on a generator that was never seeded; use
/// `try_fill_bytes` to get the error instead.
impl RngCore for MersenneTwister {
    fn next_u32(&mut self) -> u32 {
        match self.next_bits(32) {
            Ok(bits) => bits as u32,
            Err(e) => panic!("mersenne twister: {e}"),
        }
    }

    fn next_u64(&mut self) -> u64 {
        match self.next_bits(64) {
            Ok(bits) => bits,
            Err(e) => panic!("mersenne twister: {e}"),
        }
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        if let Err(e) = self.try_fill_bytes(dest) {
            panic!("mersenne twister: {e}");
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_bits(64).map_err(rand::Error::new)?.to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
        Ok(())
    }
}
