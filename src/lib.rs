//! Statistical validation of parameterized Mersenne Twister generators.
//!
//! The generators live in `matlib` and the distribution functions in
//! `stats`; this crate draws samples, runs the goodness-of-fit tests and
//! renders the results.

pub mod config;
pub mod error;
pub mod harness;
pub mod report;

pub use config::{LcgSet, ParameterSet, RunConfig};
pub use error::{HarnessError, Result};
pub use harness::{
    AcceptanceRate, Comparison, GeneratorSpec, Report, TestOutcome, DEFAULT_BINS,
    acceptance_rate, compare, generate_sample, run_goodness_of_fit, run_goodness_of_fit_binned,
};
pub use matlib::{Lcg, LcgParams, MersenneTwister, GeneratorError, TwisterParams, UniformSource, clock_seed};
pub use report::{write_json, write_text};
