//! Uniformity testing of generator output.
//!
//! Computation only: nothing in here prints. Rendering lives in
//! [`crate::report`].

use matlib::{Lcg, LcgParams, MersenneTwister, TwisterParams, UniformSource};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::error::{HarnessError, Result};

/// Number of equal-width bins used by the chi-square test unless told otherwise
pub const DEFAULT_BINS: usize = 10;

/// Draw `count` variates from `source`, in generation order.
pub fn generate_sample<S: UniformSource + ?Sized>(source: &mut S, count: usize) -> Result<Vec<f64>> {
    let mut sample = Vec::with_capacity(count);
    for _ in 0..count {
        sample.push(source.next_uniform()?);
    }
    debug!(count, "drew sample");
    Ok(sample)
}

/// Statistic, p-value and decision of a single hypothesis test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub statistic: f64,
    pub p_value: f64,
    /// Uniformity rejected: `p_value < alpha`
    pub rejected: bool,
}

impl TestOutcome {
    fn at_level(statistic: f64, p_value: f64, alpha: f64) -> Self {
        Self {
            statistic,
            p_value,
            rejected: p_value < alpha,
        }
    }
}

/// Goodness-of-fit results for one sample against U[0, 1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub sample_size: usize,
    pub alpha: f64,
    pub ks: TestOutcome,
    pub chi_square: TestOutcome,
    pub chi_square_ndf: usize,
    /// Observed counts per equal-width bin
    pub bin_counts: Vec<u64>,
}

impl Report {
    /// Neither test rejects uniformity
    pub fn is_uniform(&self) -> bool {
        !self.ks.rejected && !self.chi_square.rejected
    }
}

/// KS and chi-square (10 bins) tests of `sample` against U[0, 1).
pub fn run_goodness_of_fit(sample: &[f64], alpha: f64) -> Result<Report> {
    run_goodness_of_fit_binned(sample, alpha, DEFAULT_BINS)
}

/// Same as [`run_goodness_of_fit`] with an explicit chi-square bin count.
pub fn run_goodness_of_fit_binned(sample: &[f64], alpha: f64, bins: usize) -> Result<Report> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(HarnessError::InvalidAlpha { alpha });
    }
    if bins < 2 {
        return Err(HarnessError::InvalidBins { bins });
    }
    let ks = stats::ks_uniform(sample).ok_or(HarnessError::EmptySample)?;

    let bin_counts = stats::histogram(sample, bins);
    let expected = vec![sample.len() as f64 / bins as f64; bins];
    let chi = stats::chisq_gof(&bin_counts, &expected).ok_or(HarnessError::InvalidBins { bins })?;

    let report = Report {
        sample_size: sample.len(),
        alpha,
        ks: TestOutcome::at_level(ks.statistic, ks.p_value, alpha),
        chi_square: TestOutcome::at_level(chi.statistic, chi.p_value, alpha),
        chi_square_ndf: chi.ndf,
        bin_counts,
    };
    debug!(
        n = report.sample_size,
        ks = report.ks.statistic,
        ks_p = report.ks.p_value,
        chi2 = report.chi_square.statistic,
        chi2_p = report.chi_square.p_value,
        "goodness of fit"
    );
    Ok(report)
}

/// Generator family and constants behind a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum GeneratorSpec {
    Twister(TwisterParams),
    Lcg(LcgParams),
}

impl GeneratorSpec {
    /// Seed a fresh generator and draw `count` variates.
    pub fn sample(&self, seed: u64, count: usize) -> Result<Vec<f64>> {
        match *self {
            GeneratorSpec::Twister(params) => {
                let mut mt = MersenneTwister::new(params, seed)?;
                generate_sample(&mut mt, count)
            }
            GeneratorSpec::Lcg(params) => {
                let mut lcg = Lcg::new(params, seed)?;
                generate_sample(&mut lcg, count)
            }
        }
    }
}

/// A reference generator and an alternative, tested on samples drawn with
/// the same seed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub name: String,
    pub seed: u64,
    pub reference_generator: GeneratorSpec,
    pub generator: GeneratorSpec,
    pub reference: Report,
    pub alternative: Report,
}

fn assess(spec: &GeneratorSpec, seed: u64, config: &RunConfig) -> Result<Report> {
    let sample = spec.sample(seed, config.sample_size)?;
    run_goodness_of_fit_binned(&sample, config.alpha, config.bins)
}

/// Test every configured alternative against its family's reference.
///
/// Twister parameter sets are compared with `config.reference`, LCG sets
/// with `config.lcg_reference`.
pub fn compare(config: &RunConfig, seed: u64) -> Result<Vec<Comparison>> {
    let mut comparisons = Vec::with_capacity(config.parameter_sets.len() + config.lcg.len());

    let families = [
        (
            GeneratorSpec::Twister(config.reference),
            config
                .parameter_sets
                .iter()
                .map(|set| (set.name.as_str(), GeneratorSpec::Twister(set.params)))
                .collect::<Vec<_>>(),
        ),
        (
            GeneratorSpec::Lcg(config.lcg_reference),
            config
                .lcg
                .iter()
                .map(|set| (set.name.as_str(), GeneratorSpec::Lcg(set.params)))
                .collect::<Vec<_>>(),
        ),
    ];

    for (reference_generator, alternatives) in families {
        if alternatives.is_empty() {
            continue;
        }
        let reference = assess(&reference_generator, seed, config)?;

        for (name, generator) in alternatives {
            let alternative = assess(&generator, seed, config)?;
            info!(
                set = name,
                reference_uniform = reference.is_uniform(),
                alternative_uniform = alternative.is_uniform(),
                "compared generators"
            );
            comparisons.push(Comparison {
                name: name.to_string(),
                seed,
                reference_generator,
                generator,
                reference: reference.clone(),
                alternative,
            });
        }
    }

    Ok(comparisons)
}

/// How often a parameter set passes over repeated seeded trials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceRate {
    pub trials: usize,
    pub ks_accepted: usize,
    pub chi_square_accepted: usize,
}

impl AcceptanceRate {
    pub fn ks_rate(&self) -> f64 {
        self.ks_accepted as f64 / self.trials as f64
    }

    pub fn chi_square_rate(&self) -> f64 {
        self.chi_square_accepted as f64 / self.trials as f64
    }
}

/// Run the goodness-of-fit tests once per seed and count non-rejections.
pub fn acceptance_rate<I>(params: TwisterParams, seeds: I, count: usize, alpha: f64) -> Result<AcceptanceRate>
where
    I: IntoIterator<Item = u64>,
{
    let mut mt = MersenneTwister::unseeded(params)?;
    let mut rate = AcceptanceRate {
        trials: 0,
        ks_accepted: 0,
        chi_square_accepted: 0,
    };

    for seed in seeds {
        mt.seed(seed);
        let sample = generate_sample(&mut mt, count)?;
        let report = run_goodness_of_fit(&sample, alpha)?;
        rate.trials += 1;
        if !report.ks.rejected {
            rate.ks_accepted += 1;
        }
        if !report.chi_square.rejected {
            rate.chi_square_accepted += 1;
        }
    }

    if rate.trials == 0 {
        return Err(HarnessError::NoTrials);
    }
    info!(
        trials = rate.trials,
        ks_rate = rate.ks_rate(),
        chi2_rate = rate.chi_square_rate(),
        "acceptance rate"
    );
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_sample_keeps_order() {
        let mut mt = MersenneTwister::mt19937(42);
        let sample = generate_sample(&mut mt, 3).unwrap();

        let mut again = MersenneTwister::mt19937(42);
        let expected: Vec<f64> = (0..3).map(|_| again.next_uniform().unwrap()).collect();
        assert_eq!(sample, expected);
        assert!((sample[0] - 0.374_540_114_309_638_74).abs() < 1e-15);
    }

    #[test]
    fn test_generate_sample_unseeded() {
        let mut mt = MersenneTwister::unseeded(TwisterParams::default()).unwrap();
        let err = generate_sample(&mut mt, 5).unwrap_err();
        assert_eq!(err, HarnessError::Generator(matlib::GeneratorError::Uninitialized));
    }

    #[test]
    fn test_empty_sample_rejected() {
        assert_eq!(run_goodness_of_fit(&[], 0.05), Err(HarnessError::EmptySample));
    }

    #[test]
    fn test_alpha_validated() {
        let sample = [0.2, 0.4, 0.6];
        for alpha in [0.0, 1.0, -0.1, f64::NAN] {
            assert!(matches!(
                run_goodness_of_fit(&sample, alpha),
                Err(HarnessError::InvalidAlpha { .. })
            ));
        }
    }

    #[test]
    fn test_bins_validated() {
        assert_eq!(
            run_goodness_of_fit_binned(&[0.5], 0.05, 1),
            Err(HarnessError::InvalidBins { bins: 1 })
        );
    }

    #[test]
    fn test_report_for_canonical_seed_42() {
        let mut mt = MersenneTwister::mt19937(42);
        let sample = generate_sample(&mut mt, 1000).unwrap();
        let report = run_goodness_of_fit(&sample, 0.05).unwrap();

        assert_eq!(report.sample_size, 1000);
        assert_eq!(report.bin_counts, vec![115, 86, 103, 110, 83, 104, 108, 84, 96, 111]);
        assert!((report.ks.statistic - 0.016_697_647_923_6).abs() < 1e-9);
        assert!((report.ks.p_value - 0.941_390_037_236).abs() < 1e-9);
        assert!((report.chi_square.statistic - 12.92).abs() < 1e-9);
        assert!((report.chi_square.p_value - 0.166_259_716_885).abs() < 1e-6);
        assert_eq!(report.chi_square_ndf, 9);
        assert!(!report.ks.rejected);
        assert!(!report.chi_square.rejected);
        assert!(report.is_uniform());
    }

    #[test]
    fn test_constant_sample_rejected() {
        let sample = vec![0.25; 500];
        let report = run_goodness_of_fit(&sample, 0.05).unwrap();
        assert!(report.ks.rejected);
        assert!(report.chi_square.rejected);
        assert!(!report.is_uniform());
    }

    #[test]
    fn test_acceptance_rate_requires_trials() {
        let err = acceptance_rate(TwisterParams::default(), std::iter::empty(), 100, 0.05).unwrap_err();
        assert_eq!(err, HarnessError::NoTrials);
    }
}
