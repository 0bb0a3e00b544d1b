//! Run configuration, loaded from TOML.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use matlib::{LcgParams, TwisterParams};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::harness::DEFAULT_BINS;

/// Named twister variant compared against the reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub name: String,
    #[serde(default)]
    pub params: TwisterParams,
}

/// Named LCG compared against the LCG reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LcgSet {
    pub name: String,
    pub params: LcgParams,
}

/// Everything one comparison run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Seed shared by every sample
    pub seed: u64,

    /// Ignore `seed` and seed from the wall clock instead
    pub clock_seed: bool,

    pub sample_size: usize,

    /// Significance level of both tests
    pub alpha: f64,

    /// Chi-square bin count
    pub bins: usize,

    pub reference: TwisterParams,

    pub parameter_sets: Vec<ParameterSet>,

    pub lcg_reference: LcgParams,

    pub lcg: Vec<LcgSet>,

    /// Also write the comparisons as JSON here
    pub json_output: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            clock_seed: false,
            sample_size: 1000,
            alpha: 0.05,
            bins: DEFAULT_BINS,
            reference: TwisterParams::mt19937(),
            parameter_sets: default_parameter_sets(),
            lcg_reference: LcgParams::numerical_recipes(),
            lcg: default_lcg_sets(),
            json_output: None,
        }
    }
}

fn default_parameter_sets() -> Vec<ParameterSet> {
    vec![
        ParameterSet {
            name: "48-bit".to_string(),
            params: TwisterParams {
                w: 48,
                n: 500,
                m: 250,
                r: 27,
                a: 0xA1B2_C3D4,
                u: 14,
                d: 0x1234_ABCD,
                s: 10,
                b: 0x5E6F_7A8B,
                t: 20,
                c: 0xCDEF_1234,
                l: 25,
                f: 987_654_321,
            },
        },
        ParameterSet {
            name: "mt19937".to_string(),
            params: TwisterParams::mt19937(),
        },
        ParameterSet {
            name: "64-bit".to_string(),
            params: TwisterParams {
                w: 64,
                n: 312,
                m: 199,
                r: 29,
                a: 0x8765_4321,
                u: 15,
                d: 0x1234_5678,
                s: 11,
                b: 0x4D3C_2B1A,
                t: 19,
                c: 0xABCD_EF12,
                l: 22,
                f: 123_456_789,
            },
        },
    ]
}

fn default_lcg_sets() -> Vec<LcgSet> {
    let set = |name: &str, modulus, multiplier, increment| LcgSet {
        name: name.to_string(),
        params: LcgParams { modulus, multiplier, increment },
    };
    vec![
        set("ansi-c", (1 << 31) - 1, 1_103_515_245, 12_345),
        set("short-period", 1 << 16, 75, 74),
        set("msvc", 1 << 24, 214_013, 2_531_011),
    ]
}

impl RunConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: RunConfig =
            toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Seed for this run. Reproducible unless `clock_seed` is set.
    pub fn resolve_seed(&self) -> u64 {
        if self.clock_seed {
            matlib::clock_seed()
        } else {
            self.seed
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.sample_size == 0 {
            anyhow::bail!("sample_size must be greater than 0");
        }

        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            anyhow::bail!("alpha must be in range (0, 1), got {}", self.alpha);
        }

        if self.bins < 2 {
            anyhow::bail!("bins must be at least 2, got {}", self.bins);
        }

        self.reference.validate().context("reference parameters")?;
        self.lcg_reference.validate().context("LCG reference parameters")?;

        for set in &self.parameter_sets {
            if let Err(e) = set.params.validate() {
                warn!(set = %set.name, error = %e, "rejected parameter set");
                return Err(e).with_context(|| format!("parameter set '{}'", set.name));
            }
        }

        for set in &self.lcg {
            if let Err(e) = set.params.validate() {
                warn!(set = %set.name, error = %e, "rejected LCG set");
                return Err(e).with_context(|| format!("LCG set '{}'", set.name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = RunConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.resolve_seed(), 42);
        assert_eq!(config.parameter_sets.len(), 3);
        assert_eq!(config.lcg.len(), 3);
    }

    #[test]
    fn test_config_validation() {
        let mut config = RunConfig::default();

        config.alpha = 1.5;
        assert!(config.validate().is_err());

        config.alpha = 0.05;
        config.sample_size = 0;
        assert!(config.validate().is_err());

        config.sample_size = 100;
        config.bins = 1;
        assert!(config.validate().is_err());

        config.bins = 10;
        config.parameter_sets[0].params.m = 0;
        let err = config.validate().unwrap_err();
        assert!(format!("{err:#}").contains("48-bit"));
    }

    #[test]
    fn test_from_file_partial_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
seed = 7
sample_size = 250

[[parameter_sets]]
name = "short-offset"
params = {{ m = 5 }}

[[lcg]]
name = "tiny"
params = {{ modulus = 65536, multiplier = 75, increment = 74 }}
"#
        )
        .unwrap();

        let config = RunConfig::from_file(file.path()).unwrap();
        assert_eq!(config.seed, 7);
        assert!(!config.clock_seed);
        assert_eq!(config.sample_size, 250);
        assert_eq!(config.alpha, 0.05);
        assert_eq!(config.bins, 10);
        assert_eq!(config.parameter_sets.len(), 1);
        assert_eq!(config.parameter_sets[0].params.m, 5);
        assert_eq!(config.parameter_sets[0].params.n, 624);
        assert_eq!(config.lcg[0].params.modulus, 65536);
        assert_eq!(config.reference, TwisterParams::mt19937());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_full_width_constants() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[parameter_sets]]
name = "mt19937-64"
params = {{ w = 64, n = 312, m = 156, r = 31, a = "0xB502_6F5A_A966_19E9", u = 29, d = 6148914691236517205, s = 17, b = "0x71D67FFFEDA60000", t = 37, c = "0xFFF7EEE000000000", l = 43, f = 6364136223846793005 }}
"#
        )
        .unwrap();

        let config = RunConfig::from_file(file.path()).unwrap();
        assert!(config.validate().is_ok());

        let params = config.parameter_sets[0].params;
        assert_eq!(params.a, 0xB502_6F5A_A966_19E9);
        assert_eq!(params.d, 0x5555_5555_5555_5555);
        assert_eq!(params.c, 0xFFF7_EEE0_0000_0000);

        let mut mt = matlib::MersenneTwister::new(params, 5489).unwrap();
        assert_eq!(mt.extract().unwrap(), 14_514_284_786_278_117_030);
    }

    #[test]
    fn test_from_file_bad_word_constant() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[parameter_sets]]
name = "typo"
params = {{ a = "0xZZ" }}
"#
        )
        .unwrap();

        assert!(RunConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_from_file_missing() {
        assert!(RunConfig::from_file("/nonexistent/uniformity.toml").is_err());
    }
}
