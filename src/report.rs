use anyhow::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::harness::{Comparison, GeneratorSpec, Report};

fn describe(spec: &GeneratorSpec) -> String {
    match spec {
        GeneratorSpec::Twister(params) => format!("mersenne twister {params}"),
        GeneratorSpec::Lcg(params) => format!("lcg {params}"),
    }
}

fn verdict(rejected: bool) -> &'static str {
    if rejected {
        "reject uniformity"
    } else {
        "fail to reject uniformity"
    }
}

fn write_report<W: Write>(out: &mut W, label: &str, report: &Report) -> Result<()> {
    writeln!(
        out,
        "Kolmogorov-Smirnov ({label}): statistic = {:.4}, p-value = {:.4}  -> {}",
        report.ks.statistic,
        report.ks.p_value,
        verdict(report.ks.rejected)
    )?;
    writeln!(
        out,
        "Chi-square ({label}, {} df): statistic = {:.4}, p-value = {:.4}  -> {}",
        report.chi_square_ndf,
        report.chi_square.statistic,
        report.chi_square.p_value,
        verdict(report.chi_square.rejected)
    )?;

    let counts: Vec<String> = report.bin_counts.iter().map(u64::to_string).collect();
    writeln!(out, "Bin counts ({label}): [{}]", counts.join(", "))?;
    Ok(())
}

/// Write a plain text report of every comparison
pub fn write_text<W: Write>(out: &mut W, comparisons: &[Comparison]) -> Result<()> {
    writeln!(out, "Uniformity Comparison")?;
    writeln!(out, "=====================")?;

    for (i, comparison) in comparisons.iter().enumerate() {
        writeln!(out)?;
        writeln!(out, "Set {}: {} (seed {})", i + 1, comparison.name, comparison.seed)?;
        writeln!(out, "  reference:   {}", describe(&comparison.reference_generator))?;
        writeln!(out, "  alternative: {}", describe(&comparison.generator))?;
        writeln!(
            out,
            "  n = {}, alpha = {}",
            comparison.alternative.sample_size, comparison.alternative.alpha
        )?;
        writeln!(out)?;

        write_report(out, "reference", &comparison.reference)?;
        write_report(out, "alternative", &comparison.alternative)?;
    }

    Ok(())
}

/// Write the comparisons as pretty JSON
pub fn write_json<P: AsRef<Path>>(comparisons: &[Comparison], path: P) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, comparisons)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::harness::compare;

    #[test]
    fn test_text_report_lists_every_set() {
        let config = RunConfig {
            sample_size: 200,
            ..RunConfig::default()
        };
        let comparisons = compare(&config, config.seed).unwrap();

        let mut buf = Vec::new();
        write_text(&mut buf, &comparisons).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("Uniformity Comparison"));
        for name in ["48-bit", "mt19937", "64-bit", "ansi-c", "short-period", "msvc"] {
            assert!(text.contains(name), "missing {name}");
        }
        assert!(text.contains("Kolmogorov-Smirnov (reference)"));
        assert!(text.contains("Chi-square (alternative, 9 df)"));
    }

    #[test]
    fn test_json_report_round_trip() {
        let config = RunConfig {
            sample_size: 100,
            lcg: Vec::new(),
            ..RunConfig::default()
        };
        let comparisons = compare(&config, 42).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comparison.json");
        write_json(&comparisons, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<Comparison> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), comparisons.len());
        assert_eq!(parsed[2].generator, comparisons[2].generator);
        assert_eq!(parsed[0].alternative.bin_counts, comparisons[0].alternative.bin_counts);
    }
}
