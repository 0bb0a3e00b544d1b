const FPMIN: f64 = 1e-30;

// ============================================================================
// Log Gamma (ACM algorithm 291)
// ============================================================================

pub fn lgamma(mut x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }

    let mut result = if x < 7.0 {
        let mut res = 1.0;
        let mut z = x;
        while z < 7.0 {
            res *= z;
            z += 1.0;
        }
        x = z;
        -f64::ln(res)
    } else {
        0.0
    };

    let z = 1.0 / (x * x);

    result += (x - 0.5) * x.ln() - x + 0.918938533204673
        + ((((-0.000595238095238 * z + 0.000793650793651) * z - 0.002777777777778) * z
            + 0.083333333333333)
            / x);

    result
}

// ============================================================================
// Incomplete Gamma (From Press et al)
// ============================================================================

/// Regularized lower incomplete gamma function P(a, x)
pub fn igamma(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }

    if x < a + 1.0 {
        let mut ap = a;
        let mut del = 1.0 / a;
        let mut sum = del;

        loop {
            ap += 1.0;
            del *= x / ap;
            sum += del;
            if del < 1e-8 * sum {
                break;
            }
        }
        return sum * (a * x.ln() - x - lgamma(a)).exp();
    }

    let mut b = x + 1.0 - a;
    let mut c = 1.0 / FPMIN;
    let mut d = 1.0 / b;
    let mut h = d;

    for i in 1..1000 {
        let an = (i as f64) * (a - i as f64);
        b += 2.0;
        d = an * d + b;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = b + an / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < 1e-8 {
            break;
        }
    }

    1.0 - h * (a * x.ln() - x - lgamma(a)).exp()
}

/// Upper tail of the chi-square distribution with `ndf` degrees of freedom
pub fn chisq_sf(ndf: usize, chi_square: f64) -> f64 {
    (1.0 - igamma(0.5 * ndf as f64, 0.5 * chi_square)).clamp(0.0, 1.0)
}

// ============================================================================
// Kolmogorov-Smirnov CDF
// ============================================================================

/// Asymptotic distribution of the KS statistic with Stephens' small-sample
/// correction
pub fn ks_cdf(n: i32, dn: f64) -> f64 {
    if dn <= 0.0 || n <= 0 {
        return 0.0;
    }

    let mut arg = (n as f64).sqrt();
    arg = arg + 0.12 + 0.11 / arg;
    arg *= dn;
    arg = arg * arg;

    let mut sum = 0.0;

    for i in 1..100 {
        let term = -2.0 * (i as f64) * (i as f64) * arg;
        if term < -45.0 {
            break;
        }
        let term = term.exp();
        if i % 2 == 1 {
            sum += term;
        } else {
            sum -= term;
        }
    }

    (1.0 - 2.0 * sum).clamp(0.0, 1.0)
}

// ============================================================================
// Kolmogorov-Smirnov test against uniform [0, 1)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsTest {
    /// Largest amount the empirical CDF rises above the uniform CDF
    pub d_plus: f64,
    /// Largest amount the empirical CDF falls below the uniform CDF
    pub d_minus: f64,
    pub statistic: f64,
    pub p_value: f64,
}

/// One-sample KS test of `x` against the uniform distribution on [0, 1).
///
/// Returns `None` for an empty sample. The input order is left untouched.
pub fn ks_uniform(x: &[f64]) -> Option<KsTest> {
    if x.is_empty() {
        return None;
    }

    let mut sorted = x.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len() as f64;
    let mut d_plus: f64 = 0.0;
    let mut d_minus: f64 = 0.0;

    for (i, &xi) in sorted.iter().enumerate() {
        let cdf = xi.clamp(0.0, 1.0);
        d_plus = d_plus.max((i as f64 + 1.0) / n - cdf);
        d_minus = d_minus.max(cdf - i as f64 / n);
    }

    let statistic = d_plus.max(d_minus);
    let n = i32::try_from(sorted.len()).unwrap_or(i32::MAX);

    Some(KsTest {
        d_plus,
        d_minus,
        statistic,
        p_value: 1.0 - ks_cdf(n, statistic),
    })
}

// ============================================================================
// Chi-square goodness of fit
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub ndf: usize,
    pub p_value: f64,
}

/// Pearson chi-square test of observed counts against expected counts.
///
/// Needs at least two bins of equal length and strictly positive
/// expectations, otherwise `None`.
pub fn chisq_gof(observed: &[u64], expected: &[f64]) -> Option<ChiSquareTest> {
    if observed.len() < 2 || observed.len() != expected.len() {
        return None;
    }
    if expected.iter().any(|&e| e.is_nan() || e <= 0.0) {
        return None;
    }

    let statistic: f64 = observed
        .iter()
        .zip(expected)
        .map(|(&o, &e)| {
            let diff = o as f64 - e;
            diff * diff / e
        })
        .sum();

    let ndf = observed.len() - 1;

    Some(ChiSquareTest {
        statistic,
        ndf,
        p_value: chisq_sf(ndf, statistic),
    })
}

// ============================================================================
// Equal-width histogram on [0, 1]
// ============================================================================

/// Count values into `nbins` equal-width bins over [0, 1].
///
/// The last bin is closed so 1.0 is counted in it; values outside [0, 1]
/// are not counted.
pub fn histogram(x: &[f64], nbins: usize) -> Vec<u64> {
    let mut counts = vec![0u64; nbins];
    if nbins == 0 {
        return counts;
    }

    for &v in x {
        if !(0.0..=1.0).contains(&v) {
            continue;
        }
        let k = ((v * nbins as f64) as usize).min(nbins - 1);
        counts[k] += 1;
    }

    counts
}
