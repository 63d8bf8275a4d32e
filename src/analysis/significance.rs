//! @ai:module:intent Two-sample significance testing for A/B prompt comparisons
//! @ai:module:layer application
//! @ai:module:public_api SignificanceTester, AbComparison, Verdict
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::metrics::types::Polarity;
use serde::{Deserialize, Serialize};

/// Two-sided ~95% threshold on the test statistic. The verdict contract is
/// this threshold, not an exact p-value.
pub const DEFAULT_Z_THRESHOLD: f64 = 1.96;

const MIN_SAMPLES: usize = 2;

/// @ai:intent Categorical outcome of an A/B comparison
/// @ai:effects pure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    SignificantImprovement,
    SignificantRegression,
    Inconclusive,
}

impl Verdict {
    /// @ai:intent Convert verdict to string representation
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::SignificantImprovement => "significant-improvement",
            Verdict::SignificantRegression => "significant-regression",
            Verdict::Inconclusive => "inconclusive",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @ai:intent Result of comparing two metric samples (A = baseline, B = challenger)
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbComparison {
    pub metric: String,
    pub n_a: usize,
    pub n_b: usize,
    pub mean_a: f64,
    pub mean_b: f64,
    /// mean_b - mean_a
    pub difference: f64,
    /// Welch-style statistic: difference / sqrt(var_a/n_a + var_b/n_b)
    pub statistic: f64,
    /// Monotone squash of |statistic| into [0, 1]; 0.5 exactly at the
    /// significance threshold. A confidence heuristic, NOT a p-value.
    pub confidence: f64,
    pub verdict: Verdict,
}

/// @ai:intent Trait for two-sample comparison
pub trait SignificanceTesterTrait: Send + Sync {
    /// @ai:intent Compare two samples of one metric
    fn compare(&self, sample_a: &[f64], sample_b: &[f64], metric: &str) -> Result<AbComparison>;
}

/// @ai:intent Welch-style two-sample comparator with a fixed verdict threshold
pub struct SignificanceTester {
    z_threshold: f64,
}

impl SignificanceTester {
    /// @ai:intent Create a tester with the default ~95% threshold
    /// @ai:effects pure
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_Z_THRESHOLD)
    }

    /// @ai:intent Create a tester with a custom |statistic| threshold
    /// @ai:effects pure
    pub fn with_threshold(z_threshold: f64) -> Self {
        Self { z_threshold }
    }
}

impl Default for SignificanceTester {
    fn default() -> Self {
        Self::new()
    }
}

/// @ai:intent Sample mean
/// @ai:pre values is non-empty
/// @ai:effects pure
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// @ai:intent Unbiased (Bessel-corrected) sample variance
/// @ai:pre values.len() >= 2
/// @ai:effects pure
fn sample_variance(values: &[f64], mean: f64) -> f64 {
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    sum_sq / (values.len() - 1) as f64
}

/// @ai:intent Require a minimum sample size on one side
/// @ai:effects pure
fn require_samples(side: &'static str, values: &[f64]) -> Result<()> {
    if values.len() < MIN_SAMPLES {
        return Err(Error::InsufficientData {
            what: side,
            needed: MIN_SAMPLES,
            got: values.len(),
        });
    }
    Ok(())
}

impl SignificanceTesterTrait for SignificanceTester {
    /// @ai:intent Compare sample B against sample A for one metric
    /// @ai:pre both samples have at least 2 observations
    /// @ai:post verdict direction follows the metric's polarity convention
    /// @ai:effects pure
    fn compare(&self, sample_a: &[f64], sample_b: &[f64], metric: &str) -> Result<AbComparison> {
        require_samples("sample A", sample_a)?;
        require_samples("sample B", sample_b)?;

        let n_a = sample_a.len();
        let n_b = sample_b.len();
        let mean_a = mean(sample_a);
        let mean_b = mean(sample_b);
        let difference = mean_b - mean_a;

        let var_a = sample_variance(sample_a, mean_a);
        let var_b = sample_variance(sample_b, mean_b);

        // Welch standard error: no equal-variance pooling, latency/cost
        // distributions across versions are not assumed homoscedastic
        let standard_error = (var_a / n_a as f64 + var_b / n_b as f64).sqrt();

        let statistic = if standard_error > 0.0 {
            difference / standard_error
        } else if difference == 0.0 {
            0.0
        } else {
            // Both samples are constant but the constants differ: any
            // difference is significant
            f64::INFINITY.copysign(difference)
        };

        let significant = statistic.abs() >= self.z_threshold;

        let verdict = if !significant {
            Verdict::Inconclusive
        } else {
            let improved = match Polarity::for_metric(metric) {
                Polarity::HigherIsBetter => difference > 0.0,
                Polarity::LowerIsBetter => difference < 0.0,
            };
            if improved {
                Verdict::SignificantImprovement
            } else {
                Verdict::SignificantRegression
            }
        };

        let confidence = if statistic.is_infinite() {
            1.0
        } else {
            statistic.abs() / (statistic.abs() + self.z_threshold)
        };

        Ok(AbComparison {
            metric: metric.to_string(),
            n_a,
            n_b,
            mean_a,
            mean_b,
            difference,
            statistic,
            confidence,
            verdict,
        })
    }
}
