//! @ai:module:intent Metric record and summary types for prompt versions
//! @ai:module:layer domain
//! @ai:module:public_api MetricRecord, Summary, ModelSummary, Polarity
//! @ai:module:stateless true

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// @ai:intent One logged LLM invocation against a prompt version
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    pub prompt_name: String,
    pub version: String,
    pub model_name: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub latency_ms: f64,
    /// Quality score in [0, 1]; None means "not rated", which is distinct
    /// from a rating of 0.0
    pub quality_score: Option<f64>,
    /// Cost in EUR, either supplied by the caller or derived from the
    /// pricing table at log time
    pub cost: f64,
    pub success: bool,
    /// Assigned by the store at write time, monotonic per store
    pub timestamp: DateTime<Utc>,
    /// Free-form named metrics (accuracy, temperature, ...)
    #[serde(default)]
    pub extras: BTreeMap<String, f64>,
}

impl MetricRecord {
    /// @ai:intent Check record invariants, surfacing write-path defects
    /// @ai:post Ok iff every numeric field is finite and in range
    /// @ai:effects pure
    pub fn validate(&self) -> Result<()> {
        if !self.latency_ms.is_finite() || self.latency_ms < 0.0 {
            return Err(Error::MalformedRecord {
                field: "latency_ms",
                message: format!("must be a finite value >= 0, got {}", self.latency_ms),
            });
        }

        if !self.cost.is_finite() || self.cost < 0.0 {
            return Err(Error::MalformedRecord {
                field: "cost",
                message: format!("must be a finite value >= 0, got {}", self.cost),
            });
        }

        if let Some(q) = self.quality_score {
            if !q.is_finite() || !(0.0..=1.0).contains(&q) {
                return Err(Error::MalformedRecord {
                    field: "quality_score",
                    message: format!("must be in [0, 1], got {}", q),
                });
            }
        }

        for (name, value) in &self.extras {
            if !value.is_finite() {
                return Err(Error::MalformedRecord {
                    field: "extras",
                    message: format!("extra metric '{}' is not finite: {}", name, value),
                });
            }
        }

        Ok(())
    }

    /// @ai:intent Resolve a named metric to this record's observation
    /// @ai:post None when the record carries no value for the metric
    /// @ai:effects pure
    pub fn metric_value(&self, metric: &str) -> Option<f64> {
        match metric {
            "latency" | "latency_ms" => Some(self.latency_ms),
            "cost" => Some(self.cost),
            "quality" | "quality_score" => self.quality_score,
            "success" => Some(if self.success { 1.0 } else { 0.0 }),
            "tokens" => Some(f64::from(self.input_tokens + self.output_tokens)),
            "input_tokens" => Some(f64::from(self.input_tokens)),
            "output_tokens" => Some(f64::from(self.output_tokens)),
            other => self.extras.get(other).copied(),
        }
    }
}

/// @ai:intent Whether higher or lower values of a metric are better
/// @ai:effects pure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

impl Polarity {
    /// @ai:intent Resolve polarity from a metric name convention
    /// @ai:post latency/cost/error/token/duration metrics (and *_ms names)
    ///          are lower-better; everything else defaults to higher-better
    /// @ai:effects pure
    pub fn for_metric(name: &str) -> Polarity {
        let lower = name.to_ascii_lowercase();

        let lower_is_better = matches!(
            lower.as_str(),
            "latency" | "latency_ms" | "cost" | "error_rate" | "tokens" | "input_tokens"
                | "output_tokens" | "duration_ms"
        ) || lower.ends_with("_ms")
            || lower.contains("latency")
            || lower.contains("cost")
            || lower.contains("error");

        if lower_is_better {
            Polarity::LowerIsBetter
        } else {
            Polarity::HigherIsBetter
        }
    }
}

/// @ai:intent Aggregated statistics over a set of metric records
/// @ai:effects pure
///
/// Averaged fields are None (not zero) when the contributing sample is
/// empty: a Summary with call_count 0 must not read like measured
/// zero-latency calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub call_count: u32,
    /// Count of records that carried a quality score; keeps call-count
    /// weighted recombination of per-model summaries exact
    pub quality_count: u32,
    pub success_rate: Option<f64>,
    pub avg_latency_ms: Option<f64>,
    pub min_latency_ms: Option<f64>,
    pub max_latency_ms: Option<f64>,
    pub avg_quality: Option<f64>,
    pub total_cost: f64,
    pub avg_cost_per_call: Option<f64>,
    pub avg_input_tokens: Option<f64>,
    pub avg_output_tokens: Option<f64>,
    pub total_tokens: u64,
    /// Per-extra means, each over the records that carried the extra
    #[serde(default)]
    pub avg_extras: BTreeMap<String, f64>,
}

impl Summary {
    /// @ai:intent Resolve a named metric to its aggregated value
    /// @ai:effects pure
    pub fn metric_value(&self, metric: &str) -> Option<f64> {
        match metric {
            "latency" | "latency_ms" => self.avg_latency_ms,
            "cost" => self.avg_cost_per_call,
            "quality" | "quality_score" => self.avg_quality,
            "error_rate" => self.success_rate.map(|r| 1.0 - r),
            "success" => self.success_rate,
            other => self.avg_extras.get(other).copied(),
        }
    }
}

/// @ai:intent A Summary scoped to a single model
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model: String,
    pub stats: Summary,
}
