//! @ai:module:intent Statistical aggregation of metric records
//! @ai:module:layer application
//! @ai:module:public_api MetricsAggregator
//! @ai:module:stateless true

use crate::error::Result;
use crate::metrics::types::{MetricRecord, ModelSummary, Summary};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// @ai:intent Trait for metric aggregation
pub trait MetricsAggregatorTrait: Send + Sync {
    /// @ai:intent Reduce records into one summary
    fn summarize(&self, records: &[MetricRecord]) -> Result<Summary>;

    /// @ai:intent Reduce records into per-model summaries, keyed in order
    ///            of first appearance
    fn summarize_by_model(&self, records: &[MetricRecord])
        -> Result<IndexMap<String, ModelSummary>>;
}

/// @ai:intent Aggregates metric records into statistical summaries
pub struct MetricsAggregator;

impl MetricsAggregator {
    /// @ai:intent Create a new aggregator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// @ai:intent Calculate average of an iterator of f64
/// @ai:effects pure
fn average<I: Iterator<Item = f64>>(iter: I) -> Option<f64> {
    let (sum, count) = iter.fold((0.0, 0u32), |(s, c), v| (s + v, c + 1));

    if count == 0 {
        None
    } else {
        Some(sum / f64::from(count))
    }
}

impl MetricsAggregatorTrait for MetricsAggregator {
    /// @ai:intent Reduce a record slice into one Summary
    /// @ai:pre every record satisfies MetricRecord::validate
    /// @ai:post call_count == records.len(); averaged fields None on empty input
    /// @ai:effects pure
    fn summarize(&self, records: &[MetricRecord]) -> Result<Summary> {
        for record in records {
            record.validate()?;
        }

        let call_count = records.len() as u32;

        if call_count == 0 {
            return Ok(Summary::default());
        }

        let successes = records.iter().filter(|r| r.success).count() as u32;
        let total_cost: f64 = records.iter().map(|r| r.cost).sum();
        let total_tokens: u64 = records
            .iter()
            .map(|r| u64::from(r.input_tokens) + u64::from(r.output_tokens))
            .sum();

        let quality_count = records.iter().filter(|r| r.quality_score.is_some()).count() as u32;

        // Per-extra sums and counts; each extra averages only over the
        // records that carried it
        let mut extra_sums: BTreeMap<String, (f64, u32)> = BTreeMap::new();
        for record in records {
            for (name, value) in &record.extras {
                let entry = extra_sums.entry(name.clone()).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
        }
        let avg_extras = extra_sums
            .into_iter()
            .map(|(name, (sum, count))| (name, sum / f64::from(count)))
            .collect();

        Ok(Summary {
            call_count,
            quality_count,
            success_rate: Some(f64::from(successes) / f64::from(call_count)),
            avg_latency_ms: average(records.iter().map(|r| r.latency_ms)),
            min_latency_ms: records
                .iter()
                .map(|r| r.latency_ms)
                .min_by(|a, b| a.total_cmp(b)),
            max_latency_ms: records
                .iter()
                .map(|r| r.latency_ms)
                .max_by(|a, b| a.total_cmp(b)),
            avg_quality: average(records.iter().filter_map(|r| r.quality_score)),
            total_cost,
            avg_cost_per_call: Some(total_cost / f64::from(call_count)),
            avg_input_tokens: average(records.iter().map(|r| f64::from(r.input_tokens))),
            avg_output_tokens: average(records.iter().map(|r| f64::from(r.output_tokens))),
            total_tokens,
            avg_extras,
        })
    }

    /// @ai:intent Partition records by model and summarize each partition
    /// @ai:post union of per-model call_counts equals the global call_count
    /// @ai:effects pure
    fn summarize_by_model(
        &self,
        records: &[MetricRecord],
    ) -> Result<IndexMap<String, ModelSummary>> {
        let mut partitions: IndexMap<String, Vec<MetricRecord>> = IndexMap::new();

        for record in records {
            partitions
                .entry(record.model_name.clone())
                .or_default()
                .push(record.clone());
        }

        let mut summaries = IndexMap::with_capacity(partitions.len());

        for (model, partition) in partitions {
            let stats = self.summarize(&partition)?;
            summaries.insert(
                model.clone(),
                ModelSummary { model, stats },
            );
        }

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn record(model: &str, latency: f64, quality: Option<f64>, cost: f64, success: bool) -> MetricRecord {
        MetricRecord {
            prompt_name: "classifier".to_string(),
            version: "1.0.0".to_string(),
            model_name: model.to_string(),
            input_tokens: 100,
            output_tokens: 50,
            latency_ms: latency,
            quality_score: quality,
            cost,
            success,
            timestamp: Utc::now(),
            extras: BTreeMap::new(),
        }
    }

    #[test]
    fn test_summarize_empty_is_absent_not_zero() {
        let summary = MetricsAggregator::new().summarize(&[]).unwrap();

        assert_eq!(summary.call_count, 0);
        assert_eq!(summary.success_rate, None);
        assert_eq!(summary.avg_latency_ms, None);
        assert_eq!(summary.avg_quality, None);
        assert_eq!(summary.avg_cost_per_call, None);
        assert_eq!(summary.min_latency_ms, None);
        assert!((summary.total_cost - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summarize_basic_fields() {
        let records = vec![
            record("gpt-4o", 300.0, Some(0.8), 0.01, true),
            record("gpt-4o", 500.0, Some(0.9), 0.03, true),
            record("gpt-4o", 400.0, None, 0.02, false),
        ];
        let summary = MetricsAggregator::new().summarize(&records).unwrap();

        assert_eq!(summary.call_count, 3);
        assert_eq!(summary.quality_count, 2);
        assert!((summary.success_rate.unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert!((summary.avg_latency_ms.unwrap() - 400.0).abs() < 1e-9);
        assert!((summary.min_latency_ms.unwrap() - 300.0).abs() < 1e-9);
        assert!((summary.max_latency_ms.unwrap() - 500.0).abs() < 1e-9);
        assert!((summary.avg_quality.unwrap() - 0.85).abs() < 1e-12);
        assert!((summary.total_cost - 0.06).abs() < 1e-12);
        assert!((summary.avg_cost_per_call.unwrap() - 0.02).abs() < 1e-12);
        assert_eq!(summary.total_tokens, 450);
    }

    #[test]
    fn test_summarize_no_quality_data_stays_absent() {
        let records = vec![
            record("gpt-4o", 300.0, None, 0.01, true),
            record("gpt-4o", 500.0, None, 0.01, true),
        ];
        let summary = MetricsAggregator::new().summarize(&records).unwrap();
        assert_eq!(summary.avg_quality, None);
        assert_eq!(summary.quality_count, 0);
    }

    #[test]
    fn test_summarize_rejects_malformed_record() {
        let mut bad = record("gpt-4o", 300.0, Some(0.5), 0.01, true);
        bad.quality_score = Some(2.0);
        let result = MetricsAggregator::new().summarize(&[bad]);
        assert!(result.is_err());
    }

    #[test]
    fn test_summarize_extras_average_over_present_only() {
        let mut a = record("gpt-4o", 300.0, None, 0.01, true);
        a.extras.insert("accuracy".to_string(), 0.8);
        let b = record("gpt-4o", 400.0, None, 0.01, true);
        let mut c = record("gpt-4o", 500.0, None, 0.01, true);
        c.extras.insert("accuracy".to_string(), 0.6);

        let summary = MetricsAggregator::new().summarize(&[a, b, c]).unwrap();
        assert!((summary.avg_extras["accuracy"] - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_by_model_preserves_first_appearance_order() {
        let records = vec![
            record("mistral-nemo", 200.0, None, 0.001, true),
            record("gpt-4o", 300.0, None, 0.01, true),
            record("mistral-nemo", 250.0, None, 0.001, true),
        ];
        let by_model = MetricsAggregator::new().summarize_by_model(&records).unwrap();

        let order: Vec<_> = by_model.keys().cloned().collect();
        assert_eq!(order, vec!["mistral-nemo".to_string(), "gpt-4o".to_string()]);
        assert_eq!(by_model["mistral-nemo"].stats.call_count, 2);
        assert_eq!(by_model["gpt-4o"].stats.call_count, 1);
    }

    #[test]
    fn test_by_model_call_counts_cover_global_count() {
        let records = vec![
            record("a", 100.0, Some(0.5), 0.01, true),
            record("b", 200.0, None, 0.02, false),
            record("a", 300.0, Some(0.7), 0.03, true),
        ];
        let aggregator = MetricsAggregator::new();
        let global = aggregator.summarize(&records).unwrap();
        let by_model = aggregator.summarize_by_model(&records).unwrap();

        let partitioned: u32 = by_model.values().map(|m| m.stats.call_count).sum();
        assert_eq!(partitioned, global.call_count);
    }

    #[test]
    fn test_weighted_recombination_matches_global() {
        let records = vec![
            record("a", 100.0, Some(0.5), 0.010, true),
            record("a", 140.0, Some(0.7), 0.014, true),
            record("a", 120.0, None, 0.012, false),
            record("b", 900.0, Some(0.9), 0.090, true),
            record("b", 700.0, None, 0.070, true),
        ];
        let aggregator = MetricsAggregator::new();
        let global = aggregator.summarize(&records).unwrap();
        let by_model = aggregator.summarize_by_model(&records).unwrap();

        let mut calls = 0u32;
        let mut latency_sum = 0.0;
        let mut cost_sum = 0.0;
        let mut success_sum = 0.0;
        let mut quality_sum = 0.0;
        let mut quality_n = 0u32;

        for m in by_model.values() {
            let s = &m.stats;
            let n = f64::from(s.call_count);
            calls += s.call_count;
            latency_sum += s.avg_latency_ms.unwrap() * n;
            cost_sum += s.avg_cost_per_call.unwrap() * n;
            success_sum += s.success_rate.unwrap() * n;
            if let Some(q) = s.avg_quality {
                quality_sum += q * f64::from(s.quality_count);
                quality_n += s.quality_count;
            }
        }

        assert_eq!(calls, global.call_count);
        let n = f64::from(calls);
        assert!((latency_sum / n - global.avg_latency_ms.unwrap()).abs() < 1e-9);
        assert!((cost_sum / n - global.avg_cost_per_call.unwrap()).abs() < 1e-12);
        assert!((success_sum / n - global.success_rate.unwrap()).abs() < 1e-12);
        assert!(
            (quality_sum / f64::from(quality_n) - global.avg_quality.unwrap()).abs() < 1e-12
        );
    }
}
