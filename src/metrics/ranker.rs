//! @ai:module:intent Select best-performing models per axis from summaries
//! @ai:module:layer application
//! @ai:module:public_api ModelRanker, Badges
//! @ai:module:stateless true

use crate::metrics::types::ModelSummary;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// @ai:intent Best-performing model along each axis, when determinable
/// @ai:effects pure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badges {
    pub fastest: Option<String>,
    pub cheapest: Option<String>,
    pub best_quality: Option<String>,
    pub most_reliable: Option<String>,
}

/// @ai:intent Trait for model ranking
pub trait ModelRankerTrait: Send + Sync {
    /// @ai:intent Award badges from per-model summaries
    fn rank(&self, summaries: &IndexMap<String, ModelSummary>) -> Badges;
}

/// @ai:intent Awards fastest/cheapest/best-quality/most-reliable badges
pub struct ModelRanker;

impl ModelRanker {
    /// @ai:intent Create a new ranker
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }
}

impl Default for ModelRanker {
    fn default() -> Self {
        Self::new()
    }
}

/// @ai:intent Pick the model with the extreme value of a metric
/// @ai:post ties resolve to the lexicographically smallest model name,
///          models without the metric (or without calls) are skipped
/// @ai:effects pure
fn select<'a, F>(
    summaries: &'a IndexMap<String, ModelSummary>,
    metric: F,
    want_max: bool,
) -> Option<String>
where
    F: Fn(&ModelSummary) -> Option<f64>,
{
    let mut best: Option<(&'a str, f64)> = None;

    for (name, summary) in summaries {
        if summary.stats.call_count == 0 {
            continue;
        }

        let Some(value) = metric(summary) else {
            continue;
        };

        best = match best {
            None => Some((name, value)),
            Some((best_name, best_value)) => {
                let better = if want_max {
                    value > best_value
                } else {
                    value < best_value
                };
                let tie = value == best_value && name.as_str() < best_name;

                if better || tie {
                    Some((name, value))
                } else {
                    Some((best_name, best_value))
                }
            }
        };
    }

    best.map(|(name, _)| name.to_string())
}

impl ModelRankerTrait for ModelRanker {
    /// @ai:intent Award badges from per-model summaries
    /// @ai:post empty input yields all-absent badges, never an error
    /// @ai:effects pure
    fn rank(&self, summaries: &IndexMap<String, ModelSummary>) -> Badges {
        Badges {
            fastest: select(summaries, |m| m.stats.avg_latency_ms, false),
            cheapest: select(summaries, |m| m.stats.avg_cost_per_call, false),
            best_quality: select(summaries, |m| m.stats.avg_quality, true),
            most_reliable: select(summaries, |m| m.stats.success_rate, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::types::Summary;

    fn model(
        name: &str,
        calls: u32,
        latency: f64,
        cost: f64,
        quality: Option<f64>,
        success_rate: f64,
    ) -> (String, ModelSummary) {
        (
            name.to_string(),
            ModelSummary {
                model: name.to_string(),
                stats: Summary {
                    call_count: calls,
                    success_rate: Some(success_rate),
                    avg_latency_ms: Some(latency),
                    avg_cost_per_call: Some(cost),
                    avg_quality: quality,
                    ..Default::default()
                },
            },
        )
    }

    #[test]
    fn test_rank_empty_map_all_absent() {
        let badges = ModelRanker::new().rank(&IndexMap::new());
        assert_eq!(badges, Badges::default());
    }

    #[test]
    fn test_rank_awards_each_axis() {
        let summaries: IndexMap<_, _> = [
            model("gpt-4o", 10, 400.0, 0.02, Some(0.9), 0.95),
            model("mistral-nemo", 10, 200.0, 0.001, Some(0.7), 0.99),
        ]
        .into_iter()
        .collect();

        let badges = ModelRanker::new().rank(&summaries);
        assert_eq!(badges.fastest.as_deref(), Some("mistral-nemo"));
        assert_eq!(badges.cheapest.as_deref(), Some("mistral-nemo"));
        assert_eq!(badges.best_quality.as_deref(), Some("gpt-4o"));
        assert_eq!(badges.most_reliable.as_deref(), Some("mistral-nemo"));
    }

    #[test]
    fn test_rank_tie_breaks_lexicographically() {
        // Same avg latency; insertion order deliberately reversed
        let summaries: IndexMap<_, _> = [
            model("model-b", 5, 300.0, 0.01, None, 1.0),
            model("model-a", 5, 300.0, 0.01, None, 1.0),
        ]
        .into_iter()
        .collect();

        let badges = ModelRanker::new().rank(&summaries);
        assert_eq!(badges.fastest.as_deref(), Some("model-a"));
        assert_eq!(badges.cheapest.as_deref(), Some("model-a"));
        assert_eq!(badges.most_reliable.as_deref(), Some("model-a"));
    }

    #[test]
    fn test_rank_skips_zero_call_models() {
        let summaries: IndexMap<_, _> = [
            model("idle", 0, 1.0, 0.0, Some(1.0), 1.0),
            model("active", 3, 500.0, 0.05, Some(0.6), 0.8),
        ]
        .into_iter()
        .collect();

        let badges = ModelRanker::new().rank(&summaries);
        assert_eq!(badges.fastest.as_deref(), Some("active"));
        assert_eq!(badges.best_quality.as_deref(), Some("active"));
    }

    #[test]
    fn test_rank_no_quality_data_means_no_quality_badge() {
        let summaries: IndexMap<_, _> = [
            model("a", 5, 300.0, 0.01, None, 1.0),
            model("b", 5, 400.0, 0.02, None, 0.9),
        ]
        .into_iter()
        .collect();

        let badges = ModelRanker::new().rank(&summaries);
        assert_eq!(badges.best_quality, None);
        assert_eq!(badges.fastest.as_deref(), Some("a"));
    }
}
