//! @ai:module:intent Metric record types, aggregation, and model ranking
//! @ai:module:layer application
//! @ai:module:public_api MetricRecord, Summary, ModelSummary, MetricsAggregator, ModelRanker, Badges

pub mod aggregator;
pub mod ranker;
pub mod types;

pub use aggregator::{MetricsAggregator, MetricsAggregatorTrait};
pub use ranker::{Badges, ModelRanker, ModelRankerTrait};
pub use types::{MetricRecord, ModelSummary, Polarity, Summary};
