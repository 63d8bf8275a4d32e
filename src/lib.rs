//! @ai:module:intent Prompt version metrics library for aggregation, ranking and regression checks
//! @ai:module:layer infrastructure
//! @ai:module:public_api metrics, analysis, store, config, pricing, version, error
//! @ai:module:stateless true
//!
//! # promptver
//!
//! A library for tracking LLM call metrics across prompt versions:
//! aggregating raw records into summaries, ranking models, comparing
//! versions with an A/B significance test and flagging regressions
//! against configurable thresholds.
//!
//! ## Example
//!
//! ```rust,no_run
//! use promptver::{
//!     JsonlStore, MetricStore, MetricsAggregator, MetricsAggregatorTrait, RecordFilter,
//!     RegressionMonitor, ThresholdConfig,
//! };
//!
//! let store = JsonlStore::new(".promptver/metrics.jsonl");
//! let baseline = store
//!     .query(&RecordFilter::for_prompt("summarize").version("1.0.0"))
//!     .unwrap();
//! let current = store
//!     .query(&RecordFilter::for_prompt("summarize").version("1.1.0"))
//!     .unwrap();
//!
//! let aggregator = MetricsAggregator::new();
//! let baseline_summary = aggregator.summarize(&baseline).unwrap();
//! let current_summary = aggregator.summarize(&current).unwrap();
//!
//! let monitor = RegressionMonitor::new(ThresholdConfig::default());
//! for alert in monitor.check("1.0.0", "1.1.0", &baseline_summary, &current_summary) {
//!     println!("{}", alert.message);
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pricing;
pub mod store;
pub mod version;

pub use analysis::{
    AbComparison, Alert, AlertHandler, AlertSeverity, AlertType, RegressionMonitor,
    SignificanceTester, SignificanceTesterTrait, Verdict, DEFAULT_Z_THRESHOLD,
};
pub use config::{AbConfig, AppConfig, PathConfig, ThresholdConfig};
pub use error::{Error, Result};
pub use metrics::{
    Badges, MetricRecord, MetricsAggregator, MetricsAggregatorTrait, ModelRanker, ModelRankerTrait,
    ModelSummary, Polarity, Summary,
};
pub use pricing::{ModelPricing, PricingTable};
pub use store::{JsonlStore, MetricStore, RecordFilter};
pub use version::{next_version, SemanticVersion, VersionBump};
