//! @ai:module:intent Persistence boundary for metric records
//! @ai:module:layer infrastructure
//! @ai:module:public_api MetricStore, RecordFilter, JsonlStore

pub mod jsonl;

use crate::error::Result;
use crate::metrics::MetricRecord;
use chrono::{DateTime, Utc};

pub use jsonl::JsonlStore;

/// @ai:intent Query filter for stored metric records
/// @ai:effects pure
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub prompt: String,
    pub version: Option<String>,
    pub model: Option<String>,
    pub until: Option<DateTime<Utc>>,
}

impl RecordFilter {
    /// @ai:intent Filter matching every record of one prompt
    /// @ai:effects pure
    pub fn for_prompt(prompt: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            ..Self::default()
        }
    }

    /// @ai:intent Narrow the filter to one version
    /// @ai:effects pure
    pub fn version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// @ai:intent Narrow the filter to one model
    /// @ai:effects pure
    pub fn model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    /// @ai:intent Keep only records at or before the given instant
    /// @ai:effects pure
    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    /// @ai:intent Check whether a record passes this filter
    /// @ai:effects pure
    pub fn matches(&self, record: &MetricRecord) -> bool {
        if record.prompt_name != self.prompt {
            return false;
        }

        if let Some(version) = &self.version {
            if &record.version != version {
                return false;
            }
        }

        if let Some(model) = &self.model {
            if &record.model_name != model {
                return false;
            }
        }

        if let Some(until) = &self.until {
            if record.timestamp > *until {
                return false;
            }
        }

        true
    }
}

/// @ai:intent Storage backend for metric records
pub trait MetricStore: Send + Sync {
    /// Validate and persist a record, stamping its timestamp.
    fn append(&self, record: MetricRecord) -> Result<MetricRecord>;

    /// Return matching records in ascending timestamp order.
    fn query(&self, filter: &RecordFilter) -> Result<Vec<MetricRecord>>;
}
