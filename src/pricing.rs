//! @ai:module:intent Model pricing table for deriving call costs
//! @ai:module:layer domain
//! @ai:module:public_api PricingTable, ModelPricing
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TOKENS_PER_PRICE_UNIT: f64 = 1_000_000.0;

/// @ai:intent Per-model prices in EUR per 1M input/output tokens
/// @ai:effects pure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub input: f64,
    pub output: f64,
}

/// @ai:intent Pricing table passed explicitly to callers, no global registry
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingTable {
    #[serde(flatten)]
    pub models: BTreeMap<String, ModelPricing>,
}

impl PricingTable {
    /// @ai:intent Create an empty table
    /// @ai:effects pure
    pub fn empty() -> Self {
        Self {
            models: BTreeMap::new(),
        }
    }

    /// @ai:intent Add or replace pricing for a model
    pub fn set(&mut self, model: &str, input: f64, output: f64) {
        self.models
            .insert(model.to_string(), ModelPricing { input, output });
    }

    /// @ai:intent Derive the cost of one call
    /// @ai:post None for an unknown model (caller must supply cost explicitly)
    /// @ai:effects pure
    pub fn cost(&self, model: &str, input_tokens: u32, output_tokens: u32) -> Option<f64> {
        let pricing = self.models.get(model)?;

        let input_cost = f64::from(input_tokens) / TOKENS_PER_PRICE_UNIT * pricing.input;
        let output_cost = f64::from(output_tokens) / TOKENS_PER_PRICE_UNIT * pricing.output;

        Some(input_cost + output_cost)
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.set("claude-opus-4-1", 13.80, 69.00);
        table.set("claude-opus-4", 13.80, 69.00);
        table.set("claude-sonnet-4", 5.06, 23.00);
        table.set("mistral-large-24-11", 1.84, 5.52);
        table.set("mistral-medium-3", 0.37, 1.84);
        table.set("mistral-small-3-1", 0.09, 0.28);
        table.set("mistral-nemo", 0.14, 0.14);
        table.set("gpt-5", 1.15, 9.20);
        table.set("gpt-5-mini", 0.23, 1.84);
        table.set("gpt-5-nano", 0.05, 0.37);
        table.set("gpt-4-1", 0.92, 3.68);
        table.set("gpt-4-1-mini", 0.18, 0.73);
        table.set("gpt-4o", 1.15, 4.60);
        table
    }
}
