//! Built-in pricing table for the models the agent runs on.
//!
//! Prices are in USD per 1 million tokens. Each model has an input and
//! output price. Unknown models fall back to GPT-4o-class pricing so cost
//! accounting never silently disappears.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-million-token pricing for a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Price per 1M input tokens in USD.
    pub input_per_m: f64,
    /// Price per 1M output tokens in USD.
    pub output_per_m: f64,
}

impl ModelPricing {
    /// Create a new pricing entry.
    pub fn new(input_per_m: f64, output_per_m: f64) -> Self {
        Self {
            input_per_m,
            output_per_m,
        }
    }

    /// Compute cost for the given token counts.
    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        (input_tokens as f64 * self.input_per_m + output_tokens as f64 * self.output_per_m)
            / 1_000_000.0
    }
}

/// Pricing table with built-in defaults.
pub struct PricingTable {
    prices: HashMap<String, ModelPricing>,
}

impl PricingTable {
    /// Create a pricing table with built-in model prices.
    pub fn with_defaults() -> Self {
        let mut prices = HashMap::new();

        // ── Azure OpenAI ───────────────────────────────────────────
        prices.insert("azure/gpt-4o".into(), ModelPricing::new(5.0, 15.0));
        prices.insert("azure/gpt-4o-mini".into(), ModelPricing::new(0.15, 0.6));
        prices.insert("azure/gpt-4-turbo".into(), ModelPricing::new(10.0, 30.0));
        prices.insert("azure/gpt-35-turbo".into(), ModelPricing::new(0.5, 1.5));

        // ── OpenAI direct ──────────────────────────────────────────
        prices.insert("openai/gpt-4o".into(), ModelPricing::new(2.5, 10.0));
        prices.insert("openai/gpt-4o-mini".into(), ModelPricing::new(0.15, 0.6));

        Self { prices }
    }

    /// Look up a model's pricing.
    pub fn get(&self, model: &str) -> Option<ModelPricing> {
        self.prices.get(model).cloned()
    }

    /// Pricing for `model`, falling back to GPT-4o-class rates when the
    /// model is not in the table.
    pub fn resolve(&self, model: &str) -> ModelPricing {
        self.get(model).unwrap_or_else(|| ModelPricing::new(5.0, 15.0))
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}
