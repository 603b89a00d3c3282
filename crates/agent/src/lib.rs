//! Agent collaborator implementations for Tradewind.
//!
//! The agent is stateless per call: it receives one user query plus a short
//! context digest and returns one structured answer with usage figures. The
//! `StrategyAgent` trait lives in `tradewind-core`; this crate provides the
//! Azure OpenAI implementation plus the pricing table used to turn token
//! usage into cost estimates.

pub mod azure;
pub mod pricing;
pub mod prompt;

pub use azure::AzureAgent;
pub use pricing::{ModelPricing, PricingTable};
