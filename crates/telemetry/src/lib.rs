//! Usage reporting, warning classification, and cost estimation for ctxpack.
//!
//! These run after the selection pipeline and only read its output: a
//! token/utilization breakdown per source, warnings classified against fixed
//! thresholds, and a cost estimate from a model pricing table.

pub mod pricing;
pub mod report;
pub mod warnings;

pub use pricing::{CostEstimate, ModelPricing, PricingTable};
pub use report::{PackStats, SourceStats, summarize};
pub use warnings::{Warning, WarningKind, detect_warnings};
