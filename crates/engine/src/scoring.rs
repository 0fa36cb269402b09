//! Priority tiers to base scores.
//!
//! Each tier sits two orders of magnitude above the next, so even after the
//! strongest recency decay (down to 10%) a high item still outranks any
//! medium one, and a medium item any low one.

use ctxpack_core::Priority;

pub const HIGH_SCORE: f64 = 10_000.0;
pub const MEDIUM_SCORE: f64 = 100.0;
pub const LOW_SCORE: f64 = 1.0;

/// Base score for a priority tier. Required is `+∞`.
pub fn base_score(priority: Priority) -> f64 {
    match priority {
        Priority::Required => f64::INFINITY,
        Priority::High => HIGH_SCORE,
        Priority::Medium => MEDIUM_SCORE,
        Priority::Low => LOW_SCORE,
    }
}
