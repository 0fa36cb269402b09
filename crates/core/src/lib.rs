//! # ctxpack Core
//!
//! Domain types, capability traits, and error definitions for the ctxpack
//! context optimizer. This crate holds **no pipeline logic**; it defines the
//! vocabulary that the engine, telemetry, and CLI crates share.
//!
//! ## Design Philosophy
//!
//! The two pluggable capabilities (token counting and relevance scoring) are
//! traits here. Implementations live in the engine crate or in caller code:
//! - Swapping a tokenizer never touches the packing algorithm
//! - Tests can inject closures as tokenizers and scorers
//! - Clean dependency graph (all crates depend inward on core)

pub mod constraint;
pub mod error;
pub mod item;
pub mod packed;
pub mod score;
pub mod scorer;
pub mod tokenizer;

// Re-export key types at crate root for ergonomics
pub use constraint::Constraint;
pub use error::{Error, Result};
pub use item::{DropStrategy, Item, ItemOrigin, Placement, Position, Priority};
pub use packed::{DropReason, DroppedItem, PackedItem};
pub use scorer::Scorer;
pub use tokenizer::Tokenizer;
