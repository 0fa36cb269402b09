//! The selection-and-arrangement pipeline of ctxpack.
//!
//! A pack call turns registered sources into an ordered context window:
//!
//! 1. **Normalize** raw payloads into measured items
//! 2. **Group** conversational messages into atomic turns
//! 3. **Score** by priority tier, relevance (with a query), and recency
//! 4. **Pack** greedily within the token budget
//! 5. **Enforce** dependency constraints, cascading removals
//! 6. **Place** items where the model attends to them most
//!
//! [`ContextOptimizer`] drives the stages; each stage is also exposed as a
//! free function over owned item collections.

pub mod constraints;
pub mod normalize;
pub mod optimizer;
pub mod packer;
pub mod placement;
pub mod recency;
pub mod relevance;
pub mod result;
pub mod scoring;
pub mod source;
pub mod token;
pub mod turns;

pub use constraints::{EnforceOutcome, enforce_constraints};
pub use optimizer::{ContextOptimizer, PackOptions, QUERY_SOURCE};
pub use packer::{PackOutcome, pack_greedy};
pub use placement::place;
pub use relevance::KeywordScorer;
pub use result::PackResult;
pub use source::{AddOptions, GroupBy};
pub use token::{CharRatioTokenizer, HeuristicTokenizer, tokenizer_for};
