//! Built-in token estimators.
//!
//! Neither is exact; both are cheap and deterministic, which is what the
//! packer needs. Callers that want exact counts plug in their own
//! [`Tokenizer`].

use ctxpack_core::Tokenizer;
use std::sync::Arc;

/// Character-class ratio estimate.
///
/// ASCII letters and digits run about 4 per token, ASCII punctuation about 2,
/// and non-ASCII characters about 1.5. Whitespace is folded into neighbouring
/// tokens and not counted. Rounds up.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenizer;

impl Tokenizer for HeuristicTokenizer {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }

        let mut alnum = 0usize;
        let mut other = 0usize;
        let mut non_ascii = 0usize;
        for c in text.chars() {
            if c.is_ascii_alphanumeric() {
                alnum += 1;
            } else if c.is_whitespace() {
                continue;
            } else if c.is_ascii() {
                other += 1;
            } else {
                non_ascii += 1;
            }
        }

        let estimate = alnum as f64 / 4.0 + other as f64 / 2.0 + non_ascii as f64 / 1.5;
        estimate.ceil() as usize
    }
}

/// Flat estimate: 1 token ≈ 4 bytes. Rounds up.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharRatioTokenizer;

impl Tokenizer for CharRatioTokenizer {
    fn name(&self) -> &str {
        "chars"
    }

    fn count(&self, text: &str) -> usize {
        text.len().div_ceil(4)
    }
}

/// Resolve a configured tokenizer name. Unknown names yield `None`.
pub fn tokenizer_for(kind: &str) -> Option<Arc<dyn Tokenizer>> {
    match kind {
        "heuristic" => Some(Arc::new(HeuristicTokenizer)),
        "chars" => Some(Arc::new(CharRatioTokenizer)),
        _ => None,
    }
}
