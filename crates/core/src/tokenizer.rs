//! Tokenizer capability: how text is measured.
//!
//! The pipeline only depends on `count(text) -> usize`. The engine ships
//! heuristic implementations; callers can plug in an exact BPE counter or a
//! plain closure.

/// Measures text in tokens.
pub trait Tokenizer: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &str {
        "custom"
    }

    /// Number of tokens in `text`.
    fn count(&self, text: &str) -> usize;
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> usize + Send + Sync,
{
    fn count(&self, text: &str) -> usize {
        self(text)
    }
}
