//! Case-folding word tokenizer shared by index build and query time.
//!
//! Lowercases, then splits on every non-alphanumeric character, so
//! punctuation and whitespace both separate words. Digits are kept
//! (`"5"`, `"k8s"`), and no stop words are removed.

/// Split `text` into lowercase alphanumeric tokens, in order, with repeats.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}
