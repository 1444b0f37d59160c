//! Zero-width placeholder handling.
//!
//! Empty text containers are kept hit-testable by rendering a zero-width
//! character into them. Browsers and input-method engines also inject the
//! same character into live text runs during composition. Reconciliation
//! strips it everywhere before text reaches the logical document.

use std::borrow::Cow;

/// The zero-width placeholder character rendered into empty text runs.
pub const ZERO_WIDTH: char = '\u{FEFF}';

/// Whether the text contains any zero-width placeholder characters.
pub fn contains_zero_width(text: &str) -> bool {
    text.contains(ZERO_WIDTH)
}

/// Remove all zero-width placeholder characters.
///
/// Borrows when there is nothing to strip, which is the common case for
/// every flush after the first.
pub fn strip_zero_width(text: &str) -> Cow<'_, str> {
    if contains_zero_width(text) {
        Cow::Owned(text.chars().filter(|&c| c != ZERO_WIDTH).collect())
    } else {
        Cow::Borrowed(text)
    }
}

/// Count characters after zero-width stripping.
pub fn visible_char_count(text: &str) -> usize {
    text.chars().filter(|&c| c != ZERO_WIDTH).count()
}
