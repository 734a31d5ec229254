//! Answer normalization for spelling questions.
//!
//! Submissions are compared to the expected text after trimming, Unicode
//! NFC composition and lowercasing, so `"  Mèo "` typed with a decomposed
//! grave accent still matches `"mèo"`. Diacritics are significant unless
//! the matcher is configured to ignore them.

use serde::{Deserialize, Serialize};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerMatcher {
    /// Accept `"meo"` for `"mèo"` and `"do"` for `"đỏ"`.
    #[serde(default)]
    pub ignore_diacritics: bool,
}

impl AnswerMatcher {
    pub const STRICT: Self = Self {
        ignore_diacritics: false,
    };

    pub const LENIENT: Self = Self {
        ignore_diacritics: true,
    };

    /// Canonical form used for comparison.
    pub fn normalize(&self, s: &str) -> String {
        let composed: String = s.trim().nfc().collect::<String>().to_lowercase();
        if !self.ignore_diacritics {
            return composed;
        }
        composed
            .replace('đ', "d")
            .nfd()
            .filter(|c| !is_combining_mark(*c))
            .collect()
    }

    pub fn matches(&self, submitted: &str, expected: &str) -> bool {
        self.normalize(submitted) == self.normalize(expected)
    }
}

/// True when the text has nothing but whitespace in it.
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
