//! Cite key generation
//!
//! Keys look like `Smith2020-PRL`: first-author surname, year, and for
//! articles the initials of the journal. Repeated keys get a letter
//! between the year and the journal part (`Smith2020a-PRL`).

use std::collections::HashMap;

use crate::author::ascii_fold;

/// Stands in for a missing year
pub const YEAR_PLACEHOLDER: &str = "XXXX";

/// Words skipped when taking journal initials
const JOURNAL_STOP_WORDS: [&str; 8] = ["&", "\\&", "and", "of", "in", "on", "the", "for"];

/// Journal initials prefixed with a hyphen ("Phys. Rev. Lett." -> "-PRL")
///
/// Empty when the name has no usable word.
pub fn journal_initials(journal: &str) -> String {
    let initials: String = journal
        .split_whitespace()
        .filter(|word| !JOURNAL_STOP_WORDS.contains(&word.to_lowercase().as_str()))
        .filter_map(|word| word.chars().find(|c| c.is_alphanumeric()))
        .collect();

    if initials.is_empty() {
        String::new()
    } else {
        format!("-{}", initials)
    }
}

/// Sanitize a cite key by removing invalid characters
pub fn sanitize_cite_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || *c == ':')
        .collect()
}

/// ASCII-folded, sanitized key component
fn key_part(s: &str) -> String {
    sanitize_cite_key(&ascii_fold(s))
}

/// Letter suffix for the n-th collision: 0 -> "a", 25 -> "z", 26 -> "aa"
pub fn collision_suffix(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push((b'a' + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// Generates run-unique keys; one instance lives for one cleaning run
#[derive(Debug, Clone, Default)]
pub struct KeyGenerator {
    /// base key -> occurrences so far, in first-seen order of use
    seen: HashMap<String, usize>,
}

impl KeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key before collision handling
    pub fn base_key(surname: &str, year: Option<&str>, journal_suffix: &str) -> String {
        let (stem, year, suffix) = Self::parts(surname, year, journal_suffix);
        format!("{}{}{}", stem, year, suffix)
    }

    /// Next key for this author/year/journal combination
    pub fn generate(&mut self, surname: &str, year: Option<&str>, journal_suffix: &str) -> String {
        let (stem, year, suffix) = Self::parts(surname, year, journal_suffix);
        let base = format!("{}{}{}", stem, year, suffix);

        let count = self.seen.entry(base.clone()).or_insert(0);
        *count += 1;

        if *count == 1 {
            base
        } else {
            format!("{}{}{}{}", stem, year, collision_suffix(*count - 2), suffix)
        }
    }

    fn parts(surname: &str, year: Option<&str>, journal_suffix: &str) -> (String, String, String) {
        let year = year
            .map(key_part)
            .filter(|y| !y.is_empty())
            .unwrap_or_else(|| YEAR_PLACEHOLDER.to_string());
        (key_part(surname), year, key_part(journal_suffix))
    }
}
