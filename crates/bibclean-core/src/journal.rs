//! Journal abbreviation lookup
//!
//! Translates full journal names to their standard abbreviations (or back)
//! through a table loaded from a `Full Journal Name = Abbrev.` text file.

use std::collections::HashMap;

use crate::config::{CleanerConfig, JournalDirection};

/// Full-name/abbreviation pairs with the derived lookup indexes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbbreviationTable {
    /// (full name, abbreviation) in source order
    entries: Vec<(String, String)>,
    /// normalized full name -> entry
    by_name: HashMap<String, usize>,
    /// normalized abbreviation without periods -> entry
    by_dotless: HashMap<String, usize>,
}

impl AbbreviationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a line-oriented `Full Journal Name = Abbrev.` table
    ///
    /// Blank lines, `#` comments and lines without `=` are skipped.
    pub fn from_text(text: &str) -> Self {
        let mut table = Self::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once('=') {
                Some((full, abbrev)) if !full.trim().is_empty() && !abbrev.trim().is_empty() => {
                    table.insert(full.trim(), abbrev.trim());
                }
                _ => tracing::debug!("Skipping abbreviation line {:?}", line),
            }
        }
        table
    }

    /// Build a table from (full name, abbreviation) pairs
    pub fn from_entries(entries: Vec<(String, String)>) -> Self {
        let mut table = Self::new();
        for (full, abbrev) in entries {
            table.insert(&full, &abbrev);
        }
        table
    }

    /// Add a pair; a later pair for the same full name wins
    pub fn insert(&mut self, full: &str, abbrev: &str) {
        let name_key = normalize_journal(full);
        let dotless_key = normalize_journal(&strip_periods(abbrev));
        let entry = (full.to_string(), abbrev.to_string());

        let idx = match self.by_name.get(&name_key) {
            Some(&idx) => {
                self.entries[idx] = entry;
                idx
            }
            None => {
                self.entries.push(entry);
                self.entries.len() - 1
            }
        };
        self.by_name.insert(name_key, idx);
        self.by_dotless.insert(dotless_key, idx);
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Abbreviation for a journal name
    ///
    /// Exact match on the normalized name first, then a match ignoring
    /// periods against the abbreviations themselves.
    pub fn lookup_abbreviation(&self, journal: &str) -> Option<&str> {
        let idx = self
            .by_name
            .get(&normalize_journal(journal))
            .or_else(|| self.by_dotless.get(&normalize_journal(&strip_periods(journal))))?;
        Some(self.entries[*idx].1.as_str())
    }

    /// Full name for an abbreviation, ignoring periods
    pub fn lookup_full_name(&self, abbrev: &str) -> Option<&str> {
        let idx = self
            .by_dotless
            .get(&normalize_journal(&strip_periods(abbrev)))?;
        Some(self.entries[*idx].0.as_str())
    }
}

/// Lower-case, `\&` as `&`, single spaces
pub fn normalize_journal(name: &str) -> String {
    name.replace("\\&", "&")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drop every period and tidy the spacing ("Phys. Rev. Lett." -> "Phys Rev Lett")
pub fn strip_periods(s: &str) -> String {
    s.replace('.', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Applies the configured direction and dot convention to table lookups
#[derive(Debug, Clone, Copy)]
pub struct JournalAbbreviator<'a> {
    table: &'a AbbreviationTable,
    direction: JournalDirection,
    keep_dots: bool,
}

impl<'a> JournalAbbreviator<'a> {
    pub fn new(table: &'a AbbreviationTable, config: &CleanerConfig) -> Self {
        Self {
            table,
            direction: config.journal_direction,
            keep_dots: config.abbreviation_keeps_dots,
        }
    }

    /// Translated name, or `None` when the table has no match
    pub fn translate(&self, journal: &str) -> Option<String> {
        match self.direction {
            JournalDirection::Abbreviate => {
                let abbrev = self.table.lookup_abbreviation(journal)?;
                Some(if self.keep_dots {
                    abbrev.to_string()
                } else {
                    strip_periods(abbrev)
                })
            }
            JournalDirection::Expand => self.table.lookup_full_name(journal).map(str::to_string),
        }
    }

    /// Translated name, or the input unchanged with a diagnostic
    pub fn apply(&self, journal: &str) -> String {
        match self.translate(journal) {
            Some(translated) => translated,
            None => {
                tracing::warn!("No journal abbreviation match for {:?}", journal);
                journal.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
# JabRef export
Physical Review Letters = Phys. Rev. Lett.
Journal of Chemical Physics = J. Chem. Phys.
Science & Engineering Ethics = Sci. Eng. Ethics

not a table line
Nature = Nature
";

    fn table() -> AbbreviationTable {
        AbbreviationTable::from_text(TABLE)
    }

    #[test]
    fn test_from_text_skips_noise() {
        let table = table();
        assert_eq!(table.len(), 4);
        assert_eq!(
            table.entries()[0],
            (
                "Physical Review Letters".to_string(),
                "Phys. Rev. Lett.".to_string()
            )
        );
    }

    #[test]
    fn test_exact_lookup_is_case_insensitive() {
        let table = table();
        assert_eq!(
            table.lookup_abbreviation("Physical Review Letters"),
            Some("Phys. Rev. Lett.")
        );
        assert_eq!(
            table.lookup_abbreviation("PHYSICAL REVIEW  LETTERS"),
            Some("Phys. Rev. Lett.")
        );
    }

    #[test]
    fn test_escaped_ampersand() {
        assert_eq!(
            table().lookup_abbreviation(r"Science \& Engineering Ethics"),
            Some("Sci. Eng. Ethics")
        );
    }

    #[test]
    fn test_dotless_fallback() {
        let table = table();
        assert_eq!(
            table.lookup_abbreviation("J Chem Phys"),
            Some("J. Chem. Phys.")
        );
        assert_eq!(
            table.lookup_abbreviation("J. Chem. Phys."),
            Some("J. Chem. Phys.")
        );
        assert_eq!(table.lookup_abbreviation("Unknown Journal"), None);
    }

    #[test]
    fn test_inverse_lookup() {
        let table = table();
        assert_eq!(
            table.lookup_full_name("Phys Rev Lett"),
            Some("Physical Review Letters")
        );
        assert_eq!(
            table.lookup_full_name("phys. rev. lett."),
            Some("Physical Review Letters")
        );
        assert_eq!(table.lookup_full_name("Physical Review Letters"), None);
    }

    #[test]
    fn test_later_duplicate_wins() {
        let table = AbbreviationTable::from_text("Foo Journal = F. J.\nfoo journal = Foo J.\n");
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup_abbreviation("Foo Journal"), Some("Foo J."));
    }

    #[test]
    fn test_abbreviator_keeps_or_drops_dots() {
        let table = table();
        let mut config = CleanerConfig::default();

        let abbreviator = JournalAbbreviator::new(&table, &config);
        assert_eq!(abbreviator.apply("Physical Review Letters"), "Phys. Rev. Lett.");

        config.abbreviation_keeps_dots = false;
        let abbreviator = JournalAbbreviator::new(&table, &config);
        assert_eq!(abbreviator.apply("Physical Review Letters"), "Phys Rev Lett");
    }

    #[test]
    fn test_abbreviator_expand_direction() {
        let table = table();
        let config = CleanerConfig {
            journal_direction: JournalDirection::Expand,
            ..CleanerConfig::default()
        };
        let abbreviator = JournalAbbreviator::new(&table, &config);
        assert_eq!(abbreviator.apply("J. Chem. Phys."), "Journal of Chemical Physics");
    }

    #[test]
    fn test_unmatched_journal_unchanged() {
        let table = table();
        let abbreviator = JournalAbbreviator::new(&table, &CleanerConfig::default());
        assert_eq!(abbreviator.translate("Annals of Nowhere"), None);
        assert_eq!(abbreviator.apply("Annals of Nowhere"), "Annals of Nowhere");
    }
}
