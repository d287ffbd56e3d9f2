//! Record assembly, duplicate detection and year sorting
//!
//! The [`Assembler`] owns everything that spans records in one run: the
//! key generator's collision counts, the accumulated records and the key
//! index used to catch two different records claiming the same key.

use std::collections::{BTreeSet, HashMap};

use crate::author::AuthorList;
use crate::cite_key::{journal_initials, KeyGenerator};
use crate::config::CleanerConfig;
use crate::entry::{BibRecord, FieldMap};
use crate::error::{CleanError, Result};
use crate::formatter::{format_record, format_records};

/// Sort year of undated records: after every real year, in encounter order
pub const UNDATED_SORT_BASE: i64 = 100_000;

/// A finished record under its final key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub key: String,
    pub entry_type: String,
    pub fields: FieldMap,
    pub sort_year: i64,
}

/// What happened to a record handed to the assembler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Kept under this key
    Included(String),
    /// Rejected by the author selection filter
    Excluded(String),
    /// Identical to a record already kept under this key
    DuplicateDropped(String),
    /// No author or editor to build a key from; carries the source key
    MissingAuthor(String),
}

/// Accumulates the records of one run
#[derive(Debug)]
pub struct Assembler<'a> {
    config: &'a CleanerConfig,
    keys: KeyGenerator,
    records: Vec<OutputRecord>,
    index: HashMap<String, usize>,
    encountered: usize,
}

impl<'a> Assembler<'a> {
    pub fn new(config: &'a CleanerConfig) -> Self {
        Self {
            config,
            keys: KeyGenerator::new(),
            records: Vec::new(),
            index: HashMap::new(),
            encountered: 0,
        }
    }

    /// Key, truncate, filter and store one record
    ///
    /// `authors` is the parsed author (or editor) list of the record. A
    /// record without names keeps its source key when keys are not
    /// regenerated; otherwise it is reported and skipped.
    pub fn add(&mut self, mut record: BibRecord, authors: &AuthorList) -> Result<Admission> {
        let key = if self.config.generate_new_keys || record.original_key.is_empty() {
            let Some(first) = authors.first() else {
                let err = CleanError::MissingAuthor {
                    key: record.original_key.clone(),
                };
                tracing::error!("{}, skipping it", err);
                return Ok(Admission::MissingAuthor(record.original_key));
            };
            let suffix = if record.is_article() {
                record.journal().map(journal_initials).unwrap_or_default()
            } else {
                String::new()
            };
            self.keys.generate(&first.surname, record.year(), &suffix)
        } else {
            record.original_key.clone()
        };

        if record.author().is_some() && !authors.is_empty() {
            record.add_field("author", authors.truncated(self.config.authors_before_et_al));
        }

        if !self.is_selected(authors) {
            tracing::info!("Record type: {}, {}", record.entry_type, key);
            return Ok(Admission::Excluded(key));
        }
        tracing::info!("Record type: {}, {}   ---> output", record.entry_type, key);

        let sort_year = parse_year(record.year())
            .unwrap_or(UNDATED_SORT_BASE + self.encountered as i64);
        self.encountered += 1;

        let candidate = OutputRecord {
            key: key.clone(),
            entry_type: record.entry_type,
            fields: record.fields,
            sort_year,
        };

        if let Some(&idx) = self.index.get(&key) {
            let existing = &self.records[idx];
            if existing.entry_type == candidate.entry_type && existing.fields == candidate.fields {
                tracing::warn!("Dropping repeated record {}", key);
                return Ok(Admission::DuplicateDropped(key));
            }

            let everything = BTreeSet::new();
            return Err(CleanError::DuplicateKey {
                key,
                existing: format_record(existing, &everything),
                incoming: format_record(&candidate, &everything),
            });
        }

        self.index.insert(key.clone(), self.records.len());
        self.records.push(candidate);
        Ok(Admission::Included(key))
    }

    /// Whether the record passes the author selection filter
    fn is_selected(&self, authors: &AuthorList) -> bool {
        if self.config.selected_authors.is_empty() {
            return true;
        }
        let names = authors.to_bibtex();
        self.config
            .selected_authors
            .iter()
            .any(|selected| names.contains(selected.as_str()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sort by year and hand over the records
    pub fn finish(self) -> Bibliography {
        let mut records = self.records;
        records.sort_by_key(|record| record.sort_year);
        Bibliography { records }
    }
}

/// Leading digits of a year field ("2020", "2020a", "1999--2000")
pub fn parse_year(year: Option<&str>) -> Option<i64> {
    let digits: String = year?
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// The sorted result of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bibliography {
    pub records: Vec<OutputRecord>,
}

impl Bibliography {
    /// Keys in output order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&OutputRecord> {
        self.records.iter().find(|record| record.key == key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The cleaned `.bib` text
    pub fn to_bibtex(&self, omitted: &BTreeSet<String>) -> String {
        format_records(&self.records, omitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::author::AuthorParser;
    use proptest::prelude::*;

    fn article(author: &str, year: Option<&str>, journal: &str) -> BibRecord {
        let mut record = BibRecord::new("article", "orig");
        record.add_field("author", author);
        if let Some(year) = year {
            record.add_field("year", year);
        }
        record.add_field("journal", journal);
        record
    }

    fn add(assembler: &mut Assembler, record: BibRecord) -> Result<Admission> {
        let config = CleanerConfig::default();
        let authors = AuthorParser::new(&config).parse(record.author_source()?);
        assembler.add(record, &authors)
    }

    #[test]
    fn test_key_and_truncation() {
        let config = CleanerConfig::default();
        let mut assembler = Assembler::new(&config);

        let admission = add(
            &mut assembler,
            article("Smith, John and Doe, Jane and Roe, Richard", Some("2020"), "Phys. Rev. Lett."),
        )
        .unwrap();
        assert_eq!(admission, Admission::Included("Smith2020-PRL".to_string()));

        let bib = assembler.finish();
        let record = bib.get("Smith2020-PRL").unwrap();
        assert_eq!(
            record.fields.get("author"),
            Some("Smith, J. and Doe, J. and others")
        );
    }

    #[test]
    fn test_identical_author_year_journal_get_letters() {
        let config = CleanerConfig::default();
        let mut assembler = Assembler::new(&config);

        let mut first = article("Smith, John", Some("2020"), "Nature");
        first.add_field("title", "One");
        let mut second = article("Smith, John", Some("2020"), "Nature");
        second.add_field("title", "Two");
        let mut third = article("Smith, John", Some("2020"), "Nature");
        third.add_field("title", "Three");

        assert_eq!(
            add(&mut assembler, first).unwrap(),
            Admission::Included("Smith2020-N".to_string())
        );
        assert_eq!(
            add(&mut assembler, second).unwrap(),
            Admission::Included("Smith2020a-N".to_string())
        );
        assert_eq!(
            add(&mut assembler, third).unwrap(),
            Admission::Included("Smith2020b-N".to_string())
        );
    }

    #[test]
    fn test_distinct_records_with_same_final_key_are_fatal() {
        let config = CleanerConfig::default();
        let mut assembler = Assembler::new(&config);

        let mut book = BibRecord::new("book", "b1");
        book.add_field("author", "Smith, John");
        book.add_field("year", "2020");
        add(&mut assembler, book.clone()).unwrap();

        book.add_field("title", "Second edition");
        assert_eq!(
            add(&mut assembler, book).unwrap(),
            Admission::Included("Smith2020a".to_string())
        );

        // year "2020a" produces the base key already taken above
        let mut odd = BibRecord::new("book", "b3");
        odd.add_field("author", "Smith, John");
        odd.add_field("year", "2020a");
        let err = add(&mut assembler, odd).unwrap_err();
        match err {
            CleanError::DuplicateKey {
                key,
                existing,
                incoming,
            } => {
                assert_eq!(key, "Smith2020a");
                assert!(existing.contains("Second edition"));
                assert!(incoming.contains("2020a"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_kept_keys_collision_of_identical_records_is_dropped() {
        let config = CleanerConfig {
            generate_new_keys: false,
            ..CleanerConfig::default()
        };
        let mut assembler = Assembler::new(&config);

        let record = article("Doe, Jane", Some("2001"), "Nature");
        add(&mut assembler, record.clone()).unwrap();
        assert_eq!(
            add(&mut assembler, record).unwrap(),
            Admission::DuplicateDropped("orig".to_string())
        );
        assert_eq!(assembler.len(), 1);
    }

    #[test]
    fn test_kept_keys_collision_of_different_records_is_fatal() {
        let config = CleanerConfig {
            generate_new_keys: false,
            ..CleanerConfig::default()
        };
        let mut assembler = Assembler::new(&config);

        add(&mut assembler, article("Doe, Jane", Some("2001"), "Nature")).unwrap();
        let err = add(&mut assembler, article("Roe, Ray", Some("2002"), "Science")).unwrap_err();
        assert!(matches!(err, CleanError::DuplicateKey { .. }));
    }

    #[test]
    fn test_selected_authors_filter() {
        let config = CleanerConfig {
            selected_authors: vec!["Lukeš".to_string()],
            ..CleanerConfig::default()
        };
        let mut assembler = Assembler::new(&config);

        let kept = add(
            &mut assembler,
            article("Doe, J. and Roe, R. and Lukes, Robert", Some("2015"), "Nature"),
        )
        .unwrap();
        assert_eq!(kept, Admission::Included("Doe2015-N".to_string()));

        let skipped = add(&mut assembler, article("Roe, Ray", Some("2016"), "Nature")).unwrap();
        assert_eq!(skipped, Admission::Excluded("Roe2016-N".to_string()));
        assert_eq!(assembler.len(), 1);
    }

    #[test]
    fn test_editor_only_record_keeps_no_author_field() {
        let config = CleanerConfig::default();
        let mut assembler = Assembler::new(&config);

        let mut book = BibRecord::new("book", "ed");
        book.add_field("editor", "Doe, Jane");
        book.add_field("year", "1990");
        assert_eq!(
            add(&mut assembler, book).unwrap(),
            Admission::Included("Doe1990".to_string())
        );
        let bib = assembler.finish();
        assert!(!bib.records[0].fields.contains("author"));
    }

    #[test]
    fn test_record_without_names_is_skipped() {
        let config = CleanerConfig::default();
        let mut assembler = Assembler::new(&config);
        let mut record = BibRecord::new("misc", "nobody");
        record.add_field("title", "Project homepage");

        let admission = assembler.add(record, &AuthorList::default()).unwrap();
        assert_eq!(admission, Admission::MissingAuthor("nobody".to_string()));
        assert!(assembler.is_empty());
    }

    #[test]
    fn test_record_without_names_keeps_source_key() {
        let config = CleanerConfig {
            generate_new_keys: false,
            ..CleanerConfig::default()
        };
        let mut assembler = Assembler::new(&config);
        let mut record = BibRecord::new("misc", "web");
        record.add_field("title", "Project homepage");
        record.add_field("year", "2010");

        let admission = assembler.add(record, &AuthorList::default()).unwrap();
        assert_eq!(admission, Admission::Included("web".to_string()));
        let bib = assembler.finish();
        assert!(!bib.records[0].fields.contains("author"));
        assert_eq!(bib.records[0].sort_year, 2010);
    }

    #[test]
    fn test_record_without_names_and_without_key_is_skipped() {
        let config = CleanerConfig {
            generate_new_keys: false,
            ..CleanerConfig::default()
        };
        let mut assembler = Assembler::new(&config);
        let record = BibRecord::new("misc", "");
        let admission = assembler.add(record, &AuthorList::default()).unwrap();
        assert_eq!(admission, Admission::MissingAuthor(String::new()));
    }

    #[test]
    fn test_undated_records_sort_last_in_encounter_order() {
        let config = CleanerConfig::default();
        let mut assembler = Assembler::new(&config);

        add(&mut assembler, article("A, A.", None, "J")).unwrap();
        add(&mut assembler, article("B, B.", Some("2010"), "J")).unwrap();
        add(&mut assembler, article("C, C.", None, "J")).unwrap();
        add(&mut assembler, article("D, D.", Some("1990"), "J")).unwrap();

        let keys: Vec<String> = assembler.finish().keys().map(str::to_string).collect();
        assert_eq!(keys, vec!["D1990-J", "B2010-J", "AXXXX-J", "CXXXX-J"]);
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year(Some("2020")), Some(2020));
        assert_eq!(parse_year(Some(" 2020a")), Some(2020));
        assert_eq!(parse_year(Some("in press")), None);
        assert_eq!(parse_year(None), None);
    }

    proptest! {
        #[test]
        fn prop_output_sorted_by_year(years in proptest::collection::vec(proptest::option::of(1900u32..2100), 1..30)) {
            let config = CleanerConfig::default();
            let mut assembler = Assembler::new(&config);
            for (i, year) in years.iter().enumerate() {
                let year = year.map(|y| y.to_string());
                let mut record = BibRecord::new("misc", format!("r{i}"));
                record.add_field("author", format!("Author{i}, A."));
                if let Some(year) = year {
                    record.add_field("year", year);
                }
                add(&mut assembler, record).unwrap();
            }

            let bib = assembler.finish();
            let sort_years: Vec<i64> = bib.records.iter().map(|r| r.sort_year).collect();
            prop_assert!(sort_years.windows(2).all(|w| w[0] <= w[1]));

            let undated: Vec<&str> = bib
                .records
                .iter()
                .filter(|r| !r.fields.contains("year"))
                .map(|r| r.key.as_str())
                .collect();
            let expected: Vec<String> = years
                .iter()
                .enumerate()
                .filter(|(_, y)| y.is_none())
                .map(|(i, _)| format!("Author{i}XXXX"))
                .collect();
            prop_assert_eq!(undated, expected.iter().map(String::as_str).collect::<Vec<_>>());
            if let Some(first_undated) = bib.records.iter().position(|r| !r.fields.contains("year")) {
                prop_assert!(bib.records[first_undated..].iter().all(|r| !r.fields.contains("year")));
            }
        }
    }
}
