//! Per-record normalization pipeline
//!
//! Runs each parsed record through author normalization, DOI cleanup and
//! journal translation, then hands it to the [`Assembler`].

use lazy_static::lazy_static;
use regex::Regex;

use crate::assembler::{Admission, Assembler, Bibliography};
use crate::author::{AuthorList, AuthorParser};
use crate::config::CleanerConfig;
use crate::entry::BibRecord;
use crate::error::Result;
use crate::journal::{AbbreviationTable, JournalAbbreviator};
use crate::parser::parse_records;

lazy_static! {
    static ref DOI_PREFIX: Regex =
        Regex::new(r"(?i)^\s*(?:doi:\s*|https?://(?:dx\.)?doi\.org/)").unwrap();
}

/// Remove a resolver URL or `doi:` prefix, leaving the bare DOI
pub fn strip_doi_prefix(doi: &str) -> String {
    DOI_PREFIX.replace(doi, "").trim().to_string()
}

/// One cleaning run over a whole document
pub struct Cleaner<'a> {
    config: &'a CleanerConfig,
    parser: AuthorParser,
    abbreviations: Option<&'a AbbreviationTable>,
}

impl<'a> Cleaner<'a> {
    /// `abbreviations` is only consulted when the configuration enables
    /// journal translation.
    pub fn new(config: &'a CleanerConfig, abbreviations: Option<&'a AbbreviationTable>) -> Self {
        Self {
            config,
            parser: AuthorParser::new(config),
            abbreviations,
        }
    }

    /// Clean every record of a BibTeX document
    pub fn clean(&self, text: &str) -> Result<Bibliography> {
        let mut assembler = Assembler::new(self.config);
        let mut excluded = 0usize;
        let mut dropped = 0usize;
        let mut skipped = 0usize;

        for record in parse_records(text) {
            let (record, authors) = self.normalize(record);
            match assembler.add(record, &authors)? {
                Admission::Included(_) => {}
                Admission::Excluded(_) => excluded += 1,
                Admission::DuplicateDropped(_) => dropped += 1,
                Admission::MissingAuthor(_) => skipped += 1,
            }
        }

        tracing::info!(
            "Cleaned {} records ({} excluded, {} duplicates dropped, {} without authors)",
            assembler.len(),
            excluded,
            dropped,
            skipped
        );
        Ok(assembler.finish())
    }

    /// Normalize one record's fields and return its parsed name list
    ///
    /// The list is empty when the record has neither author nor editor.
    pub fn normalize(&self, mut record: BibRecord) -> (BibRecord, AuthorList) {
        if let Some(editor) = record.editor() {
            let editors = self.parser.parse(editor).to_bibtex();
            record.add_field("editor", editors);
        }

        let authors = match record.author_source() {
            Ok(names) => self.parser.parse(names),
            Err(_) => AuthorList::default(),
        };

        if let Some(doi) = record.get_field("doi") {
            let doi = strip_doi_prefix(doi);
            record.add_field("doi", doi);
        }

        let translated = match (self.abbreviations, record.journal()) {
            (Some(table), Some(journal)) if self.config.use_journal_abbreviation => {
                Some(JournalAbbreviator::new(table, self.config).apply(journal))
            }
            _ => None,
        };
        if let Some(journal) = translated {
            record.add_field("journal", journal);
        }

        (record, authors)
    }
}
