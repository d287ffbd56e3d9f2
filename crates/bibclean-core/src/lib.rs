//! BibTeX cleaning
//!
//! This crate turns a loose reference-manager export (Web of Science,
//! JabRef, ...) into a tidy bibliography plus a LaTeX document that cites
//! every entry.
//!
//! Features:
//! - Tolerant record splitter and field tokenizer
//! - Author normalization to "Surname, I.~N." with diacritic restoration
//! - Journal abbreviation through a JabRef-style table with a binary cache
//! - Cite key generation (`Smith2020-PRL`) with letter suffixes on collision
//! - Year-sorted output with field omission

mod assembler;
mod author;
mod cache;
mod cite_key;
mod cleaner;
mod config;
mod entry;
mod error;
mod files;
mod formatter;
mod journal;
pub mod parser;

pub use assembler::{
    parse_year, Admission, Assembler, Bibliography, OutputRecord, UNDATED_SORT_BASE,
};
pub use author::{ascii_fold, format_author_list, Author, AuthorList, AuthorParser};
pub use cache::{load_abbreviations, write_cache};
pub use cite_key::{
    collision_suffix, journal_initials, sanitize_cite_key, KeyGenerator, YEAR_PLACEHOLDER,
};
pub use cleaner::{strip_doi_prefix, Cleaner};
pub use config::{is_omitted_field, CleanerConfig, JournalDirection};
pub use entry::{BibRecord, BibTeXField, FieldMap};
pub use error::{CleanError, Result};
pub use files::{clean_file, read_source, CleanReport, OutputPaths};
pub use formatter::{format_latex_main, format_record, format_records};
pub use journal::{normalize_journal, strip_periods, AbbreviationTable, JournalAbbreviator};
pub use parser::{parse_records, tokenize_fields, RawRecord};
