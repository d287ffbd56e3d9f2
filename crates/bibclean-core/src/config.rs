//! Configuration for bibclean-core
//!
//! Every policy knob of a cleaning run lives here. The structure is built
//! once at startup (defaults, or a TOML file) and passed by reference to
//! each component.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CleanError, Result};

/// Which way journal names are translated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JournalDirection {
    /// Full name to abbreviation
    #[default]
    Abbreviate,
    /// Abbreviation to full name
    Expand,
}

/// Run-wide cleaning configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Replace the source cite keys with generated ones
    pub generate_new_keys: bool,
    /// Number of authors listed before "and others"
    pub authors_before_et_al: usize,
    /// Translate journal names through the abbreviation table
    pub use_journal_abbreviation: bool,
    /// Keep the periods of an abbreviation ("Phys. Rev." vs "Phys Rev")
    pub abbreviation_keeps_dots: bool,
    pub journal_direction: JournalDirection,
    /// Export only records with one of these authors (empty = everything)
    pub selected_authors: Vec<String>,
    /// Fields never written to the cleaned file
    pub omitted_fields: BTreeSet<String>,
    /// Accented surnames repaired after an ASCII-only export
    pub diacritic_restore: Vec<String>,
    /// Non-breaking joiner placed between initials
    pub initials_joiner: String,
    /// Line-oriented `Full Name = Abbrev.` table
    pub abbreviation_source: PathBuf,
    /// Binary cache of the table; derived from the source when unset
    pub abbreviation_cache: Option<PathBuf>,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        let omitted = [
            "type",
            "abstract",
            "keywords",
            "eprint",
            "month",
            "language",
            "article-number",
            "researcherid-numbers",
            "orcid-numbers",
            "unique-id",
            "earlyaccessdate",
            "organization",
        ];

        Self {
            generate_new_keys: true,
            authors_before_et_al: 2,
            use_journal_abbreviation: true,
            abbreviation_keeps_dots: true,
            journal_direction: JournalDirection::Abbreviate,
            selected_authors: Vec::new(),
            omitted_fields: omitted.iter().map(|s| s.to_string()).collect(),
            diacritic_restore: vec!["Lukeš".to_string()],
            initials_joiner: "~".to_string(),
            abbreviation_source: PathBuf::from("jabref_wos_abbrev_dots.txt"),
            abbreviation_cache: None,
        }
    }
}

impl CleanerConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(toml_str)?;
        config.omitted_fields = config
            .omitted_fields
            .iter()
            .map(|field| field.trim().to_lowercase())
            .collect();
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CleanError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CleanError::io(path, e))?;
        Self::from_toml(&content)
    }

    /// Path of the binary abbreviation cache
    pub fn abbreviation_cache_path(&self) -> PathBuf {
        self.abbreviation_cache
            .clone()
            .unwrap_or_else(|| self.abbreviation_source.with_extension("cache"))
    }

    /// Whether a field name is on the omission list
    pub fn is_omitted(&self, field: &str) -> bool {
        is_omitted_field(&self.omitted_fields, field)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.authors_before_et_al == 0 {
            return Err(CleanError::InvalidConfig(
                "authors_before_et_al must be at least 1".to_string(),
            ));
        }

        if self.initials_joiner.is_empty() {
            return Err(CleanError::InvalidConfig(
                "initials_joiner must not be empty".to_string(),
            ));
        }

        if self.use_journal_abbreviation && self.abbreviation_source.as_os_str().is_empty() {
            return Err(CleanError::InvalidConfig(
                "abbreviation_source is required when use_journal_abbreviation is set".to_string(),
            ));
        }

        Ok(())
    }
}

/// Case-insensitive membership in an omission list
pub fn is_omitted_field(omitted: &BTreeSet<String>, field: &str) -> bool {
    omitted.iter().any(|name| name.eq_ignore_ascii_case(field))
}
