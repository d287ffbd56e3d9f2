//! Author name parsing
//!
//! Provides functions for:
//! - Splitting a BibTeX author/editor field into individual names
//! - Collapsing given names to canonical initials ("J.~K.")
//! - Restoring accented surnames damaged by ASCII-only exports
//! - ASCII folding for cite keys

use unicode_normalization::UnicodeNormalization;

use crate::config::CleanerConfig;

/// Connective between names in a BibTeX name list
pub const AUTHOR_SEPARATOR: &str = " and ";

/// Literal that marks an already truncated name list
const ET_AL: &str = "others";

/// One parsed author: surname plus canonical initials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub surname: String,
    pub initials: String,
}

impl Author {
    pub fn new(surname: impl Into<String>, initials: impl Into<String>) -> Self {
        Self {
            surname: surname.into(),
            initials: initials.into(),
        }
    }

    /// Format as "Surname, I.~N." for BibTeX
    pub fn to_bibtex(&self) -> String {
        if self.initials.is_empty() {
            self.surname.clone()
        } else {
            format!("{}, {}", self.surname, self.initials)
        }
    }
}

/// Ordered author list, first author first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorList {
    pub authors: Vec<Author>,
    /// The source list already ended in "and others"
    pub et_al: bool,
}

impl AuthorList {
    pub fn first(&self) -> Option<&Author> {
        self.authors.first()
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    /// The full list in BibTeX form
    pub fn to_bibtex(&self) -> String {
        format_author_list(&self.authors, self.et_al)
    }

    /// The first `limit` authors, followed by "and others" when anything was cut
    pub fn truncated(&self, limit: usize) -> String {
        let kept = limit.min(self.authors.len());
        let et_al = self.et_al || kept < self.authors.len();
        format_author_list(&self.authors[..kept], et_al)
    }
}

/// Join authors with " and ", appending "and others" on request
pub fn format_author_list(authors: &[Author], et_al: bool) -> String {
    let mut names: Vec<String> = authors.iter().map(Author::to_bibtex).collect();
    if et_al {
        names.push(ET_AL.to_string());
    }
    names.join(AUTHOR_SEPARATOR)
}

/// Return the ASCII representation of a string
///
/// NFKD splits accented letters into base letter plus combining marks;
/// everything outside ASCII is then dropped.
pub fn ascii_fold(s: &str) -> String {
    s.nfkd().filter(char::is_ascii).collect()
}

/// Name-list parser bound to one run's configuration
#[derive(Debug, Clone)]
pub struct AuthorParser {
    joiner: String,
    /// (ASCII-folded, accented) surname pairs
    restore: Vec<(String, String)>,
}

impl AuthorParser {
    pub fn new(config: &CleanerConfig) -> Self {
        let restore = config
            .diacritic_restore
            .iter()
            .map(|name| (ascii_fold(name), name.clone()))
            .filter(|(folded, name)| !folded.is_empty() && folded != name)
            .collect();

        Self {
            joiner: config.initials_joiner.clone(),
            restore,
        }
    }

    /// Parse a name list joined by " and "
    pub fn parse(&self, field: &str) -> AuthorList {
        let mut list = AuthorList::default();

        for name in field.split(AUTHOR_SEPARATOR) {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            if name.eq_ignore_ascii_case(ET_AL) {
                list.et_al = true;
                continue;
            }
            list.authors.push(self.parse_name(name));
        }

        list
    }

    /// Parse one name in either "Last, First" or "First Last" order
    pub fn parse_name(&self, name: &str) -> Author {
        // A joiner left by an earlier cleaning pass is just a space
        let name = name.replace(self.joiner.as_str(), " ");

        let (surname, given) = match name.split_once(',') {
            Some((last, rest)) => {
                let given = rest.split(',').map(str::trim).collect::<Vec<_>>().join(" ");
                (last.trim().to_string(), given)
            }
            None => {
                let mut parts: Vec<&str> = name.split_whitespace().collect();
                let last = parts.pop().unwrap_or_default().to_string();
                (last, parts.join(" "))
            }
        };

        let given = given.trim().replace(". ", ".");

        Author {
            surname: self.restore_diacritics(&surname),
            initials: self.collapse_initials(&given),
        }
    }

    /// Reduce a given-name portion to "X." initials joined by the joiner
    ///
    /// A compact all-caps form ("JK", "J.K.", "J-P") yields one initial per
    /// letter; anything else yields the first letter of each name part.
    pub fn collapse_initials(&self, given: &str) -> String {
        let compact: String = given.chars().filter(|&c| c != '.').collect();
        let letters: Vec<char> = compact.chars().filter(|&c| c != '-').collect();

        let initials: Vec<char> =
            if compact.chars().count() > 1 && letters.iter().all(|c| c.is_uppercase()) {
                letters
            } else {
                given
                    .split(|c: char| c.is_whitespace() || c == '-' || c == '.')
                    .filter_map(|part| part.chars().next())
                    .collect()
            };

        initials
            .iter()
            .map(|c| format!("{}.", c))
            .collect::<Vec<_>>()
            .join(&self.joiner)
    }

    /// Replace an ASCII-folded surname with its accented spelling
    pub fn restore_diacritics(&self, surname: &str) -> String {
        let mut restored = surname.to_string();
        for (folded, accented) in &self.restore {
            if restored.contains(folded.as_str()) {
                restored = restored.replace(folded.as_str(), accented);
            }
        }
        restored
    }
}
