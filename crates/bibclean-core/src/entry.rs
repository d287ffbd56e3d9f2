//! BibTeX record data structures

use crate::error::{CleanError, Result};

/// A single BibTeX field (key-value pair)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibTeXField {
    pub key: String,
    pub value: String,
}

/// Ordered field mapping with unique, lower-case field names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    fields: Vec<BibTeXField>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing the value in place if the name already exists
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into().to_lowercase();
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.key == key) {
            Some(field) => field.value = value,
            None => self.fields.push(BibTeXField { key, value }),
        }
    }

    /// Get a field value by key (case-insensitive)
    pub fn get(&self, key: &str) -> Option<&str> {
        let key_lower = key.to_lowercase();
        self.fields
            .iter()
            .find(|f| f.key == key_lower)
            .map(|f| f.value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let key_lower = key.to_lowercase();
        let pos = self.fields.iter().position(|f| f.key == key_lower)?;
        Some(self.fields.remove(pos).value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BibTeXField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A parsed BibTeX record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibRecord {
    /// Lower-cased entry type ("article", "book", ...)
    pub entry_type: String,
    /// Cite key found in the source, possibly empty
    pub original_key: String,
    pub fields: FieldMap,
}

impl BibRecord {
    /// Create a new record
    pub fn new(entry_type: impl Into<String>, original_key: impl Into<String>) -> Self {
        Self {
            entry_type: entry_type.into().to_lowercase(),
            original_key: original_key.into(),
            fields: FieldMap::new(),
        }
    }

    /// Add a field to the record
    pub fn add_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key, value);
    }

    /// Get a field value by key (case-insensitive)
    pub fn get_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key)
    }

    pub fn is_article(&self) -> bool {
        self.entry_type == "article"
    }

    /// Get the author field
    pub fn author(&self) -> Option<&str> {
        self.get_field("author")
    }

    /// Get the editor field
    pub fn editor(&self) -> Option<&str> {
        self.get_field("editor")
    }

    /// Get the year field
    pub fn year(&self) -> Option<&str> {
        self.get_field("year")
    }

    /// Get the journal field
    pub fn journal(&self) -> Option<&str> {
        self.get_field("journal")
    }

    /// The name list a key is generated from: author, else editor.
    pub fn author_source(&self) -> Result<&str> {
        self.author()
            .or_else(|| self.editor())
            .ok_or_else(|| CleanError::MissingAuthor {
                key: self.original_key.clone(),
            })
    }
}
