//! Record splitting and field tokenization
//!
//! Reference-manager exports (Web of Science, JabRef, ...) follow a loose
//! subset of BibTeX. This module recovers one [`FieldMap`] per record:
//! - the file is split on the `@type{` sigil
//! - the record header (`type{key,`) is parsed with nom
//! - the body is read by [`FieldScanner`], a two-mode scanner that
//!   alternates between seeking a field name and reading its value
//!
//! Values are brace- or quote-delimited, or bare. A value may contain `=`,
//! so a bare or unbalanced value ends only where [`field_boundary`] says a
//! new field starts.

use lazy_static::lazy_static;
use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0},
    IResult,
};
use regex::Regex;

use crate::entry::{BibRecord, FieldMap};

/// Chunks shorter than this are stray preamble or comment noise.
pub const MIN_RECORD_LEN: usize = 10;

/// Entry kinds that carry no bibliography record.
const SKIPPED_ENTRY_TYPES: [&str; 3] = ["comment", "string", "preamble"];

lazy_static! {
    // `@` only opens a record when an identifier and an opening delimiter follow,
    // so e-mail addresses inside values do not split records.
    static ref ENTRY_SIGIL: Regex = Regex::new(r"@[ \t]*[A-Za-z]+[ \t]*[{(]").unwrap();
}

/// One record as cut from the source text, before tokenization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord<'a> {
    pub entry_type: String,
    pub original_key: String,
    /// Field text after the header, up to the closing delimiter
    pub body: &'a str,
}

/// Parse every record of a BibTeX text
///
/// Noise chunks and records without a single recognizable field are
/// skipped, never reported as errors.
pub fn parse_records(text: &str) -> Vec<BibRecord> {
    split_records(text)
        .into_iter()
        .filter_map(read_record)
        .filter_map(|raw| {
            let fields = tokenize_fields(raw.body);
            if fields.is_empty() {
                tracing::debug!("Skipping {} record without fields", raw.entry_type);
                return None;
            }
            Some(BibRecord {
                entry_type: raw.entry_type,
                original_key: raw.original_key,
                fields,
            })
        })
        .collect()
}

/// Split text into chunks, each starting right after an entry sigil `@`
pub fn split_records(text: &str) -> Vec<&str> {
    let starts: Vec<usize> = ENTRY_SIGIL.find_iter(text).map(|m| m.start()).collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            &text[start + 1..end]
        })
        .collect()
}

/// Read the header of one chunk and cut its body
pub fn read_record(chunk: &str) -> Option<RawRecord<'_>> {
    if chunk.trim().len() < MIN_RECORD_LEN {
        tracing::debug!("Skipping short chunk {:?}", chunk.trim());
        return None;
    }

    let (rest, (entry_type, opener, key)) = match record_header(chunk) {
        Ok(parsed) => parsed,
        Err(_) => {
            tracing::debug!("Skipping chunk without a record header");
            return None;
        }
    };

    let entry_type = entry_type.to_lowercase();
    if SKIPPED_ENTRY_TYPES.contains(&entry_type.as_str()) {
        tracing::debug!("Skipping @{} block", entry_type);
        return None;
    }

    let closer = if opener == '(' { ')' } else { '}' };
    let body = match rest.rfind(closer) {
        Some(pos) => &rest[..pos],
        None => rest,
    };

    Some(RawRecord {
        entry_type,
        original_key: key.to_string(),
        body,
    })
}

/// Parse `type{key,` and return the remaining body
fn record_header(input: &str) -> IResult<&str, (&str, char, &str)> {
    let (rest, _) = multispace0(input)?;
    let (rest, entry_type) = take_while1(|c: char| c.is_ascii_alphanumeric())(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, opener) = alt((char('{'), char('(')))(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, key) =
        take_while(|c: char| !matches!(c, ',' | '}' | ')' | '=') && !c.is_whitespace())(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char(',')(rest)?;

    Ok((rest, (entry_type, opener, key)))
}

/// Tokenize a record body into a field map
///
/// A body without any `=` yields an empty map.
pub fn tokenize_fields(body: &str) -> FieldMap {
    let mut fields = FieldMap::new();
    for (name, value) in FieldScanner::new(body) {
        fields.insert(name, normalize_value(value));
    }
    fields
}

/// Two-mode scanner over a record body
///
/// Yields `(field name, raw value)` pairs in source order.
pub struct FieldScanner<'a> {
    rest: &'a str,
}

impl<'a> FieldScanner<'a> {
    pub fn new(body: &'a str) -> Self {
        Self { rest: body }
    }

    /// Seeking-name mode: the name is the last token before the next `=`
    fn next_name(&mut self) -> Option<String> {
        let eq = self.rest.find('=')?;
        let name = self.rest[..eq]
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .last()?;

        if !is_bare_field_name(name) {
            tracing::debug!("Stopping at malformed field name {:?}", name);
            return None;
        }

        let name = name.to_lowercase();
        self.rest = &self.rest[eq + 1..];
        Some(name)
    }

    /// In-value mode
    fn next_value(&mut self) -> &'a str {
        let start = self.rest.trim_start();
        let delimited = match start.chars().next() {
            Some('{') => scan_braced(start),
            Some('"') => scan_quoted(start),
            _ => None,
        };

        let (value, rest) = delimited.unwrap_or_else(|| scan_until_boundary(start));
        self.rest = rest;
        value
    }
}

impl<'a> Iterator for FieldScanner<'a> {
    type Item = (String, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.next_name()?;
        let value = self.next_value();
        Some((name, value))
    }
}

/// Decide whether the `=` that follows `preceding` opens a new field
///
/// `preceding` is the text read since the current value started. The `=`
/// is a boundary only when the token right before it is a bare field name
/// and the text before that token ends with the separator comma. Returns
/// the byte offset where the field name starts.
///
/// This is a heuristic: a value containing `", ABC = "` misfires.
pub fn field_boundary(preceding: &str) -> Option<usize> {
    let trimmed = preceding.trim_end();
    let name_start = trimmed
        .char_indices()
        .rev()
        .find(|&(_, c)| c.is_whitespace() || c == ',')
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);

    let name = &trimmed[name_start..];
    let prefix = trimmed[..name_start].trim_end();

    (is_bare_field_name(name) && prefix.ends_with(',')).then_some(name_start)
}

/// A field name: an ASCII letter, then ASCII alphanumerics or `-_:.`
pub fn is_bare_field_name(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

/// Text after a close delimiter must be the separator comma or the end of the body.
fn after_separator(s: &str) -> Option<&str> {
    let trimmed = s.trim_start();
    if trimmed.is_empty() {
        Some(trimmed)
    } else {
        trimmed.strip_prefix(',')
    }
}

/// Scan a `{...}` value, tolerating nested and escaped braces
fn scan_braced(input: &str) -> Option<(&str, &str)> {
    let bytes = input.as_bytes();
    let mut depth = 0usize;
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 1,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(rest) = after_separator(&input[pos + 1..]) {
                        return Some((&input[1..pos], rest));
                    }
                }
            }
            _ => {}
        }
        pos += 1;
    }

    None
}

/// Scan a `"..."` value; `\"` and quotes inside braces are not delimiters
fn scan_quoted(input: &str) -> Option<(&str, &str)> {
    let bytes = input.as_bytes();
    let mut depth = 0usize;
    let mut pos = 1;

    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 1,
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b'"' if depth == 0 => {
                if let Some(rest) = after_separator(&input[pos + 1..]) {
                    return Some((&input[1..pos], rest));
                }
            }
            _ => {}
        }
        pos += 1;
    }

    None
}

/// Bare or unbalanced value: runs up to the next field boundary
fn scan_until_boundary(input: &str) -> (&str, &str) {
    for (eq, _) in input.match_indices('=') {
        if let Some(name_start) = field_boundary(&input[..eq]) {
            let value = input[..name_start].trim_end();
            let value = value.strip_suffix(',').unwrap_or(value);
            return (value, &input[name_start..]);
        }
    }

    (input, "")
}

/// Strip delimiters and collapse whitespace in a raw value
///
/// Braces and unescaped quotes are removed; the `\"` escape is kept.
pub fn normalize_value(raw: &str) -> String {
    let mut stripped = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'"') => {
                chars.next();
                stripped.push_str("\\\"");
            }
            '{' | '}' | '"' => {}
            _ => stripped.push(c),
        }
    }

    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string()
}
