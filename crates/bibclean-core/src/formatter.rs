//! Output formatting
//!
//! Converts assembled records back to BibTeX text and writes the LaTeX
//! companion document that cites every key.

use std::collections::BTreeSet;

use crate::assembler::OutputRecord;
use crate::config::is_omitted_field;

/// Format a single record, skipping omitted fields
pub fn format_record(record: &OutputRecord, omitted: &BTreeSet<String>) -> String {
    let mut result = String::new();

    // Entry type and cite key
    result.push('@');
    result.push_str(&record.entry_type);
    result.push('{');
    result.push_str(&record.key);
    result.push(',');
    result.push('\n');

    // Fields
    for field in record.fields.iter() {
        if is_omitted_field(omitted, &field.key) {
            continue;
        }
        result.push_str("  ");
        result.push_str(&field.key);
        result.push_str(" = {");
        result.push_str(&field.value);
        result.push_str("},\n");
    }

    result.push_str("}\n");
    result
}

/// Format records in order, each followed by a blank line
pub fn format_records(records: &[OutputRecord], omitted: &BTreeSet<String>) -> String {
    records
        .iter()
        .map(|record| format_record(record, omitted) + "\n")
        .collect()
}

/// Minimal LaTeX document citing every key against the cleaned bibliography
///
/// `bib_name` is the bibliography file name as LaTeX expects it (no `.bib`).
pub fn format_latex_main(bib_name: &str, keys: &[&str]) -> String {
    let citations = keys
        .iter()
        .map(|key| format!("\\cite{{{}}}", key))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "\\documentclass[11pt]{{article}}\n\
         \\usepackage{{a4wide}}\n\
         \\begin{{document}}\n\
         \n\
         {}\n\
         \n\
         \\bibliographystyle{{plain}}\n\
         \\bibliography{{{}}}\n\
         \n\
         \\end{{document}}\n",
        citations, bib_name
    )
}
