//! Reading the source file and writing the cleaned outputs

use std::fs;
use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1252;

use crate::assembler::Bibliography;
use crate::cache::load_abbreviations;
use crate::cleaner::Cleaner;
use crate::config::CleanerConfig;
use crate::error::{CleanError, Result};
use crate::formatter::format_latex_main;

/// Where the two outputs of a run are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// `<dir>/<stem>_clean.bib`
    pub bib: PathBuf,
    /// `<dir>/main_<stem>.tex`
    pub tex: PathBuf,
}

impl OutputPaths {
    /// Output paths next to the input file
    pub fn for_input(input: &Path) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = input.parent().unwrap_or_else(|| Path::new(""));

        Self {
            bib: dir.join(format!("{}_clean.bib", stem)),
            tex: dir.join(format!("main_{}.tex", stem)),
        }
    }

    /// Bibliography name as `\bibliography{}` expects it
    pub fn bib_name(&self) -> String {
        self.bib
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Read a source file as UTF-8, falling back to Latin-1 compatible decoding
pub fn read_source(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| CleanError::io(path, e))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            tracing::info!("{:?} is not UTF-8, decoding as windows-1252", path);
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(e.as_bytes());
            Ok(text.into_owned())
        }
    }
}

/// Result of a successful [`clean_file`] run
#[derive(Debug, Clone)]
pub struct CleanReport {
    pub paths: OutputPaths,
    pub bibliography: Bibliography,
}

/// Clean one BibTeX file and write the `.bib` and `.tex` outputs
///
/// Nothing is written unless every record was processed.
pub fn clean_file(input: &Path, config: &CleanerConfig) -> Result<CleanReport> {
    config.validate()?;
    let text = read_source(input)?;

    let table = if config.use_journal_abbreviation {
        Some(load_abbreviations(
            &config.abbreviation_source,
            &config.abbreviation_cache_path(),
        )?)
    } else {
        None
    };

    let bibliography = Cleaner::new(config, table.as_ref()).clean(&text)?;
    let paths = OutputPaths::for_input(input);

    let bib_text = bibliography.to_bibtex(&config.omitted_fields);
    fs::write(&paths.bib, bib_text).map_err(|e| CleanError::io(&paths.bib, e))?;

    let keys: Vec<&str> = bibliography.keys().collect();
    let tex_text = format_latex_main(&paths.bib_name(), &keys);
    fs::write(&paths.tex, tex_text).map_err(|e| CleanError::io(&paths.tex, e))?;

    tracing::info!(
        "Wrote {} records to {:?} and {:?}",
        bibliography.len(),
        paths.bib,
        paths.tex
    );

    Ok(CleanReport {
        paths,
        bibliography,
    })
}
