//! Abbreviation table loading with a binary fast-access cache
//!
//! The text table is parsed once and stored as bincode next to it. Later
//! runs read the cache unless it is missing, older than the text source,
//! from another format version, or undecodable; in those cases the table
//! is rebuilt from the text and the cache rewritten.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CleanError, Result};
use crate::journal::AbbreviationTable;

/// Bumped whenever the cached layout changes
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CachedTable {
    version: u32,
    entries: Vec<(String, String)>,
}

/// Load the abbreviation table from its cache or its text source
pub fn load_abbreviations(source: &Path, cache: &Path) -> Result<AbbreviationTable> {
    if let Some(table) = read_cache(source, cache) {
        tracing::debug!("Loaded {} abbreviations from cache {:?}", table.len(), cache);
        return Ok(table);
    }

    let text = match fs::read_to_string(source) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(CleanError::AbbreviationSource(source.to_path_buf()))
        }
        Err(e) => return Err(CleanError::io(source, e)),
    };

    let table = AbbreviationTable::from_text(&text);
    tracing::info!("Loaded {} journal abbreviations from {:?}", table.len(), source);

    if let Err(e) = write_cache(&table, cache) {
        tracing::warn!("Failed to write abbreviation cache: {}", e);
    }

    Ok(table)
}

/// Persist a table as bincode
pub fn write_cache(table: &AbbreviationTable, cache: &Path) -> Result<()> {
    let cached = CachedTable {
        version: CACHE_VERSION,
        entries: table.entries().to_vec(),
    };
    let bytes = bincode::serialize(&cached)?;
    fs::write(cache, bytes).map_err(|e| CleanError::io(cache, e))
}

/// A usable cache, or `None` when it must be rebuilt
fn read_cache(source: &Path, cache: &Path) -> Option<AbbreviationTable> {
    let cache_meta = fs::metadata(cache).ok()?;

    // Without a source the cache is all there is
    if let Ok(source_meta) = fs::metadata(source) {
        let (Ok(source_time), Ok(cache_time)) = (source_meta.modified(), cache_meta.modified())
        else {
            return None;
        };
        if cache_time < source_time {
            tracing::debug!("Abbreviation cache {:?} is stale", cache);
            return None;
        }
    }

    let bytes = fs::read(cache).ok()?;
    match bincode::deserialize::<CachedTable>(&bytes) {
        Ok(cached) if cached.version == CACHE_VERSION => {
            Some(AbbreviationTable::from_entries(cached.entries))
        }
        Ok(cached) => {
            tracing::debug!("Abbreviation cache has version {}", cached.version);
            None
        }
        Err(e) => {
            tracing::warn!("Abbreviation cache {:?} is corrupt, rebuilding: {}", cache, e);
            None
        }
    }
}
