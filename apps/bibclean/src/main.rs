//! bibclean - BibTeX export cleaner
//!
//! Writes `<input>_clean.bib` and `main_<input>.tex` next to the input file.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bibclean_core::{clean_file, CleanerConfig};

#[derive(Parser, Debug)]
#[command(name = "bibclean")]
#[command(about = "Clean a BibTeX export: normalized authors, abbreviated journals, regenerated keys")]
struct Args {
    /// BibTeX file to clean
    input: PathBuf,

    /// TOML file with cleaning options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Journal abbreviation table (`Full Name = Abbrev.` per line)
    #[arg(short, long, value_name = "FILE")]
    abbreviations: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => CleanerConfig::load(path)?,
        None => CleanerConfig::default(),
    };
    if let Some(path) = args.abbreviations {
        config.abbreviation_source = path;
    }

    let report = clean_file(&args.input, &config)?;
    println!(
        "{} records -> {}, {}",
        report.bibliography.len(),
        report.paths.bib.display(),
        report.paths.tex.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_only_locate_resources() {
        let args =
            Args::try_parse_from(["bibclean", "refs.bib", "-a", "abbrev.txt", "-c", "run.toml"])
                .unwrap();
        assert_eq!(args.input, PathBuf::from("refs.bib"));
        assert_eq!(args.abbreviations, Some(PathBuf::from("abbrev.txt")));
        assert_eq!(args.config, Some(PathBuf::from("run.toml")));

        // Policy lives in the config file
        assert!(Args::try_parse_from(["bibclean", "refs.bib", "--no-abbreviations"]).is_err());
    }
}
