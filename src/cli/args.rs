//! CLI argument parsing

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ClassifierConfig;

#[derive(Parser, Debug)]
#[command(name = "rawcheckr")]
#[command(version, about = "Guess sample format, endianness and channel count of raw audio files")]
pub struct Args {
    /// Input files or directories
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Extensions picked up when walking directories
    #[arg(long, value_delimiter = ',', default_value = "raw,pcm,bin,dat,snd")]
    pub ext: Vec<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Verbose output with per-hypothesis scores
    #[arg(short, long)]
    pub verbose: bool,

    /// JSON file overriding classifier constants
    #[arg(short, long, value_name = "FILE", env = "RAWCHECKR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Score hypotheses in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Write integrated signals of every hypothesis to <DIR>/<file>.sig
    #[arg(long, value_name = "DIR")]
    pub dump_signals: Option<PathBuf>,

    /// Convert each classified file to WAV in this directory
    #[arg(long, value_name = "DIR")]
    pub export_wav: Option<PathBuf>,

    /// Sample rate written to exported WAV files
    #[arg(long, default_value = "44100")]
    pub sample_rate: u32,
}

impl Args {
    /// Parse from the process arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Classifier configuration from defaults, `--config` and `--parallel`
    pub fn classifier_config(&self) -> Result<ClassifierConfig> {
        let mut config = match &self.config {
            Some(path) => ClassifierConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => ClassifierConfig::default(),
        };
        if self.parallel {
            config.parallel_scoring = true;
        }
        Ok(config)
    }
}

/// Expand inputs into a list of files.
///
/// Files named directly are always taken; directories are walked and
/// filtered by extension.
pub fn collect_files(inputs: &[PathBuf], extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
        } else if input.is_dir() {
            for entry in WalkDir::new(input)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file() && has_extension(path, extensions) {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            anyhow::bail!("Input not found: {}", input.display());
        }
    }

    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}
