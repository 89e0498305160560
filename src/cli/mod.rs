// src/cli/mod.rs
//
// Command-line interface module

mod args;
mod output;

pub use args::{collect_files, Args};
pub use output::{format_json, format_report, FileReport};

use anyhow::{Context, Result};
use colorful::Colorful;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use log::{error, info};
use rayon::prelude::*;
use std::fs;
use std::path::Path;

use crate::config::ClassifierConfig;
use crate::core::export::write_wav;
use crate::core::{FileSink, FormatClassifier};

/// Run the CLI
pub fn run(args: Args) -> Result<()> {
    let config = args.classifier_config()?;

    for dir in [&args.dump_signals, &args.export_wav].into_iter().flatten() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }

    let files = collect_files(&args.inputs, &args.ext)?;
    if files.is_empty() {
        println!("{}", "No raw audio files found!".red());
        return Ok(());
    }
    info!("Classifying {} file(s)", files.len());

    let progress = if files.len() > 1 && !args.json {
        let pb = ProgressBar::new(files.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {wide_msg}") {
            pb.set_style(style);
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let reports: Vec<FileReport> = files
        .par_iter()
        .progress_with(progress.clone())
        .map(|path| process_file(path, &config, &args))
        .collect();
    progress.finish_and_clear();

    if args.json {
        println!("{}", format_json(&reports)?);
    } else {
        for report in &reports {
            println!("{}", format_report(report, args.verbose));
        }
    }

    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} file(s) could not be classified", failed, reports.len());
    }

    Ok(())
}

fn process_file(path: &Path, config: &ClassifierConfig, args: &Args) -> FileReport {
    let mut report = FileReport {
        path: path.display().to_string(),
        result: None,
        wav: None,
        error: None,
    };

    match classify_one(path, config, args) {
        Ok((result, wav)) => {
            report.result = Some(result);
            report.wav = wav;
        }
        Err(e) => {
            error!("{}: {:#}", path.display(), e);
            report.error = Some(format!("{:#}", e));
        }
    }

    report
}

fn classify_one(
    path: &Path,
    config: &ClassifierConfig,
    args: &Args,
) -> Result<(crate::ClassificationResult, Option<String>)> {
    let mut classifier = FormatClassifier::open(path, config.clone())
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    if let Some(dir) = &args.dump_signals {
        let sink_path = dir.join(format!("{}.sig", file_name(path)));
        let sink = FileSink::create(&sink_path)
            .with_context(|| format!("Failed to create {}", sink_path.display()))?;
        classifier = classifier.with_sink(Box::new(sink));
    }

    let result = classifier
        .classify()
        .with_context(|| format!("Classification failed: {}", path.display()))?;

    let wav = match &args.export_wav {
        Some(dir) => {
            let out = dir.join(format!("{}.wav", file_name(path)));
            write_wav(path, &result, args.sample_rate, 0, &out)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            Some(out.display().to_string())
        }
        None => None,
    };

    Ok((result, wav))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string())
}
