//! Output formatting for CLI results

use colorful::Colorful;
use serde::Serialize;

use crate::detection::{ClassificationResult, HypothesisScore};

/// Outcome for one input file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ClassificationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wav: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Format a report for terminal output
pub fn format_report(report: &FileReport, verbose: bool) -> String {
    let mut output = String::new();

    let result = match (&report.result, &report.error) {
        (Some(result), _) => result,
        (None, error) => {
            output.push_str(&format!("{} {}\n", "✗".red(), report.path.clone().bold()));
            output.push_str(&format!(
                "  {}\n",
                error.clone().unwrap_or_else(|| "unknown error".to_string()).red()
            ));
            return output;
        }
    };

    output.push_str(&format!("{} {}\n", "✓".green(), report.path.clone().bold()));
    output.push_str(&format!(
        "  Format:       {} {}-endian\n",
        result.format.name().cyan(),
        result.endianness
    ));
    output.push_str(&format!(
        "  Channels:     {} ({})\n",
        result.channels,
        if result.channels == 1 { "mono" } else { "stereo" }
    ));
    output.push_str(&format!("  Signal start: byte {}\n", result.signal_start));

    match result.margin_db() {
        Some(margin) => output.push_str(&format!("  Margin:       {:.1} dB\n", margin)),
        None => output.push_str(&format!(
            "  Margin:       {}\n",
            "n/a (no usable signal)".yellow()
        )),
    }

    if let Some(wav) = &report.wav {
        output.push_str(&format!("  WAV written:  {}\n", wav));
    }

    if verbose {
        output.push_str("\n  Hypothesis            Windows      Mono feature    Stereo feature\n");
        for (mono, stereo) in result.mono_scores.iter().zip(&result.stereo_scores) {
            output.push_str(&format_score_row(mono, stereo));
        }
    }

    output
}

fn format_score_row(mono: &HypothesisScore, stereo: &HypothesisScore) -> String {
    format!(
        "  {:<22}{:>7}{:>18}{:>18}\n",
        mono.class.to_string(),
        mono.windows,
        format_feature(mono.feature),
        format_feature(stereo.feature)
    )
}

fn format_feature(feature: f32) -> String {
    if feature == f32::NEG_INFINITY {
        "degenerate".to_string()
    } else {
        format!("{:.4e}", feature)
    }
}

/// Format reports as a JSON array
pub fn format_json(reports: &[FileReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}
