//! CLI output formatting.
//!
//! # Format-First Display
//!
//! Every line leads with the format identifier, the thing the user asked for,
//! with paths and error text as secondary context. Identifiers are padded to
//! a common width so a batch reads as a table.
//!
//! # Output Format
//!
//! ## Process
//!
//! ```text
//! Processing 3 formats
//! APPICON          validating
//! APPICON          resizing
//! APPICON          encoding
//! APPICON          → assets/APPICON.PNG
//! LOGO             failed: Validation failed: Image too small: 10x10 (minimum 90px per side)
//!
//! 2 succeeded, 1 failed
//! ```
//!
//! ## Formats
//!
//! ```text
//! APPICON          1024×1024  transparent   Application icon with optional transparency
//! FEATURE_GRAPHIC  1024×500   #FFFFFF       Feature graphic banner for store listings
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::formats::{FormatCatalog, FormatSpec};
use crate::imaging::Dimensions;
use crate::process::{JobStage, ProcessEvent, ProcessingResult, ResultStatus};
use std::path::Path;

/// Width of the identifier column (longest identifier plus two spaces).
const ID_WIDTH: usize = 17;

fn id_column(format_id: &str) -> String {
    format!("{:<width$}", format_id, width = ID_WIDTH)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Human description of a format's canvas background.
fn background_label(spec: &FormatSpec) -> String {
    let [r, g, b, a] = spec.background.0;
    if a == 0 {
        "transparent".to_string()
    } else {
        format!("#{r:02X}{g:02X}{b:02X}")
    }
}

// ============================================================================
// process
// ============================================================================

/// Format a single progress event as display lines.
///
/// `Pending` stages produce nothing: every format is pending at batch start
/// and the `BatchStarted` line already says how many there are.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::BatchStarted { total } => {
            vec![format!("Processing {}", plural(*total, "format"))]
        }
        ProcessEvent::Stage { stage, .. } if *stage == JobStage::Pending => Vec::new(),
        ProcessEvent::Stage { format_id, stage } => {
            vec![format!("{}{}", id_column(format_id), stage)]
        }
        ProcessEvent::Finished(result) => vec![format_result_line(result)],
        ProcessEvent::Cancelled { skipped } => {
            vec![format!("Cancelled: {} not started", plural(*skipped, "format"))]
        }
    }
}

/// One line per result: output path on success, error text on failure.
pub fn format_result_line(result: &ProcessingResult) -> String {
    match &result.status {
        ResultStatus::Success { output_path } => format!(
            "{}\u{2192} {}",
            id_column(&result.format_id),
            output_path.display()
        ),
        ResultStatus::Failed { error_message } => {
            format!("{}failed: {}", id_column(&result.format_id), error_message)
        }
    }
}

/// Closing tally for a batch.
pub fn format_batch_summary(results: &[ProcessingResult]) -> Vec<String> {
    let succeeded = results.iter().filter(|r| r.is_success()).count();
    let failed = results.len() - succeeded;
    let mut lines = vec![String::new()];
    if results.is_empty() {
        lines.push("No formats processed".to_string());
    } else {
        lines.push(format!("{succeeded} succeeded, {failed} failed"));
    }
    lines
}

/// Print the batch summary to stdout.
pub fn print_batch_summary(results: &[ProcessingResult]) {
    for line in format_batch_summary(results) {
        println!("{}", line);
    }
}

// ============================================================================
// formats
// ============================================================================

/// One line per catalogue entry, in catalogue order.
pub fn format_catalog(catalog: &FormatCatalog) -> Vec<String> {
    catalog
        .iter()
        .map(|spec| {
            let size = format!("{}\u{00d7}{}", spec.width, spec.height);
            format!(
                "{}{:<11}{:<14}{}",
                id_column(spec.id.as_str()),
                size,
                background_label(spec),
                spec.description
            )
        })
        .collect()
}

/// Print the catalogue to stdout.
pub fn print_catalog(catalog: &FormatCatalog) {
    for line in format_catalog(catalog) {
        println!("{}", line);
    }
}

// ============================================================================
// check
// ============================================================================

/// Report for a source that passed validation.
pub fn format_check_output(source: &Path, dims: Dimensions) -> Vec<String> {
    vec![
        source.display().to_string(),
        format!("    Dimensions: {}\u{00d7}{}", dims.width, dims.height),
        "==> Source is valid".to_string(),
    ]
}

/// Print the check report to stdout.
pub fn print_check_output(source: &Path, dims: Dimensions) {
    for line in format_check_output(source, dims) {
        println!("{}", line);
    }
}
