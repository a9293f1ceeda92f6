//! Format batch orchestration.
//!
//! Takes one source image and a set of format identifiers and produces one
//! `<FORMAT_ID>.PNG` per format in the output directory.
//!
//! ## Per-format pipeline
//!
//! ```text
//! Pending → Validating → (Removing) → Resizing/Stylizing → Encoding → Success | Failed
//! ```
//!
//! - **PUSH**: background removal (always; the gate keeps sources without a
//!   flat white border opaque), then the icon stylizer, then a plain resize
//!   to 96×96 (the glyph is already square).
//! - **Everything else**: background removal only when requested *and* the
//!   format supports transparency, then canvas-fit onto the format's
//!   background. Opaque formats are flattened to RGB before encoding.
//!
//! ## Failure isolation
//!
//! [`Processor::process_one`] never returns an error. Anything that goes wrong
//! for a format (unknown identifier, validation, decode, encode) becomes a
//! [`ResultStatus::Failed`] entry and the batch moves on to the next format.
//! Background removal never fails a format: a degraded strategy falls back to
//! the opaque original.
//!
//! ## Parallel Processing
//!
//! Formats share nothing but the read-only catalogue and the remover, so
//! [`Processor::process_batch_parallel`] simply fans the per-format loop out
//! over [rayon](https://docs.rs/rayon). Results keep catalogue order either way.

use crate::config::LogocraftConfig;
use crate::formats::{FormatCatalog, FormatId, FormatSpec, UnknownFormat};
use crate::imaging::{
    BackendError, FitParams, ImageBackend, PngCompression, fit_to_canvas, resize_exact, stylize,
    with_channels,
};
use crate::removal::{BackgroundRemover, opaque_passthrough};
use crate::validate::{ValidationError, ValidationLimits, validate_source};
use image::{DynamicImage, RgbaImage};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    UnknownFormat(#[from] UnknownFormat),
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
}

/// Where a single format job currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    Pending,
    Validating,
    Removing,
    Resizing,
    Stylizing,
    Encoding,
    Success,
    Failed,
}

impl JobStage {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStage::Pending => "pending",
            JobStage::Validating => "validating",
            JobStage::Removing => "removing background",
            JobStage::Resizing => "resizing",
            JobStage::Stylizing => "stylizing",
            JobStage::Encoding => "encoding",
            JobStage::Success => "success",
            JobStage::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStage::Success | JobStage::Failed)
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResultStatus {
    Success { output_path: PathBuf },
    Failed { error_message: String },
}

/// Result record for one requested format identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingResult {
    /// The identifier as requested (canonical form when it was recognised).
    pub format_id: String,
    #[serde(flatten)]
    pub status: ResultStatus,
}

impl ProcessingResult {
    pub fn success(format_id: impl Into<String>, output_path: PathBuf) -> Self {
        Self {
            format_id: format_id.into(),
            status: ResultStatus::Success { output_path },
        }
    }

    pub fn failed(format_id: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            format_id: format_id.into(),
            status: ResultStatus::Failed {
                error_message: error_message.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, ResultStatus::Success { .. })
    }

    pub fn output_path(&self) -> Option<&Path> {
        match &self.status {
            ResultStatus::Success { output_path } => Some(output_path),
            ResultStatus::Failed { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            ResultStatus::Success { .. } => None,
            ResultStatus::Failed { error_message } => Some(error_message),
        }
    }

    /// Terminal stage this result represents.
    pub fn stage(&self) -> JobStage {
        if self.is_success() {
            JobStage::Success
        } else {
            JobStage::Failed
        }
    }
}

/// Progress events sent to an optional listener while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    /// The batch has resolved its format list.
    BatchStarted { total: usize },
    /// A format moved to a new non-terminal stage.
    Stage { format_id: String, stage: JobStage },
    /// A format reached `Success` or `Failed`.
    Finished(ProcessingResult),
    /// Cancellation was observed; `skipped` formats were never started.
    Cancelled { skipped: usize },
}

/// Cooperative cancellation flag, checked before each format starts.
///
/// A format already in progress always runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Optional progress listener and cancellation for a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchControl {
    pub progress: Option<Sender<ProcessEvent>>,
    pub cancel: CancelToken,
}

impl BatchControl {
    pub fn with_progress(progress: Sender<ProcessEvent>) -> Self {
        Self {
            progress: Some(progress),
            cancel: CancelToken::default(),
        }
    }

    fn emit(&self, event: ProcessEvent) {
        if let Some(tx) = &self.progress {
            // A listener that went away must not stop the batch.
            tx.send(event).ok();
        }
    }
}

/// Resolve a request into processing order: recognised identifiers in
/// catalogue order (duplicates collapsed), then unrecognised ones as given.
pub fn batch_order<S: AsRef<str>>(format_ids: &[S]) -> Vec<String> {
    let mut known: Vec<FormatId> = Vec::new();
    let mut unknown: Vec<String> = Vec::new();
    for raw in format_ids {
        let raw = raw.as_ref();
        match raw.parse::<FormatId>() {
            Ok(id) if !known.contains(&id) => known.push(id),
            Ok(_) => {}
            Err(_) if !unknown.iter().any(|u| u == raw) => unknown.push(raw.to_string()),
            Err(_) => {}
        }
    }
    known.sort();
    known
        .into_iter()
        .map(|id| id.as_str().to_string())
        .chain(unknown)
        .collect()
}

/// Runs format jobs for one source image.
pub struct Processor<'a, B: ImageBackend> {
    backend: B,
    catalog: &'a FormatCatalog,
    remover: BackgroundRemover,
    limits: ValidationLimits,
    progressive: bool,
    compression: PngCompression,
}

impl<'a, B: ImageBackend> Processor<'a, B> {
    /// Processor with default validation, removal and encoding settings.
    pub fn new(backend: B, catalog: &'a FormatCatalog) -> Self {
        Self {
            backend,
            catalog,
            remover: BackgroundRemover::default(),
            limits: ValidationLimits::default(),
            progressive: true,
            compression: PngCompression::default(),
        }
    }

    /// Processor configured from a loaded `logocraft.toml`.
    pub fn from_config(backend: B, catalog: &'a FormatCatalog, config: &LogocraftConfig) -> Self {
        Self {
            backend,
            catalog,
            remover: config.removal.remover(),
            limits: config.validation.limits(),
            progressive: config.resize.progressive_downscale,
            compression: config.output.compression,
        }
    }

    pub fn with_remover(mut self, remover: BackgroundRemover) -> Self {
        self.remover = remover;
        self
    }

    pub fn with_limits(mut self, limits: ValidationLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_progressive(mut self, progressive: bool) -> Self {
        self.progressive = progressive;
        self
    }

    pub fn with_compression(mut self, compression: PngCompression) -> Self {
        self.compression = compression;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn remover(&self) -> &BackgroundRemover {
        &self.remover
    }

    /// Produce one format. Never fails: errors become a `Failed` result.
    ///
    /// `remove_background` applies to the transparency-capable formats. PUSH
    /// runs the remover regardless, since its glyph sits on transparency.
    pub fn process_one(
        &self,
        source: &Path,
        output_dir: &Path,
        format_id: &str,
        remove_background: bool,
    ) -> ProcessingResult {
        self.run_format(
            source,
            output_dir,
            format_id,
            remove_background,
            &BatchControl::default(),
        )
    }

    /// Produce every requested format, one after another.
    pub fn process_batch<S: AsRef<str>>(
        &self,
        source: &Path,
        output_dir: &Path,
        format_ids: &[S],
        remove_background: bool,
    ) -> Vec<ProcessingResult> {
        self.process_batch_with(
            source,
            output_dir,
            format_ids,
            remove_background,
            &BatchControl::default(),
        )
    }

    /// [`process_batch`](Self::process_batch) with progress events and cancellation.
    pub fn process_batch_with<S: AsRef<str>>(
        &self,
        source: &Path,
        output_dir: &Path,
        format_ids: &[S],
        remove_background: bool,
        control: &BatchControl,
    ) -> Vec<ProcessingResult> {
        let order = self.begin_batch(source, format_ids, control);
        let mut results = Vec::with_capacity(order.len());
        for (i, id) in order.iter().enumerate() {
            if control.cancel.is_cancelled() {
                let skipped = order.len() - i;
                info!(skipped, "Batch cancelled");
                control.emit(ProcessEvent::Cancelled { skipped });
                break;
            }
            results.push(self.run_format(source, output_dir, id, remove_background, control));
        }
        results
    }

    /// Same results as [`process_batch_with`](Self::process_batch_with), with
    /// formats processed concurrently on the rayon pool.
    pub fn process_batch_parallel<S: AsRef<str>>(
        &self,
        source: &Path,
        output_dir: &Path,
        format_ids: &[S],
        remove_background: bool,
        control: &BatchControl,
    ) -> Vec<ProcessingResult> {
        let order = self.begin_batch(source, format_ids, control);
        let results: Vec<Option<ProcessingResult>> = order
            .par_iter()
            .map(|id| {
                if control.cancel.is_cancelled() {
                    return None;
                }
                Some(self.run_format(source, output_dir, id, remove_background, control))
            })
            .collect();

        let skipped = results.iter().filter(|r| r.is_none()).count();
        if skipped > 0 {
            info!(skipped, "Batch cancelled");
            control.emit(ProcessEvent::Cancelled { skipped });
        }
        results.into_iter().flatten().collect()
    }

    fn begin_batch<S: AsRef<str>>(
        &self,
        source: &Path,
        format_ids: &[S],
        control: &BatchControl,
    ) -> Vec<String> {
        let order = batch_order(format_ids);
        info!(source = %source.display(), formats = order.len(), "Starting batch");
        control.emit(ProcessEvent::BatchStarted { total: order.len() });
        for id in &order {
            control.emit(ProcessEvent::Stage {
                format_id: id.clone(),
                stage: JobStage::Pending,
            });
        }
        order
    }

    fn run_format(
        &self,
        source: &Path,
        output_dir: &Path,
        format_id: &str,
        remove_background: bool,
        control: &BatchControl,
    ) -> ProcessingResult {
        info!(format = format_id, "Processing format");
        let result = match self.render(source, output_dir, format_id, remove_background, control) {
            Ok((spec, path)) => {
                info!(format = %spec.id, path = %path.display(), "Format written");
                ProcessingResult::success(spec.id.as_str(), path)
            }
            Err(e) => {
                error!(format = format_id, error = %e, "Format failed");
                ProcessingResult::failed(format_id, e.to_string())
            }
        };
        control.emit(ProcessEvent::Finished(result.clone()));
        result
    }

    fn render(
        &self,
        source: &Path,
        output_dir: &Path,
        format_id: &str,
        remove_background: bool,
        control: &BatchControl,
    ) -> Result<(&'a FormatSpec, PathBuf), ProcessError> {
        let spec = self.catalog.lookup(format_id)?;
        let stage = |stage: JobStage| {
            debug!(format = %spec.id, %stage, "Stage");
            control.emit(ProcessEvent::Stage {
                format_id: spec.id.as_str().to_string(),
                stage,
            });
        };

        stage(JobStage::Validating);
        validate_source(&self.backend, source, &self.limits)?;
        let image = self.backend.load(source)?;

        let output = if spec.is_push() {
            stage(JobStage::Removing);
            let rgba = self.remove(spec, &image.to_rgba8());
            stage(JobStage::Stylizing);
            let glyph = stylize(&rgba);
            stage(JobStage::Resizing);
            with_channels(resize_exact(&glyph, spec.width, spec.height), spec.channels())
        } else {
            let prepared = if remove_background && spec.supports_transparency {
                stage(JobStage::Removing);
                DynamicImage::ImageRgba8(self.remove(spec, &image.to_rgba8()))
            } else {
                image
            };
            stage(JobStage::Resizing);
            let params = FitParams {
                progressive: self.progressive,
                ..FitParams::new(spec.width, spec.height, spec.background)
            };
            with_channels(fit_to_canvas(&prepared, &params), spec.channels())
        };

        stage(JobStage::Encoding);
        std::fs::create_dir_all(output_dir)?;
        let path = output_dir.join(spec.id.file_name());
        self.backend.save_png(&output, &path, self.compression)?;
        Ok((spec, path))
    }

    /// Best-effort removal: a degraded strategy yields the opaque original.
    fn remove(&self, spec: &FormatSpec, image: &RgbaImage) -> RgbaImage {
        match self.remover.try_remove(image) {
            Ok(removed) => removed,
            Err(reason) => {
                warn!(
                    format = %spec.id,
                    method = %self.remover.method(),
                    %reason,
                    "Background removal degraded to passthrough"
                );
                opaque_passthrough(image)
            }
        }
    }
}
