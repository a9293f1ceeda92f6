//! # logocraft
//!
//! Turns one source image into the fixed set of assets a mobile app ships
//! with: application icons, splash screens, store graphics, square and wide
//! logos, and a monochrome notification icon.
//!
//! # Architecture: One Source, Many Formats
//!
//! ```text
//!            ┌─ validate ─ load ─ (remove background) ─ canvas-fit ─────────── encode → <ID>.PNG
//! source ────┤
//!            └─ validate ─ load ─ remove background ─── stylize ─ resize 96² ─ encode → PUSH.PNG
//! ```
//!
//! Each requested format runs through its own pipeline. Formats share nothing
//! mutable, so one failing format never affects the others and the batch can
//! run in parallel.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`formats`] | The immutable format catalogue: identifiers, sizes, backgrounds |
//! | [`validate`] | Source checks (existence, extension, file size, dimensions) before any decode |
//! | [`imaging`] | Backend seam, canvas-fit math and resampling, mask primitives, icon stylizer |
//! | [`removal`] | Background removal: combined pipeline plus alternative strategies |
//! | [`process`] | Batch orchestrator: per-format dispatch, failure isolation, progress |
//! | [`config`] | `logocraft.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup for the binary |
//!
//! # Design Decisions
//!
//! ## Canvas-Fit Never Crops
//!
//! Every non-notification format is produced by scaling the source to the
//! largest size that fits the target canvas and centering it on the format's
//! background. Aspect ratio is preserved exactly, any leftover pixel goes to
//! the right/bottom margin, and large reductions go through a box pre-shrink
//! before Lanczos to avoid aliasing.
//!
//! ## Best-Effort Background Removal
//!
//! Removal is an enhancement, never a requirement. Strategies report why they
//! could not run as a [`removal::RemovalDegradation`] and the orchestrator
//! substitutes the opaque original. Flat-background strategies are gated on a
//! mostly-white border, so photos and coloured artwork pass through untouched.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding and encoding use the `image` crate; blur, edge detection, Otsu
//! thresholding and contour tracing come from `imageproc`. There are no system
//! libraries to install and no model weights to ship.

pub mod config;
pub mod formats;
pub mod imaging;
pub mod logging;
pub mod output;
pub mod process;
pub mod removal;
pub mod validate;

pub use formats::{FormatCatalog, FormatId, FormatSpec};
pub use process::{BatchControl, CancelToken, ProcessEvent, ProcessingResult, Processor};
pub use removal::{BackgroundRemover, RemovalMethod};

#[cfg(test)]
pub(crate) mod test_helpers;
