//! # platelens-core
//!
//! Core types for the PlateLens food-photo analysis pipeline.
//!
//! This crate provides the foundational types shared by the analysis
//! crates:
//!
//! - [`ImageBuffer`] - Owned RGBA f32 pixel grid, the unit of data
//!   exchanged between the host and the compute backends
//! - [`Error`] - Buffer-level error handling
//!
//! ## Design Philosophy
//!
//! An [`ImageBuffer`] is a plain rectangular grid of normalized RGBA
//! samples with no backend affinity: it is what callers hand to the
//! pipeline and what the pipeline hands back. All accelerator-specific
//! resources (storage buffers, pipelines, queues) live in
//! `platelens-analysis` and never leak into results.
//!
//! ## Crate Structure
//!
//! This crate has no internal dependencies. The analysis crate depends
//! on it:
//!
//! ```text
//! platelens-core (this crate)
//!    ^
//!    |
//!    +-- platelens-analysis (kernels, orchestrator, extraction)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod image;

pub use error::{Error, Result};
pub use image::ImageBuffer;

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use platelens_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::image::ImageBuffer;
}
