//! Food-photo analysis pipeline.
//!
//! Turns a captured food photograph into four families of per-pixel
//! signals: visual enhancement, nutrition-heuristic scoring, freshness
//! scoring, and edge/segmentation strength. All kernels are fixed,
//! deterministic numeric formulas - nothing here is learned or trained.
//!
//! # Architecture
//!
//! ```text
//! FoodAnalyzer (typed results)
//!     └── AnalysisBackend (dispatch one kernel per call)
//!             ├── CpuDispatcher (rayon, reference math)
//!             └── GpuDispatcher (wgpu compute shaders)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use platelens_analysis::{FoodAnalyzer, Backend, ImageBuffer};
//!
//! let analyzer = FoodAnalyzer::new(Backend::Gpu)?;
//! let photo = ImageBuffer::from_rgba(pixels, 1024, 768)?;
//!
//! let enhanced = analyzer.enhance(&photo)?;
//! let freshness = analyzer.analyze_freshness(&photo)?;
//! ```
//!
//! The GPU path compiles all four kernels once at construction and
//! keeps them for the lifetime of the dispatcher; a construction
//! failure permanently disables the accelerated path (callers decide
//! how to degrade - there is no silent CPU fallback).

pub mod analyzer;
pub mod backend;
pub mod extract;
pub mod kernel;
mod shaders;

pub use analyzer::{AnalysisJob, FoodAnalyzer};
pub use backend::{AnalysisBackend, Backend, CpuDispatcher, TILE_SIZE, workgroup_grid};
#[cfg(feature = "gpu")]
pub use backend::GpuDispatcher;
pub use extract::{
    AdvancedFoodAnalysis, ColorProfile, EdgeMap, EstimatedNutrition, FreshnessAnalysis,
    Recommendation, TextureMetrics,
};
pub use kernel::AnalysisKernel;
pub use platelens_core::ImageBuffer;

use thiserror::Error;

/// Analysis pipeline errors.
///
/// Initialization errors (`AcceleratorUnavailable`,
/// `KernelCompilationFailed`) are permanent: the dispatcher is never
/// constructed and there is no retry. Per-call errors affect only that
/// call; the dispatcher stays usable.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// No compatible compute accelerator was found at startup.
    #[error("no compatible compute accelerator: {0}")]
    AcceleratorUnavailable(String),

    /// A kernel failed to compile at startup.
    #[error("kernel '{kernel}' failed to compile: {reason}")]
    KernelCompilationFailed {
        /// Name of the offending kernel.
        kernel: &'static str,
        /// Compiler-reported reason.
        reason: String,
    },

    /// Caller passed an empty (zero-dimension) image.
    #[error("invalid input image: {width}x{height}")]
    InvalidImage {
        /// Input width.
        width: u32,
        /// Input height.
        height: u32,
    },

    /// Device buffer allocation failed for this call.
    #[error("buffer allocation failed: {0}")]
    BufferAllocationFailed(String),

    /// Recording the compute pass failed for this call.
    #[error("failed to encode dispatch: {0}")]
    DispatchEncodingFailed(String),

    /// Accelerator-reported failure during execution or readback.
    #[error("computation failed: {0}")]
    ComputationFailed(String),
}

/// Result alias for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
